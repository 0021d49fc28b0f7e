// Copyright 2025 OPPO.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::FileLease;
use blobfs_common::conf::LeaseConf;
use blobfs_common::error::FsError;
use blobfs_common::FsResult;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncRead;

/// Hands out [`FileLease`]s created in a scratch directory.
pub struct FileLeaser {
    dir: PathBuf,
    copy_chunk_size: usize,
    next_id: AtomicU64,
    live: Arc<AtomicUsize>,
}

impl FileLeaser {
    pub fn new(conf: &LeaseConf) -> FsResult<Self> {
        let dir = conf.temp_dir();
        std::fs::create_dir_all(&dir).map_err(|e| {
            FsError::common(format!("create lease dir {}: {}", dir.display(), e))
        })?;
        info!(
            "file leaser created, dir {}, copy chunk size {}",
            dir.display(),
            conf.copy_chunk_size
        );

        Ok(Self {
            dir,
            copy_chunk_size: conf.copy_chunk_size.max(1),
            next_id: AtomicU64::new(1),
            live: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn copy_chunk_size(&self) -> usize {
        self.copy_chunk_size
    }

    /// Number of leases created by this leaser that have not been dropped yet.
    pub fn live_leases(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn new_file_lease(&self) -> FsResult<FileLease> {
        let file = tempfile::tempfile_in(&self.dir)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!("new file lease {} in {}", id, self.dir.display());
        Ok(FileLease::new(id, File::from_std(file), self.live.clone()))
    }

    /// Create a lease holding everything `reader` yields.
    /// A lease that fails half way is dropped, which releases its file.
    pub async fn new_file_lease_from<R>(&self, reader: &mut R) -> FsResult<FileLease>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut lease = self.new_file_lease()?;
        let n = lease.fill_from(reader, self.copy_chunk_size).await?;
        debug!("file lease {} filled with {} bytes", lease.id(), n);
        Ok(lease)
    }
}
