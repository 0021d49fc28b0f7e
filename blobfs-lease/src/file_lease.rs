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

use crate::ReadWriteLease;
use async_trait::async_trait;
use blobfs_common::FsResult;
use log::debug;
use std::io::SeekFrom;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// Read-write lease backed by an anonymous temporary file.
///
/// The file is unlinked as soon as it is created, so the space is reclaimed as
/// soon as the lease is dropped, whether or not `destroy` was called.
pub struct FileLease {
    id: u64,
    file: File,
    live: Arc<AtomicUsize>,
}

impl FileLease {
    pub(crate) fn new(id: u64, file: File, live: Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self { id, file, live }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Append the whole of `reader` to the lease, copying through a buffer of `chunk_size` bytes.
    pub async fn fill_from<R>(&mut self, reader: &mut R, chunk_size: usize) -> FsResult<u64>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut buf = vec![0u8; chunk_size];
        let mut off = self.size().await?;
        let start = off;
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            self.write_at(&buf[..n], off).await?;
            off += n as u64;
        }
        Ok(off - start)
    }
}

#[async_trait]
impl ReadWriteLease for FileLease {
    async fn size(&self) -> FsResult<u64> {
        let meta = self.file.metadata().await?;
        Ok(meta.len())
    }

    async fn read_at(&mut self, buf: &mut [u8], off: u64) -> FsResult<usize> {
        self.file.seek(SeekFrom::Start(off)).await?;
        let mut total = 0;
        while total < buf.len() {
            let n = self.file.read(&mut buf[total..]).await?;
            if n == 0 {
                break;
            }
            total += n;
        }
        Ok(total)
    }

    async fn write_at(&mut self, buf: &[u8], off: u64) -> FsResult<usize> {
        self.file.seek(SeekFrom::Start(off)).await?;
        self.file.write_all(buf).await?;
        // Surfaces errors of the background write here rather than on a later call.
        self.file.flush().await?;
        Ok(buf.len())
    }

    async fn truncate(&mut self, size: u64) -> FsResult<()> {
        self.file.set_len(size).await?;
        Ok(())
    }

    fn destroy(self: Box<Self>) {
        debug!("destroy file lease {}", self.id);
    }
}

impl Drop for FileLease {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}
