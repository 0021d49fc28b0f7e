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

use blobfs_common::clock::SimulatedClock;
use blobfs_common::conf::{LeaseConf, ProxyConf};
use blobfs_common::FsResult;
use blobfs_lease::{BytesReadProxy, FileLeaser, FileReadProxy};
use blobfs_proxy::{CheckingMutableContent, MutableContent};
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Scratch directory, leaser and simulated clock for end-to-end tests over real leases.
pub struct Testing {
    pub dir: TempDir,
    pub conf: ProxyConf,
    pub leaser: Arc<FileLeaser>,
    pub clock: Arc<SimulatedClock>,
}

impl Testing {
    pub const COPY_CHUNK_SIZE: usize = 7;

    pub fn new() -> FsResult<Self> {
        let dir = tempfile::tempdir()?;
        let conf = ProxyConf {
            check_invariants: true,
            lease: LeaseConf {
                temp_dir: dir.path().join("leases").to_string_lossy().to_string(),
                copy_chunk_size: Self::COPY_CHUNK_SIZE,
            },
            ..Default::default()
        };
        let leaser = Arc::new(FileLeaser::new(&conf.lease)?);
        let clock = Arc::new(SimulatedClock::new(Self::start_time()));

        Ok(Self {
            dir,
            conf,
            leaser,
            clock,
        })
    }

    pub fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2012, 8, 15, 22, 56, 0)
            .single()
            .unwrap_or_default()
    }

    /// Content over an object already fetched into memory.
    pub fn bytes_content<T: Into<Bytes>>(&self, object: T) -> CheckingMutableContent {
        let proxy = BytesReadProxy::new(object, self.leaser.clone());
        let mc = MutableContent::new(Box::new(proxy), self.clock.clone());
        CheckingMutableContent::with_conf(mc, &self.conf)
    }

    /// Content over an object cached in a file under the scratch directory.
    pub async fn file_content(&self, name: &str, object: &[u8]) -> FsResult<CheckingMutableContent> {
        let path = self.object_path(name);
        tokio::fs::write(&path, object).await?;
        let proxy = FileReadProxy::open(&path, self.leaser.clone()).await?;
        let mc = MutableContent::new(Box::new(proxy), self.clock.clone());
        Ok(CheckingMutableContent::with_conf(mc, &self.conf))
    }

    pub fn object_path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }

    pub fn lease_dir(&self) -> &Path {
        self.leaser.dir()
    }
}

/// Read the whole content through `read_at`, `chunk` bytes at a time.
pub async fn read_all(mc: &mut CheckingMutableContent, chunk: usize) -> FsResult<Vec<u8>> {
    let mut res = vec![];
    let mut buf = vec![0u8; chunk];
    loop {
        let n = mc.read_at(&mut buf, res.len() as u64).await?;
        if n == 0 {
            return Ok(res);
        }
        res.extend_from_slice(&buf[..n]);
    }
}
