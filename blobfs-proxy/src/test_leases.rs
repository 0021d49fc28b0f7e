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

// Recording lease doubles shared by the unit tests of this crate.

use async_trait::async_trait;
use blobfs_common::error::FsError;
use blobfs_common::FsResult;
use blobfs_lease::{ReadProxy, ReadWriteLease};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct Recorder {
    pub upgrades: usize,
    pub proxy_reads: Vec<(u64, usize)>,
    pub lease_reads: Vec<(u64, usize)>,
    pub writes: Vec<(u64, Vec<u8>)>,
    pub truncates: Vec<u64>,
    pub invariant_checks: usize,
    pub proxy_destroyed: bool,
    pub lease_destroyed: bool,

    pub proxy_read_error: Option<String>,
    // Fails reads, writes and truncates of the read-write lease.
    pub lease_error: Option<String>,
    pub upgrade_delay: Option<Duration>,
}

impl Recorder {
    pub fn clear_calls(&mut self) {
        self.upgrades = 0;
        self.proxy_reads.clear();
        self.lease_reads.clear();
        self.writes.clear();
        self.truncates.clear();
        self.invariant_checks = 0;
    }
}

#[derive(Debug, Clone, Default)]
pub struct SharedRecorder(Arc<Mutex<Recorder>>);

impl SharedRecorder {
    pub fn get(&self) -> MutexGuard<'_, Recorder> {
        self.0.lock().unwrap()
    }
}

fn read_from(content: &[u8], buf: &mut [u8], off: u64) -> usize {
    if off >= content.len() as u64 {
        return 0;
    }
    let src = &content[off as usize..];
    let n = src.len().min(buf.len());
    buf[..n].copy_from_slice(&src[..n]);
    n
}

pub struct RecordingProxy {
    content: Vec<u8>,
    recorder: SharedRecorder,
    // Consumed front to back by upgrade calls.
    upgrades: VecDeque<FsResult<RecordingLease>>,
}

impl RecordingProxy {
    pub fn new(content: &[u8], recorder: SharedRecorder) -> Self {
        Self {
            content: content.to_vec(),
            recorder,
            upgrades: VecDeque::new(),
        }
    }

    pub fn upgrade_ok(mut self, lease: RecordingLease) -> Self {
        self.upgrades.push_back(Ok(lease));
        self
    }

    pub fn upgrade_err(mut self, msg: &str) -> Self {
        self.upgrades.push_back(Err(FsError::common(msg)));
        self
    }
}

#[async_trait]
impl ReadProxy for RecordingProxy {
    fn size(&self) -> u64 {
        self.content.len() as u64
    }

    async fn read_at(&mut self, buf: &mut [u8], off: u64) -> FsResult<usize> {
        let mut recorder = self.recorder.get();
        recorder.proxy_reads.push((off, buf.len()));
        if let Some(msg) = &recorder.proxy_read_error {
            return Err(FsError::common(msg.clone()));
        }
        Ok(read_from(&self.content, buf, off))
    }

    async fn upgrade(&mut self) -> FsResult<Box<dyn ReadWriteLease>> {
        let delay = {
            let mut recorder = self.recorder.get();
            recorder.upgrades += 1;
            recorder.upgrade_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.upgrades.pop_front() {
            Some(Ok(lease)) => Ok(Box::new(lease)),
            Some(Err(e)) => Err(e),
            None => Err(FsError::common("unexpected upgrade")),
        }
    }

    fn destroy(self: Box<Self>) {
        self.recorder.get().proxy_destroyed = true;
    }

    fn check_invariants(&self) {
        self.recorder.get().invariant_checks += 1;
    }
}

pub struct RecordingLease {
    content: Vec<u8>,
    recorder: SharedRecorder,
}

impl RecordingLease {
    pub fn new(content: &[u8], recorder: SharedRecorder) -> Self {
        Self {
            content: content.to_vec(),
            recorder,
        }
    }

    fn check_error(recorder: &Recorder) -> FsResult<()> {
        match &recorder.lease_error {
            Some(msg) => Err(FsError::common(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ReadWriteLease for RecordingLease {
    async fn size(&self) -> FsResult<u64> {
        Ok(self.content.len() as u64)
    }

    async fn read_at(&mut self, buf: &mut [u8], off: u64) -> FsResult<usize> {
        let mut recorder = self.recorder.get();
        recorder.lease_reads.push((off, buf.len()));
        Self::check_error(&recorder)?;
        Ok(read_from(&self.content, buf, off))
    }

    async fn write_at(&mut self, buf: &[u8], off: u64) -> FsResult<usize> {
        let mut recorder = self.recorder.get();
        recorder.writes.push((off, buf.to_vec()));
        Self::check_error(&recorder)?;

        let start = off as usize;
        let end = start + buf.len();
        if end > self.content.len() {
            self.content.resize(end, 0);
        }
        self.content[start..end].copy_from_slice(buf);
        Ok(buf.len())
    }

    async fn truncate(&mut self, size: u64) -> FsResult<()> {
        let mut recorder = self.recorder.get();
        recorder.truncates.push(size);
        Self::check_error(&recorder)?;
        self.content.resize(size as usize, 0);
        Ok(())
    }

    fn destroy(self: Box<Self>) {
        self.recorder.get().lease_destroyed = true;
    }

    fn check_invariants(&self) {
        self.recorder.get().invariant_checks += 1;
    }
}
