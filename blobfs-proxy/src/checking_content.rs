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

use crate::{MutableContent, StatResult};
use blobfs_common::conf::ProxyConf;
use blobfs_common::FsResult;

/// A [`MutableContent`] that runs `check_invariants` before and after every
/// call when checks are enabled, to catch logic errors at the call that caused them.
#[derive(Debug)]
pub struct CheckingMutableContent {
    wrapped: MutableContent,
    enabled: bool,
}

impl CheckingMutableContent {
    pub fn new(wrapped: MutableContent) -> Self {
        Self::with_checks(wrapped, true)
    }

    pub fn with_checks(wrapped: MutableContent, enabled: bool) -> Self {
        Self { wrapped, enabled }
    }

    pub fn with_conf(wrapped: MutableContent, conf: &ProxyConf) -> Self {
        Self::with_checks(wrapped, conf.check_invariants)
    }

    pub fn inner(&self) -> &MutableContent {
        &self.wrapped
    }

    pub fn into_inner(self) -> MutableContent {
        self.wrapped
    }

    pub fn is_dirty(&self) -> bool {
        self.wrapped.is_dirty()
    }

    fn check(&self) {
        if self.enabled {
            self.wrapped.check_invariants();
        }
    }

    pub async fn stat(&self) -> FsResult<StatResult> {
        self.check();
        let res = self.wrapped.stat().await;
        self.check();
        res
    }

    pub async fn read_at(&mut self, buf: &mut [u8], off: u64) -> FsResult<usize> {
        self.check();
        let res = self.wrapped.read_at(buf, off).await;
        self.check();
        res
    }

    pub async fn write_at(&mut self, buf: &[u8], off: u64) -> FsResult<usize> {
        self.check();
        let res = self.wrapped.write_at(buf, off).await;
        self.check();
        res
    }

    pub async fn truncate(&mut self, size: u64) -> FsResult<()> {
        self.check();
        let res = self.wrapped.truncate(size).await;
        self.check();
        res
    }

    pub fn destroy(self) {
        self.check();
        self.wrapped.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::CheckingMutableContent;
    use crate::test_leases::{RecordingLease, RecordingProxy, SharedRecorder};
    use crate::MutableContent;
    use blobfs_common::clock::SimulatedClock;
    use blobfs_common::conf::ProxyConf;
    use std::sync::Arc;

    fn content(recorder: &SharedRecorder) -> MutableContent {
        let proxy = RecordingProxy::new(b"hello world", recorder.clone())
            .upgrade_ok(RecordingLease::new(b"hello world", recorder.clone()));
        MutableContent::new(Box::new(proxy), Arc::new(SimulatedClock::default()))
    }

    #[tokio::test]
    async fn checks_around_every_call() {
        let recorder = SharedRecorder::default();
        let mut mc = CheckingMutableContent::new(content(&recorder));

        mc.stat().await.unwrap();
        assert_eq!(recorder.get().invariant_checks, 2);

        let mut buf = [0u8; 4];
        mc.read_at(&mut buf, 0).await.unwrap();
        assert_eq!(recorder.get().invariant_checks, 4);

        // Before on the read-only lease, after on the read-write lease.
        mc.write_at(b"j", 0).await.unwrap();
        assert_eq!(recorder.get().invariant_checks, 6);

        mc.truncate(3).await.unwrap();
        assert_eq!(recorder.get().invariant_checks, 8);

        mc.destroy();
        let recorder = recorder.get();
        assert_eq!(recorder.invariant_checks, 9);
        assert!(recorder.lease_destroyed);
    }

    #[tokio::test]
    async fn checks_after_failed_call() {
        let recorder = SharedRecorder::default();
        recorder.get().proxy_read_error = Some("taco".to_string());
        let mut mc = CheckingMutableContent::new(content(&recorder));

        let mut buf = [0u8; 4];
        assert!(mc.read_at(&mut buf, 0).await.is_err());
        assert_eq!(recorder.get().invariant_checks, 2);
    }

    #[tokio::test]
    async fn disabled_by_conf() {
        let recorder = SharedRecorder::default();
        let conf = ProxyConf {
            check_invariants: false,
            ..Default::default()
        };
        let mut mc = CheckingMutableContent::with_conf(content(&recorder), &conf);

        mc.stat().await.unwrap();
        mc.write_at(b"j", 0).await.unwrap();
        assert_eq!(recorder.get().invariant_checks, 0);
        assert!(mc.is_dirty());
    }
}
