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

use blobfs_common::clock::Clock;
use blobfs_common::error::FsError;
use blobfs_common::{err_box, FsResult};
use blobfs_lease::{ReadProxy, ReadWriteLease};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatResult {
    pub size: u64,

    // None until the content has been modified locally; the caller then
    // falls back to the object's own metadata.
    pub mtime: Option<DateTime<Utc>>,
}

enum ContentState {
    Clean(Box<dyn ReadProxy>),
    Dirty {
        lease: Box<dyn ReadWriteLease>,
        mtime: DateTime<Utc>,
    },
}

/// Mutable contents of an object.
///
/// Starts out serving reads from a read-only lease. The first write or
/// truncate upgrades that lease into a read-write lease, which serves every
/// operation from then on. The instance never goes back to the read-only lease.
///
/// Not synchronized: the owner must serialize calls, e.g. by holding a
/// per-file lock. Dropping a future returned by any method cancels the
/// underlying lease call and leaves the instance in a consistent state.
pub struct MutableContent {
    state: ContentState,
    clock: Arc<dyn Clock>,
}

impl MutableContent {
    pub fn new(initial: Box<dyn ReadProxy>, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: ContentState::Clean(initial),
            clock,
        }
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self.state, ContentState::Dirty { .. })
    }

    /// Panic if internal invariants are violated.
    ///
    /// Holding exactly one lease, and having an mtime exactly when dirty, are
    /// guaranteed by the representation; this asks the held lease to check itself.
    pub fn check_invariants(&self) {
        match &self.state {
            ContentState::Clean(proxy) => proxy.check_invariants(),
            ContentState::Dirty { lease, .. } => lease.check_invariants(),
        }
    }

    pub async fn stat(&self) -> FsResult<StatResult> {
        match &self.state {
            ContentState::Clean(proxy) => Ok(StatResult {
                size: proxy.size(),
                mtime: None,
            }),

            ContentState::Dirty { lease, mtime } => Ok(StatResult {
                size: lease.size().await?,
                mtime: Some(*mtime),
            }),
        }
    }

    /// Read from whichever lease is current. Never upgrades.
    /// Returns 0 at or past the end of the content.
    pub async fn read_at(&mut self, buf: &mut [u8], off: u64) -> FsResult<usize> {
        match &mut self.state {
            ContentState::Clean(proxy) => proxy.read_at(buf, off).await,
            ContentState::Dirty { lease, .. } => lease.read_at(buf, off).await,
        }
    }

    pub async fn write_at(&mut self, buf: &[u8], off: u64) -> FsResult<usize> {
        let lease = self.ensure_read_write_lease().await?;
        let n = lease.write_at(buf, off).await?;
        self.touch();
        Ok(n)
    }

    pub async fn truncate(&mut self, size: u64) -> FsResult<()> {
        let lease = self.ensure_read_write_lease().await?;
        lease.truncate(size).await?;
        self.touch();
        Ok(())
    }

    /// Release whichever lease is held.
    pub fn destroy(self) {
        match self.state {
            ContentState::Clean(proxy) => proxy.destroy(),
            ContentState::Dirty { lease, .. } => lease.destroy(),
        }
    }

    async fn ensure_read_write_lease(&mut self) -> FsResult<&mut Box<dyn ReadWriteLease>> {
        if let ContentState::Clean(proxy) = &mut self.state {
            let lease = match proxy.upgrade().await {
                Ok(lease) => lease,
                Err(e) => {
                    warn!("upgrade content of {} bytes failed: {}", proxy.size(), e);
                    return Err(FsError::upgrade(e));
                }
            };
            debug!("upgraded content of {} bytes to read-write lease", proxy.size());

            // The proxy gave its content to the new lease, it is dropped without destroy.
            self.state = ContentState::Dirty {
                lease,
                mtime: self.clock.now(),
            };
        }

        match &mut self.state {
            ContentState::Dirty { lease, .. } => Ok(lease),
            ContentState::Clean(_) => err_box!("content is still clean after upgrade"),
        }
    }

    fn touch(&mut self) {
        let now = self.clock.now();
        if let ContentState::Dirty { mtime, .. } = &mut self.state {
            *mtime = now;
        }
    }
}

impl fmt::Debug for MutableContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            ContentState::Clean(proxy) => f
                .debug_struct("MutableContent")
                .field("state", &"clean")
                .field("size", &proxy.size())
                .finish(),
            ContentState::Dirty { mtime, .. } => f
                .debug_struct("MutableContent")
                .field("state", &"dirty")
                .field("mtime", mtime)
                .finish(),
        }
    }
}
