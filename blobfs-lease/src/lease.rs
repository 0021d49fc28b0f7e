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

use async_trait::async_trait;
use blobfs_common::FsResult;

/// Read-only lease over immutable content.
#[async_trait]
pub trait ReadProxy: Send + Sync {
    /// Size of the content, fixed for the lifetime of the lease.
    fn size(&self) -> u64;

    /// Read into `buf` starting at `off`. Returns 0 at or past the end of the
    /// content and a short count when the range crosses it.
    async fn read_at(&mut self, buf: &mut [u8], off: u64) -> FsResult<usize>;

    /// Produce a read-write lease holding a copy of the content.
    ///
    /// On success the proxy has handed its content over and must only be
    /// dropped, not destroyed or read again. On failure the proxy is unchanged.
    async fn upgrade(&mut self) -> FsResult<Box<dyn ReadWriteLease>>;

    /// Release the resources behind the proxy.
    fn destroy(self: Box<Self>);

    /// Panic if internal state is inconsistent.
    fn check_invariants(&self) {}
}

/// Locally mutable content.
#[async_trait]
pub trait ReadWriteLease: Send + Sync {
    async fn size(&self) -> FsResult<u64>;

    /// Same end-of-content contract as [`ReadProxy::read_at`].
    async fn read_at(&mut self, buf: &mut [u8], off: u64) -> FsResult<usize>;

    /// Write all of `buf` at `off`. Writing past the end extends the content,
    /// the gap reads back as zeros.
    async fn write_at(&mut self, buf: &[u8], off: u64) -> FsResult<usize>;

    /// Set the content length, zero-extending or discarding trailing bytes.
    async fn truncate(&mut self, size: u64) -> FsResult<()>;

    fn destroy(self: Box<Self>);

    fn check_invariants(&self) {}
}
