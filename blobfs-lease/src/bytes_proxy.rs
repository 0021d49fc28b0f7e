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

use crate::{FileLeaser, ReadProxy, ReadWriteLease};
use async_trait::async_trait;
use blobfs_common::FsResult;
use bytes::Bytes;
use log::debug;
use std::sync::Arc;

/// Read-only lease over object content already held in memory.
pub struct BytesReadProxy {
    content: Bytes,
    leaser: Arc<FileLeaser>,
}

impl BytesReadProxy {
    pub fn new<T: Into<Bytes>>(content: T, leaser: Arc<FileLeaser>) -> Self {
        Self {
            content: content.into(),
            leaser,
        }
    }
}

#[async_trait]
impl ReadProxy for BytesReadProxy {
    fn size(&self) -> u64 {
        self.content.len() as u64
    }

    async fn read_at(&mut self, buf: &mut [u8], off: u64) -> FsResult<usize> {
        if off >= self.size() {
            return Ok(0);
        }
        let src = &self.content[off as usize..];
        let n = src.len().min(buf.len());
        buf[..n].copy_from_slice(&src[..n]);
        Ok(n)
    }

    async fn upgrade(&mut self) -> FsResult<Box<dyn ReadWriteLease>> {
        let mut src: &[u8] = &self.content;
        let lease = self.leaser.new_file_lease_from(&mut src).await?;
        Ok(Box::new(lease))
    }

    fn destroy(self: Box<Self>) {
        debug!("destroy bytes proxy of {} bytes", self.content.len());
    }
}
