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

use crate::error::FsError;
use crate::FsResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Local scratch storage used by read-write leases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaseConf {
    // Directory holding the temporary files behind read-write leases.
    // Empty means the system temp directory.
    pub temp_dir: String,

    // Buffer size used when copying read-only content into a new read-write lease.
    pub copy_chunk_size: usize,
}

impl LeaseConf {
    pub const DEFAULT_COPY_CHUNK_SIZE: usize = 128 * 1024;

    pub fn init(&mut self) -> FsResult<()> {
        if self.copy_chunk_size == 0 {
            return Err(FsError::conf("lease.copy_chunk_size must be > 0"));
        }
        Ok(())
    }

    pub fn temp_dir(&self) -> PathBuf {
        if self.temp_dir.is_empty() {
            std::env::temp_dir()
        } else {
            PathBuf::from(&self.temp_dir)
        }
    }
}

impl Default for LeaseConf {
    fn default() -> Self {
        Self {
            temp_dir: "".to_string(),
            copy_chunk_size: Self::DEFAULT_COPY_CHUNK_SIZE,
        }
    }
}
