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

use crate::conf::{LeaseConf, LogConf};
use crate::error::FsError;
use crate::FsResult;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConf {
    // Run the invariant checker around every mutable content operation.
    pub check_invariants: bool,

    pub log: LogConf,

    pub lease: LeaseConf,
}

impl ProxyConf {
    pub fn from_file<T: AsRef<str>>(path: T) -> FsResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| FsError::conf(format!("read {} failed: {}", path, e)))?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> FsResult<Self> {
        let mut conf: Self = toml::from_str(content)?;
        conf.init()?;
        Ok(conf)
    }

    pub fn init(&mut self) -> FsResult<()> {
        self.lease.init()
    }

    pub fn print(&self) {
        info!(
            "proxy conf: check_invariants={}, lease.temp_dir={}, lease.copy_chunk_size={}, \
            log.level={}, log.log_dir={}",
            self.check_invariants,
            self.lease.temp_dir().display(),
            self.lease.copy_chunk_size,
            self.log.level,
            self.log.log_dir
        );
    }
}

impl Default for ProxyConf {
    fn default() -> Self {
        Self {
            check_invariants: cfg!(debug_assertions),
            log: LogConf::default(),
            lease: LeaseConf::default(),
        }
    }
}
