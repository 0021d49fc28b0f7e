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

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("{0}")]
    IO(#[from] io::Error),

    // The read-only to read-write transition failed. The content is still clean.
    #[error("upgrade: {0}")]
    Upgrade(Box<FsError>),

    #[error("invalid configuration: {0}")]
    Conf(String),

    #[error("{0}")]
    Common(String),
}

impl FsError {
    pub fn common<T: Into<String>>(msg: T) -> Self {
        FsError::Common(msg.into())
    }

    pub fn conf<T: Into<String>>(msg: T) -> Self {
        FsError::Conf(msg.into())
    }

    pub fn upgrade(cause: FsError) -> Self {
        FsError::Upgrade(Box::new(cause))
    }

    pub fn is_upgrade(&self) -> bool {
        matches!(self, FsError::Upgrade(_))
    }

    pub fn errno(&self) -> i32 {
        match self {
            FsError::IO(e) => e.raw_os_error().unwrap_or(libc::EIO),
            FsError::Upgrade(cause) => cause.errno(),
            FsError::Conf(_) => libc::EINVAL,
            FsError::Common(_) => libc::EIO,
        }
    }
}

impl From<String> for FsError {
    fn from(value: String) -> Self {
        FsError::Common(value)
    }
}

impl From<&str> for FsError {
    fn from(value: &str) -> Self {
        FsError::Common(value.to_string())
    }
}

impl From<toml::de::Error> for FsError {
    fn from(value: toml::de::Error) -> Self {
        FsError::Conf(value.to_string())
    }
}
