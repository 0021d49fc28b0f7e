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

//! Leases over object content.
//!
//! A [`ReadProxy`] is a read-only view of an immutable object that is already
//! cached somewhere (memory or a local file). Upgrading it materializes the
//! bytes into a [`ReadWriteLease`], a private mutable copy in local scratch
//! storage.

mod lease;
pub use self::lease::*;

mod file_lease;
pub use self::file_lease::FileLease;

mod file_leaser;
pub use self::file_leaser::FileLeaser;

mod bytes_proxy;
pub use self::bytes_proxy::BytesReadProxy;

mod file_proxy;
pub use self::file_proxy::FileReadProxy;
