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
use log::debug;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Read-only lease over an object cached in a local file.
///
/// The size is captured when the proxy is opened and reads never go past it.
/// The cached file is opened read-only and never written.
pub struct FileReadProxy {
    path: PathBuf,
    file: File,
    size: u64,
    leaser: Arc<FileLeaser>,
}

impl FileReadProxy {
    pub async fn open<P: AsRef<Path>>(path: P, leaser: Arc<FileLeaser>) -> FsResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).await?;
        let size = file.metadata().await?.len();
        debug!("open file proxy {}, size {}", path.display(), size);

        Ok(Self {
            path,
            file,
            size,
            leaser,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReadProxy for FileReadProxy {
    fn size(&self) -> u64 {
        self.size
    }

    async fn read_at(&mut self, buf: &mut [u8], off: u64) -> FsResult<usize> {
        if off >= self.size {
            return Ok(0);
        }
        let want = buf.len().min((self.size - off) as usize);
        self.file.seek(SeekFrom::Start(off)).await?;

        let mut total = 0;
        while total < want {
            let n = self.file.read(&mut buf[total..want]).await?;
            if n == 0 {
                break;
            }
            total += n;
        }
        Ok(total)
    }

    async fn upgrade(&mut self) -> FsResult<Box<dyn ReadWriteLease>> {
        self.file.seek(SeekFrom::Start(0)).await?;
        let mut src = (&mut self.file).take(self.size);
        let lease = self.leaser.new_file_lease_from(&mut src).await?;
        debug!(
            "upgrade file proxy {} to file lease {}",
            self.path.display(),
            lease.id()
        );
        Ok(Box::new(lease))
    }

    fn destroy(self: Box<Self>) {
        debug!("destroy file proxy {}", self.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::FileReadProxy;
    use crate::{FileLeaser, ReadProxy};
    use blobfs_common::conf::LeaseConf;
    use std::sync::Arc;

    #[tokio::test]
    async fn read_and_upgrade() {
        let dir = tempfile::tempdir().unwrap();
        let object = dir.path().join("object");
        std::fs::write(&object, b"hello world").unwrap();

        let conf = LeaseConf {
            temp_dir: dir.path().join("leases").to_string_lossy().to_string(),
            copy_chunk_size: 4,
        };
        let leaser = Arc::new(FileLeaser::new(&conf).unwrap());
        let mut proxy = FileReadProxy::open(&object, leaser.clone()).await.unwrap();
        assert_eq!(proxy.size(), 11);

        let mut buf = [0u8; 8];
        assert_eq!(proxy.read_at(&mut buf, 6).await.unwrap(), 5);
        assert_eq!(&buf[..5], b"world");
        assert_eq!(proxy.read_at(&mut buf, 11).await.unwrap(), 0);

        let mut lease = proxy.upgrade().await.unwrap();
        lease.truncate(5).await.unwrap();
        lease.write_at(b"!", 5).await.unwrap();

        let mut buf = [0u8; 16];
        let n = lease.read_at(&mut buf, 0).await.unwrap();
        assert_eq!(&buf[..n], b"hello!");

        // The cached object is untouched.
        assert_eq!(std::fs::read(&object).unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let conf = LeaseConf {
            temp_dir: dir.path().to_string_lossy().to_string(),
            ..Default::default()
        };
        let leaser = Arc::new(FileLeaser::new(&conf).unwrap());
        assert!(FileReadProxy::open(dir.path().join("missing"), leaser)
            .await
            .is_err());
    }
}
