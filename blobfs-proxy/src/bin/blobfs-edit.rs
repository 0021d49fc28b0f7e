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

use blobfs_common::clock::RealClock;
use blobfs_common::conf::ProxyConf;
use blobfs_common::logger::Logger;
use blobfs_common::FsResult;
use blobfs_lease::{FileLeaser, FileReadProxy};
use blobfs_proxy::{CheckingMutableContent, MutableContent};
use clap::Parser;
use log::info;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

// Apply edits to a locally cached object without touching it, and save the result.
// cargo run --bin blobfs-edit -- --source /tmp/object --output /tmp/edited \
//     --op write:0:hello --op truncate:64
fn main() -> FsResult<()> {
    let args = EditArgs::parse();

    let conf = args.get_conf()?;
    Logger::init(&conf.log)?;
    conf.print();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(run(args, conf))
}

async fn run(args: EditArgs, conf: ProxyConf) -> FsResult<()> {
    let leaser = Arc::new(FileLeaser::new(&conf.lease)?);
    let proxy = FileReadProxy::open(&args.source, leaser).await?;
    let mc = MutableContent::new(Box::new(proxy), Arc::new(RealClock));
    let mut mc = CheckingMutableContent::with_conf(mc, &conf);

    let res = apply(&mut mc, &args).await;
    mc.destroy();
    res
}

async fn apply(mc: &mut CheckingMutableContent, args: &EditArgs) -> FsResult<()> {
    for op in &args.op {
        match op {
            EditOp::Write { off, data } => {
                let n = mc.write_at(data.as_bytes(), *off).await?;
                info!("write {} bytes at {}", n, off);
            }
            EditOp::Truncate(size) => {
                mc.truncate(*size).await?;
                info!("truncate to {}", size);
            }
        }
    }

    let stat = mc.stat().await?;
    match stat.mtime {
        Some(mtime) => println!("size {}, modified {}", stat.size, mtime.to_rfc3339()),
        None => println!("size {}, unmodified", stat.size),
    }

    let mut out = tokio::fs::File::create(&args.output).await?;
    let mut buf = vec![0u8; args.read_chunk_size.max(1)];
    let mut off = 0;
    loop {
        let n = mc.read_at(&mut buf, off).await?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n]).await?;
        off += n as u64;
    }
    out.flush().await?;
    info!("saved {} bytes to {}", off, args.output);

    Ok(())
}

#[derive(Debug, Clone)]
enum EditOp {
    Write { off: u64, data: String },
    Truncate(u64),
}

impl FromStr for EditOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_num = |v: &str| {
            v.parse::<u64>()
                .map_err(|_| format!("invalid number {} in {}", v, s))
        };

        match s.split_once(':') {
            Some(("write", rest)) => match rest.split_once(':') {
                Some((off, data)) => Ok(EditOp::Write {
                    off: parse_num(off)?,
                    data: data.to_string(),
                }),
                None => Err(format!("expected write:<offset>:<text>, got {}", s)),
            },
            Some(("truncate", size)) => Ok(EditOp::Truncate(parse_num(size)?)),
            _ => Err(format!("unknown op {}", s)),
        }
    }
}

#[derive(Debug, Parser)]
pub struct EditArgs {
    // Configuration file path (optional)
    #[arg(short, long, help = "Configuration file path (optional)")]
    conf: Option<String>,

    #[arg(long, help = "Locally cached object to open read-only")]
    source: String,

    #[arg(long, help = "Where to save the edited content")]
    output: String,

    // Applied in order.
    #[arg(long, help = "Edit to apply: write:<offset>:<text> or truncate:<size>")]
    op: Vec<EditOp>,

    #[arg(long, default_value_t = 64 * 1024, help = "Read buffer size when saving")]
    read_chunk_size: usize,

    #[arg(long, action = clap::ArgAction::SetTrue, help = "Check invariants around every call")]
    check_invariants: bool,
}

impl EditArgs {
    fn get_conf(&self) -> FsResult<ProxyConf> {
        let mut conf = match &self.conf {
            Some(path) => ProxyConf::from_file(path)?,
            None => ProxyConf::default(),
        };
        if self.check_invariants {
            conf.check_invariants = true;
        }
        conf.init()?;
        Ok(conf)
    }
}
