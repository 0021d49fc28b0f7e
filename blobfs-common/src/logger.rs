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

use crate::conf::LogConf;
use crate::error::FsError;
use crate::FsResult;
use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

// Keeps the non-blocking file writer flushing for the lifetime of the process.
static LOG_GUARD: OnceCell<Option<WorkerGuard>> = OnceCell::new();

pub struct Logger;

impl Logger {
    /// Install the global subscriber and route `log` records into it.
    /// RUST_LOG, when set, overrides `conf.level`. Only the first call has an effect.
    pub fn init(conf: &LogConf) -> FsResult<()> {
        LOG_GUARD.get_or_try_init(|| Self::install(conf))?;
        Ok(())
    }

    fn install(conf: &LogConf) -> FsResult<Option<WorkerGuard>> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(f) => f,
            Err(_) => EnvFilter::try_new(&conf.level)
                .map_err(|e| FsError::conf(format!("log level {}: {}", conf.level, e)))?,
        };

        let (writer, guard) = if conf.is_stdout() {
            (BoxMakeWriter::new(std::io::stdout), None)
        } else {
            let appender = tracing_appender::rolling::never(&conf.log_dir, &conf.file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard))
        };

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(conf.is_stdout())
            .with_thread_names(conf.display_thread)
            .with_file(conf.display_position)
            .with_line_number(conf.display_position)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| FsError::common(format!("set global subscriber: {}", e)))?;
        tracing_log::LogTracer::init()
            .map_err(|e| FsError::common(format!("install log bridge: {}", e)))?;

        Ok(guard)
    }
}
