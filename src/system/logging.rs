//! Logging system initialization
//!
//! Builds the global `tracing` subscriber from `StaticConfig.logging`.

use std::io::Write;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use crate::config::{LogFormat, StaticConfig};
use crate::errors::{Result, SysocialError};

const DEFAULT_LOG_NAME: &str = "sysocial.log";

/// 根据配置选择日志输出目标
fn build_writer(config: &StaticConfig) -> Result<Box<dyn Write + Send + Sync>> {
    let Some(log_file) = config.logging.file.as_deref().filter(|f| !f.is_empty()) else {
        return Ok(Box::new(std::io::stdout()));
    };

    if config.logging.enable_rotation {
        // 按天滚动
        let path = Path::new(log_file);
        let dir = path.parent().unwrap_or(Path::new("."));
        let filename = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or(DEFAULT_LOG_NAME);
        let appender = rolling::Builder::new()
            .rotation(rolling::Rotation::DAILY)
            .filename_prefix(filename.trim_end_matches(".log"))
            .filename_suffix("log")
            .max_log_files(config.logging.max_backups.max(1) as usize)
            .build(dir)
            .map_err(|e| {
                SysocialError::validation(format!("Failed to create rolling log appender: {}", e))
            })?;
        Ok(Box::new(appender))
    } else {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .map_err(|e| {
                SysocialError::validation(format!("Failed to open log file {}: {}", log_file, e))
            })?;
        Ok(Box::new(file))
    }
}

/// Initialize logging system based on configuration
///
/// The returned `WorkerGuard` must stay alive for the whole program,
/// otherwise buffered log lines are lost on exit.
pub fn init_logging(config: &StaticConfig) -> Result<WorkerGuard> {
    let writer = build_writer(config)?;
    let to_console = config
        .logging
        .file
        .as_ref()
        .is_none_or(|f| f.is_empty());

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = tracing_subscriber::EnvFilter::try_new(&config.logging.level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(to_console);

    let result = match config.logging.format {
        LogFormat::Json => subscriber_builder.json().try_init(),
        LogFormat::Text => subscriber_builder.try_init(),
    };
    result.map_err(|e| SysocialError::validation(format!("Failed to set subscriber: {}", e)))?;

    Ok(guard)
}
