//! Logging setup with a reloadable filter.
//!
//! - Runtime log level changes via `tracing_subscriber::reload`
//! - Optional daily rolling log file, pruned after 7 days
//! - Local timezone timestamps

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::Writer, time::FormatTime},
    layer::SubscriberExt,
    reload::{self, Handle},
    util::SubscriberInitExt,
};

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "kubedeck=info,tower_http=info";

/// Prefix of rolled log files; the appender appends `.YYYY-MM-DD`.
const LOG_FILE_PREFIX: &str = "kubedeck.log";

/// Log retention period in days.
const LOG_RETENTION_DAYS: i64 = 7;

/// Custom timer that uses the local timezone via chrono.
#[derive(Debug, Clone, Copy)]
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

/// Type alias for the reload handle.
pub type FilterHandle = Handle<EnvFilter, tracing_subscriber::Registry>;

/// Handle to the installed subscriber.
pub struct LoggingConfig {
    handle: FilterHandle,
    log_dir: Option<PathBuf>,
}

impl LoggingConfig {
    /// Get the current filter directive string.
    pub fn get_filter(&self) -> String {
        self.handle
            .with_current(|filter| filter.to_string())
            .unwrap_or_default()
    }

    /// Replace the active filter directive.
    ///
    /// Returns a validation error if the directive does not parse.
    pub fn set_filter(&self, directive: &str) -> crate::Result<()> {
        let new_filter = parse_filter(directive)?;

        self.handle
            .reload(new_filter)
            .map_err(|e| crate::Error::Other(format!("Failed to reload filter: {}", e)))?;

        info!(directive = %directive, "Log filter updated");
        Ok(())
    }

    /// Directory holding rolled log files, if file logging is enabled.
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }

    /// Start the daily log retention cleanup task.
    ///
    /// Does nothing when logging to the console only.
    pub fn start_retention_cleanup(self: &Arc<Self>, cancel_token: CancellationToken) {
        let Some(log_dir) = self.log_dir.clone() else {
            return;
        };

        tokio::spawn(async move {
            let cleanup_interval = Duration::from_secs(24 * 60 * 60);

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        debug!("Log retention cleanup task shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(cleanup_interval) => {
                        if let Err(e) = cleanup_old_logs(&log_dir, LOG_RETENTION_DAYS).await {
                            warn!(error = %e, "Failed to cleanup old logs");
                        }
                    }
                }
            }
        });
    }
}

fn parse_filter(directive: &str) -> crate::Result<EnvFilter> {
    if directive.trim().is_empty() {
        return Err(crate::Error::validation("Filter directive must not be empty"));
    }
    EnvFilter::try_new(directive)
        .map_err(|e| crate::Error::validation(format!("Invalid filter directive: {}", e)))
}

/// Date suffix of a rolled log file name, if it is one of ours.
fn rolled_file_date(filename: &str) -> Option<NaiveDate> {
    let date_str = filename.strip_prefix(LOG_FILE_PREFIX)?.strip_prefix('.')?;
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()
}

/// Delete log files older than the specified number of days.
async fn cleanup_old_logs(log_dir: &Path, retention_days: i64) -> std::io::Result<()> {
    let cutoff = (Utc::now() - chrono::Duration::days(retention_days)).date_naive();

    let mut entries = tokio::fs::read_dir(log_dir).await?;
    let mut deleted_count = 0;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(file_date) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(rolled_file_date)
        else {
            continue;
        };

        if file_date < cutoff {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %e, "Failed to delete old log file");
            } else {
                deleted_count += 1;
                debug!(path = %path.display(), "Deleted old log file");
            }
        }
    }

    if deleted_count > 0 {
        info!(count = deleted_count, "Cleaned up old log files");
    }

    Ok(())
}

/// Initialize logging.
///
/// Console output is always enabled. When `log_dir` is given, a daily rolling
/// file is written there as well and the returned guard must be kept alive
/// for the lifetime of the process.
pub fn init_logging(
    log_dir: Option<&str>,
) -> crate::Result<(Arc<LoggingConfig>, Option<WorkerGuard>)> {
    let initial_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let (filter_layer, filter_handle) = reload::Layer::new(initial_filter);

    let console_layer = fmt::layer().with_ansi(true).with_timer(LocalTimer);

    let (file_layer, guard, log_path) = match log_dir {
        Some(dir) => {
            let log_path = PathBuf::from(dir);
            std::fs::create_dir_all(&log_path)?;

            let file_appender = tracing_appender::rolling::daily(&log_path, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_timer(LocalTimer)
                .boxed();
            (Some(layer), Some(guard), Some(log_path))
        }
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| {
            crate::Error::Other(format!("Failed to set global default subscriber: {}", e))
        })?;

    let config = Arc::new(LoggingConfig {
        handle: filter_handle,
        log_dir: log_path,
    });

    Ok((config, guard))
}

/// Log targets worth tuning, for the logging API.
pub fn available_modules() -> Vec<(&'static str, &'static str)> {
    vec![
        ("kubedeck", "Main application"),
        ("kubedeck::scheduler", "Alert scheduler"),
        ("kubedeck::alert", "Check cycle and deduplication"),
        ("kubedeck::notification", "Telegram delivery"),
        ("reqwest", "HTTP requests"),
        ("tower_http", "HTTP middleware"),
    ]
}
