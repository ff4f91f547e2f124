use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Environment override for the log file directory
pub const LOG_DIR_ENV: &str = "LENDLOOP_LOG_DIR";

/// Install the global subscriber: console (plain or JSON) plus an optional daily file.
///
/// `RUST_LOG` wins over `logging.level`. Keep the returned guard alive for the
/// lifetime of the process or buffered file lines are lost.
pub fn init_logging(cfg: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.level.as_str()));

    let log_dir = std::env::var(LOG_DIR_ENV)
        .ok()
        .filter(|d| !d.trim().is_empty())
        .or_else(|| cfg.dir.clone());

    // `rolling::daily` panics if it cannot create the first file, so preflight writability.
    let (file_layer, guard) = match log_dir.as_deref().map(prepare_log_dir) {
        Some(Ok(dir)) => {
            let file_appender = tracing_appender::rolling::daily(&dir, "lendloop.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        Some(Err(e)) => {
            eprintln!("Warning: {e}, file logging disabled");
            (None, None)
        }
        None => (None, None),
    };

    let console_plain = (!cfg.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
    });
    let console_json = cfg
        .json
        .then(|| tracing_subscriber::fmt::layer().json().with_target(true));

    let file_logging_enabled = file_layer.is_some();
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_plain)
        .with(console_json)
        .with(file_layer)
        .try_init();

    if file_logging_enabled {
        if let Some(dir) = log_dir {
            eprintln!("Logging to: {}/lendloop.log", dir);
        }
    }

    guard
}

fn prepare_log_dir(dir: &str) -> Result<String, String> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("could not create log directory {dir} ({e})"))?;

    let probe = std::path::Path::new(dir).join(".lendloop_write_test");
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&probe)
        .map_err(|e| format!("could not write to log directory {dir} ({e})"))?;
    let _ = std::fs::remove_file(&probe);

    Ok(dir.to_string())
}
