//! Host-side tracing installation.

use core_config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins over the configured filter when set.
pub fn filter_for(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
}

/// Install the global fmt subscriber.
///
/// With a log directory configured, events go through a non-blocking file
/// appender and the returned guard must be held for the lifetime of the host;
/// dropping it flushes pending lines. Without one, events go to stderr and
/// no guard is returned. A second install is a no-op returning `None`.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = filter_for(config);
    match &config.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, &config.file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            match tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
            {
                Ok(()) => Some(guard),
                Err(_) => None,
            }
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
            None
        }
    }
}
