use tracing_subscriber::EnvFilter;

use crate::diagnostics::Diagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Install the fmt subscriber, honoring `RUST_LOG` and defaulting to `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub fn log_event(level: LogLevel, message: &str) {
    match level {
        LogLevel::Debug => tracing::debug!("[usc-records] {}", message),
        LogLevel::Info => tracing::info!("[usc-records] {}", message),
        LogLevel::Warn => tracing::warn!("[usc-records] {}", message),
        LogLevel::Error => tracing::error!("[usc-records] {}", message),
    }
}

pub fn log_diagnostic(document: &str, diagnostic: &Diagnostic) {
    log_event(
        diagnostic.level(),
        &format!("{document}: {}", diagnostic.message()),
    );
}
