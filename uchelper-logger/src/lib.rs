use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Maps the configured log level onto a filter directive for the uchelper crates.
pub fn default_directive(log_level: &str) -> String {
    let level = match log_level.to_uppercase().as_str() {
        "ERROR" => "error",
        "WARN" => "warn",
        "INFO" => "info",
        "DEBUG" => "debug",
        "TRACE" => "trace",
        _ => "info",
    };

    [
        "uchelper",
        "uchelper_rest",
        "uchelper_frames",
        "uchelper_sql",
    ]
    .iter()
    .map(|target| format!("{target}={level}"))
    .collect::<Vec<_>>()
    .join(",")
}

/// Installs the global tracing subscriber. `RUST_LOG` wins over the configured level.
pub fn init() -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            default_directive(&uchelper_config::CONFIG.log_level).into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
