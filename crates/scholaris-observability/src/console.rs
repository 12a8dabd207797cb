use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub(crate) fn default_filter() -> EnvFilter {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "scholaris={log_level},scholaris_core={log_level},tower_http=warn,hyper=warn,sqlx=warn"
        ))
    })
}

/// Console-only logging, used when observability is off or log files cannot
/// be created. Level comes from `RUST_LOG`, then `LOG_LEVEL`, then `info`.
pub fn init_console_logging() {
    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(default_filter());

    // A second init (tests, CLI after server) is harmless.
    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}
