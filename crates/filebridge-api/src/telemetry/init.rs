use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const DEFAULT_FILTER: &str = "filebridge=debug,tower_http=debug";

/// Initialize tracing. `log_format` is `compact` (default) or `json`.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_telemetry(log_format: &str, environment: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let installed = if log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init()
    } else {
        // Console: compact format (message string for convenience).
        let console_fmt = tracing_subscriber::fmt::layer().event_format(
            Format::default()
                .compact()
                .with_target(false)
                .without_time(),
        );
        tracing_subscriber::registry()
            .with(filter)
            .with(console_fmt)
            .try_init()
    };

    match installed {
        Ok(()) => tracing::info!(log_format, environment, "Tracing initialized"),
        Err(e) => tracing::debug!(error = %e, "Tracing subscriber already installed"),
    }
}

pub async fn shutdown_telemetry() {
    tracing::debug!("Telemetry shutdown");
}
