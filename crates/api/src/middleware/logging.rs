//! Logging initialization.
//!
//! Level and format come from `LoggingConfig`; a `RUST_LOG` environment
//! filter still wins so a deployment can raise verbosity without a
//! config rollout.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Wire format of emitted log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// "json" for ingestion pipelines; anything else renders pretty.
    fn from_config(format: &str) -> Self {
        match format {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Default directives when `RUST_LOG` is absent: application events at
/// the configured level, the HTTP stack capped at warn so request spans
/// and dispatch reports stay readable.
fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("{level},tower_http=warn,hyper=warn"))
}

/// Initializes the logging subsystem based on configuration.
pub fn init_logging(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match LogFormat::from_config(&config.format) {
        LogFormat::Json => {
            // Flattened fields so request_id, device_id and the command
            // outcome land as top-level keys for log queries.
            let json_layer = fmt::layer()
                .json()
                .flatten_event(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_target(true);
            subscriber.with(json_layer).init();
        }
        LogFormat::Pretty => {
            let pretty_layer = fmt::layer()
                .pretty()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true)
                .with_file(false)
                .with_line_number(false);
            subscriber.with(pretty_layer).init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_selection() {
        assert_eq!(LogFormat::from_config("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_config("pretty"), LogFormat::Pretty);
        // Unknown values fall back to the development format.
        assert_eq!(LogFormat::from_config("logfmt"), LogFormat::Pretty);
    }

    #[test]
    fn test_default_filter_accepts_configured_levels() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let filter = default_filter(level);
            assert!(filter.to_string().contains(level));
        }
    }
}
