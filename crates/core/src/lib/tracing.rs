use std::sync::Once;

use derive_more::FromStr;
use json_subscriber;
use tracing_subscriber::{layer::Layer, registry::Registry, util::SubscriberInitExt};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

static INIT: Once = Once::new();

#[derive(Debug, Clone, PartialEq, FromStr)]
pub enum LogFormat {
    Plain,
    Json,
}

pub struct LoggingConfig {
    format: LogFormat,
    is_test: bool,
    with_thread_names: bool,
    sentry_dsn: Option<String>,
    sentry_environment: Option<String>,
}

impl LoggingConfig {
    pub fn default_for_test() -> Self {
        Self {
            format: LogFormat::Plain,
            is_test: true,
            with_thread_names: false,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    pub fn use_format(mut self, value: LogFormat) -> Self {
        self.format = value;
        self
    }
    pub fn is_test(mut self, value: bool) -> Self {
        self.is_test = value;
        self
    }
    pub fn with_thread_names(mut self, value: bool) -> Self {
        self.with_thread_names = value;
        self
    }
    /// Enables the Sentry layer (§10.6) when `dsn` is set; a missing DSN leaves crash
    /// reporting off, matching the original relayer's `setup_sentry`.
    pub fn with_sentry(mut self, dsn: Option<String>, environment: Option<String>) -> Self {
        self.sentry_dsn = dsn;
        self.sentry_environment = environment;
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Plain,
            is_test: false,
            with_thread_names: false,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

/// Initializes the global tracing subscriber exactly once, regardless of how many call sites
/// (service startup, test setup) request it. When `SENTRY_DSN` is configured, also initializes
/// the Sentry client and returns its guard — the caller must hold this for the process lifetime
/// (dropping it flushes pending events), the same role `sentry_sdk.init(...)` plays in the
/// original relayer's `setup_sentry`.
pub fn setup_logger(config: LoggingConfig) -> Option<sentry::ClientInitGuard> {
    let sentry_guard = config.sentry_dsn.as_ref().map(|dsn| {
        sentry::init((
            dsn.as_str(),
            sentry::ClientOptions {
                environment: config.sentry_environment.clone().map(std::borrow::Cow::from),
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let fmt_layer = match config.format {
            LogFormat::Json => json_subscriber::layer()
                .with_target(true)
                .with_thread_names(config.with_thread_names)
                .with_current_span(false)
                .with_span_list(false)
                .flatten_span_list_on_top_level(true)
                .flatten_event(true)
                .boxed(),
            LogFormat::Plain => tracing_subscriber::fmt::layer()
                .compact()
                .with_target(true)
                .with_thread_names(config.with_thread_names)
                .boxed(),
        };

        let test_layer = if config.is_test {
            Some(tracing_subscriber::fmt::layer().compact().with_test_writer())
        } else {
            None
        };

        let registry = Registry::default()
            .with(env_filter)
            .with(fmt_layer)
            .with(test_layer)
            .with(sentry_tracing::layer());
        registry.init();
    });

    sentry_guard
}
