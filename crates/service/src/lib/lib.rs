use std::sync::Arc;

use dvt_relayer_core::service::Service;
use dvt_relayer_core::tracing::{LogFormat, LoggingConfig};
use dvt_relayer_core::{env, tracing as tracing_config};

use common::AppState;

mod common;
mod scheduler;
mod server;

pub async fn service_main() {
    // Held for the process lifetime: dropping it would flush and tear down the Sentry client.
    let _sentry_guard = tracing_config::setup_logger(
        LoggingConfig::default()
            .with_thread_names(true)
            .use_format(env::LOG_FORMAT.default(LogFormat::Plain).value)
            .with_sentry(env::SENTRY_DSN.optional::<String>().value, env::SENTRY_ENVIRONMENT.optional::<String>().value),
    );

    let service = Service::bootstrap().await.unwrap_or_else(|e| panic!("Failed to bootstrap service: {e:?}"));
    let state = Arc::new(AppState { service });
    state.log_config_full();

    // §4.9 `/health`: ready once genesis load (already done inside `bootstrap`) and a first
    // protocol-config fetch have both been attempted, success or not.
    if let Err(e) = state.service.run_protocol_config_tick().await {
        tracing::error!("initial protocol config fetch failed: {e}");
    }
    state.service.mark_ready();

    scheduler::launch(Arc::clone(&state));
    server::launch(state).await;
}
