//! §9 "Cron scheduler → concrete `{name, interval, fn}` scheduler": a small fixed list of
//! named periodic tasks, each with its own interval, rather than a single dynamically
//! dispatched cron expression driving one report job.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::common::SharedState;

type TaskFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

struct Task {
    name: &'static str,
    interval: Duration,
    run: Arc<dyn Fn(SharedState) -> TaskFuture + Send + Sync>,
}

fn task<F, Fut>(name: &'static str, interval: Duration, run: F) -> Task
where
    F: Fn(SharedState) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Task {
        name,
        interval,
        run: Arc::new(move |state| Box::pin(run(state))),
    }
}

/// Spawns one loop per task; none of them can take the process down. Each tick is timed into
/// `adapters.tick_duration_seconds` and failures are logged, never propagated (§5 cancellation
/// and timeouts: "catches and logs all exceptions... without dying").
async fn run_task_loop(task: Task, state: SharedState) {
    let mut ticker = tokio::time::interval(task.interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let timer = state
            .service
            .metrics
            .adapters
            .tick_duration_seconds
            .with_label_values(&[task.name])
            .start_timer();
        (task.run)(Arc::clone(&state)).await;
        timer.observe_duration();
    }
}

async fn network_validators_tick(state: SharedState) {
    match state.service.run_network_validators_tick().await {
        Ok(inserted) => tracing::debug!(inserted, "network validators scan tick complete"),
        Err(e) => tracing::error!("network validators scan tick failed: {e}"),
    }
}

async fn protocol_config_tick(state: SharedState) {
    match state.service.run_protocol_config_tick().await {
        Ok(()) => tracing::debug!("protocol config refresh tick complete"),
        Err(e) => tracing::error!("protocol config refresh tick failed: {e}"),
    }
}

async fn cleanup_tick(state: SharedState) {
    let now = chrono::Utc::now().timestamp().max(0) as u64;
    match state.service.run_cleanup_tick(now) {
        Ok(evicted) => tracing::debug!(evicted, "registry cleanup tick complete"),
        Err(e) => tracing::error!("registry cleanup tick failed: {e}"),
    }
}

/// One epoch's worth of blocks, the pace the scanner and the protocol-config cache both tail
/// the chain at.
const BLOCKS_PER_EPOCH: u64 = 32;
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

pub fn launch(state: SharedState) {
    let epoch_duration = Duration::from_secs(state.service.network.seconds_per_block * BLOCKS_PER_EPOCH);

    let tasks = vec![
        task("network_validators_scan", epoch_duration, network_validators_tick),
        task("protocol_config_refresh", epoch_duration, protocol_config_tick),
        task("registry_cleanup", CLEANUP_INTERVAL, cleanup_tick),
    ];

    for task in tasks {
        tracing::info!(name = task.name, interval_seconds = task.interval.as_secs(), "scheduling task");
        tokio::spawn(run_task_loop(task, Arc::clone(&state)));
    }
}
