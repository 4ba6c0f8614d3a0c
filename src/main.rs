use std::env;
use std::sync::Arc;

use teacher_payroll::api::{AppState, create_router};
use teacher_payroll::clock::{Clock, SystemClock};
use teacher_payroll::config::ConfigLoader;
use teacher_payroll::notification::{LogNotifier, Notifier};
use teacher_payroll::scheduler::{PayrollJob, SchedulerRunner};
use teacher_payroll::store::{MemoryStore, PayrollStore};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG_DIR: &str = "./config/default";

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("PAYROLL_LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn wait_for_shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for shutdown signal");
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let config_dir = env::var("PAYROLL_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let config = ConfigLoader::load(&config_dir)
        .map_err(|e| format!("failed to load configuration from {config_dir}: {e}"))?;
    let service = config.service().clone();

    let store = Arc::new(MemoryStore::new());
    config
        .seed_store(store.as_ref())
        .map_err(|e| format!("failed to seed store: {e}"))?;

    let store: Arc<dyn PayrollStore> = store;
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier::new(service.notification.from_email.clone()));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let schedule = service.payroll.schedule.to_schedule();
    let job = PayrollJob::new(store.clone(), notifier.clone(), service.job_settings());
    let runner = SchedulerRunner::new(job, schedule, clock.clone(), service.payroll.poll_interval());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = tokio::spawn(runner.run(shutdown_rx));

    let state = AppState::new(store, notifier, clock, &service);
    let app = create_router(state);

    let bind_addr = env::var("PAYROLL_BIND").unwrap_or_else(|_| service.server.bind_address.clone());
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr} failed: {e}"))?;
    info!(bind_addr = %bind_addr, config_dir = %config_dir, "teacher-payroll listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server failed: {e}"));

    let _ = shutdown_tx.send(true);
    if let Err(err) = scheduler.await {
        error!(error = %err, "Payroll scheduler task failed");
    }
    info!("teacher-payroll stopped");
    served
}
