use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use kubedeck::alert::{AlertTracker, CheckCycle};
use kubedeck::api::{ApiServer, ApiServerConfig, AppState};
use kubedeck::collector::HttpResourceCollector;
use kubedeck::config::{AppConfig, SettingsStore};
use kubedeck::logging::init_logging;
use kubedeck::notification::TelegramSink;
use kubedeck::recommendation::LlmRecommendationEngine;
use kubedeck::scheduler::AlertScheduler;
use kubedeck::utils::http_client::install_rustls_provider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    // Keep the guard alive so the file writer flushes on exit
    let (logging_config, _log_guard) = init_logging(config.log_dir.as_deref())?;

    install_rustls_provider();

    let settings = Arc::new(SettingsStore::new(config.alert.clone()));
    let cycle = CheckCycle::new(
        Arc::new(HttpResourceCollector::new(config.collector_url.clone())),
        Arc::new(LlmRecommendationEngine::new(config.llm.clone())),
        Arc::new(TelegramSink::new(
            config.telegram_api_base.clone(),
            config.dashboard_url.clone(),
        )),
        settings,
        Arc::new(AlertTracker::new()),
    )
    .with_dedup(config.dedup_enabled);
    let scheduler = Arc::new(AlertScheduler::new(Arc::new(cycle)));

    let shutdown = CancellationToken::new();
    logging_config.start_retention_cleanup(shutdown.clone());

    let scheduler_task = {
        let scheduler = scheduler.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move { scheduler.run(shutdown).await })
    };

    let state = AppState::new(scheduler).with_logging_config(logging_config);
    let server = ApiServer::with_cancellation(
        ApiServerConfig::from_env_or_default(),
        state,
        shutdown.clone(),
    );
    let mut server_task = tokio::spawn(async move { server.run().await });

    info!(dedup = config.dedup_enabled, "kubedeck alerting started");

    let finished = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
            None
        }
        result = &mut server_task => Some(result),
    };
    shutdown.cancel();

    let server_result = match finished {
        Some(result) => result,
        None => server_task.await,
    };
    match server_result {
        Ok(Err(e)) => error!("API server error: {}", e),
        Err(e) => error!("API server task failed: {}", e),
        Ok(Ok(())) => {}
    }
    if let Err(e) = scheduler_task.await {
        error!("Scheduler task failed: {}", e);
    }

    info!("Shutdown complete");
    Ok(())
}
