use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use groundwork_core::Terraform;
use groundwork_db::repositories::WorkerRepo;
use groundwork_worker::config::WorkerConfig;
use groundwork_worker::dispatcher::Dispatcher;
use groundwork_worker::execute::{ExecutionSettings, JobExecutor};
use groundwork_worker::startup::StartupOutcome;
use groundwork_worker::{heartbeat, startup};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "groundwork_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = WorkerConfig::from_env();
    tracing::info!(
        config_root = %config.config_root.display(),
        concurrency = config.concurrency,
        "Loaded worker configuration",
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = groundwork_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    groundwork_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    groundwork_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    // --- Terraform handle ---
    let terraform = Terraform::from_env().with_timeout(config.exec_timeout);

    // --- Startup validation ---
    // No jobs are accepted against an unvalidated environment: the
    // process exits before registering as a worker.
    match startup::validate_configurations(&config.config_root, &terraform).await {
        Ok(StartupOutcome::Ready { validated }) => {
            tracing::info!(validated, "All configurations validated");
        }
        Ok(StartupOutcome::Fatal { failures }) => {
            for failure in &failures {
                tracing::error!(
                    configuration = %failure.configuration,
                    detail = %failure.detail,
                    "Configuration failed startup validation",
                );
            }
            tracing::error!(failed = failures.len(), "Startup validation failed, shutting down");
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!(error = %e, "Startup validation could not run, shutting down");
            std::process::exit(1);
        }
    }

    // --- Worker registration & heartbeat ---
    let hostname = std::env::var("HOSTNAME").unwrap_or_else(|_| "worker".into());
    let worker = WorkerRepo::register(&pool, &hostname)
        .await
        .expect("Failed to register worker");
    tracing::info!(worker_id = %worker.id, hostname = %worker.hostname, "Worker registered");

    let cancel = CancellationToken::new();
    let heartbeat_handle = tokio::spawn(heartbeat::run(pool.clone(), worker.id, cancel.clone()));

    // --- Dispatcher ---
    let executor = JobExecutor::new(
        pool.clone(),
        terraform,
        ExecutionSettings {
            config_root: config.config_root.clone(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
        },
    );
    let dispatcher = Dispatcher::new(
        pool.clone(),
        executor,
        config.poll_interval,
        config.concurrency,
    );

    let dispatcher_cancel = cancel.clone();
    let dispatcher_handle = tokio::spawn(async move {
        dispatcher.run(dispatcher_cancel).await;
    });

    // --- Run until a termination signal ---
    shutdown_signal().await;
    cancel.cancel();

    // Let in-flight jobs drain, bounded so a hung tool cannot block
    // shutdown forever.
    let _ = tokio::time::timeout(Duration::from_secs(30), dispatcher_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), heartbeat_handle).await;

    if let Err(e) = WorkerRepo::deregister(&pool, worker.id).await {
        tracing::error!(error = %e, "Failed to deregister worker");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the worker
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
