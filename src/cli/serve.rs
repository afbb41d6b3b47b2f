//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::cli::ServeArgs;
use crate::clock::SystemClock;
use crate::config::{LogFormat, SpendGuardConfig};
use crate::engine::{BudgetEngine, EngineError};
use crate::events::EventLog;
use crate::scheduler::Scheduler;
use crate::store::InMemoryStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &ServeArgs,
) -> Result<SpendGuardConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if args.config.exists() {
        SpendGuardConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        SpendGuardConfig::default()
    };

    config = config.with_env_overrides();

    // CLI overrides (highest priority)
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if args.no_scheduler {
        config.scheduler.enabled = false;
    }

    Ok(config)
}

/// Initialize tracing based on configuration
pub fn init_tracing(
    config: &crate::config::LoggingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}

/// Build an engine over an empty in-memory store, tuned from the config.
pub fn build_engine(config: &SpendGuardConfig) -> (Arc<BudgetEngine>, Arc<EventLog>) {
    let events = Arc::new(EventLog::new(config.events.history_capacity));
    let engine = BudgetEngine::new(
        Arc::new(InMemoryStore::default()),
        Arc::new(SystemClock),
        events.clone(),
    )
    .with_sweep_concurrency(config.scheduler.sweep_concurrency)
    .with_attention(config.attention.clone());
    (Arc::new(engine), events)
}

/// Create the brands, campaigns and dayparting windows declared in the config.
pub async fn seed_fleet(
    engine: &BudgetEngine,
    config: &SpendGuardConfig,
) -> Result<(), EngineError> {
    for brand in &config.brands {
        engine.create_brand(brand.into()).await?;
    }
    for campaign in &config.campaigns {
        engine.create_campaign(campaign.into()).await?;
    }
    for schedule in &config.schedules {
        engine
            .add_schedule(schedule.campaign_id, schedule.into())
            .await?;
    }
    tracing::info!(
        brands = config.brands.len(),
        campaigns = config.campaigns.len(),
        schedules = config.schedules.len(),
        "Loaded fleet from config"
    );
    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }

    cancel_token.cancel();
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load, merge and validate configuration
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    // 2. Initialize tracing
    init_tracing(&config.logging)?;

    tracing::info!("Starting SpendGuard server");
    tracing::debug!(?config, "Loaded configuration");

    // 3. Build the engine and load the configured fleet
    let (engine, events) = build_engine(&config);
    seed_fleet(&engine, &config).await?;

    // 4. Build API router
    let config = Arc::new(config);
    let app_state = Arc::new(AppState::new(
        Arc::clone(&engine),
        events,
        Arc::clone(&config),
    ));
    let app = create_router(app_state);

    // 5. Start the scheduler (if enabled)
    let cancel_token = CancellationToken::new();
    let scheduler_handle = if config.scheduler.enabled {
        let scheduler = Scheduler::new(Arc::clone(&engine), config.scheduler.clone());
        Some(scheduler.start(cancel_token.clone()))
    } else {
        tracing::info!("Scheduler disabled, cycles run only on request");
        None
    };

    // 6. Bind and serve
    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "SpendGuard API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token.clone()))
        .await?;

    // 7. Let in-flight cycles finish
    if let Some(handle) = scheduler_handle {
        tracing::info!("Waiting for scheduler to stop");
        handle.await?;
    }

    tracing::info!("SpendGuard server stopped");
    Ok(())
}
