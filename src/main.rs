use autodial::application::{CallOrchestrator, DialerSettings};
use autodial::config::{Config, TelephonyMode};
use autodial::domain::telephony::TelephonyAdapter;
use autodial::infrastructure::metrics::init_metrics;
use autodial::infrastructure::persistence::MemoryCallHistoryStore;
use autodial::infrastructure::telephony::{ScriptedTelephonyAdapter, SimulatedTelephonyAdapter};
use autodial::interface::api::{build_router, AppState};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting autodial service");
    info!("Configuration loaded: {:?}", config);

    let telephony: Arc<dyn TelephonyAdapter> = match config.telephony.mode {
        TelephonyMode::Simulated => Arc::new(SimulatedTelephonyAdapter::new(
            config.telephony.server.clone(),
            &config.telephony.simulator,
        )),
        TelephonyMode::Scripted => {
            info!("Dry-run telephony: calls resolve Not Answer without dialing");
            Arc::new(ScriptedTelephonyAdapter::disconnected())
        }
    };
    info!("Telephony adapter: {}", telephony.name());

    if config.telephony.connect_on_start {
        if let Err(e) = telephony.connect().await {
            warn!("Initial telephony connect failed: {}", e);
        }
    }

    let history = Arc::new(MemoryCallHistoryStore::new());
    let orchestrator = Arc::new(
        CallOrchestrator::new(telephony, history).with_settings(DialerSettings {
            inter_call_delay: config.dialer.inter_call_delay(),
        }),
    );

    let prometheus_handle = init_metrics()?;
    info!("Prometheus metrics initialized");

    let state = AppState::new(orchestrator.clone(), &config);
    let app = build_router(state, Some(prometheus_handle));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("REST API server started on {}", config.bind_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("Shutting down...");
    orchestrator.stop().await;
    orchestrator.wait_until_idle().await;
    info!("Autodial service stopped");

    Ok(())
}
