use std::error::Error;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info};

use shipping_server::ShippingError;
use shipping_server::config::ShippingConfig;
use shipping_server::envioclick::EnvioclickClient;
use shipping_server::geo::{GeoResolver, GeoTable};
use shipping_server::store::JsonFileOrderStore;
use shipping_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = ShippingConfig::from_env()?;

    let table = match &config.geo_table_path {
        Some(path) => Arc::new(GeoTable::from_path(path)?),
        None => GeoTable::bundled(),
    };
    info!(entries = table.len(), "loaded DANE table");
    let geo = GeoResolver::new(table);

    let api = Arc::new(EnvioclickClient::new(config.envioclick.clone())?);

    let store = Arc::new(JsonFileOrderStore::open(&config.orders_path).await?);
    info!(path = %store.path().display(), "opened order store");

    let state = AppState::new(api, geo, store, &config);

    // Background tracking sync until shutdown
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let sync = Arc::clone(&state.sync);
    let sync_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(sync.config().interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match sync.run_once().await {
                        Ok(_) => {}
                        Err(ShippingError::SyncInProgress) => {
                            debug!("previous tracking sync still running; skipping tick");
                        }
                        Err(e) => error!(error = %e, "tracking sync failed"),
                    }
                }
                _ = shutdown_rx.changed() => break,
            }
        }
        info!("tracking sync stopped");
    });

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "shipping server listening");
    info!("  GET  /health          - Health check");
    info!("  GET  /geo/resolve     - Resolve a destination");
    info!("  POST /shipping/quote  - Quote a basket");
    info!("  POST /shipping/create - Generate a shipment");
    info!("  POST /shipping/track  - Track a shipment");
    info!("  POST /tracking/sync   - Run a tracking sync now");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for ctrl-c");
            }
            info!("shutting down");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    sync_task.await?;

    Ok(())
}
