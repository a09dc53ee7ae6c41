mod equipment;
mod poll;
mod rest;

use equipment::{load_equipment, SharedEquipment};
use iot_client::{metrics, ClientConfig, IoTDataClient};
use poll::{merge_and_record, SharedPoll};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let http_addr = env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let equipment_file = PathBuf::from(
        env::var("EQUIPMENT_FILE").unwrap_or_else(|_| "equipment.json".to_string()),
    );
    let config = ClientConfig::from_env();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting IoT equipment monitor");
    info!("Telemetry source: {}", config.source);
    info!("Poll interval: {}ms", config.poll_interval.as_millis());
    info!("HTTP server: {}", http_addr);

    if let Err(e) = metrics::init_metrics() {
        error!("Failed to register metrics: {}", e);
        std::process::exit(1);
    }

    let records = match load_equipment(&equipment_file).await {
        Ok(records) => records,
        Err(e) => {
            error!("Failed to load equipment: {:#}", e);
            std::process::exit(1);
        }
    };
    let equipment: SharedEquipment = Arc::new(RwLock::new(records));
    let latest: SharedPoll = Arc::new(RwLock::new(None));

    let client = match IoTDataClient::new(config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to create IoT client: {}", e);
            std::process::exit(1);
        }
    };

    // Initial merge so the list is populated before the first tick
    merge_and_record(client.fetch_telemetry().await, &equipment, &latest).await;

    let fetcher = client.fetcher();
    let poll_equipment = equipment.clone();
    let poll_latest = latest.clone();
    client.start_polling(move || {
        let fetcher = fetcher.clone();
        let equipment = poll_equipment.clone();
        let latest = poll_latest.clone();
        async move {
            merge_and_record(fetcher.fetch().await, &equipment, &latest).await;
        }
    });

    let app = rest::create_router(rest::AppState {
        client: client.clone(),
        equipment,
        latest,
    });

    let listener = match tokio::net::TcpListener::bind(&http_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", http_addr, e);
            std::process::exit(1);
        }
    };

    info!("HTTP server listening on {}", http_addr);

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap_or_else(|e| {
            error!("HTTP server error: {}", e);
        });
    });

    tokio::select! {
        _ = server_handle => {
            error!("HTTP server terminated");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    client.stop_polling();
    info!("Shutting down");
}
