use std::sync::Arc;

use tracing::info;

use cabinet::record::FileStorage;
use cabinet::web::WebServer;
use cabinet::{Config, Database};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = cabinet::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        cabinet::logging::init_console_only(&config.logging.level);
    }

    info!("cabinet - personal file management service");

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = db.migrate().await {
        tracing::error!("Failed to migrate database: {}", e);
        std::process::exit(1);
    }

    let storage = match FileStorage::new(&config.storage.path) {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!("Failed to initialize file storage: {}", e);
            std::process::exit(1);
        }
    };
    info!("File storage initialized at: {}", config.storage.path);

    let server = match WebServer::new(&config, Arc::new(db), storage) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Invalid server configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        tracing::error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
