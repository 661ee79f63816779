//! Silsilah - genealogy graph service

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use silsilah::{
    config::Args,
    db::{Collections, MongoClient},
    engine::{spawn_orphan_sweep_task, GenealogyEngine},
    server::{self, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("silsilah={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Silsilah - genealogy graph service");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {}", silsilah::db::mongo::redact_uri(&args.mongodb_uri));
    info!("Database: {}", args.mongodb_db);
    info!("======================================");

    let names = args.collection_names();

    // Connect to MongoDB (optional in dev mode)
    let (mongo, collections) = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => {
            info!("MongoDB connected successfully");
            let collections = Collections::open(&client, &names).await?;
            (Some(client), collections)
        }
        Err(e) => {
            if args.dev_mode {
                warn!("MongoDB connection failed (dev mode, using in-memory store): {}", e);
                (None, Collections::memory_only(&names))
            } else {
                error!("MongoDB connection failed: {}", e);
                std::process::exit(1);
            }
        }
    };

    let engine = Arc::new(GenealogyEngine::new(collections, args.engine_config()));

    let sweeper = args
        .orphan_sweep_interval()
        .map(|interval| spawn_orphan_sweep_task(Arc::clone(&engine), interval));

    let state = Arc::new(AppState::new(args, engine, mongo));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    };

    server::run(Arc::clone(&state), shutdown).await?;

    if let Some(task) = sweeper {
        task.abort();
    }
    if let Some(ref mongo) = state.mongo {
        mongo.close().await;
    }

    info!("Silsilah stopped");
    Ok(())
}
