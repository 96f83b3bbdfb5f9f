use domain::{ingest, providers::Providers};
use log::{error, info};
use service::{config::Config, logging::Logger};

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
    }

    info!("Backfilling call insights [{}]...", config.database_url());

    let db = match service::init_database(&config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let providers = match Providers::from_config(&config) {
        Ok(providers) => providers,
        Err(e) => {
            error!("Failed to build ML service clients: {e}");
            std::process::exit(1);
        }
    };

    match ingest::backfill(&db, &providers).await {
        Ok(report) => info!(
            "Backfill finished: {} candidates, {} created, {} failed",
            report.candidates, report.created, report.failed
        ),
        Err(e) => {
            error!("Backfill aborted: {e}");
            std::process::exit(1);
        }
    }
}
