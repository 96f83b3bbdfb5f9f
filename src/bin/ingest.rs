use domain::{archive::RawArchive, ingest, providers::Providers};
use log::{error, info};
use service::{config::Config, logging::Logger};

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
    }

    let csv_file = config.ingest_csv_file().to_path_buf();
    info!(
        "Ingesting {} into [{}]...",
        csv_file.display(),
        config.database_url()
    );

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
    let archive = RawArchive::new(config.raw_archive_dir());

    match ingest::ingest_file(&db, &providers, &archive, &csv_file).await {
        Ok(report) => info!(
            "Ingestion finished: {} threads, {} calls inserted ({} without insight), \
             {} duplicates, {} ungeneratable, {} failed",
            report.threads,
            report.inserted,
            report.missing_insights,
            report.duplicates,
            report.ungeneratable,
            report.failed
        ),
        Err(e) => {
            error!("Ingestion aborted, batch rolled back: {e}");
            std::process::exit(1);
        }
    }
}
