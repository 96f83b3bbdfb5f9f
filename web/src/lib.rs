use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use domain::archive::RawArchive;
use domain::providers::Providers;
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;
use tower_http::cors::CorsLayer;

mod controller;
mod error;
mod params;
mod router;

pub use error::{Error, Result};

/// Application state shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub service_state: service::AppState,
    pub providers: Providers,
    pub archive: RawArchive,
}

impl AppState {
    pub fn new(service_state: service::AppState, providers: Providers) -> Self {
        let archive = RawArchive::new(service_state.config.raw_archive_dir());
        Self {
            service_state,
            providers,
            archive,
        }
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.service_state.db_conn_ref()
    }

    pub fn config(&self) -> &Config {
        &self.service_state.config
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let config = app_state.config();
    let interface = config.interface.clone().unwrap_or_default();
    let host = format!("{interface}:{}", config.port);

    info!("Server starting... listening for connections on http://{host}");

    let cors_layer = cors_layer(&config.allowed_origins);
    let listener = tokio::net::TcpListener::bind(host).await?;

    axum::serve(listener, router::define_routes(app_state).layer(cors_layer)).await
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("Ignoring invalid CORS origin {origin:?}: {err}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(origins)
}

