use crate::controller::{analytics_controller, call_controller, health_check_controller};
use crate::{params, AppState};
use axum::{
    routing::{get, post},
    Router,
};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Call Analytics API"
        ),
        paths(
            call_controller::index,
            call_controller::read,
            call_controller::recommendations,
            call_controller::create_threads,
            analytics_controller::agents,
            health_check_controller::health_check,
        ),
        components(
            schemas(
                domain::calls::Model,
                domain::call_insights::Model,
                domain::call::CallSummary,
                domain::call::CallPage,
                domain::call::CallDetail,
                domain::recommendation::Recommendation,
                domain::analytics::AgentRollup,
                domain::ingest::IngestReport,
                domain::message::RawMessage,
                params::call::ThreadsRequest,
            )
        ),
        tags(
            (name = "call_analytics", description = "Call Center Transcript Analytics API")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(app_state))
        .merge(health_routes())
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn api_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(call_routes(app_state.clone()))
        .merge(analytics_routes(app_state))
}

fn call_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/calls", get(call_controller::index))
        .route("/calls/threads", post(call_controller::create_threads))
        .route("/calls/{call_id}", get(call_controller::read))
        .route(
            "/calls/{call_id}/recommendations",
            get(call_controller::recommendations),
        )
        .with_state(app_state)
}

fn analytics_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/analytics/agents", get(analytics_controller::agents))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}
