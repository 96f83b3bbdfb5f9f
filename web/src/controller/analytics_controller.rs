use crate::controller::ApiResponse;
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::analytics as AnalyticsApi;

use log::*;

/// GET per-agent sentiment and talk ratio averages over all calls with insights
#[utoipa::path(
    get,
    path = "/api/v1/analytics/agents",
    responses(
        (status = 200, description = "Successfully retrieved the per-agent rollup", body = [domain::analytics::AgentRollup]),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn agents(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    debug!("GET agent analytics");

    let rollup = AnalyticsApi::agent_rollup(app_state.db_conn_ref()).await?;

    debug!("Found rollups for {} agents", rollup.len());

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), rollup)))
}
