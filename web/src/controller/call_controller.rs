use crate::controller::ApiResponse;
use crate::params::call::{IndexParams, ThreadsRequest};
use crate::{AppState, Error};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{call as CallApi, ingest as IngestApi, recommendation as RecommendationApi, Id};

use log::*;

/// GET a page of calls that have insights, newest first
#[utoipa::path(
    get,
    path = "/api/v1/calls",
    params(IndexParams),
    responses(
        (status = 200, description = "Successfully retrieved a page of calls", body = domain::call::CallPage),
        (status = 422, description = "Unprocessable Entity"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn index(
    State(app_state): State<AppState>,
    params: Result<Query<IndexParams>, QueryRejection>,
) -> Result<impl IntoResponse, Error> {
    let Query(params) = params.map_err(|rejection| Error::invalid_params(rejection.body_text()))?;
    debug!("GET all Calls matching: {params:?}");
    params.validate()?;

    let page = CallApi::find_page(
        app_state.db_conn_ref(),
        &params.filter(),
        params.limit(),
        params.offset(),
    )
    .await?;

    debug!("Found {} of {} Calls", page.items.len(), page.total);

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), page)))
}

/// GET a particular Call with its metrics
#[utoipa::path(
    get,
    path = "/api/v1/calls/{call_id}",
    params(
        ("call_id" = String, Path, description = "Call id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved the Call", body = domain::call::CallDetail),
        (status = 404, description = "Call not found"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn read(
    State(app_state): State<AppState>,
    Path(call_id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Call by id: {call_id}");

    let call = CallApi::find_detail(app_state.db_conn_ref(), &call_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), call)))
}

/// GET the calls most similar to a Call, each paired with a coaching nudge
#[utoipa::path(
    get,
    path = "/api/v1/calls/{call_id}/recommendations",
    params(
        ("call_id" = String, Path, description = "Call id to find similar calls for")
    ),
    responses(
        (status = 200, description = "Successfully computed recommendations", body = [domain::recommendation::Recommendation]),
        (status = 404, description = "Call has no insight"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn recommendations(
    State(app_state): State<AppState>,
    Path(call_id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET recommendations for Call: {call_id}");

    let recommendations = RecommendationApi::recommend(
        app_state.db_conn_ref(),
        &app_state.providers,
        &call_id,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), recommendations)))
}

/// POST raw messages; every reconstructed thread is stored as a Call right away
#[utoipa::path(
    post,
    path = "/api/v1/calls/threads",
    request_body = ThreadsRequest,
    responses(
        (status = 201, description = "Messages were ingested", body = domain::ingest::IngestReport),
        (status = 422, description = "Unprocessable Entity"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn create_threads(
    State(app_state): State<AppState>,
    Json(request): Json<ThreadsRequest>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST {} raw messages", request.messages.len());

    let report = IngestApi::ingest_threads(
        app_state.db_conn_ref(),
        &app_state.providers,
        &app_state.archive,
        &request.messages,
    )
    .await?;

    info!("Ingested messages: {report:?}");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), report)),
    ))
}
