use crate::equipment::SharedEquipment;
use crate::poll::{merge_and_record, PollSummary, SharedPoll};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use iot_client::{metrics, EquipmentRecord, IoTDataClient, StatusReport};
use std::sync::Arc;
use tracing::error;

/// The client is shared without a lock; only the equipment list and the
/// latest poll summary are locked, and never across a fetch.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<IoTDataClient>,
    pub equipment: SharedEquipment,
    pub latest: SharedPoll,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/status", get(get_status))
        .route("/api/v1/poll", get(get_last_poll))
        .route("/api/v1/equipment", get(get_equipment))
        .route("/api/v1/refresh", post(refresh))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn get_status(State(state): State<AppState>) -> Json<StatusReport> {
    Json(state.client.get_status().await)
}

async fn get_last_poll(State(state): State<AppState>) -> Result<Json<PollSummary>, StatusCode> {
    state
        .latest
        .read()
        .await
        .clone()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_equipment(State(state): State<AppState>) -> Json<Vec<EquipmentRecord>> {
    Json(state.equipment.read().await.clone())
}

async fn refresh(State(state): State<AppState>) -> Json<PollSummary> {
    let fetched = state.client.manual_refresh().await;
    Json(merge_and_record(fetched, &state.equipment, &state.latest).await)
}

async fn metrics_handler() -> Result<String, AppError> {
    Ok(metrics::gather_metrics()?)
}

struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("API error: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal server error: {}", self.0),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
