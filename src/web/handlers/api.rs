//! JSON series for the admin dashboard charts.

use crate::{
    core::report::{self, ChartData},
    web::{AppState, error::WebResult},
};
use axum::{Json, extract::State};

pub async fn production_data(State(state): State<AppState>) -> WebResult<Json<ChartData>> {
    Ok(Json(report::production_chart(&state.db).await?))
}

pub async fn health_record_data(State(state): State<AppState>) -> WebResult<Json<ChartData>> {
    Ok(Json(report::symptom_chart(&state.db).await?))
}

pub async fn flock_data(State(state): State<AppState>) -> WebResult<Json<ChartData>> {
    Ok(Json(report::breed_chart(&state.db).await?))
}
