use axum::{ Json, extract::State, http::StatusCode };
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthData {
    status: u16,
    database: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthData> {
    let database = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();
    let health_data = HealthData {
        status: StatusCode::OK.as_u16(),
        database,
    };
    Json(health_data)
}
