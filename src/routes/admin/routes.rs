use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::aggregation::{self, CountEntry};
use crate::state::AppState;
use super::{AdminDataRequest, AdminDataResponse, FlagOverview, PageStats};

/// Count totals for the default registered entity set.
pub async fn data(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let entries = state.entities.default_entries();
    run_aggregation(&state, entries).await
}

/// Count totals for a caller-supplied ordered spec.
pub async fn data_custom(
    State(state): State<AppState>,
    Json(payload): Json<AdminDataRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    run_aggregation(&state, payload.entries).await
}

async fn run_aggregation(
    state: &AppState,
    entries: Vec<CountEntry>,
) -> Result<Json<AdminDataResponse>, (StatusCode, String)> {
    // Malformed specs are rejected before any SQL exists
    aggregation::validate_entries(&entries).map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    if entries.is_empty() {
        return Ok(Json(AdminDataResponse { page_stats: Vec::new() }));
    }

    let pairs = aggregation::resolve_entries(&state.entities, &entries)
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let sql = aggregation::build_count_query(&pairs);

    let raw = aggregation::queries::fetch_counts(&state.db, &sql)
        .await
        .map_err(|e| {
            eprintln!("Failed to run count aggregation: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to run aggregation".to_string(),
            )
        })?;

    let page_stats = aggregation::totals_in_order(&entries, &raw)
        .into_iter()
        .map(|t| PageStats {
            label: t.label,
            total: t.total,
        })
        .collect();

    Ok(Json(AdminDataResponse { page_stats }))
}

/// List all flags in the store
pub async fn list_flags(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let flags = sqlx::query_as::<_, FlagOverview>(
        r#"
        SELECT id, key, name, enabled, rollout_percentage, updated_at
        FROM feature_flags
        ORDER BY key
        "#,
    )
    .fetch_all(&state.db)
    .await
    .map_err(|e| {
        eprintln!("Failed to fetch flags: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch flags".to_string())
    })?;

    Ok(Json(flags))
}

/// Flip a flag's enabled state
pub async fn toggle_flag(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let flag = sqlx::query_as::<_, FlagOverview>(
        r#"
        UPDATE feature_flags
        SET enabled = NOT enabled, updated_at = NOW()
        WHERE key = $1
        RETURNING id, key, name, enabled, rollout_percentage, updated_at
        "#,
    )
    .bind(&key)
    .fetch_optional(&state.db)
    .await
    .map_err(|e| {
        eprintln!("Failed to toggle flag {}: {:?}", key, e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to toggle flag".to_string())
    })?;

    match flag {
        Some(f) => Ok(Json(serde_json::json!({ "key": f.key, "enabled": f.enabled }))),
        None => Err((StatusCode::NOT_FOUND, "Flag not found".to_string())),
    }
}
