use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use tokio::task::JoinSet;

use crate::flags::EvalContext;
use crate::forecast::{build_forecast, Forecast, FORECAST_DAYS};
use crate::session::OptionalSession;
use crate::state::AppState;
use super::{ForecastParams, WEATHER_V2_FLAG};

/// Five-day forecast. The summary variant is resolved per request from the
/// weather-v2 flag; anonymous requests are normal and evaluate against the
/// anonymous context.
pub async fn forecast(
    State(state): State<AppState>,
    OptionalSession(session): OptionalSession,
    Query(params): Query<ForecastParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let context = EvalContext::for_session(session.as_ref());
    let decision = state.flags.bool_variation(WEATHER_V2_FLAG, &context, false).await;

    let anchor = params.date.unwrap_or_else(|| Utc::now().date_naive());

    // One unit of work per forecast day, each with its own random source.
    // Dropping the set (caller gone) aborts whatever is still outstanding.
    let mut units = JoinSet::new();
    for day in 1..=FORECAST_DAYS {
        let use_v2 = decision.value;
        units.spawn(async move {
            let mut rng = rand::thread_rng();
            build_forecast(anchor, day, use_v2, &mut rng)
        });
    }

    let mut records: Vec<Forecast> = Vec::with_capacity(FORECAST_DAYS as usize);
    while let Some(joined) = units.join_next().await {
        match joined {
            Ok(forecast) => records.push(forecast),
            Err(e) => {
                eprintln!("Forecast worker failed: {:?}", e);
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to build forecast".to_string(),
                ));
            }
        }
    }

    // Units complete in any order; the response contract is ascending dates.
    records.sort_by_key(|f| f.date);

    Ok(Json(records))
}
