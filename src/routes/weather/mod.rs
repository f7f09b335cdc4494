pub mod routes;

use chrono::NaiveDate;
use serde::Deserialize;

/// Flag gating the deterministic summary variant.
pub const WEATHER_V2_FLAG: &str = "get-weather-v-2";

#[derive(Debug, Deserialize)]
pub struct ForecastParams {
    pub date: Option<NaiveDate>,
}
