use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde::Serialize;

/// Inclusive lower bound of simulated temperatures.
pub const TEMP_MIN_C: i32 = -20;
/// Exclusive upper bound, so draws land in [-20, 54].
pub const TEMP_MAX_C: i32 = 55;

/// Days covered by one forecast request.
pub const FORECAST_DAYS: i64 = 5;

/// Summary word list used when the v2 flag is off: a uniform draw,
/// unrelated to the temperature.
pub const LEGACY_SUMMARIES: [&str; 10] = [
    "Freezing", "Bracing", "Chilly", "Cool", "Mild", "Warm", "Balmy", "Hot", "Sweltering",
    "Scorching",
];

#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    pub date: NaiveDate,
    pub temperature_c: i32,
    pub summary: String,
}

/// Deterministic summary for a temperature, ascending buckets. Each bucket
/// carries a fixed decorative suffix; the bucket name is the stable part of
/// the value.
pub fn summary_for_temperature(temperature_c: i32) -> &'static str {
    match temperature_c {
        t if t <= -10 => "Freezing 🥶",
        t if t <= 0 => "Bracing 🌬️",
        t if t <= 10 => "Chilly ❄️",
        t if t <= 15 => "Cool 🍃",
        t if t <= 20 => "Mild 🌤️",
        t if t <= 25 => "Warm 🌞",
        t if t <= 30 => "Balmy 🌴",
        t if t <= 35 => "Hot 🔥",
        t if t <= 40 => "Sweltering 🌡️",
        _ => "Scorching 🌋",
    }
}

/// Build the record for `day` days past the anchor. The caller supplies the
/// random source: every concurrent unit of work owns its own generator, and
/// tests pass a seeded one.
pub fn build_forecast<R: Rng>(
    anchor: NaiveDate,
    day: i64,
    use_v2_summary: bool,
    rng: &mut R,
) -> Forecast {
    let temperature_c = rng.gen_range(TEMP_MIN_C..TEMP_MAX_C);

    let summary = if use_v2_summary {
        summary_for_temperature(temperature_c).to_string()
    } else {
        LEGACY_SUMMARIES[rng.gen_range(0..LEGACY_SUMMARIES.len())].to_string()
    };

    Forecast {
        date: anchor + Duration::days(day),
        temperature_c,
        summary,
    }
}
