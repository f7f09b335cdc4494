use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

mod admin;
mod health;
mod hello;
mod weather;

use crate::session;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let admin_router = Router::new()
        .route(
            "/data",
            get(admin::routes::data).post(admin::routes::data_custom),
        )
        .route("/flags", get(admin::routes::list_flags))
        .route("/flags/{key}/toggle", post(admin::routes::toggle_flag));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health::health))
        .route("/hello/{name}", get(hello::hello))
        .route("/weather/forecast", get(weather::routes::forecast))
        .nest(
            "/api/admin",
            admin_router.layer(middleware::from_fn(session::require_admin)),
        )
        .layer(CorsLayer::permissive())
}

async fn root() -> &'static str {
    "bookings backend is running"
}
