mod aggregation;
mod config;
mod flags;
mod forecast;
mod routes;
mod session;
mod state;

use std::sync::Arc;

use sqlx::PgPool;

use crate::aggregation::EntityRegistry;
use crate::flags::client::FlagClient;

#[tokio::main]
async fn main() {
    let config = config::Config::from_env();

    let db = PgPool::connect(&config.database_url)
        .await
        .expect("Error connecting DB");

    sqlx::migrate!()
        .run(&db)
        .await
        .expect("Error running migrations");

    // Countable entities, registered up front; registration order is the
    // default reporting order.
    let mut entities = EntityRegistry::new();
    entities.register("booking", "bookings", "Bookings");
    entities.register("coupon", "coupons", "Coupons");

    let state = state::AppState {
        db: db.clone(),
        flags: FlagClient::new(db),
        entities: Arc::new(entities),
    };

    let app = routes::routes().with_state(state);

    let listener = tokio::net::TcpListener::bind(config.addr()).await.unwrap();

    println!("bookings backend is up at http://{}", config.addr());

    axum::serve(listener, app).await.unwrap();
}
