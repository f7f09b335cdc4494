use axum::{extract::Path, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct HelloResponse {
    pub result: String,
}

pub async fn hello(Path(name): Path<String>) -> Json<HelloResponse> {
    Json(HelloResponse {
        result: format!("Hello, {}!", name),
    })
}
