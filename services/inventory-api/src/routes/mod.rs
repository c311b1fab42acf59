use axum::{routing::post, Router};

use crate::{handlers::*, AppState};

pub fn create_api_routes() -> Router<AppState> {
    Router::new().nest(
        "/inventory",
        Router::new()
            .route("/materials", post(submit_materials))
            .route("/upload", post(upload_inventory)),
    )
}
