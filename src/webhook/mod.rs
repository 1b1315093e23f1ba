mod dto;
pub mod handlers;
pub mod replies;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::home))
        .route("/webhook", post(handlers::inbound))
}
