use axum::{routing::post, Router};

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/usuarios",
            post(handlers::register).get(handlers::profile),
        )
        .route("/login", post(handlers::login))
}
