use crate::{models::config::ServerConfig, routes, state::AppState};
use axum::Router;

pub fn create_app() -> Router {
    create_app_with_config(ServerConfig::default())
}

pub fn create_app_with_config(config: ServerConfig) -> Router {
    let state = AppState::new(config);
    routes::create_routes(state)
}
