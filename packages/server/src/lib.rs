//! HTTP and WebSocket host for `game-rules` tables.

pub mod app;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
