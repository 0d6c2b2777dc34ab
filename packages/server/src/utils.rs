pub mod auth;
pub mod narration;
pub mod test_setup;
pub mod websocket;
