pub mod actions;
pub mod player;
pub mod role;
pub mod settings;

pub use actions::*;
pub use player::*;
pub use role::*;
pub use settings::*;
