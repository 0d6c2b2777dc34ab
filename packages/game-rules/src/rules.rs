pub mod divination;
pub mod night;
pub mod role_assignment;
pub mod voting;
pub mod winning_judgement;

pub use divination::*;
pub use night::*;
pub use role_assignment::*;
pub use voting::*;
pub use winning_judgement::*;
