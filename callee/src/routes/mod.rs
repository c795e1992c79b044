//! Callee route definitions.

mod dice;
mod health;
mod root;
mod slow;

pub use dice::dice_routes;
pub use health::health_routes;
pub use root::root_routes;
pub use slow::{slow_routes, SlowResponse};
