//! Caller route definitions.

mod fetch;
mod health;
mod root;

pub use fetch::fetch_routes;
pub use health::health_routes;
pub use root::root_routes;
