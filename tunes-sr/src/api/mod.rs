//! HTTP API handlers for tunes-sr

pub mod buildinfo;
pub mod health;
pub mod recommend;
pub mod search;
pub mod session;

pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use recommend::get_recommendations;
pub use search::search;
pub use session::SessionError;
