//! API Module
//!
//! HTTP surface for the fetch cache.

mod handlers;
mod routes;

pub use handlers::AppState;
pub use routes::create_router;
