//! Models Module
//!
//! Typed request and response shapes for the HTTP surface.

mod requests;
mod responses;

pub use requests::FetchRequest;
pub use responses::{
    DeleteResponse, EntryResponse, ErrorResponse, EvictResponse, FetchResponse, HealthResponse,
    StatsResponse,
};
