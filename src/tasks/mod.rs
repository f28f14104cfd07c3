//! Background Tasks Module
//!
//! Periodic maintenance for the fetch cache.

mod sweep;

pub use sweep::spawn_sweep_task;
