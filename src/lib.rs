// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod config;
pub mod csv;
pub mod dto;
pub mod error;
pub mod history;
pub mod normalize;
pub mod scorer;
pub mod stats;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::error::ApiError;
