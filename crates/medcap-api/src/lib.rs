//! Medcap API Library
//!
//! HTTP surface for the media captioning service: upload handling, response
//! shaping, and application setup. Integration tests build the router through
//! [`setup`] with test doubles injected via [`state::AppState`].

mod api_doc;
mod handlers;
mod telemetry;
mod utils;

// Public modules
pub mod error;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
