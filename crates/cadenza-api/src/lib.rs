//! Cadenza API Library
//!
//! HTTP surface of the catalogue: axum handlers, multipart staging, response
//! envelopes and application bootstrapping.

mod api_doc;
mod handlers;
mod utils;

pub mod error;
pub mod response;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use state::{AppState, UploadLimits};
