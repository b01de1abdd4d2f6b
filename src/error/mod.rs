//! API Error Types
//!
//! The error taxonomy every handler and service speaks, plus its conversion
//! into HTTP responses. See `types` for the enum and `conversion` for the
//! `IntoResponse` implementation.

pub mod conversion;
pub mod types;

pub use types::ApiError;
