//! Route Configuration
//!
//! Router assembly: `api_routes` wires handlers to paths, `router` stacks
//! the cross-cutting layers (CORS, tracing, fallback) on top.

pub mod api_routes;
pub mod router;

pub use router::create_router;
