//! Crate-level scenario tests.
//!
//! - `integration.rs`: end-to-end editing scenarios through the [`Engine`](crate::engine::Engine)
//! - `fault_isolation.rs`: broken and missing handlers never break resolution
//! - `helpers.rs`: fixture handlers, a recording canvas and a counting
//!   tracing layer

mod fault_isolation;
mod helpers;

// Re-export for convenience
pub use helpers::*;
