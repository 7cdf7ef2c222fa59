//! Showroom Core - vehicle inventory store, query engine and lookups.
//!
//! This crate owns the dataset lifecycle (load, cache, refresh) and answers
//! filtered, faceted and paginated queries against it. It knows nothing about
//! HTTP; the `showroom-server` app adapts it to JSON endpoints.

pub mod constants;
pub mod errors;
pub mod vehicles;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
