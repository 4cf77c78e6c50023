//! Leadflow Core - Domain entities, services, and traits.
//!
//! This crate contains the lead intake and campaign activation logic.
//! It is backend-agnostic and defines gateway traits that are implemented
//! by the `connect` crate.

pub mod campaigns;
pub mod constants;
pub mod errors;
pub mod imports;
pub mod leads;
pub mod sources;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
