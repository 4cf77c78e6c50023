//! Leadflow Connect - HTTP access to the Leadflow backend.
//!
//! This crate implements the gateway traits of `leadflow-core` over the
//! backend REST API.

pub mod client;

pub use client::{LeadflowApiClient, DEFAULT_API_URL, DEFAULT_TIMEOUT_MS};
