//! Leads module - lead field catalogue and row projection.

mod leads_model;

pub use leads_model::{LeadDraft, LeadField};
