//! Error handling and survey statistics.
//!
//! This module provides:
//! - Error type definitions for initialization, storage, profiles, locks and
//!   administrative actions
//! - Transport failure categorization for probes
//! - Per-pass survey outcome counters

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::categorize_transport_error;
pub use stats::SurveyStats;
pub use types::{
    AdminError, DatabaseError, InitializationError, LockError, ProfileError, SurveyOutcome,
    TransportError, TransportFailure,
};
