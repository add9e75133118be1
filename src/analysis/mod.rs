//! Analysis result assembly
//!
//! - Result types and their wire forms
//! - Primary/fallback arbitration
//! - Diagnostics

pub mod arbiter;
pub mod metadata;
pub mod result;
