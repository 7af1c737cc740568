//! # VIGIL Common Library
//!
//! Shared code for the VIGIL operator console:
//! - Data model for tasks, videos, channels, and analysis results
//! - API request/response envelope types
//! - Risk aggregation (multi-source danger verdicts)
//! - Timestamp format helpers
//! - Error types

pub mod api;
pub mod error;
pub mod models;
pub mod timefmt;
pub mod verdict;

pub use error::{Error, Result};
pub use verdict::{aggregate, Verdict};
