//! Error types for validation failures.
//!
//! This module provides the error taxonomy produced by chain runs: single
//! field errors, alternative-group errors, and unknown-field errors, plus
//! the non-empty accumulated collection used by the pipeline's verdict.

mod validation_error;

pub use validation_error::{ValidationError, ValidationErrors};
