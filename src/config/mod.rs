//! Configuration loading
//!
//! This module handles loading an execution [`Context`](crate::runner::Context)
//! from a `sciflow.yml` file.

pub mod parse;

// Re-export main types
pub use parse::*;
