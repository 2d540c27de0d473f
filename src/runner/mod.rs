//! Task execution engine
//!
//! This module handles constructing and running tasks: resolving their
//! placeholders, deciding whether their outputs already exist, running the
//! command or function, and recording what was done.

pub mod audit;
pub mod command;
pub mod context;
pub mod satisfied;
pub mod task;

// Re-export main types
pub use audit::*;
pub use command::*;
pub use context::*;
pub use satisfied::*;
pub use task::*;
