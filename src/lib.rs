//! Sciflow - ad-hoc file-based workflow steps
//!
//! Sciflow lets a program declare workflow steps inline, each a shell command
//! or a Rust function reading named inputs and writing named outputs. Paths
//! are computed from placeholders such as `[o:fasta:[i:gz|basename|%.gz]]`,
//! and a step whose outputs already exist is skipped.
//!
//! ```no_run
//! use sciflow::{paths, shell};
//!
//! # fn main() -> sciflow::Result<()> {
//! let download = shell("wget -O [o:gz:chrmt.fa.gz] https://example.org/chrmt.fa.gz", paths([]), paths([]))?;
//! let unpack = shell(
//!     "zcat [i:gz] > [o:fasta:[i:gz|%.gz]]",
//!     download.outputs().clone(),
//!     paths([]),
//! )?;
//! assert_eq!(unpack.output("fasta"), Some("chrmt.fa"));
//! # Ok(())
//! # }
//! ```

// Public modules
pub mod config;
pub mod error;
pub mod placeholder;
pub mod runner;

// Re-export commonly used types
pub use error::{Result, SciflowError};
pub use placeholder::{paths, resolve, PathMap, Resolution};
pub use runner::{func, shell, Context, Ports, Task, TaskState, TaskView, Template};

/// Current version of Sciflow
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
