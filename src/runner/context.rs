//! Execution context for task running
//!
//! The context carries the settings every task needs while it runs, and the
//! verbosity-gated logging tasks report through.

use colored::Colorize;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Execution context shared by the tasks of one workflow
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Context {
    /// Directory commands run in and relative paths are resolved against
    pub working_dir: PathBuf,

    /// Interpreter for shell commands (e.g., ["bash", "-c"])
    pub interpreter: Vec<String>,

    /// Verbosity level
    pub verbosity: Verbosity,

    /// Write outputs to `<path>.tmp` first and move them in place on success
    pub tempfiles: bool,

    /// Write `<output>.au.json` audit files after shell tasks
    pub audit: bool,
}

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

impl Context {
    /// Create a new context with default settings
    pub fn new() -> Self {
        Context {
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            interpreter: vec!["sh".to_string(), "-c".to_string()],
            verbosity: Verbosity::Normal,
            tempfiles: true,
            audit: true,
        }
    }

    /// Create a context with a specific working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Enable or disable temp-file outputs
    pub fn with_tempfiles(mut self, tempfiles: bool) -> Self {
        self.tempfiles = tempfiles;
        self
    }

    /// Enable or disable audit files
    pub fn with_audit(mut self, audit: bool) -> Self {
        self.audit = audit;
        self
    }

    /// Resolve a task path against the working directory
    pub fn locate(&self, path: impl AsRef<Path>) -> PathBuf {
        self.working_dir.join(path)
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{} {}", "[INFO]".green(), message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        if self.verbosity >= Verbosity::Quiet {
            eprintln!("{} {}", "[ERROR]".red().bold(), message);
        }
    }

    /// Print debug message (only in verbose mode)
    pub fn print_debug(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{} {}", "[DEBUG]".dimmed(), message);
        }
    }

    /// Print captured process output under a heading
    pub fn print_stream(&self, heading: &str, content: &str) {
        if self.verbosity >= Verbosity::Normal && !content.is_empty() {
            eprintln!("{}", "=".repeat(80));
            eprintln!("{}:", heading.bold());
            eprintln!("{}", content.trim_end());
        }
    }

    /// Print the separator closing a block of captured output
    pub fn print_rule(&self) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{}", "=".repeat(80));
        }
    }

    /// Print task start message
    pub fn print_task_start(&self, what: &str) {
        self.print_info(&format!("Executing: {} ...", what));
    }

    /// Print task complete message
    pub fn print_task_complete(&self, what: &str) {
        self.print_debug(&format!("Task completed: {}", what));
    }

    /// Print task skip message
    pub fn print_task_skip(&self, path: &str, name: &str) {
        self.print_info(&format!(
            "File or folder already exists, so skipping task: {} ({})",
            path, name
        ));
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
