//! Error types for Sciflow

use crate::runner::TaskState;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Sciflow operations
pub type Result<T> = std::result::Result<T, SciflowError>;

/// Main error type for Sciflow
#[derive(Error, Debug)]
pub enum SciflowError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Placeholder parsing and resolution errors
    #[error("Placeholder error: {0}")]
    Placeholder(#[from] PlaceholderError),

    /// Task execution errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// Whatever a function task returned, passed through untouched
    #[error(transparent)]
    Function(anyhow::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON errors (audit files)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which map a placeholder refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Input,
    Output,
    Param,
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortKind::Input => write!(f, "input"),
            PortKind::Output => write!(f, "output"),
            PortKind::Param => write!(f, "parameter"),
        }
    }
}

/// Placeholder parsing and resolution errors
#[derive(Error, Debug, PartialEq)]
pub enum PlaceholderError {
    #[error("Invalid placeholder syntax in '{fragment}': {reason}")]
    Syntax { fragment: String, reason: String },

    #[error("Unknown {kind} '{name}'")]
    UnknownReference { kind: PortKind, name: String },

    #[error("Cyclic output reference: {0}")]
    CyclicReference(String),

    #[error("Output '{0}' is declared more than once with different paths")]
    ConflictingOutput(String),

    #[error("Output '{0}' resolves to an empty path")]
    EmptyOutput(String),
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command failed with exit code {code:?}: {command}\nSTDERR: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to spawn command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("No interpreter configured")]
    NoInterpreter,

    #[error("Existing temp file found: {0}")]
    StaleTempFile(PathBuf),

    #[error("Task finished without producing output: {0}")]
    MissingOutput(PathBuf),

    #[error("Task already {0}, it cannot be executed again")]
    ReEntry(TaskState),
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for placeholder operations
pub type PlaceholderResult<T> = std::result::Result<T, PlaceholderError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

