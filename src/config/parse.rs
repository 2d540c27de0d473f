//! Configuration file parsing and discovery

use crate::error::{ConfigError, ConfigResult, SciflowError};
use crate::runner::Context;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["sciflow.yml", "sciflow.yaml"];

/// Find the configuration file by searching current and parent directories
pub fn find_config_file() -> ConfigResult<PathBuf> {
    find_config_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the configuration file starting from a specific directory
pub fn find_config_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in CONFIG_FILE_NAMES {
            let config_path = current_dir.join(file_name);
            searched_paths.push(config_path.display().to_string());

            if config_path.is_file() {
                return Ok(config_path);
            }
        }

        // Try parent directory
        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Parse a context from a configuration file
///
/// A relative `working_dir` is taken relative to the file's directory; when
/// unset, the working directory is the file's directory.
pub fn parse_context_file(path: &Path) -> Result<Context, SciflowError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read file: {}", e)))?;

    parse_context(&contents, path.parent())
}

/// Parse a context from YAML
pub fn parse_context(yaml: &str, base_dir: Option<&Path>) -> Result<Context, SciflowError> {
    let raw: serde_yaml::Value = if yaml.trim().is_empty() {
        serde_yaml::Value::Mapping(serde_yaml::Mapping::new())
    } else {
        serde_yaml::from_str(yaml)?
    };
    let has_working_dir = raw.get("working_dir").is_some();
    let mut ctx: Context = serde_yaml::from_value(raw)?;

    if let Some(dir) = base_dir {
        if !has_working_dir {
            ctx.working_dir = dir.to_path_buf();
        } else if ctx.working_dir.is_relative() {
            ctx.working_dir = dir.join(&ctx.working_dir);
        }
    }

    validate_context(&ctx)?;
    Ok(ctx)
}

/// Validate a loaded context
pub fn validate_context(ctx: &Context) -> ConfigResult<()> {
    if ctx.interpreter.is_empty() {
        return Err(ConfigError::Invalid(
            "interpreter must name at least a program".to_string(),
        ));
    }
    if ctx.interpreter.iter().any(|part| part.is_empty()) {
        return Err(ConfigError::Invalid(
            "interpreter entries must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Load the context from the nearest configuration file, or the default
/// context when there is none
pub fn load_context() -> Result<Context, SciflowError> {
    match find_config_file() {
        Ok(path) => parse_context_file(&path),
        Err(ConfigError::NotFound(_)) => Ok(Context::default()),
        Err(e) => Err(e.into()),
    }
}
