//! Command execution
//!
//! This module handles executing resolved shell commands.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::Context;
use std::process::{Command as StdCommand, Stdio};

/// Captured result of a successful command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run a command string through the context's interpreter
///
/// Output is captured and echoed via the context. A non-zero exit status is
/// returned as `ExecutionError::CommandFailed` carrying the captured stderr.
pub fn execute_command(command: &str, ctx: &Context) -> ExecutionResult<CommandOutput> {
    let (program, args) = ctx
        .interpreter
        .split_first()
        .ok_or(ExecutionError::NoInterpreter)?;

    ctx.print_task_start(command);

    let output = StdCommand::new(program)
        .args(args)
        .arg(command)
        .current_dir(&ctx.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| ExecutionError::Spawn {
            command: command.to_string(),
            source,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    ctx.print_stream("STDOUT", &stdout);
    ctx.print_stream("STDERR", &stderr);
    if !stdout.is_empty() || !stderr.is_empty() {
        ctx.print_rule();
    }

    if !output.status.success() {
        return Err(ExecutionError::CommandFailed {
            command: command.to_string(),
            code: output.status.code(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(CommandOutput {
        stdout: stdout.trim().to_string(),
        stderr: stderr.trim().to_string(),
    })
}
