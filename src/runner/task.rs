//! Task types and execution logic
//!
//! A task is one step of a workflow: a shell command or a Rust function
//! reading named inputs and writing named outputs. Outputs are resolved when
//! the task is constructed, and the task only runs if some output is missing.

use crate::error::{ExecutionError, PlaceholderResult, PortKind, Result, SciflowError};
use crate::placeholder::{lookup, Environment, PathMap};
use crate::runner::{
    check_stale_temp_files, ensure_output_dirs, execute_command, is_satisfied,
    promote_temp_files, temp_path, AuditInfo, Context,
};
use chrono::{DateTime, Utc};
use std::fmt;

/// Signature of a function task
pub type TaskFn = Box<dyn Fn(&TaskView<'_>) -> anyhow::Result<()>>;

/// What a task runs
pub enum Template {
    /// Shell command template, with placeholders
    Command(String),

    /// Rust function, called with a view of the task's ports
    Callable(TaskFn),
}

impl Template {
    /// Wrap a closure as a function template
    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&TaskView<'_>) -> anyhow::Result<()> + 'static,
    {
        Template::Callable(Box::new(f))
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Template::Command(cmd) => f.debug_tuple("Command").field(cmd).finish(),
            Template::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

/// The named inputs, outputs and params a task is built from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ports {
    /// Input name to path, which may use `[p:..]` params
    pub inputs: PathMap,

    /// Output name to path expression
    pub outputs: PathMap,

    /// Param name to value
    pub params: PathMap,
}

impl Ports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inputs(mut self, inputs: PathMap) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: PathMap) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_params(mut self, params: PathMap) -> Self {
        self.params = params;
        self
    }

    /// Add a single input
    pub fn input(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.inputs.insert(name.into(), path.into());
        self
    }

    /// Add a single output path expression
    pub fn output(mut self, name: impl Into<String>, expr: impl Into<String>) -> Self {
        self.outputs.insert(name.into(), expr.into());
        self
    }

    /// Add a single param
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

/// Lifecycle of a task
///
/// Construction resolves placeholders, so every `Task` starts out `Resolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Resolved,
    Skipped,
    Executed,
    Failed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Resolved => write!(f, "resolved"),
            TaskState::Skipped => write!(f, "skipped"),
            TaskState::Executed => write!(f, "executed"),
            TaskState::Failed => write!(f, "failed"),
        }
    }
}

/// What a function task sees of its task
///
/// Paths are already joined onto the context's working directory, so the
/// function can open them directly.
#[derive(Debug)]
pub struct TaskView<'a> {
    /// Input name to concrete path
    pub inputs: PathMap,

    /// Output name to the path the function should write
    pub outputs: PathMap,

    /// Param name to value
    pub params: &'a PathMap,
}

impl TaskView<'_> {
    /// Path of a named input
    pub fn input(&self, name: &str) -> PlaceholderResult<&str> {
        lookup(&self.inputs, PortKind::Input, name)
    }

    /// Path a named output should be written to
    pub fn output(&self, name: &str) -> PlaceholderResult<&str> {
        lookup(&self.outputs, PortKind::Output, name)
    }

    /// Value of a named param
    pub fn param(&self, name: &str) -> PlaceholderResult<&str> {
        lookup(self.params, PortKind::Param, name)
    }
}

/// A command resolved in both final and temp-path form
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedCommand {
    resolved: String,
    temp: String,
}

/// One workflow step
#[derive(Debug)]
pub struct Task {
    template: Template,
    command: Option<ResolvedCommand>,
    inputs: PathMap,
    outputs: PathMap,
    params: PathMap,
    state: TaskState,
}

impl Task {
    /// Create a task, resolving its command and output paths
    pub fn new(template: Template, ports: Ports, ctx: &Context) -> Result<Self> {
        let Ports {
            inputs: input_exprs,
            outputs: output_exprs,
            params,
        } = ports;

        let inputs = Environment::new(&input_exprs, &output_exprs)
            .with_params(&params)
            .resolve_inputs()?;
        let env = Environment::new(&inputs, &output_exprs).with_params(&params);

        let (command, outputs) = match &template {
            Template::Command(cmd) => {
                let resolution = env.resolve(cmd)?;
                ctx.print_debug(&format!("Resolved command: {}", resolution.resolved));
                let command = ResolvedCommand {
                    resolved: resolution.resolved,
                    temp: resolution.temp,
                };
                (Some(command), resolution.outputs)
            }
            Template::Callable(_) => (None, env.resolve_outputs()?),
        };

        for (name, path) in &outputs {
            ctx.print_debug(&format!("Resolved output {}: {}", name, path));
        }

        Ok(Task {
            template,
            command,
            inputs,
            outputs,
            params,
            state: TaskState::Resolved,
        })
    }

    /// Run the task unless all of its outputs already exist
    pub fn execute(&mut self, ctx: &Context) -> Result<TaskState> {
        if self.state != TaskState::Resolved {
            return Err(ExecutionError::ReEntry(self.state).into());
        }

        if is_satisfied(&self.outputs, &ctx.working_dir) {
            for (name, path) in &self.outputs {
                ctx.print_task_skip(path, name);
            }
            self.state = TaskState::Skipped;
            return Ok(self.state);
        }

        match self.run(ctx) {
            Ok(()) => {
                self.state = TaskState::Executed;
                Ok(self.state)
            }
            Err(e) => {
                self.state = TaskState::Failed;
                ctx.print_error(&e.to_string());
                Err(e)
            }
        }
    }

    fn run(&self, ctx: &Context) -> Result<()> {
        if ctx.tempfiles {
            check_stale_temp_files(&self.outputs, &ctx.working_dir)?;
        }
        ensure_output_dirs(&self.outputs, &ctx.working_dir)?;

        let timing = match &self.template {
            Template::Command(_) => self.run_command(ctx)?,
            Template::Callable(f) => {
                self.run_callable(f, ctx)?;
                None
            }
        };

        if ctx.tempfiles {
            promote_temp_files(&self.outputs, &ctx.working_dir)?;
        }

        if let (true, Some(command), Some((start, end))) = (ctx.audit, &self.command, timing) {
            AuditInfo::new(
                &command.resolved,
                self.inputs.values(),
                self.outputs.values(),
                start,
                end,
            )
            .write(ctx)?;
        }

        Ok(())
    }

    /// Run the shell command, returning when it started and finished
    fn run_command(&self, ctx: &Context) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>> {
        let Some(command) = &self.command else {
            return Ok(None);
        };

        let exec = if ctx.tempfiles {
            &command.temp
        } else {
            &command.resolved
        };

        let start = Utc::now();
        execute_command(exec, ctx)?;
        let end = Utc::now();

        ctx.print_task_complete(&command.resolved);
        Ok(Some((start, end)))
    }

    fn run_callable(&self, f: &TaskFn, ctx: &Context) -> Result<()> {
        let locate = |path: &str| ctx.locate(path).to_string_lossy().into_owned();

        let inputs = self
            .inputs
            .iter()
            .map(|(name, path)| (name.clone(), locate(path)))
            .collect();

        let outputs: PathMap = self
            .outputs
            .iter()
            .map(|(name, path)| {
                let path = if ctx.tempfiles {
                    temp_path(path)
                } else {
                    path.clone()
                };
                (name.clone(), locate(&path))
            })
            .collect();

        ctx.print_info(&format!(
            "Executing function, producing output(s): {}",
            outputs.values().cloned().collect::<Vec<_>>().join(", ")
        ));

        let view = TaskView {
            inputs,
            outputs,
            params: &self.params,
        };
        f(&view).map_err(SciflowError::Function)
    }

    /// Resolved command string, for shell tasks
    pub fn command(&self) -> Option<&str> {
        self.command.as_ref().map(|c| c.resolved.as_str())
    }

    /// Inputs as supplied
    pub fn inputs(&self) -> &PathMap {
        &self.inputs
    }

    /// Resolved output paths
    pub fn outputs(&self) -> &PathMap {
        &self.outputs
    }

    /// Resolved path of a single output
    pub fn output(&self, name: &str) -> Option<&str> {
        self.outputs.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &PathMap {
        &self.params
    }

    pub fn state(&self) -> TaskState {
        self.state
    }
}

impl Context {
    /// Build and run a shell task in this context
    pub fn shell(&self, command: &str, inputs: PathMap, outputs: PathMap) -> Result<Task> {
        self.run_task(
            Template::Command(command.to_string()),
            Ports::new().with_inputs(inputs).with_outputs(outputs),
        )
    }

    /// Build and run a function task in this context
    pub fn func<F>(&self, f: F, inputs: PathMap, outputs: PathMap) -> Result<Task>
    where
        F: Fn(&TaskView<'_>) -> anyhow::Result<()> + 'static,
    {
        self.run_task(
            Template::callable(f),
            Ports::new().with_inputs(inputs).with_outputs(outputs),
        )
    }

    /// Build and run any task in this context
    pub fn run_task(&self, template: Template, ports: Ports) -> Result<Task> {
        let mut task = Task::new(template, ports, self)?;
        task.execute(self)?;
        Ok(task)
    }
}

/// Build and run a shell task with the default context
pub fn shell(command: &str, inputs: PathMap, outputs: PathMap) -> Result<Task> {
    Context::default().shell(command, inputs, outputs)
}

/// Build and run a function task with the default context
pub fn func<F>(f: F, inputs: PathMap, outputs: PathMap) -> Result<Task>
where
    F: Fn(&TaskView<'_>) -> anyhow::Result<()> + 'static,
{
    Context::default().func(f, inputs, outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::paths;
    use crate::runner::Verbosity;
    use std::fs;
    use tempfile::TempDir;

    fn ctx_in(dir: &TempDir) -> Context {
        Context::new()
            .with_working_dir(dir.path().to_path_buf())
            .with_verbosity(Verbosity::Silent)
    }

    #[test]
    fn test_ports_builder() {
        let ports = Ports::new()
            .input("gz", "data/a.gz")
            .output("txt", "[i:gz|%.gz]")
            .param("level", "9");

        assert_eq!(ports.inputs, paths([("gz", "data/a.gz")]));
        assert_eq!(ports.outputs, paths([("txt", "[i:gz|%.gz]")]));
        assert_eq!(ports.params, paths([("level", "9")]));
    }

    #[test]
    fn test_new_resolves_command_and_outputs() {
        let dir = TempDir::new().unwrap();
        let task = Task::new(
            Template::Command("gzip -[p:level] -c [i:txt] > [o:gz:[i:txt].gz]".to_string()),
            Ports::new().input("txt", "a.txt").param("level", "9"),
            &ctx_in(&dir),
        )
        .unwrap();

        assert_eq!(task.command(), Some("gzip -9 -c a.txt > a.txt.gz"));
        assert_eq!(task.output("gz"), Some("a.txt.gz"));
        assert_eq!(task.state(), TaskState::Resolved);
        assert_eq!(task.params(), &paths([("level", "9")]));
    }

    #[test]
    fn test_new_fails_on_unknown_reference() {
        let dir = TempDir::new().unwrap();
        let result = Task::new(
            Template::Command("cat [i:missing]".to_string()),
            Ports::new(),
            &ctx_in(&dir),
        );
        assert!(matches!(result, Err(SciflowError::Placeholder(_))));
    }

    #[test]
    fn test_callable_outputs_are_resolved_without_command() {
        let dir = TempDir::new().unwrap();
        let task = Task::new(
            Template::callable(|_| Ok(())),
            Ports::new()
                .input("raw", "reads/s1.fq")
                .output("trimmed", "[i:raw|basename|%.fq].trimmed.fq"),
            &ctx_in(&dir),
        )
        .unwrap();

        assert_eq!(task.command(), None);
        assert_eq!(task.output("trimmed"), Some("s1.trimmed.fq"));
    }

    #[test]
    fn test_reentry_is_rejected() {
        let dir = TempDir::new().unwrap();
        let ctx = ctx_in(&dir);
        let mut task = Task::new(
            Template::Command("echo x > [o:out:x.txt]".to_string()),
            Ports::new(),
            &ctx,
        )
        .unwrap();

        assert_eq!(task.execute(&ctx).unwrap(), TaskState::Executed);
        let err = task.execute(&ctx).unwrap_err();
        assert!(matches!(
            err,
            SciflowError::Execution(ExecutionError::ReEntry(TaskState::Executed))
        ));
    }

    #[test]
    fn test_failed_command_marks_task_failed() {
        let dir = TempDir::new().unwrap();
        let ctx = ctx_in(&dir);
        let mut task = Task::new(
            Template::Command("exit 2 > [o:out:never.txt]".to_string()),
            Ports::new(),
            &ctx,
        )
        .unwrap();

        let err = task.execute(&ctx).unwrap_err();
        assert!(matches!(
            err,
            SciflowError::Execution(ExecutionError::CommandFailed { code: Some(2), .. })
        ));
        assert_eq!(task.state(), TaskState::Failed);
        assert!(!dir.path().join("never.txt").exists());
    }

    #[test]
    fn test_function_error_passes_through() {
        #[derive(Debug, thiserror::Error)]
        #[error("bad input")]
        struct BadInput;

        let dir = TempDir::new().unwrap();
        let ctx = ctx_in(&dir);
        let mut task = Task::new(
            Template::callable(|_| Err(BadInput.into())),
            Ports::new().output("out", "out.txt"),
            &ctx,
        )
        .unwrap();

        match task.execute(&ctx) {
            Err(SciflowError::Function(e)) => assert!(e.downcast_ref::<BadInput>().is_some()),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(task.state(), TaskState::Failed);
    }

    #[test]
    fn test_view_writes_temp_path_then_promoted() {
        let dir = TempDir::new().unwrap();
        let ctx = ctx_in(&dir);

        let task = ctx
            .func(
                |view| {
                    let out = view.output("out")?;
                    assert!(out.ends_with("result.txt.tmp"));
                    fs::write(out, view.param("missing").unwrap_or("default"))?;
                    Ok(())
                },
                PathMap::new(),
                paths([("out", "result.txt")]),
            )
            .unwrap();

        assert_eq!(task.state(), TaskState::Executed);
        assert_eq!(
            fs::read_to_string(dir.path().join("result.txt")).unwrap(),
            "default"
        );
    }

    #[test]
    fn test_view_without_tempfiles_uses_final_path() {
        let dir = TempDir::new().unwrap();
        let ctx = ctx_in(&dir).with_tempfiles(false);

        ctx.func(
            |view| {
                let out = view.output("out")?;
                assert!(out.ends_with("final.txt"));
                fs::write(out, "x")?;
                Ok(())
            },
            PathMap::new(),
            paths([("out", "final.txt")]),
        )
        .unwrap();

        assert!(dir.path().join("final.txt").exists());
    }

    #[test]
    fn test_state_display_and_template_debug() {
        assert_eq!(TaskState::Skipped.to_string(), "skipped");
        assert_eq!(
            format!("{:?}", Template::Command("ls".to_string())),
            "Command(\"ls\")"
        );
        assert_eq!(format!("{:?}", Template::callable(|_| Ok(()))), "Callable(..)");
    }
}
