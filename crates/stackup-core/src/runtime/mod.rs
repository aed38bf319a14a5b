//! External tool invocation
//!
//! This module provides:
//! - `CommandSpec`, the description of one external process invocation
//! - The `CommandRunner` capability every invocation goes through
//! - Tool preflight checks (`check`)
//! - A process-spawning runner (`system`) and a recording runner (`recording`)

pub mod check;
pub mod recording;
pub mod system;

use crate::error::ScaffoldError;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub use check::{preflight, ToolInfo};
pub use recording::RecordingRunner;
pub use system::SystemRunner;

/// One external process invocation: program, arguments, and working directory
/// relative to the project root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// The single way the scaffolder touches external tools.
///
/// `run` must return an error for any non-zero exit; callers stop at the first one.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Return the tool's version output, or `None` if it cannot be run
    fn probe(&self, program: &str) -> Option<String>;

    /// Run `spec` in `cwd` (already resolved against the project root)
    async fn run(&mut self, spec: &CommandSpec, cwd: &Path) -> Result<(), ScaffoldError>;
}

/// Program name to hand to the OS; Node tools are `.cmd` shims on Windows
pub fn resolve_program(program: &str) -> String {
    if cfg!(windows) && matches!(program, "npm" | "npx" | "yarn" | "pnpm") {
        format!("{}.cmd", program)
    } else {
        program.to_string()
    }
}
