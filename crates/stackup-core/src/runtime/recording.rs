//! Runner that records invocations instead of spawning processes

use super::{CommandRunner, CommandSpec};
use crate::error::ScaffoldError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct RecordingRunner {
    /// Every spec passed to `run`, with the resolved working directory
    pub invocations: Vec<(CommandSpec, PathBuf)>,
    tools: HashMap<String, String>,
    fail_on: Option<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `probe(program)` report `version`
    pub fn with_tool(mut self, program: &str, version: &str) -> Self {
        self.tools.insert(program.to_string(), version.to_string());
        self
    }

    /// Fail the first command whose rendered form contains `needle`
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    /// Rendered command lines in invocation order
    pub fn command_lines(&self) -> Vec<String> {
        self.invocations
            .iter()
            .map(|(spec, _)| spec.to_string())
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn probe(&self, program: &str) -> Option<String> {
        self.tools.get(program).cloned()
    }

    async fn run(&mut self, spec: &CommandSpec, cwd: &Path) -> Result<(), ScaffoldError> {
        self.invocations.push((spec.clone(), cwd.to_path_buf()));

        let line = spec.to_string();
        match &self.fail_on {
            Some(needle) if line.contains(needle.as_str()) => Err(ScaffoldError::CommandFailed {
                command: line,
                code: Some(1),
                output: "simulated failure".to_string(),
            }),
            _ => Ok(()),
        }
    }
}
