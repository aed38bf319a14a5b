//! Runner that spawns real child processes
//!
//! Children run one at a time with stdin closed so generators never wait on a
//! prompt. Their output is streamed to the terminal and kept so a failure can
//! be reported with what the tool said.

use super::{check, resolve_program, CommandRunner, CommandSpec};
use crate::error::ScaffoldError;
use colored::Colorize;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;

/// Lines of captured output attached to a `CommandFailed` error
const FAILURE_TAIL_LINES: usize = 20;

#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn probe(&self, program: &str) -> Option<String> {
        check::probe_version(program)
    }

    async fn run(&mut self, spec: &CommandSpec, cwd: &Path) -> Result<(), ScaffoldError> {
        println!("{} {}", "Running:".dimmed(), spec.to_string().yellow());

        let spawn_failed = |e: std::io::Error| ScaffoldError::CommandFailed {
            command: spec.to_string(),
            code: None,
            output: e.to_string(),
        };

        let mut child = TokioCommand::new(resolve_program(&spec.program))
            .args(&spec.args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_failed)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_failed(std::io::Error::other("stdout not captured")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| spawn_failed(std::io::Error::other("stderr not captured")))?;

        let mut stdout_reader = BufReader::new(stdout).lines();
        let mut stderr_reader = BufReader::new(stderr).lines();
        let mut stdout_open = true;
        let mut stderr_open = true;
        let mut captured: Vec<String> = Vec::new();

        while stdout_open || stderr_open {
            tokio::select! {
                line = stdout_reader.next_line(), if stdout_open => {
                    match line {
                        Ok(Some(line)) => {
                            println!("  {}", line);
                            captured.push(line);
                        }
                        Ok(None) => stdout_open = false,
                        Err(e) => {
                            eprintln!("{} {}", "Error reading stdout:".red(), e);
                            stdout_open = false;
                        }
                    }
                }
                line = stderr_reader.next_line(), if stderr_open => {
                    match line {
                        Ok(Some(line)) => {
                            eprintln!("  {}", line.yellow());
                            captured.push(line);
                        }
                        Ok(None) => stderr_open = false,
                        Err(e) => {
                            eprintln!("{} {}", "Error reading stderr:".red(), e);
                            stderr_open = false;
                        }
                    }
                }
            }
        }

        let status = child.wait().await.map_err(spawn_failed)?;
        if status.success() {
            Ok(())
        } else {
            Err(ScaffoldError::CommandFailed {
                command: spec.to_string(),
                code: status.code(),
                output: tail(&captured, FAILURE_TAIL_LINES),
            })
        }
    }
}

fn tail(lines: &[String], n: usize) -> String {
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}
