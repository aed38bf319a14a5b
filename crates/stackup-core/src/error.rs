//! Error taxonomy for a scaffolding run
//!
//! Every variant is terminal: the run stops and nothing is retried or rolled back.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScaffoldError {
    /// The project directory is already there; nothing was written.
    #[error("Directory {} already exists!", .0.display())]
    DirectoryExists(PathBuf),

    /// One or more external tools are not on PATH.
    #[error("Missing required tools:\n{}", bullet_list(.0))]
    MissingTools(Vec<String>),

    /// An external command could not be started or exited unsuccessfully.
    #[error("Error running command: {command} ({})", exit_description(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        output: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Setup cancelled.")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("Failed to render template: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Failed to update package.json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse answers: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ScaffoldError {
    /// Captured child output, if this error carries any
    pub fn output(&self) -> Option<&str> {
        match self {
            ScaffoldError::CommandFailed { output, .. } if !output.is_empty() => Some(output),
            _ => None,
        }
    }
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|m| format!("  - {}", m))
        .collect::<Vec<_>>()
        .join("\n")
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code".to_string(),
    }
}
