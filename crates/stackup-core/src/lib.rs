//! stackup core: project scaffolding engine
//!
//! Turns a set of stack choices into a new application skeleton.
//!
//! # Architecture
//!
//! - **Choices**: [`config::Configuration`], a closed-enum record of every answer
//! - **Capability table**: [`capability`], static package lists per choice
//! - **Planning**: [`plan::GenerationPlan`], the ordered directories, files and
//!   external commands derived from a configuration
//! - **Execution**: [`materialize`] runs a plan through a [`runtime::CommandRunner`]
//! - **Prompts**: the optional cliclack flow in [`tui`] (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use stackup_core::{Configuration, GenerationPlan, Toolchain, runtime};
//!
//! let config = Configuration::from_yaml(&std::fs::read_to_string("answers.yaml")?)?;
//! let plan = GenerationPlan::resolve(&config, &Toolchain::from_env())?;
//! let mut runner = runtime::SystemRunner::new();
//! runtime::preflight(&runner, &plan.required_tools())?;
//! stackup_core::materialize(&plan, Path::new("."), &mut runner).await?;
//! ```

pub mod capability;
pub mod config;
pub mod error;
pub mod materialize;
pub mod plan;
pub mod render;
pub mod runtime;

#[cfg(feature = "tui")]
pub mod tui;

pub use config::Configuration;
pub use error::ScaffoldError;
pub use materialize::materialize;
pub use plan::{GenerationPlan, Step, Toolchain};
pub use runtime::{preflight, CommandRunner, CommandSpec};

#[cfg(feature = "tui")]
pub use tui::run;
