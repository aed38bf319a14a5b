//! stackup - interactive full-stack project scaffolder

use clap::Parser;
use stackup_core::tui::CreateArgs;
use stackup_core::ScaffoldError;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "stackup")]
#[command(about = "Scaffold a full-stack, backend-only or frontend-only project")]
#[command(version)]
pub struct Args {
    /// YAML file with pre-filled answers; skips the prompts
    #[arg(long, value_name = "FILE")]
    pub answers: Option<PathBuf>,

    /// Print the generation plan and check tools without writing anything
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Directory to create the project in (defaults to the current directory)
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

impl From<Args> for CreateArgs {
    fn from(args: Args) -> Self {
        CreateArgs {
            answers: args.answers,
            dry_run: args.dry_run,
            directory: args.directory,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    let result = stackup_core::run(args.into()).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(error: &anyhow::Error) {
    match error.downcast_ref::<ScaffoldError>() {
        Some(ScaffoldError::Cancelled) => {
            let _ = cliclack::outro_cancel("Setup cancelled.");
        }
        scaffold_error => {
            let _ = cliclack::log::error(format!("{:#}", error));
            if let Some(output) = scaffold_error.and_then(|e| e.output()) {
                let _ = cliclack::log::remark(output);
            }
            let _ = cliclack::outro_cancel("Setup failed");
        }
    }
}
