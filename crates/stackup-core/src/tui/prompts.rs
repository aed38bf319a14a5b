//! Charm-style CLI prompts using cliclack

use crate::capability;
use crate::config::{
    validate_project_name, Backend, BackendLanguage, Configuration, Database, Frontend,
    FrontendFramework, JsPackageManager, LanguageFamily, ProjectType, PyPackageManager,
};
use crate::error::ScaffoldError;
use crate::materialize::materialize;
use crate::plan::{self, GenerationPlan, Toolchain};
use crate::runtime::{check, preflight, SystemRunner};
use anyhow::{Context, Result};
use std::fmt::Display;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// CLI arguments for a scaffolding run
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// YAML answers file used instead of the prompts
    pub answers: Option<PathBuf>,

    /// Print the plan and check tools without writing anything
    pub dry_run: bool,

    /// Parent directory for the new project
    pub directory: Option<PathBuf>,
}

/// Prompt results: Esc or Ctrl+C at a prompt cancels the whole run
trait Answered<T> {
    fn answered(self) -> Result<T>;
}

impl<T> Answered<T> for std::io::Result<T> {
    fn answered(self) -> Result<T> {
        self.map_err(|e| match e.kind() {
            ErrorKind::Interrupted => ScaffoldError::Cancelled.into(),
            _ => e.into(),
        })
    }
}

/// Run the scaffolder with interactive prompts (or an answers file)
pub async fn run(args: CreateArgs) -> Result<()> {
    cliclack::intro("stackup")?;

    // Step 1: Choices
    let config = match &args.answers {
        Some(path) => load_answers(path)?,
        None => collect_configuration()?,
    };

    // Step 2: Where the project goes
    let parent = select_parent(&args)?;
    let root = parent.join(&config.project_name);

    // Step 3: Plan
    let plan = GenerationPlan::resolve(&config, &Toolchain::from_env())?;

    if args.dry_run {
        println!("{}", plan.to_yaml()?);
        if root.exists() {
            cliclack::log::warning(format!("{} already exists", root.display()))?;
        }
        check_tools(&plan, true)?;
        cliclack::outro("Dry run: nothing was written")?;
        return Ok(());
    }

    if root.exists() {
        return Err(ScaffoldError::DirectoryExists(root).into());
    }

    // Step 4: Every tool is checked before the root is created
    check_tools(&plan, false)?;

    // Step 5: Create project
    cliclack::log::step(format!("Creating {} in {}", config.project_name, parent.display()))?;
    let mut runner = SystemRunner::new();
    let root = materialize(&plan, &parent, &mut runner).await?;
    cliclack::log::success(format!("Project created at {}", root.display()))?;

    // Step 6: Show next steps
    print_next_steps(&config)?;

    Ok(())
}

fn load_answers(path: &Path) -> Result<Configuration> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read answers file: {}", path.display()))?;
    let config = Configuration::from_yaml(&content)
        .with_context(|| format!("Invalid answers file: {}", path.display()))?;
    cliclack::log::info(format!("Using answers from {}", path.display()))?;
    Ok(config)
}

fn select_parent(args: &CreateArgs) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let parent = match &args.directory {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => current_dir.join(dir),
        None => current_dir,
    };

    if !parent.is_dir() {
        anyhow::bail!("Parent directory does not exist: {}", parent.display());
    }

    Ok(parent)
}

/// Gather every answer through sequential prompts
pub fn collect_configuration() -> Result<Configuration> {
    let project_name: String = cliclack::input("Project name")
        .placeholder("my-app")
        .default_input("my-app")
        .validate(|input: &String| validate_project_name(input.trim()))
        .interact()
        .answered()?;
    let project_name = project_name.trim().to_string();

    let project_type = choose("Project type", &ProjectType::ALL)?;

    let backend = if project_type.includes_backend() {
        Some(select_backend()?)
    } else {
        None
    };

    let frontend = if project_type.includes_frontend() {
        Some(select_frontend()?)
    } else {
        None
    };

    let typescript = match (&backend, &frontend) {
        (Some(b), _) if b.language == BackendLanguage::TypeScript => true,
        (_, Some(_)) => cliclack::confirm("Use TypeScript for the frontend?")
            .initial_value(true)
            .interact()
            .answered()?,
        _ => false,
    };

    let needs_js = frontend.is_some()
        || backend
            .as_ref()
            .is_some_and(|b| b.language.family() == LanguageFamily::Node);
    let js_package_manager = if needs_js {
        Some(choose("JavaScript package manager", &JsPackageManager::ALL)?)
    } else {
        None
    };

    let needs_py = backend
        .as_ref()
        .is_some_and(|b| b.language.family() == LanguageFamily::Python);
    let py_package_manager = if needs_py {
        Some(select_python_package_manager()?)
    } else {
        None
    };

    let additional_deps = select_extras()?;

    let init_git = cliclack::confirm("Initialize a git repository?")
        .initial_value(true)
        .interact()
        .answered()?;
    let add_docker = cliclack::confirm("Add Docker configuration?")
        .initial_value(false)
        .interact()
        .answered()?;

    let config = Configuration {
        project_name,
        project_type,
        backend,
        frontend,
        typescript,
        js_package_manager,
        py_package_manager,
        additional_deps,
        init_git,
        add_docker,
    };
    config.validate()?;

    cliclack::note("Summary", summary(&config))?;
    let proceed = cliclack::confirm("Create this project?")
        .initial_value(true)
        .interact()
        .answered()?;
    if !proceed {
        return Err(ScaffoldError::Cancelled.into());
    }

    Ok(config)
}

fn select_backend() -> Result<Backend> {
    let language = choose("Backend language", &BackendLanguage::ALL)?;
    let framework = choose("Backend framework", language.frameworks())?;
    let database = choose_optional("Database", &Database::ALL)?;
    Ok(Backend {
        language,
        framework,
        database,
    })
}

fn select_frontend() -> Result<Frontend> {
    let framework: FrontendFramework = choose("Frontend framework", &FrontendFramework::ALL)?;
    let styling = choose_optional("Styling", capability::styling_options(framework))?;
    let state = choose_optional("State management", capability::state_options(framework))?;
    Ok(Frontend {
        framework,
        styling,
        state,
    })
}

/// Poetry, then conda, is offered only when found on PATH
fn select_python_package_manager() -> Result<PyPackageManager> {
    for (program, manager) in [
        ("poetry", PyPackageManager::Poetry),
        ("conda", PyPackageManager::Conda),
    ] {
        if let Some(version) = check::probe_version(program) {
            let use_it = cliclack::confirm(format!("{} detected ({}). Use it?", program, version))
                .initial_value(true)
                .interact()
                .answered()?;
            if use_it {
                return Ok(manager);
            }
        }
    }
    cliclack::log::info("Using pip")?;
    Ok(PyPackageManager::Pip)
}

fn select_extras() -> Result<Vec<String>> {
    let wants_extras = cliclack::confirm("Add additional dependencies?")
        .initial_value(false)
        .interact()
        .answered()?;
    if !wants_extras {
        return Ok(Vec::new());
    }

    let input: String = cliclack::input("Packages (space-separated)")
        .placeholder("lodash dayjs")
        .required(false)
        .interact()
        .answered()?;
    Ok(input.split_whitespace().map(String::from).collect())
}

fn choose<T>(prompt: &str, options: &[T]) -> Result<T>
where
    T: Clone + Eq + Display,
{
    let mut select = cliclack::select(prompt);
    for option in options {
        select = select.item(option.clone(), option, "");
    }
    select.interact().answered()
}

/// Like `choose`, with a trailing "None" entry
fn choose_optional<T>(prompt: &str, options: &[T]) -> Result<Option<T>>
where
    T: Clone + Eq + Display,
{
    let mut select = cliclack::select(prompt);
    for option in options {
        select = select.item(Some(option.clone()), option, "");
    }
    select = select.item(None, "None", "");
    select.interact().answered()
}

fn summary(config: &Configuration) -> String {
    let mut lines = vec![
        format!("Name:       {}", config.project_name),
        format!("Type:       {}", config.project_type),
    ];
    if let Some(backend) = &config.backend {
        lines.push(format!(
            "Backend:    {} ({})",
            backend.framework, backend.language
        ));
        lines.push(format!("Database:   {}", display_or_none(backend.database)));
    }
    if let Some(frontend) = &config.frontend {
        lines.push(format!("Frontend:   {}", frontend.framework));
        lines.push(format!("Styling:    {}", display_or_none(frontend.styling)));
        lines.push(format!("State:      {}", display_or_none(frontend.state)));
        lines.push(format!("TypeScript: {}", yes_no(config.typescript)));
    }
    if let Some(pm) = config.js_package_manager {
        lines.push(format!("JS deps:    {}", pm));
    }
    if let Some(pm) = config.py_package_manager {
        lines.push(format!("Py deps:    {}", pm));
    }
    if !config.additional_deps.is_empty() {
        lines.push(format!("Extras:     {}", config.additional_deps.join(" ")));
    }
    lines.push(format!("Git:        {}", yes_no(config.init_git)));
    lines.push(format!("Docker:     {}", yes_no(config.add_docker)));
    lines.join("\n")
}

fn display_or_none<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "None".to_string(), |v| v.to_string())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Probe every tool the plan invokes; in dry-run mode missing tools only warn
fn check_tools(plan: &GenerationPlan, advisory: bool) -> Result<()> {
    let tools = plan.required_tools();
    if tools.is_empty() {
        return Ok(());
    }

    let spinner = cliclack::spinner();
    spinner.start("Checking tools...");

    match preflight(&SystemRunner::new(), &tools) {
        Ok(found) => {
            let info: Vec<String> = found
                .iter()
                .map(|t| {
                    let version = t.version.as_deref().unwrap_or("unknown");
                    let first_line = version.lines().next().unwrap_or(version);
                    format!("{} ({})", t.name, first_line)
                })
                .collect();
            spinner.stop(format!("Detected tools: {}", info.join(", ")));
            Ok(())
        }
        Err(e) if advisory => {
            spinner.stop("Missing tools");
            cliclack::log::warning(format!("{}", e))?;
            Ok(())
        }
        Err(e) => {
            spinner.stop("Missing tools");
            Err(e.into())
        }
    }
}

fn print_next_steps(config: &Configuration) -> Result<()> {
    let steps = plan::next_steps(config);

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    cliclack::outro("Happy coding!")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendFramework, StateLibrary, Styling};

    #[test]
    fn test_interrupted_prompt_is_cancel() {
        let result: std::io::Result<()> = Err(std::io::Error::from(ErrorKind::Interrupted));
        let err = result.answered().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScaffoldError>(),
            Some(ScaffoldError::Cancelled)
        ));
    }

    #[test]
    fn test_other_prompt_errors_pass_through() {
        let result: std::io::Result<()> = Err(std::io::Error::from(ErrorKind::BrokenPipe));
        let err = result.answered().unwrap_err();
        assert!(err.downcast_ref::<ScaffoldError>().is_none());
    }

    #[test]
    fn test_summary_lists_choices() {
        let config = Configuration {
            project_name: "shop".to_string(),
            project_type: ProjectType::FullStack,
            backend: Some(Backend {
                language: BackendLanguage::Python,
                framework: BackendFramework::Django,
                database: None,
            }),
            frontend: Some(Frontend {
                framework: FrontendFramework::Vue,
                styling: Some(Styling::Vuetify),
                state: Some(StateLibrary::Pinia),
            }),
            typescript: false,
            js_package_manager: Some(JsPackageManager::Pnpm),
            py_package_manager: Some(PyPackageManager::Poetry),
            additional_deps: vec!["requests".to_string()],
            init_git: true,
            add_docker: false,
        };

        let text = summary(&config);
        assert!(text.contains("Name:       shop"));
        assert!(text.contains("Database:   None"));
        assert!(text.contains("Extras:     requests"));
        assert!(text.contains("Py deps:    poetry"));
        assert!(text.contains("Docker:     no"));
    }

    #[test]
    fn test_select_parent_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let args = CreateArgs {
            directory: Some(dir.path().join("missing")),
            ..Default::default()
        };
        assert!(select_parent(&args).is_err());

        let args = CreateArgs {
            directory: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(select_parent(&args).unwrap(), dir.path());
    }
}
