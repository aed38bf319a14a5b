//! Generation plan resolution
//!
//! A [`GenerationPlan`] is the ordered list of everything a run will do:
//! directories, file contents, external commands, and the two small edits made
//! to files that external generators produce. It is derived from a
//! [`Configuration`] without touching the filesystem, so it can be printed,
//! checked for required tools, and tested on its own.

use crate::capability::{self, CLIENT_TYPESCRIPT_TOOLING, SERVER_TYPESCRIPT_TOOLING};
use crate::config::{
    Backend, BackendFramework, BackendLanguage, Configuration, Frontend, FrontendFramework,
    JsPackageManager, LanguageFamily, ProjectType, PyPackageManager,
};
use crate::error::ScaffoldError;
use crate::render::{self, EnvFile, Renderer};
use crate::runtime::CommandSpec;
use serde::Serialize;
use std::path::{Path, PathBuf};

const SERVER: &str = "server";
const CLIENT: &str = "client";
const ROOT: &str = ".";

const VITE_CONFIG_ANCHOR: &str = "export default defineConfig({";

/// One unit of work, executed in order by the materializer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    CreateDir {
        path: PathBuf,
    },
    WriteFile {
        path: PathBuf,
        contents: String,
    },
    Run {
        command: CommandSpec,
    },
    /// Merge top-level fields into a `package.json` created by `init`
    UpdatePackageJson {
        path: PathBuf,
        set: serde_json::Value,
    },
    /// Insert text after `anchor` in a generator-produced file
    PatchFile {
        path: PathBuf,
        anchor: String,
        insert: String,
        unless_contains: String,
    },
}

/// Interpreter settings that come from the environment rather than the answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub python: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        let python = if cfg!(windows) { "python" } else { "python3" };
        Self {
            python: python.to_string(),
        }
    }
}

impl Toolchain {
    /// `PYTHON` overrides the interpreter used for pip and Django commands
    pub fn from_env() -> Self {
        match std::env::var("PYTHON") {
            Ok(python) if !python.trim().is_empty() => Self { python },
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationPlan {
    pub project_name: String,
    pub steps: Vec<Step>,
}

impl GenerationPlan {
    /// Resolve the plan for a validated configuration
    pub fn resolve(config: &Configuration, toolchain: &Toolchain) -> Result<Self, ScaffoldError> {
        config.validate()?;
        let mut builder = PlanBuilder {
            config,
            toolchain,
            renderer: Renderer::new(config)?,
            steps: Vec::new(),
        };

        if let Some(backend) = &config.backend {
            builder.server(backend)?;
        }
        if let Some(frontend) = &config.frontend {
            builder.client(frontend);
        }
        if config.add_docker {
            builder.docker()?;
        }
        if config.init_git {
            builder.run(CommandSpec::new("git", ROOT).arg("init"));
            let gitignore = builder.renderer.gitignore()?;
            builder.file(".gitignore", gitignore);
        }

        Ok(Self {
            project_name: config.project_name.clone(),
            steps: builder.steps,
        })
    }

    pub fn directories(&self) -> impl Iterator<Item = &Path> {
        self.steps.iter().filter_map(|step| match step {
            Step::CreateDir { path } => Some(path.as_path()),
            _ => None,
        })
    }

    pub fn files(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.steps.iter().filter_map(|step| match step {
            Step::WriteFile { path, contents } => Some((path.as_path(), contents.as_str())),
            _ => None,
        })
    }

    /// Contents of a planned file, by path relative to the project root
    pub fn file(&self, path: impl AsRef<Path>) -> Option<&str> {
        let path = path.as_ref();
        self.files().find(|(p, _)| *p == path).map(|(_, c)| c)
    }

    pub fn commands(&self) -> impl Iterator<Item = &CommandSpec> {
        self.steps.iter().filter_map(|step| match step {
            Step::Run { command } => Some(command),
            _ => None,
        })
    }

    /// Distinct programs the plan invokes, in first-use order
    pub fn required_tools(&self) -> Vec<String> {
        let mut tools: Vec<String> = Vec::new();
        for command in self.commands() {
            if !tools.contains(&command.program) {
                tools.push(command.program.clone());
            }
        }
        tools
    }

    pub fn to_yaml(&self) -> Result<String, ScaffoldError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

struct PlanBuilder<'a> {
    config: &'a Configuration,
    toolchain: &'a Toolchain,
    renderer: Renderer<'a>,
    steps: Vec<Step>,
}

impl PlanBuilder<'_> {
    fn dir(&mut self, path: impl AsRef<Path>) {
        self.steps.push(Step::CreateDir {
            path: path.as_ref().to_path_buf(),
        });
    }

    fn dirs(&mut self, base: &str, paths: &[&str]) {
        for path in paths {
            self.dir(Path::new(base).join(path));
        }
    }

    fn file(&mut self, path: impl AsRef<Path>, contents: impl Into<String>) {
        self.steps.push(Step::WriteFile {
            path: path.as_ref().to_path_buf(),
            contents: contents.into(),
        });
    }

    fn run(&mut self, command: CommandSpec) {
        self.steps.push(Step::Run { command });
    }

    /// Extras go to the server when there is one, otherwise to the client
    fn extras_for_server(&self) -> bool {
        self.config.has_backend()
    }

    fn js_pm(&self) -> JsPackageManager {
        // validate() guarantees a JS package manager wherever one is needed
        self.config
            .js_package_manager
            .unwrap_or(JsPackageManager::Npm)
    }

    // ---- server ----

    fn server(&mut self, backend: &Backend) -> Result<(), ScaffoldError> {
        let packages = capability::server_packages(backend.framework);
        let mut required = owned_list(packages.required);
        if let Some(database) = backend.database {
            required.extend(owned_list(capability::database_drivers(
                database,
                backend.framework.family(),
            )));
        }
        if self.extras_for_server() {
            required.extend(self.config.additional_deps.iter().cloned());
        }

        let mut dev = owned_list(packages.dev);
        let node = backend.framework.family() == LanguageFamily::Node;
        if node && self.config.server_uses_typescript() {
            dev.extend(owned_list(SERVER_TYPESCRIPT_TOOLING));
        }

        let env = EnvFile::for_backend(self.config, backend).render();

        match backend.framework {
            BackendFramework::Express => self.express(env, required, dev)?,
            BackendFramework::Nest => self.nest(backend.language, env, required, dev),
            BackendFramework::FastApi => self.fastapi(env, required, dev)?,
            BackendFramework::Django => self.django(env, required, dev),
            BackendFramework::Flask => self.flask(env, required, dev)?,
        }
        Ok(())
    }

    fn express(
        &mut self,
        env: String,
        required: Vec<String>,
        dev: Vec<String>,
    ) -> Result<(), ScaffoldError> {
        let typescript = self.config.server_uses_typescript();
        let ext = if typescript { "ts" } else { "js" };
        let pm = self.js_pm();

        self.dirs(
            SERVER,
            &[
                "src/config",
                "src/models",
                "src/controllers",
                "src/routes",
                "src/middleware",
                "src/utils",
            ],
        );
        if typescript {
            self.dir(Path::new(SERVER).join("src/types"));
        }

        let app = self.renderer.express_app()?;
        self.file(Path::new(SERVER).join(format!("src/app.{}", ext)), app);
        self.file(Path::new(SERVER).join(".env"), env);
        if typescript {
            let tsconfig = self.renderer.express_tsconfig()?;
            self.file(Path::new(SERVER).join("tsconfig.json"), tsconfig);
        }

        self.run(js_init(pm, SERVER));
        self.run(js_add(pm, SERVER, &required, false));
        self.run(js_add(pm, SERVER, &dev, true));
        self.steps.push(Step::UpdatePackageJson {
            path: Path::new(SERVER).join("package.json"),
            set: render::express_package_fields(typescript),
        });
        Ok(())
    }

    fn nest(
        &mut self,
        language: BackendLanguage,
        env: String,
        required: Vec<String>,
        dev: Vec<String>,
    ) {
        let pm = self.js_pm();

        let mut generate = CommandSpec::new("npx", ROOT).args([
            "--yes",
            "@nestjs/cli@latest",
            "new",
            SERVER,
            "--skip-install",
            "--skip-git",
            "--package-manager",
            pm.program(),
        ]);
        if language == BackendLanguage::JavaScript {
            generate = generate.args(["--language", "js"]);
        }
        self.run(generate);

        self.dirs(SERVER, &["src/modules", "src/common", "src/config"]);
        self.file(Path::new(SERVER).join(".env"), env);

        self.run(CommandSpec::new(pm.program(), SERVER).arg("install"));
        self.run(js_add(pm, SERVER, &required, false));
        self.run(js_add(pm, SERVER, &dev, true));
    }

    fn fastapi(
        &mut self,
        env: String,
        required: Vec<String>,
        dev: Vec<String>,
    ) -> Result<(), ScaffoldError> {
        let packages = [
            "app/routers",
            "app/models",
            "app/schemas",
            "app/services",
            "app/utils",
        ];
        self.dirs(SERVER, &packages);
        self.dir(Path::new(SERVER).join("tests"));

        let main = self.renderer.fastapi_main()?;
        self.file(Path::new(SERVER).join("app/main.py"), main);
        self.file(Path::new(SERVER).join("app/__init__.py"), "");
        for package in packages {
            self.file(Path::new(SERVER).join(package).join("__init__.py"), "");
        }
        if self.config.database().is_some() {
            let db = self.renderer.fastapi_db()?;
            self.file(Path::new(SERVER).join("app/db.py"), db);
        }
        self.file(Path::new(SERVER).join(".env"), env);
        self.file(
            Path::new(SERVER).join("requirements.txt"),
            render::requirements_txt(&required),
        );

        self.python_install(required, dev);
        Ok(())
    }

    fn django(&mut self, env: String, required: Vec<String>, dev: Vec<String>) {
        self.dirs(SERVER, &["static", "templates"]);
        self.file(Path::new(SERVER).join(".env"), env);
        self.file(
            Path::new(SERVER).join("requirements.txt"),
            render::requirements_txt(&required),
        );

        self.python_install(required, dev);

        // Django's own generators need django installed first
        let module = self.config.module_name();
        self.run(self.python(["-m", "django", "startproject", module.as_str(), "."]));
        self.run(self.python(["manage.py", "startapp", "api"]));
        self.run(self.python(["manage.py", "migrate"]));
    }

    fn flask(
        &mut self,
        env: String,
        required: Vec<String>,
        dev: Vec<String>,
    ) -> Result<(), ScaffoldError> {
        self.dirs(
            SERVER,
            &[
                "app",
                "app/routes",
                "app/models",
                "app/templates",
                "app/static",
                "tests",
            ],
        );

        let init = self.renderer.flask_init()?;
        let routes = self.renderer.flask_routes()?;
        let wsgi = self.renderer.flask_wsgi()?;
        self.file(Path::new(SERVER).join("app/__init__.py"), init);
        self.file(Path::new(SERVER).join("app/routes/__init__.py"), "");
        self.file(Path::new(SERVER).join("app/routes/main_routes.py"), routes);
        self.file(Path::new(SERVER).join("wsgi.py"), wsgi);
        self.file(Path::new(SERVER).join(".env"), env);
        self.file(
            Path::new(SERVER).join("requirements.txt"),
            render::requirements_txt(&required),
        );

        self.python_install(required, dev);
        Ok(())
    }

    fn py_pm(&self) -> PyPackageManager {
        self.config.py_package_manager.unwrap_or(PyPackageManager::Pip)
    }

    /// Python command run inside the project's environment
    fn python<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let interpreter = match self.py_pm() {
            PyPackageManager::Pip => CommandSpec::new(self.toolchain.python.as_str(), SERVER),
            PyPackageManager::Poetry => CommandSpec::new("poetry", SERVER).args(["run", "python"]),
            PyPackageManager::Conda => CommandSpec::new("conda", SERVER).args([
                "run",
                "-n",
                self.config.project_name.as_str(),
                "python",
            ]),
        };
        interpreter.args(args)
    }

    fn python_install(&mut self, required: Vec<String>, dev: Vec<String>) {
        match self.py_pm() {
            PyPackageManager::Pip => {
                self.run(
                    self.python(["-m", "pip", "install"])
                        .args(required)
                        .args(dev),
                );
            }
            PyPackageManager::Poetry => {
                self.run(CommandSpec::new("poetry", SERVER).args([
                    "init",
                    "--no-interaction",
                    "--name",
                    self.config.module_name().as_str(),
                ]));
                self.run(CommandSpec::new("poetry", SERVER).arg("add").args(required));
                self.run(
                    CommandSpec::new("poetry", SERVER)
                        .args(["add", "--group", "dev"])
                        .args(dev),
                );
            }
            PyPackageManager::Conda => {
                self.run(CommandSpec::new("conda", SERVER).args([
                    "create",
                    "--name",
                    self.config.project_name.as_str(),
                    "python=3.11",
                    "-y",
                ]));
                self.run(
                    self.python(["-m", "pip", "install"])
                        .args(required)
                        .args(dev),
                );
            }
        }
    }

    // ---- client ----

    fn client(&mut self, frontend: &Frontend) {
        let pm = self.js_pm();
        let framework = frontend.framework;
        let typescript = self.config.typescript;

        match framework.vite_template() {
            Some(template) => {
                let template = if typescript {
                    format!("{}-ts", template)
                } else {
                    template.to_string()
                };
                self.run(vite_create(pm, &template));
            }
            None => {
                self.run(CommandSpec::new("npx", ROOT).args([
                    "--yes",
                    "@angular/cli@latest",
                    "new",
                    CLIENT,
                    "--skip-install",
                    "--skip-git",
                    "--routing",
                    "--style=scss",
                    "--ssr=false",
                    "--package-manager",
                    pm.program(),
                ]));
            }
        }

        let mut required = owned_list(capability::client_packages(framework));
        if let Some(styling) = frontend.styling {
            required.extend(owned_list(
                capability::styling_packages(framework, styling).unwrap_or_default(),
            ));
        }
        if let Some(state) = frontend.state {
            required.extend(owned_list(
                capability::state_packages(framework, state).unwrap_or_default(),
            ));
        }
        if !self.extras_for_server() {
            required.extend(self.config.additional_deps.iter().cloned());
        }
        self.run(js_add(pm, CLIENT, &required, false));
        if typescript {
            self.run(js_add(pm, CLIENT, &owned_list(CLIENT_TYPESCRIPT_TOOLING), true));
        }

        self.client_dirs(frontend);

        if self.config.project_type == ProjectType::FullStack && framework.vite_template().is_some()
        {
            let port = self
                .config
                .backend
                .as_ref()
                .map(|b| b.framework.port())
                .unwrap_or(5000);
            let ext = if typescript { "ts" } else { "js" };
            self.steps.push(Step::PatchFile {
                path: Path::new(CLIENT).join(format!("vite.config.{}", ext)),
                anchor: VITE_CONFIG_ANCHOR.to_string(),
                insert: format!(
                    "\n  server: {{\n    proxy: {{\n      '/api': 'http://localhost:{}'\n    }}\n  }},",
                    port
                ),
                unless_contains: "server: {".to_string(),
            });
        }
    }

    fn client_dirs(&mut self, frontend: &Frontend) {
        let store = frontend.state.is_some_and(|s| s.needs_store_dir());
        match frontend.framework {
            FrontendFramework::React => {
                self.dirs(
                    CLIENT,
                    &[
                        "src/components",
                        "src/pages",
                        "src/hooks",
                        "src/utils",
                        "src/assets/styles",
                        "src/assets/images",
                    ],
                );
                if self.config.typescript {
                    self.dir(Path::new(CLIENT).join("src/types"));
                }
                if store {
                    self.dir(Path::new(CLIENT).join("src/store"));
                }
            }
            FrontendFramework::Vue => {
                self.dirs(
                    CLIENT,
                    &[
                        "src/components",
                        "src/views",
                        "src/composables",
                        "src/utils",
                        "src/assets/styles",
                        "src/assets/images",
                    ],
                );
                if store {
                    self.dir(Path::new(CLIENT).join("src/store"));
                }
            }
            FrontendFramework::Svelte => {
                self.dirs(
                    CLIENT,
                    &["src/components", "src/routes", "src/lib", "src/assets"],
                );
            }
            FrontendFramework::Angular => {
                self.dirs(
                    CLIENT,
                    &[
                        "src/app/components",
                        "src/app/pages",
                        "src/app/services",
                        "src/app/shared",
                    ],
                );
                if store {
                    self.dir(Path::new(CLIENT).join("src/app/store"));
                }
            }
        }
    }

    // ---- docker ----

    fn docker(&mut self) -> Result<(), ScaffoldError> {
        let dockerfile = self.renderer.dockerfile()?;
        self.file("Dockerfile", dockerfile);

        if self.config.has_frontend() {
            let nginx = self.renderer.nginx_conf()?;
            self.file("nginx.conf", nginx);
        }

        let full_stack = self.config.project_type == ProjectType::FullStack;
        if self.config.database().is_some() || full_stack {
            let compose = self.renderer.docker_compose()?;
            self.file("docker-compose.yml", compose);
        }
        Ok(())
    }
}

fn owned_list(packages: &[&str]) -> Vec<String> {
    packages.iter().map(|p| p.to_string()).collect()
}

fn js_init(pm: JsPackageManager, cwd: &str) -> CommandSpec {
    match pm {
        JsPackageManager::Npm | JsPackageManager::Yarn => {
            CommandSpec::new(pm.program(), cwd).args(["init", "-y"])
        }
        JsPackageManager::Pnpm => CommandSpec::new(pm.program(), cwd).arg("init"),
    }
}

fn js_add(pm: JsPackageManager, cwd: &str, packages: &[String], dev: bool) -> CommandSpec {
    let verb = match pm {
        JsPackageManager::Npm => "install",
        JsPackageManager::Yarn | JsPackageManager::Pnpm => "add",
    };
    let mut command = CommandSpec::new(pm.program(), cwd).arg(verb);
    if dev {
        command = command.arg("-D");
    }
    command.args(packages.iter().cloned())
}

fn vite_create(pm: JsPackageManager, template: &str) -> CommandSpec {
    let command = CommandSpec::new(pm.program(), ROOT).arg("create");
    match pm {
        // npm forwards flags to the initializer only after `--`
        JsPackageManager::Npm => {
            command.args(["vite@latest", CLIENT, "--", "--template", template])
        }
        JsPackageManager::Yarn | JsPackageManager::Pnpm => {
            command.args(["vite", CLIENT, "--template", template])
        }
    }
}

/// Commands the user runs after the project is created
pub fn next_steps(config: &Configuration) -> Vec<String> {
    let mut steps = vec![format!("cd {}", config.project_name)];

    if let Some(backend) = &config.backend {
        let pm = config.js_package_manager.unwrap_or(JsPackageManager::Npm);
        let run_python = |args: &str| match config.py_package_manager {
            Some(PyPackageManager::Poetry) => format!("poetry run {}", args),
            Some(PyPackageManager::Conda) => {
                format!("conda activate {} && {}", config.project_name, args)
            }
            _ => args.to_string(),
        };
        let server = match backend.framework {
            BackendFramework::Express => pm.run_script("dev"),
            BackendFramework::Nest => pm.run_script("start:dev"),
            BackendFramework::FastApi => run_python("uvicorn app.main:app --reload"),
            BackendFramework::Django => run_python("python manage.py runserver"),
            BackendFramework::Flask => run_python("python wsgi.py"),
        };
        steps.push(format!("cd server && {}", server));
    }

    if let Some(frontend) = &config.frontend {
        let pm = config.js_package_manager.unwrap_or(JsPackageManager::Npm);
        let script = match frontend.framework {
            FrontendFramework::Angular => pm.run_script("start"),
            _ => pm.run_script("dev"),
        };
        steps.push(format!("cd client && {}", script));
    }

    if config.add_docker {
        if config.database().is_some() || config.project_type == ProjectType::FullStack {
            steps.push("docker compose up --build".to_string());
        } else {
            // image references must be lowercase
            let tag = config.project_name.to_lowercase();
            steps.push(format!("docker build -t {} .", tag));
        }
    }

    steps
}
