//! File contents for the generated project
//!
//! Templates are embedded at compile time and rendered with minijinja. The
//! `.env` file is assembled in code (see [`env`]) because its key set is part
//! of the contract tests check.

pub mod env;

use crate::config::{BackendFramework, Configuration, FrontendFramework, LanguageFamily};
use crate::error::ScaffoldError;
use minijinja::{context, AutoEscape, Environment, UndefinedBehavior, Value};

pub use env::EnvFile;

const TEMPLATES: &[(&str, &str)] = &[
    (
        "express/app.js",
        include_str!("../../templates/express/app.js.j2"),
    ),
    (
        "express/tsconfig.json",
        include_str!("../../templates/express/tsconfig.json"),
    ),
    (
        "fastapi/main.py",
        include_str!("../../templates/fastapi/main.py.j2"),
    ),
    (
        "fastapi/db.py",
        include_str!("../../templates/fastapi/db.py.j2"),
    ),
    (
        "flask/__init__.py",
        include_str!("../../templates/flask/__init__.py"),
    ),
    (
        "flask/main_routes.py",
        include_str!("../../templates/flask/main_routes.py"),
    ),
    (
        "flask/wsgi.py",
        include_str!("../../templates/flask/wsgi.py.j2"),
    ),
    (
        "docker/Dockerfile",
        include_str!("../../templates/docker/Dockerfile.j2"),
    ),
    (
        "docker/docker-compose.yml",
        include_str!("../../templates/docker/docker-compose.yml.j2"),
    ),
    (
        "docker/nginx.conf",
        include_str!("../../templates/docker/nginx.conf.j2"),
    ),
    ("gitignore", include_str!("../../templates/gitignore")),
];

/// Renders the embedded templates for one configuration
pub struct Renderer<'a> {
    env: Environment<'static>,
    config: &'a Configuration,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a Configuration) -> Result<Self, ScaffoldError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env, config })
    }

    fn render(&self, name: &str, ctx: Value) -> Result<String, ScaffoldError> {
        Ok(self.env.get_template(name)?.render(ctx)?)
    }

    /// Values every template can rely on
    fn base_context(&self) -> Value {
        let backend = self.config.backend.as_ref();
        context! {
            project_name => &self.config.project_name,
            module_name => self.config.module_name(),
            database => self.config.database().map(|d| d.tag()),
            port => backend.map(|b| b.framework.port()),
        }
    }

    pub fn express_app(&self) -> Result<String, ScaffoldError> {
        self.render("express/app.js", self.base_context())
    }

    pub fn express_tsconfig(&self) -> Result<String, ScaffoldError> {
        self.render("express/tsconfig.json", self.base_context())
    }

    pub fn fastapi_main(&self) -> Result<String, ScaffoldError> {
        self.render("fastapi/main.py", self.base_context())
    }

    pub fn fastapi_db(&self) -> Result<String, ScaffoldError> {
        self.render("fastapi/db.py", self.base_context())
    }

    pub fn flask_init(&self) -> Result<String, ScaffoldError> {
        self.render("flask/__init__.py", self.base_context())
    }

    pub fn flask_routes(&self) -> Result<String, ScaffoldError> {
        self.render("flask/main_routes.py", self.base_context())
    }

    pub fn flask_wsgi(&self) -> Result<String, ScaffoldError> {
        self.render("flask/wsgi.py", self.base_context())
    }

    pub fn gitignore(&self) -> Result<String, ScaffoldError> {
        self.render("gitignore", self.base_context())
    }

    pub fn dockerfile(&self) -> Result<String, ScaffoldError> {
        self.render("docker/Dockerfile", self.docker_context())
    }

    pub fn docker_compose(&self) -> Result<String, ScaffoldError> {
        self.render("docker/docker-compose.yml", self.docker_context())
    }

    pub fn nginx_conf(&self) -> Result<String, ScaffoldError> {
        let api_port = self.config.backend.as_ref().map(|b| b.framework.port());
        self.render("docker/nginx.conf", context! { api_port => api_port })
    }

    fn docker_context(&self) -> Value {
        let server = self.config.backend.as_ref().map(|backend| {
            let framework = backend.framework;
            let typescript = self.config.server_uses_typescript();
            context! {
                family => match framework.family() {
                    LanguageFamily::Node => "node",
                    LanguageFamily::Python => "python",
                },
                port => framework.port(),
                build => framework == BackendFramework::Nest || typescript,
                cmd => container_command(framework, typescript),
            }
        });
        let client = self.config.frontend.as_ref().map(|frontend| {
            context! { dist => client_dist_dir(frontend.framework) }
        });

        context! {
            server => server,
            client => client,
            ..self.base_context()
        }
    }
}

/// Exec-form CMD for the server container
fn container_command(framework: BackendFramework, typescript: bool) -> &'static str {
    match framework {
        BackendFramework::Express if typescript => r#"["node", "dist/app.js"]"#,
        BackendFramework::Express => r#"["node", "src/app.js"]"#,
        BackendFramework::Nest => r#"["node", "dist/main.js"]"#,
        BackendFramework::FastApi => {
            r#"["sh", "-c", "uvicorn app.main:app --host 0.0.0.0 --port $PORT"]"#
        }
        BackendFramework::Django => {
            r#"["sh", "-c", "python manage.py runserver 0.0.0.0:$PORT"]"#
        }
        BackendFramework::Flask => r#"["python", "wsgi.py"]"#,
    }
}

/// Build output directory of the client, relative to `client/`
fn client_dist_dir(framework: FrontendFramework) -> &'static str {
    match framework {
        FrontendFramework::Angular => "dist/client/browser",
        _ => "dist",
    }
}

/// Top-level `package.json` fields for an Express server
pub fn express_package_fields(typescript: bool) -> serde_json::Value {
    if typescript {
        serde_json::json!({
            "scripts": {
                "start": "node dist/app.js",
                "dev": "nodemon --watch src --exec ts-node src/app.ts",
                "build": "tsc"
            }
        })
    } else {
        // app.js uses ES module imports
        serde_json::json!({
            "type": "module",
            "scripts": {
                "start": "node src/app.js",
                "dev": "nodemon src/app.js"
            }
        })
    }
}

/// `requirements.txt` listing the runtime packages, one per line
pub fn requirements_txt(packages: &[String]) -> String {
    let mut out = packages.join("\n");
    out.push('\n');
    out
}
