//! Resolved project configuration
//!
//! Every choice axis is a closed enum. A [`Configuration`] is built once by the
//! prompts (or deserialized from an answers file), validated, and then only read.

use crate::capability;
use crate::error::ScaffoldError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which halves of the application get generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    FullStack,
    BackendOnly,
    FrontendOnly,
}

impl ProjectType {
    pub const ALL: [ProjectType; 3] = [
        ProjectType::FullStack,
        ProjectType::BackendOnly,
        ProjectType::FrontendOnly,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ProjectType::FullStack => "Full-stack",
            ProjectType::BackendOnly => "Backend only",
            ProjectType::FrontendOnly => "Frontend only",
        }
    }

    pub fn includes_backend(&self) -> bool {
        matches!(self, ProjectType::FullStack | ProjectType::BackendOnly)
    }

    pub fn includes_frontend(&self) -> bool {
        matches!(self, ProjectType::FullStack | ProjectType::FrontendOnly)
    }
}

/// Language family a backend framework runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageFamily {
    Node,
    Python,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendLanguage {
    JavaScript,
    TypeScript,
    Python,
}

impl BackendLanguage {
    pub const ALL: [BackendLanguage; 3] = [
        BackendLanguage::JavaScript,
        BackendLanguage::TypeScript,
        BackendLanguage::Python,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            BackendLanguage::JavaScript => "JavaScript",
            BackendLanguage::TypeScript => "TypeScript",
            BackendLanguage::Python => "Python",
        }
    }

    pub fn family(&self) -> LanguageFamily {
        match self {
            BackendLanguage::JavaScript | BackendLanguage::TypeScript => LanguageFamily::Node,
            BackendLanguage::Python => LanguageFamily::Python,
        }
    }

    /// Frameworks offered for this language, in prompt order
    pub fn frameworks(&self) -> &'static [BackendFramework] {
        match self.family() {
            LanguageFamily::Node => &[BackendFramework::Express, BackendFramework::Nest],
            LanguageFamily::Python => &[
                BackendFramework::FastApi,
                BackendFramework::Django,
                BackendFramework::Flask,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendFramework {
    #[serde(rename = "express")]
    Express,
    #[serde(rename = "nest")]
    Nest,
    #[serde(rename = "fastapi")]
    FastApi,
    #[serde(rename = "django")]
    Django,
    #[serde(rename = "flask")]
    Flask,
}

impl BackendFramework {
    pub fn display_name(&self) -> &'static str {
        match self {
            BackendFramework::Express => "Express",
            BackendFramework::Nest => "NestJS",
            BackendFramework::FastApi => "FastAPI",
            BackendFramework::Django => "Django",
            BackendFramework::Flask => "Flask",
        }
    }

    pub fn family(&self) -> LanguageFamily {
        match self {
            BackendFramework::Express | BackendFramework::Nest => LanguageFamily::Node,
            BackendFramework::FastApi | BackendFramework::Django | BackendFramework::Flask => {
                LanguageFamily::Python
            }
        }
    }

    /// Port the generated server listens on
    pub fn port(&self) -> u16 {
        match self {
            BackendFramework::Express | BackendFramework::Flask => 5000,
            BackendFramework::Nest => 3000,
            BackendFramework::FastApi | BackendFramework::Django => 8000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Database {
    #[serde(rename = "mongodb")]
    MongoDb,
    #[serde(rename = "postgresql")]
    PostgreSql,
    #[serde(rename = "mysql")]
    MySql,
    #[serde(rename = "sqlite")]
    Sqlite,
}

impl Database {
    pub const ALL: [Database; 4] = [
        Database::MongoDb,
        Database::PostgreSql,
        Database::MySql,
        Database::Sqlite,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Database::MongoDb => "MongoDB",
            Database::PostgreSql => "PostgreSQL",
            Database::MySql => "MySQL",
            Database::Sqlite => "SQLite",
        }
    }

    /// Lowercase identifier used inside file templates
    pub fn tag(&self) -> &'static str {
        match self {
            Database::MongoDb => "mongodb",
            Database::PostgreSql => "postgresql",
            Database::MySql => "mysql",
            Database::Sqlite => "sqlite",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrontendFramework {
    React,
    Vue,
    Svelte,
    Angular,
}

impl FrontendFramework {
    pub const ALL: [FrontendFramework; 4] = [
        FrontendFramework::React,
        FrontendFramework::Vue,
        FrontendFramework::Svelte,
        FrontendFramework::Angular,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            FrontendFramework::React => "React",
            FrontendFramework::Vue => "Vue",
            FrontendFramework::Svelte => "Svelte",
            FrontendFramework::Angular => "Angular",
        }
    }

    /// Base Vite template name; Angular uses its own generator
    pub fn vite_template(&self) -> Option<&'static str> {
        match self {
            FrontendFramework::React => Some("react"),
            FrontendFramework::Vue => Some("vue"),
            FrontendFramework::Svelte => Some("svelte"),
            FrontendFramework::Angular => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Styling {
    Tailwind,
    Bootstrap,
    Mui,
    Chakra,
    StyledComponents,
    Vuetify,
}

impl Styling {
    pub fn display_name(&self) -> &'static str {
        match self {
            Styling::Tailwind => "Tailwind CSS",
            Styling::Bootstrap => "Bootstrap",
            Styling::Mui => "Material UI",
            Styling::Chakra => "Chakra UI",
            Styling::StyledComponents => "styled-components",
            Styling::Vuetify => "Vuetify",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StateLibrary {
    Redux,
    Zustand,
    Recoil,
    Jotai,
    Context,
    Pinia,
    Vuex,
    SvelteStore,
    Ngrx,
}

impl StateLibrary {
    pub fn display_name(&self) -> &'static str {
        match self {
            StateLibrary::Redux => "Redux Toolkit",
            StateLibrary::Zustand => "Zustand",
            StateLibrary::Recoil => "Recoil",
            StateLibrary::Jotai => "Jotai",
            StateLibrary::Context => "React Context",
            StateLibrary::Pinia => "Pinia",
            StateLibrary::Vuex => "Vuex",
            StateLibrary::SvelteStore => "Svelte stores",
            StateLibrary::Ngrx => "NgRx",
        }
    }

    /// Whether the library gets a dedicated store directory
    pub fn needs_store_dir(&self) -> bool {
        !matches!(self, StateLibrary::Context | StateLibrary::SvelteStore)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JsPackageManager {
    Npm,
    Yarn,
    Pnpm,
}

impl JsPackageManager {
    pub const ALL: [JsPackageManager; 3] = [
        JsPackageManager::Npm,
        JsPackageManager::Yarn,
        JsPackageManager::Pnpm,
    ];

    pub fn program(&self) -> &'static str {
        match self {
            JsPackageManager::Npm => "npm",
            JsPackageManager::Yarn => "yarn",
            JsPackageManager::Pnpm => "pnpm",
        }
    }

    /// Script runner prefix shown in next steps (`npm run dev`, `yarn dev`)
    pub fn run_script(&self, script: &str) -> String {
        match self {
            JsPackageManager::Npm => format!("npm run {}", script),
            JsPackageManager::Yarn => format!("yarn {}", script),
            JsPackageManager::Pnpm => format!("pnpm {}", script),
        }
    }
}

impl fmt::Display for JsPackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PyPackageManager {
    Pip,
    Poetry,
    Conda,
}

impl fmt::Display for PyPackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PyPackageManager::Pip => "pip",
            PyPackageManager::Poetry => "poetry",
            PyPackageManager::Conda => "conda",
        };
        write!(f, "{}", name)
    }
}

macro_rules! display_via_name {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.display_name())
            }
        })*
    };
}

display_via_name!(
    ProjectType,
    BackendLanguage,
    BackendFramework,
    Database,
    FrontendFramework,
    Styling,
    StateLibrary
);

/// Server-side choices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backend {
    pub language: BackendLanguage,
    pub framework: BackendFramework,
    #[serde(default)]
    pub database: Option<Database>,
}

/// Client-side choices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frontend {
    pub framework: FrontendFramework,
    #[serde(default)]
    pub styling: Option<Styling>,
    #[serde(default)]
    pub state: Option<StateLibrary>,
}

/// The full set of answers driving generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub project_name: String,
    pub project_type: ProjectType,
    #[serde(default)]
    pub backend: Option<Backend>,
    #[serde(default)]
    pub frontend: Option<Frontend>,
    #[serde(default)]
    pub typescript: bool,
    #[serde(default)]
    pub js_package_manager: Option<JsPackageManager>,
    #[serde(default)]
    pub py_package_manager: Option<PyPackageManager>,
    #[serde(default)]
    pub additional_deps: Vec<String>,
    #[serde(default = "default_true")]
    pub init_git: bool,
    #[serde(default)]
    pub add_docker: bool,
}

fn default_true() -> bool {
    true
}

impl Configuration {
    /// Parse and validate a YAML answers document
    pub fn from_yaml(content: &str) -> Result<Self, ScaffoldError> {
        let config: Configuration = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    pub fn has_frontend(&self) -> bool {
        self.frontend.is_some()
    }

    pub fn database(&self) -> Option<Database> {
        self.backend.as_ref().and_then(|b| b.database)
    }

    /// TypeScript only reaches the server through the backend language choice
    pub fn server_uses_typescript(&self) -> bool {
        self.backend
            .as_ref()
            .is_some_and(|b| b.language == BackendLanguage::TypeScript)
    }

    /// Project name usable as a Python module or database name
    pub fn module_name(&self) -> String {
        self.project_name.replace(['-', '.'], "_")
    }

    /// Check that the answers describe a combination the generators support
    pub fn validate(&self) -> Result<(), ScaffoldError> {
        validate_project_name(&self.project_name).map_err(invalid)?;

        match (&self.backend, self.project_type.includes_backend()) {
            (None, true) => {
                return Err(invalid(format!(
                    "project type '{}' needs backend choices",
                    self.project_type
                )));
            }
            (Some(_), false) => {
                return Err(invalid(format!(
                    "project type '{}' has no backend",
                    self.project_type
                )));
            }
            _ => {}
        }

        match (&self.frontend, self.project_type.includes_frontend()) {
            (None, true) => {
                return Err(invalid(format!(
                    "project type '{}' needs frontend choices",
                    self.project_type
                )));
            }
            (Some(_), false) => {
                return Err(invalid(format!(
                    "project type '{}' has no frontend",
                    self.project_type
                )));
            }
            _ => {}
        }

        if let Some(backend) = &self.backend {
            if backend.language == BackendLanguage::TypeScript && !self.typescript {
                return Err(invalid("a TypeScript backend requires `typescript: true`"));
            }
            if backend.framework == BackendFramework::Django {
                validate_python_module(&self.module_name()).map_err(invalid)?;
            }
            if !backend.language.frameworks().contains(&backend.framework) {
                return Err(invalid(format!(
                    "{} is not a {} framework",
                    backend.framework, backend.language
                )));
            }
        }

        if let Some(frontend) = &self.frontend {
            if let Some(styling) = frontend.styling {
                if !capability::styling_options(frontend.framework).contains(&styling) {
                    return Err(invalid(format!(
                        "{} is not offered for {}",
                        styling, frontend.framework
                    )));
                }
            }
            if let Some(state) = frontend.state {
                if !capability::state_options(frontend.framework).contains(&state) {
                    return Err(invalid(format!(
                        "{} is not offered for {}",
                        state, frontend.framework
                    )));
                }
            }
        }

        if self.needs_js_package_manager() && self.js_package_manager.is_none() {
            return Err(invalid("a JavaScript package manager is required"));
        }
        if self.needs_py_package_manager() && self.py_package_manager.is_none() {
            return Err(invalid("a Python package manager is required"));
        }
        if !self.needs_js_package_manager() && self.js_package_manager.is_some() {
            return Err(invalid("a JavaScript package manager is set but nothing uses it"));
        }
        if !self.needs_py_package_manager() && self.py_package_manager.is_some() {
            return Err(invalid("a Python package manager is set but nothing uses it"));
        }

        if let Some(dep) = self.additional_deps.iter().find(|d| d.starts_with('-')) {
            return Err(invalid(format!("'{}' is not a package name", dep)));
        }

        Ok(())
    }

    pub fn needs_js_package_manager(&self) -> bool {
        self.has_frontend()
            || self
                .backend
                .as_ref()
                .is_some_and(|b| b.language.family() == LanguageFamily::Node)
    }

    pub fn needs_py_package_manager(&self) -> bool {
        self.backend
            .as_ref()
            .is_some_and(|b| b.language.family() == LanguageFamily::Python)
    }
}

fn invalid(reason: impl Into<String>) -> ScaffoldError {
    ScaffoldError::InvalidConfiguration(reason.into())
}

/// Validate a project name; used by the prompt validator as well
pub fn validate_project_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Project name cannot be empty".to_string());
    }
    if name.starts_with('.') || name.starts_with('-') {
        return Err("Project name cannot start with '.' or '-'".to_string());
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(format!("Project name cannot contain '{}'", c));
    }
    Ok(())
}

/// Names Django refuses for a project package: they shadow an importable module
/// or the `api` app created next to it
const RESERVED_MODULE_NAMES: &[&str] = &[
    "api", "asyncio", "code", "django", "email", "http", "io", "json",
    "logging", "math", "os", "random", "re", "site", "string", "sys", "test", "time",
    "typing",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise",
    "return", "try", "while", "with", "yield",
];

/// Django's `startproject` needs an identifier that does not clash with an existing module
fn validate_python_module(module: &str) -> Result<(), String> {
    let starts_ok = module
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_ok {
        return Err(format!(
            "'{}' is not a valid Django project name: it must start with a letter or '_'",
            module
        ));
    }
    if PYTHON_KEYWORDS.contains(&module) || RESERVED_MODULE_NAMES.contains(&module) {
        return Err(format!(
            "'{}' is not a valid Django project name: it clashes with an existing module",
            module
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flask_backend() -> Configuration {
        Configuration {
            project_name: "my-app".to_string(),
            project_type: ProjectType::BackendOnly,
            backend: Some(Backend {
                language: BackendLanguage::Python,
                framework: BackendFramework::Flask,
                database: Some(Database::Sqlite),
            }),
            frontend: None,
            typescript: false,
            js_package_manager: None,
            py_package_manager: Some(PyPackageManager::Pip),
            additional_deps: vec![],
            init_git: true,
            add_docker: false,
        }
    }

    #[test]
    fn test_valid_backend_only_configuration() {
        assert!(flask_backend().validate().is_ok());
    }

    #[test]
    fn test_frontend_rejected_for_backend_only() {
        let mut config = flask_backend();
        config.frontend = Some(Frontend {
            framework: FrontendFramework::React,
            styling: None,
            state: None,
        });
        assert!(matches!(
            config.validate(),
            Err(ScaffoldError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_framework_must_match_language() {
        let mut config = flask_backend();
        config.backend.as_mut().unwrap().framework = BackendFramework::Express;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Express"));
    }

    #[test]
    fn test_styling_must_be_offered_for_frontend() {
        let config = Configuration {
            project_type: ProjectType::FrontendOnly,
            backend: None,
            frontend: Some(Frontend {
                framework: FrontendFramework::Svelte,
                styling: Some(Styling::Mui),
                state: None,
            }),
            js_package_manager: Some(JsPackageManager::Npm),
            py_package_manager: None,
            ..flask_backend()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_package_manager_rejected() {
        let mut config = flask_backend();
        config.py_package_manager = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_project_name_rules() {
        assert!(validate_project_name("my-app").is_ok());
        assert!(validate_project_name("app_2.0").is_ok());
        assert!(validate_project_name("").is_err());
        assert!(validate_project_name(".hidden").is_err());
        assert!(validate_project_name("a/b").is_err());
        assert!(validate_project_name("my app").is_err());
    }

    #[test]
    fn test_module_name_replaces_separators() {
        let mut config = flask_backend();
        config.project_name = "my-cool.app".to_string();
        assert_eq!(config.module_name(), "my_cool_app");
    }

    #[test]
    fn test_typescript_flag_does_not_reach_python_server() {
        let mut config = flask_backend();
        config.typescript = true;
        assert!(!config.server_uses_typescript());
    }

    #[test]
    fn test_from_yaml_answers() {
        let yaml = r#"
project_name: shop
project_type: full-stack
backend:
  language: typescript
  framework: express
  database: postgresql
frontend:
  framework: react
  styling: tailwind
  state: redux
typescript: true
js_package_manager: pnpm
"#;
        let config = Configuration::from_yaml(yaml).unwrap();
        assert!(config.server_uses_typescript());
        assert!(config.init_git);
        assert!(!config.add_docker);
        assert_eq!(config.database(), Some(Database::PostgreSql));
        assert_eq!(config.js_package_manager, Some(JsPackageManager::Pnpm));
    }

    #[test]
    fn test_typescript_backend_requires_typescript_flag() {
        let yaml = r#"
project_name: shop
project_type: full-stack
backend:
  language: typescript
  framework: express
frontend:
  framework: react
typescript: false
js_package_manager: npm
"#;
        let err = Configuration::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ScaffoldError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("typescript: true"));
    }

    #[test]
    fn test_unused_package_managers_rejected() {
        let mut config = flask_backend();
        config.js_package_manager = Some(JsPackageManager::Npm);
        assert!(matches!(
            config.validate(),
            Err(ScaffoldError::InvalidConfiguration(_))
        ));

        let yaml = r#"
project_name: shop
project_type: full-stack
backend:
  language: javascript
  framework: express
frontend:
  framework: react
js_package_manager: npm
py_package_manager: pip
"#;
        assert!(matches!(
            Configuration::from_yaml(yaml),
            Err(ScaffoldError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_django_project_name_must_be_importable() {
        let mut config = flask_backend();
        config.backend.as_mut().unwrap().framework = BackendFramework::Django;

        for name in ["2app", "test", "django", "api", "class"] {
            config.project_name = name.to_string();
            assert!(
                matches!(config.validate(), Err(ScaffoldError::InvalidConfiguration(_))),
                "{name} should be rejected"
            );
        }

        for name in ["blog-site", "_internal", "shop2"] {
            config.project_name = name.to_string();
            assert!(config.validate().is_ok(), "{name} should be accepted");
        }
    }

    #[test]
    fn test_reserved_names_allowed_outside_django() {
        let mut config = flask_backend();
        config.project_name = "test".to_string();
        assert!(config.validate().is_ok());
    }
}
