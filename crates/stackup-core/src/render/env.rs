//! Server `.env` file

use crate::config::{Backend, BackendFramework, Configuration, Database};

/// Ordered `KEY=value` pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    entries: Vec<(String, String)>,
}

impl EnvFile {
    /// Keys for the backend's (framework, database) pair and nothing else
    pub fn for_backend(config: &Configuration, backend: &Backend) -> Self {
        let mut env = EnvFile::default();
        env.set("PORT", backend.framework.port().to_string());

        match backend.framework {
            BackendFramework::Flask => {
                env.set("SECRET_KEY", "your_secret_key_here");
            }
            BackendFramework::Django => {
                env.set("SECRET_KEY", "your_secret_key_here");
                env.set("DEBUG", "True");
            }
            BackendFramework::Express | BackendFramework::Nest | BackendFramework::FastApi => {}
        }

        match backend.database {
            Some(Database::MongoDb) => {
                env.set(
                    "MONGO_URI",
                    format!("mongodb://localhost:27017/{}", config.project_name),
                );
            }
            Some(db @ (Database::PostgreSql | Database::MySql)) => {
                let prefix = db.tag().to_uppercase();
                let port = if db == Database::PostgreSql { "5432" } else { "3306" };
                env.set(format!("{prefix}_HOST"), "localhost");
                env.set(format!("{prefix}_PORT"), port);
                env.set(format!("{prefix}_USER"), "root");
                env.set(format!("{prefix}_PASSWORD"), "password");
                env.set(format!("{prefix}_DATABASE"), config.module_name());
            }
            Some(Database::Sqlite) | None => {}
        }

        env
    }

    fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}\n", k, v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendLanguage, ProjectType, PyPackageManager};

    fn config_for(framework: BackendFramework, database: Option<Database>) -> Configuration {
        let language = match framework {
            BackendFramework::Express | BackendFramework::Nest => BackendLanguage::JavaScript,
            _ => BackendLanguage::Python,
        };
        Configuration {
            project_name: "my-app".to_string(),
            project_type: ProjectType::BackendOnly,
            backend: Some(Backend {
                language,
                framework,
                database,
            }),
            frontend: None,
            typescript: false,
            js_package_manager: None,
            py_package_manager: Some(PyPackageManager::Pip),
            additional_deps: vec![],
            init_git: false,
            add_docker: false,
        }
    }

    fn keys_for(framework: BackendFramework, database: Option<Database>) -> Vec<String> {
        let config = config_for(framework, database);
        let backend = config.backend.clone().unwrap();
        EnvFile::for_backend(&config, &backend)
            .keys()
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn expected_keys(framework: BackendFramework, database: Option<Database>) -> Vec<String> {
        let mut keys = vec!["PORT"];
        match framework {
            BackendFramework::Flask => keys.push("SECRET_KEY"),
            BackendFramework::Django => keys.extend(["SECRET_KEY", "DEBUG"]),
            _ => {}
        }
        match database {
            Some(Database::MongoDb) => keys.push("MONGO_URI"),
            Some(Database::PostgreSql) => keys.extend([
                "POSTGRESQL_HOST",
                "POSTGRESQL_PORT",
                "POSTGRESQL_USER",
                "POSTGRESQL_PASSWORD",
                "POSTGRESQL_DATABASE",
            ]),
            Some(Database::MySql) => keys.extend([
                "MYSQL_HOST",
                "MYSQL_PORT",
                "MYSQL_USER",
                "MYSQL_PASSWORD",
                "MYSQL_DATABASE",
            ]),
            Some(Database::Sqlite) | None => {}
        }
        keys.into_iter().map(String::from).collect()
    }

    #[test]
    fn test_every_pair_has_exactly_its_keys() {
        let frameworks = [
            BackendFramework::Express,
            BackendFramework::Nest,
            BackendFramework::FastApi,
            BackendFramework::Django,
            BackendFramework::Flask,
        ];
        let databases = [
            None,
            Some(Database::MongoDb),
            Some(Database::PostgreSql),
            Some(Database::MySql),
            Some(Database::Sqlite),
        ];
        for framework in frameworks {
            for database in databases {
                assert_eq!(
                    keys_for(framework, database),
                    expected_keys(framework, database),
                    "{framework} / {database:?}"
                );
            }
        }
    }

    #[test]
    fn test_flask_sqlite_env() {
        let config = config_for(BackendFramework::Flask, Some(Database::Sqlite));
        let backend = config.backend.clone().unwrap();
        let env = EnvFile::for_backend(&config, &backend);
        assert_eq!(
            env.render(),
            "PORT=5000\nSECRET_KEY=your_secret_key_here\n"
        );
    }

    #[test]
    fn test_postgres_values() {
        let config = config_for(BackendFramework::Express, Some(Database::PostgreSql));
        let backend = config.backend.clone().unwrap();
        let env = EnvFile::for_backend(&config, &backend);
        assert_eq!(env.get("POSTGRESQL_PORT"), Some("5432"));
        assert_eq!(env.get("POSTGRESQL_DATABASE"), Some("my_app"));
        assert_eq!(env.get("PORT"), Some("5000"));
    }
}
