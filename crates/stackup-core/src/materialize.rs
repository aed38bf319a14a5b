//! Plan execution against the filesystem and the command runner

use crate::error::ScaffoldError;
use crate::plan::{GenerationPlan, Step};
use crate::runtime::CommandRunner;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Create `<parent>/<project_name>` and execute every step in order.
///
/// The root is created with a non-recursive create, so an existing directory
/// fails before anything is written. The first failing step stops the run and
/// whatever was already created stays on disk.
pub async fn materialize<R: CommandRunner>(
    plan: &GenerationPlan,
    parent: &Path,
    runner: &mut R,
) -> Result<PathBuf> {
    let root = parent.join(&plan.project_name);
    create_root(&root).await?;

    for step in &plan.steps {
        execute(step, &root, runner).await?;
    }

    Ok(root)
}

async fn create_root(root: &Path) -> Result<()> {
    match fs::create_dir(root).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            Err(ScaffoldError::DirectoryExists(root.to_path_buf()).into())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to create {}", root.display())),
    }
}

async fn execute<R: CommandRunner>(step: &Step, root: &Path, runner: &mut R) -> Result<()> {
    match step {
        Step::CreateDir { path } => {
            let target = root.join(path);
            fs::create_dir_all(&target)
                .await
                .with_context(|| format!("Failed to create directory: {}", target.display()))?;
        }
        Step::WriteFile { path, contents } => {
            let target = root.join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            fs::write(&target, contents)
                .await
                .with_context(|| format!("Failed to write file: {}", target.display()))?;
        }
        Step::Run { command } => {
            runner.run(command, &root.join(&command.cwd)).await?;
        }
        Step::UpdatePackageJson { path, set } => {
            update_package_json(&root.join(path), set).await?;
        }
        Step::PatchFile {
            path,
            anchor,
            insert,
            unless_contains,
        } => {
            patch_file(&root.join(path), anchor, insert, unless_contains).await?;
        }
    }
    Ok(())
}

async fn update_package_json(path: &Path, set: &Value) -> Result<()> {
    let mut manifest = match fs::read_to_string(path).await {
        Ok(content) => serde_json::from_str::<Value>(&content)
            .map_err(ScaffoldError::from)
            .with_context(|| format!("Failed to parse {}", path.display()))?,
        Err(e) if e.kind() == ErrorKind::NotFound => Value::Object(Map::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    merge_fields(&mut manifest, set);

    let mut content = serde_json::to_string_pretty(&manifest).map_err(ScaffoldError::from)?;
    content.push('\n');
    fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    Ok(())
}

/// Overwrite top-level keys; object values such as `scripts` are merged one level deep
fn merge_fields(target: &mut Value, set: &Value) {
    let (Some(target), Some(set)) = (target.as_object_mut(), set.as_object()) else {
        return;
    };
    for (key, value) in set {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                for (k, v) in incoming {
                    existing.insert(k.clone(), v.clone());
                }
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

async fn patch_file(path: &Path, anchor: &str, insert: &str, unless_contains: &str) -> Result<()> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        // generator layouts change; a missing file is left alone
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };

    if content.contains(unless_contains) || !content.contains(anchor) {
        return Ok(());
    }

    let patched = content.replacen(anchor, &format!("{}{}", anchor, insert), 1);
    fs::write(path, patched)
        .await
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        Backend, BackendFramework, BackendLanguage, Configuration, Database, Frontend,
        FrontendFramework, JsPackageManager, ProjectType, PyPackageManager, StateLibrary, Styling,
    };
    use crate::plan::Toolchain;
    use crate::runtime::RecordingRunner;
    use walkdir::WalkDir;

    fn flask_sqlite() -> Configuration {
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

    fn full_stack() -> Configuration {
        Configuration {
            project_name: "shop".to_string(),
            project_type: ProjectType::FullStack,
            backend: Some(Backend {
                language: BackendLanguage::JavaScript,
                framework: BackendFramework::Express,
                database: Some(Database::MongoDb),
            }),
            frontend: Some(Frontend {
                framework: FrontendFramework::React,
                styling: Some(Styling::Tailwind),
                state: Some(StateLibrary::Redux),
            }),
            typescript: false,
            js_package_manager: Some(JsPackageManager::Npm),
            py_package_manager: None,
            additional_deps: vec![],
            init_git: true,
            add_docker: true,
        }
    }

    fn plan_for(config: &Configuration) -> GenerationPlan {
        GenerationPlan::resolve(config, &Toolchain::default()).unwrap()
    }

    fn tree(root: &Path) -> Vec<String> {
        let mut entries: Vec<String> = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| {
                e.path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        entries.sort();
        entries
    }

    #[tokio::test]
    async fn test_materialize_creates_planned_tree_and_runs_commands_in_order() {
        let parent = tempfile::tempdir().unwrap();
        let plan = plan_for(&flask_sqlite());
        let mut runner = RecordingRunner::new();

        let root = materialize(&plan, parent.path(), &mut runner).await.unwrap();

        assert_eq!(root, parent.path().join("my-app"));
        let entries = tree(&root);
        for expected in [
            "server/app/__init__.py",
            "server/app/routes/main_routes.py",
            "server/app/static",
            "server/wsgi.py",
            "server/.env",
            "server/requirements.txt",
            ".gitignore",
        ] {
            assert!(entries.contains(&expected.to_string()), "missing {expected}");
        }
        assert!(!entries.iter().any(|e| e.starts_with("client")));

        assert_eq!(
            runner.command_lines(),
            plan.commands().map(|c| c.to_string()).collect::<Vec<_>>()
        );
        assert_eq!(runner.invocations[0].1, root.join("server"));
        assert_eq!(runner.invocations.last().unwrap().1, root.join("."));

        let env = std::fs::read_to_string(root.join("server/.env")).unwrap();
        assert_eq!(env, "PORT=5000\nSECRET_KEY=your_secret_key_here\n");
    }

    #[tokio::test]
    async fn test_second_run_fails_with_directory_exists() {
        let parent = tempfile::tempdir().unwrap();
        let plan = plan_for(&flask_sqlite());

        materialize(&plan, parent.path(), &mut RecordingRunner::new())
            .await
            .unwrap();

        let mut runner = RecordingRunner::new();
        let err = materialize(&plan, parent.path(), &mut runner)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScaffoldError>(),
            Some(ScaffoldError::DirectoryExists(_))
        ));
        assert!(runner.invocations.is_empty());
    }

    #[tokio::test]
    async fn test_failing_command_stops_run_and_keeps_partial_tree() {
        let parent = tempfile::tempdir().unwrap();
        let plan = plan_for(&full_stack());
        let mut runner = RecordingRunner::new().failing_on("create vite");

        let err = materialize(&plan, parent.path(), &mut runner)
            .await
            .unwrap_err();

        match err.downcast_ref::<ScaffoldError>() {
            Some(ScaffoldError::CommandFailed { command, .. }) => {
                assert!(command.starts_with("npm create vite@latest"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let root = parent.path().join("shop");
        assert!(root.join("server/src/app.js").exists());
        assert!(root.join("server/package.json").exists());
        assert!(!root.join("client").exists());
        assert!(!root.join("Dockerfile").exists());
        assert_eq!(runner.invocations.last().unwrap().0.program, "npm");
        assert!(!runner.command_lines().iter().any(|l| l == "git init"));
    }

    #[tokio::test]
    async fn test_update_package_json_merges_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(
            &path,
            r#"{"name":"server","main":"index.js","scripts":{"test":"echo"}}"#,
        )
        .unwrap();

        let set = serde_json::json!({"type": "module", "scripts": {"dev": "nodemon src/app.js"}});
        update_package_json(&path, &set).await.unwrap();

        let manifest: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(manifest["name"], "server");
        assert_eq!(manifest["type"], "module");
        assert_eq!(manifest["scripts"]["test"], "echo");
        assert_eq!(manifest["scripts"]["dev"], "nodemon src/app.js");
    }

    #[tokio::test]
    async fn test_update_package_json_creates_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.json");

        update_package_json(&path, &serde_json::json!({"scripts": {"start": "node"}}))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("}\n"));
        assert!(content.contains("\"start\": \"node\""));
    }

    #[tokio::test]
    async fn test_patch_file_inserts_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vite.config.js");
        std::fs::write(
            &path,
            "import { defineConfig } from 'vite'\n\nexport default defineConfig({\n  plugins: [],\n})\n",
        )
        .unwrap();

        let anchor = "export default defineConfig({";
        let insert = "\n  server: { proxy: {} },";
        patch_file(&path, anchor, insert, "server: {").await.unwrap();
        patch_file(&path, anchor, insert, "server: {").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("server: {").count(), 1);
        assert!(content.contains("defineConfig({\n  server: { proxy: {} },\n  plugins"));
    }

    #[tokio::test]
    async fn test_patch_file_skips_missing_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vite.config.ts");
        patch_file(&path, "a", "b", "c").await.unwrap();
        assert!(!path.exists());
    }
}
