//! Tool detection run before anything touches the filesystem

use super::{resolve_program, CommandRunner};
use crate::error::ScaffoldError;
use semver::Version;
use std::process::Command;

/// `npm create <pkg> -- <flags>` forwarding needs npm 7 or newer
const MIN_NPM_VERSION: Version = Version::new(7, 0, 0);

/// Tool detection result
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub version: Option<String>,
    pub available: bool,
}

/// Run `<program> --version` and return its trimmed output on success
pub fn probe_version(program: &str) -> Option<String> {
    let output = Command::new(resolve_program(program))
        .arg("--version")
        .output();

    match output {
        Ok(out) if out.status.success() => {
            let stdout = String::from_utf8_lossy(&out.stdout).trim().to_string();
            // Python 2 and some conda builds print the version on stderr
            if stdout.is_empty() {
                Some(String::from_utf8_lossy(&out.stderr).trim().to_string())
            } else {
                Some(stdout)
            }
        }
        _ => None,
    }
}

/// Pull the first semver-looking token out of a `--version` banner
pub fn parse_version(banner: &str) -> Option<Version> {
    banner.split_whitespace().find_map(|token| {
        let cleaned = token.strip_prefix('v').unwrap_or(token);
        Version::parse(cleaned).ok()
    })
}

fn install_hint(program: &str) -> &'static str {
    match program {
        "npm" | "npx" => "install Node.js from https://nodejs.org",
        "yarn" => "install from https://yarnpkg.com",
        "pnpm" => "install from https://pnpm.io",
        "python" | "python3" => "install from https://python.org",
        "poetry" => "install from https://python-poetry.org",
        "conda" => "install from https://docs.conda.io",
        "git" => "install from https://git-scm.com",
        _ => "install it and add it to PATH",
    }
}

/// Probe every tool a plan will invoke; fail with all missing tools at once.
pub fn preflight<R: CommandRunner>(
    runner: &R,
    tools: &[String],
) -> Result<Vec<ToolInfo>, ScaffoldError> {
    let mut results = Vec::new();
    let mut missing = Vec::new();

    for tool in tools {
        match runner.probe(tool) {
            Some(banner) => {
                if tool == "npm" {
                    if let Some(version) = parse_version(&banner) {
                        if version < MIN_NPM_VERSION {
                            missing.push(format!(
                                "npm {} or newer (found {}; {})",
                                MIN_NPM_VERSION,
                                version,
                                install_hint(tool)
                            ));
                            continue;
                        }
                    }
                }
                results.push(ToolInfo {
                    name: tool.clone(),
                    version: Some(banner),
                    available: true,
                });
            }
            None => missing.push(format!("{} ({})", tool, install_hint(tool))),
        }
    }

    if !missing.is_empty() {
        return Err(ScaffoldError::MissingTools(missing));
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RecordingRunner;

    #[test]
    fn test_parse_version_banners() {
        assert_eq!(parse_version("10.2.4"), Some(Version::new(10, 2, 4)));
        assert_eq!(parse_version("v20.11.0"), Some(Version::new(20, 11, 0)));
        assert_eq!(parse_version("Python 3.12.1"), Some(Version::new(3, 12, 1)));
        assert_eq!(
            parse_version("git version 2.43.0"),
            Some(Version::new(2, 43, 0))
        );
        assert_eq!(parse_version("unknown"), None);
    }

    #[test]
    fn test_preflight_reports_all_missing_tools() {
        let runner = RecordingRunner::new().with_tool("npm", "10.2.4");
        let tools = vec!["npm".to_string(), "git".to_string(), "poetry".to_string()];

        let err = preflight(&runner, &tools).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("git (install from https://git-scm.com)"));
        assert!(message.contains("poetry"));
        assert!(!message.contains("  - npm"));
    }

    #[test]
    fn test_preflight_rejects_old_npm() {
        let runner = RecordingRunner::new().with_tool("npm", "6.14.18");
        let err = preflight(&runner, &["npm".to_string()]).unwrap_err();
        assert!(err.to_string().contains("npm 7.0.0 or newer"));
    }

    #[test]
    fn test_preflight_returns_versions() {
        let runner = RecordingRunner::new()
            .with_tool("git", "git version 2.43.0")
            .with_tool("python3", "Python 3.12.1");
        let tools = vec!["git".to_string(), "python3".to_string()];

        let infos = preflight(&runner, &tools).unwrap();
        assert_eq!(infos.len(), 2);
        assert!(infos.iter().all(|t| t.available));
        assert_eq!(infos[1].version.as_deref(), Some("Python 3.12.1"));
    }
}
