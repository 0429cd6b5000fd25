//! Configuration schema types for `dllb.toml`
//!
//! Defines the structure and validation rules for project configuration.

use crate::build::compiler::DEFAULT_COMPILER;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Main artifact name, without extension
    #[serde(default = "default_name")]
    pub name: String,
    /// Root of the script tree to scan
    #[serde(default = "default_src")]
    pub src: PathBuf,
    /// Directory artifacts are written to (must already exist)
    #[serde(default = "default_out")]
    pub out: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self { name: default_name(), src: default_src(), out: default_out() }
    }
}

fn default_name() -> String {
    "Assembly".to_string()
}

fn default_src() -> PathBuf {
    PathBuf::from("Assets")
}

fn default_out() -> PathBuf {
    PathBuf::from("build")
}

/// Build behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSection {
    /// Also build the editor artifact
    #[serde(default = "default_true")]
    pub editor: bool,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self { editor: true }
    }
}

fn default_true() -> bool {
    true
}

/// External compiler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Compiler executable (e.g., "mcs", "csc")
    #[serde(default = "default_program")]
    pub program: String,
    /// Arguments placed before the generated ones
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self { program: default_program(), args: Vec::new() }
    }
}

fn default_program() -> String {
    DEFAULT_COMPILER.to_string()
}

/// Host install the default references live in
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// Host contents directory; no default references without it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<PathBuf>,
}

/// Preference store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding persisted references and defines
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: default_store_path() }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".dllb/prefs.json")
}

/// Complete dllb.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DllbConfig {
    /// Project metadata
    #[serde(default)]
    pub project: ProjectConfig,
    /// Build settings
    #[serde(default)]
    pub build: BuildSection,
    /// Compiler settings
    #[serde(default)]
    pub compiler: CompilerConfig,
    /// Host install settings
    #[serde(default)]
    pub host: HostConfig,
    /// Preference store settings
    #[serde(default)]
    pub store: StoreConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "project.name")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dllb.toml: '{}' {}", self.field, self.message)
    }
}

impl DllbConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.project.name.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "project.name".to_string(),
                message: "must be a non-empty string".to_string(),
            });
        } else if self.project.name.contains(|c: char| c == '/' || c == '\\') {
            errors.push(ConfigValidationError {
                field: "project.name".to_string(),
                message: "must be a file name, not a path".to_string(),
            });
        }

        if self.compiler.program.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "compiler.program".to_string(),
                message: "must name a compiler executable".to_string(),
            });
        }

        if self.store.path.as_os_str().is_empty() {
            errors.push(ConfigValidationError {
                field: "store.path".to_string(),
                message: "must be a file path".to_string(),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_parse() {
        let config: DllbConfig = toml::from_str("").unwrap();
        assert_eq!(config.project.name, "Assembly");
        assert_eq!(config.project.src, PathBuf::from("Assets"));
        assert_eq!(config.project.out, PathBuf::from("build"));
        assert!(config.build.editor);
        assert_eq!(config.compiler.program, "mcs");
        assert!(config.host.contents.is_none());
        assert!(config.is_valid());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[project]
name = "Gameplay"
src = "Assets/Scripts"
out = "Plugins"

[build]
editor = false

[compiler]
program = "csc"
args = ["-langversion:7.3"]

[host]
contents = "/Applications/Unity/Unity.app/Contents"

[store]
path = "prefs/dllb.json"
"#;
        let config: DllbConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.project.name, "Gameplay");
        assert_eq!(config.project.src, PathBuf::from("Assets/Scripts"));
        assert_eq!(config.project.out, PathBuf::from("Plugins"));
        assert!(!config.build.editor);
        assert_eq!(config.compiler.program, "csc");
        assert_eq!(config.compiler.args, vec!["-langversion:7.3"]);
        assert_eq!(
            config.host.contents,
            Some(PathBuf::from("/Applications/Unity/Unity.app/Contents"))
        );
        assert_eq!(config.store.path, PathBuf::from("prefs/dllb.json"));
    }

    #[test]
    fn test_validation_empty_name() {
        let toml = r#"
[project]
name = ""
"#;
        let config: DllbConfig = toml::from_str(toml).unwrap();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "project.name"));
    }

    #[test]
    fn test_validation_name_with_separator() {
        let toml = r#"
[project]
name = "out/Assembly"
"#;
        let config: DllbConfig = toml::from_str(toml).unwrap();
        assert!(!config.is_valid());
    }

    #[test]
    fn test_validation_empty_program() {
        let toml = r#"
[compiler]
program = " "
"#;
        let config: DllbConfig = toml::from_str(toml).unwrap();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "compiler.program"));
        assert!(errors[0].to_string().starts_with("dllb.toml: 'compiler.program'"));
    }
}
