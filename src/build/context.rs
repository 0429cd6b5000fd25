//! Build context containing configuration and paths for a build.

use crate::build::target::{BuildTarget, Phase};
use crate::config::DllbConfig;
use std::path::{Path, PathBuf};

/// Build context containing configuration and paths for a build operation.
///
/// The context resolves every configured path against the project root
/// (the directory holding `dllb.toml`).
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// The loaded configuration
    config: DllbConfig,
    /// Project root directory (where dllb.toml is located)
    project_root: PathBuf,
}

impl BuildContext {
    /// Create a new build context.
    pub fn new(config: DllbConfig, project_root: PathBuf) -> Self {
        Self { config, project_root }
    }

    /// Get the configuration.
    pub fn config(&self) -> &DllbConfig {
        &self.config
    }

    /// Get the project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the source directory (resolved to absolute path).
    pub fn src_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.project.src)
    }

    /// Get the output directory (resolved to absolute path).
    pub fn out_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.project.out)
    }

    /// Preference store file (resolved to absolute path).
    pub fn store_path(&self) -> PathBuf {
        self.resolve_path(&self.config.store.path)
    }

    /// Host contents directory, if configured.
    pub fn host_contents(&self) -> Option<PathBuf> {
        self.config.host.contents.as_deref().map(|p| self.resolve_path(p))
    }

    /// Main artifact name, without extension.
    pub fn artifact_name(&self) -> &str {
        &self.config.project.name
    }

    /// Whether the editor phase is enabled.
    pub fn build_editor(&self) -> bool {
        self.config.build.editor
    }

    /// Enable or disable the editor phase.
    pub fn with_editor(mut self, editor: bool) -> Self {
        self.config.build.editor = editor;
        self
    }

    /// Target produced by `phase`.
    pub fn target(&self, phase: Phase) -> BuildTarget {
        BuildTarget::for_phase(phase, self.artifact_name(), &self.out_dir())
    }

    /// Resolve a path relative to the project root.
    ///
    /// If the path is absolute, returns it unchanged.
    /// If relative, joins it with the project root.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        crate::config::loader::resolve_path(&self.project_root, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config;

    #[test]
    fn test_build_context_new() {
        let root = PathBuf::from("/project");
        let ctx = BuildContext::new(default_config(), root.clone());

        assert_eq!(ctx.project_root(), &root);
        assert_eq!(ctx.artifact_name(), "Assembly");
        assert!(ctx.build_editor());
    }

    #[test]
    fn test_build_context_paths() {
        let ctx = BuildContext::new(default_config(), PathBuf::from("/project"));

        assert_eq!(ctx.src_dir(), PathBuf::from("/project/Assets"));
        assert_eq!(ctx.out_dir(), PathBuf::from("/project/build"));
        assert_eq!(ctx.store_path(), PathBuf::from("/project/.dllb/prefs.json"));
        assert!(ctx.host_contents().is_none());
    }

    #[test]
    fn test_build_context_absolute_paths() {
        let mut config = default_config();
        config.project.out = PathBuf::from("/var/dlls");
        config.host.contents = Some(PathBuf::from("/opt/unity/Data"));
        let ctx = BuildContext::new(config, PathBuf::from("/project"));

        assert_eq!(ctx.out_dir(), PathBuf::from("/var/dlls"));
        assert_eq!(ctx.host_contents(), Some(PathBuf::from("/opt/unity/Data")));
    }

    #[test]
    fn test_build_context_with_editor() {
        let ctx = BuildContext::new(default_config(), PathBuf::from("/project")).with_editor(false);
        assert!(!ctx.build_editor());
    }

    #[test]
    fn test_build_context_targets() {
        let ctx = BuildContext::new(default_config(), PathBuf::from("/project"));

        assert_eq!(ctx.target(Phase::Main).output, PathBuf::from("/project/build/Assembly.dll"));
        assert_eq!(
            ctx.target(Phase::Editor).output,
            PathBuf::from("/project/build/Assembly.Editor.dll")
        );
    }
}
