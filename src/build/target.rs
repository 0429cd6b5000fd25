//! Build phases and the artifacts they produce.
//!
//! A build has at most two phases. The main phase always runs first; the
//! editor phase depends on the main artifact.

use crate::build::discovery::SourceKind;
use crate::build::scope::{ARTIFACT_EXTENSION, EDITOR_SUFFIX};
use std::path::{Path, PathBuf};

/// Phase of a two-artifact build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Compile the main sources into the main artifact
    Main,
    /// Compile the editor sources into the editor artifact
    Editor,
}

impl Phase {
    /// Whether this phase targets the editor artifact.
    pub fn is_editor(&self) -> bool {
        matches!(self, Phase::Editor)
    }

    /// The source bucket compiled in this phase.
    pub fn source_kind(&self) -> SourceKind {
        match self {
            Phase::Main => SourceKind::Main,
            Phase::Editor => SourceKind::EditorOnly,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Main => write!(f, "main"),
            Phase::Editor => write!(f, "editor"),
        }
    }
}

/// The artifact a phase writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    /// Unique identifier (e.g., "editor:Assembly.Editor")
    pub id: String,
    /// Phase producing this artifact
    pub phase: Phase,
    /// Artifact name without extension
    pub name: String,
    /// Full output path
    pub output: PathBuf,
}

impl BuildTarget {
    /// Target for `phase` given the main artifact name and output directory.
    pub fn for_phase(phase: Phase, main_name: &str, out_dir: &Path) -> Self {
        let name = artifact_name(phase, main_name);
        let output = out_dir.join(format!("{}.{}", name, ARTIFACT_EXTENSION));
        Self { id: format!("{}:{}", phase, name), phase, name, output }
    }

    /// File name of the artifact, with extension.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, ARTIFACT_EXTENSION)
    }
}

/// Artifact name (without extension) for a phase.
pub fn artifact_name(phase: Phase, main_name: &str) -> String {
    match phase {
        Phase::Main => main_name.to_string(),
        Phase::Editor => format!("{}{}", main_name, EDITOR_SUFFIX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Main.to_string(), "main");
        assert_eq!(Phase::Editor.to_string(), "editor");
    }

    #[test]
    fn test_phase_source_kind() {
        assert_eq!(Phase::Main.source_kind(), SourceKind::Main);
        assert_eq!(Phase::Editor.source_kind(), SourceKind::EditorOnly);
    }

    #[test]
    fn test_main_target() {
        let target = BuildTarget::for_phase(Phase::Main, "Assembly", Path::new("/out"));
        assert_eq!(target.id, "main:Assembly");
        assert_eq!(target.output, PathBuf::from("/out/Assembly.dll"));
        assert_eq!(target.file_name(), "Assembly.dll");
    }

    #[test]
    fn test_editor_target() {
        let target = BuildTarget::for_phase(Phase::Editor, "Assembly", Path::new("/out"));
        assert_eq!(target.id, "editor:Assembly.Editor");
        assert_eq!(target.name, "Assembly.Editor");
        assert_eq!(target.output, PathBuf::from("/out/Assembly.Editor.dll"));
    }
}
