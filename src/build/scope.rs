//! Editor scoping rule shared by source discovery and reference filtering.

use std::path::Path;

/// Directory marker that places a path in editor scope.
pub const EDITOR_MARKER: &str = "Editor";

/// Extension of the source files picked up by discovery.
pub const SOURCE_EXTENSION: &str = "cs";

/// Conditional-compilation symbol forced into every editor build.
pub const EDITOR_DEFINE: &str = "UNITY_EDITOR";

/// Suffix appended to the main artifact name for the editor artifact.
pub const EDITOR_SUFFIX: &str = ".Editor";

/// Extension of produced and referenced artifacts.
pub const ARTIFACT_EXTENSION: &str = "dll";

/// Check whether a path belongs to editor scope.
///
/// This is a case-sensitive substring match on the whole path string, so
/// `Assets/Editor/Tool.cs`, `EditorTools/Foo.cs` and `Managed/UnityEditor.dll`
/// are all editor scoped, while `assets/editor/Foo.cs` is not.
pub fn is_editor_scoped(path: &Path) -> bool {
    path.to_string_lossy().contains(EDITOR_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_directory_is_scoped() {
        assert!(is_editor_scoped(Path::new("/project/Sub/Editor/B.cs")));
        assert!(is_editor_scoped(Path::new("/Managed/UnityEditor.dll")));
    }

    #[test]
    fn test_plain_paths_are_not_scoped() {
        assert!(!is_editor_scoped(Path::new("/project/A.cs")));
        assert!(!is_editor_scoped(Path::new("/Managed/UnityEngine.dll")));
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        assert!(!is_editor_scoped(Path::new("/project/editor/B.cs")));
        assert!(!is_editor_scoped(Path::new("/project/EDITOR/B.cs")));
    }
}
