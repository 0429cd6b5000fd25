//! Source file discovery for the build system.
//!
//! Scans a root directory for `.cs` sources and partitions them into the
//! main bucket and the editor-only bucket.

use crate::build::scope::{is_editor_scoped, SOURCE_EXTENSION};
use glob::glob;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error during source discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Root is missing or not a directory
    #[error("Source root is not a directory: {}", .0.display())]
    InvalidRoot(PathBuf),
    /// A scan was requested before any root was set
    #[error("No source root has been set")]
    NoRoot,
    /// Invalid glob pattern
    #[error("Invalid glob pattern '{0}': {1}")]
    InvalidPattern(String, #[source] glob::PatternError),
    /// IO error during file enumeration
    #[error("IO error during discovery: {0}")]
    Io(#[from] std::io::Error),
}

/// Which artifact a source file is compiled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Compiled into the main artifact
    Main,
    /// Compiled into the editor artifact only
    EditorOnly,
}

impl SourceKind {
    /// Classify a path by the editor marker.
    pub fn classify(path: &Path) -> Self {
        if is_editor_scoped(path) {
            SourceKind::EditorOnly
        } else {
            SourceKind::Main
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Main => write!(f, "main"),
            SourceKind::EditorOnly => write!(f, "editor"),
        }
    }
}

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path, also the identity of the file
    pub path: PathBuf,
    /// File name shown to users
    pub name: String,
    /// Bucket assigned at scan time
    kind: SourceKind,
    /// Whether the file takes part in the next build
    pub include: bool,
}

impl SourceFile {
    /// Create an included source file, classifying it from its path.
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let kind = SourceKind::classify(&path);
        Self { path, name, kind, include: true }
    }

    /// The bucket this file was classified into.
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Path relative to `root`, or the absolute path when outside it.
    pub fn relative_to(&self, root: &Path) -> PathBuf {
        self.path.strip_prefix(root).map(Path::to_path_buf).unwrap_or_else(|_| self.path.clone())
    }
}

/// Recursively find every source file under `root`.
///
/// Files come back in enumeration order.
pub fn discover_files(root: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::InvalidRoot(root.to_path_buf()));
    }

    let base = glob::Pattern::escape(&root.to_string_lossy());
    let pattern = format!("{}/**/*", base);

    let paths = glob(&pattern).map_err(|e| DiscoveryError::InvalidPattern(pattern.clone(), e))?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                if path.is_file() && has_source_extension(&path) {
                    files.push(path);
                }
            }
            Err(e) => {
                // Unreadable subtrees are skipped, not fatal
                tracing::warn!("error reading path during scan: {}", e);
            }
        }
    }

    Ok(files)
}

/// Extension match ignores ASCII case, so `Foo.CS` counts as a source.
fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
}

/// Split files into `(main, editor)` buckets.
///
/// Each bucket is ordered by ascending path length. The sort is stable, so
/// files of equal length keep their enumeration order.
pub fn partition(files: Vec<PathBuf>) -> (Vec<SourceFile>, Vec<SourceFile>) {
    let (mut editor, mut main): (Vec<_>, Vec<_>) = files
        .into_iter()
        .map(SourceFile::new)
        .partition(|f| f.kind() == SourceKind::EditorOnly);

    main.sort_by_key(|f| f.path.as_os_str().len());
    editor.sort_by_key(|f| f.path.as_os_str().len());
    (main, editor)
}

/// Scan `root` and partition the sources found there.
pub fn scan(root: &Path) -> Result<(Vec<SourceFile>, Vec<SourceFile>), DiscoveryError> {
    let root = absolute_root(root)?;
    let files = discover_files(&root)?;
    let (main, editor) = partition(files);
    tracing::debug!(
        root = %root.display(),
        main = main.len(),
        editor = editor.len(),
        "scanned sources"
    );
    Ok((main, editor))
}

fn absolute_root(root: &Path) -> Result<PathBuf, DiscoveryError> {
    if root.is_absolute() {
        Ok(root.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(root))
    }
}

/// The scanned source tree, split into main and editor buckets.
///
/// Repeated scans append; call [`SourceList::clear`] (or use
/// [`SourceList::set_root`]) to start over.
#[derive(Debug, Clone, Default)]
pub struct SourceList {
    root: Option<PathBuf>,
    main: Vec<SourceFile>,
    editor: Vec<SourceFile>,
}

impl SourceList {
    /// Create an empty list with no root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the root, drop previous results and scan the new root.
    pub fn set_root(&mut self, root: impl Into<PathBuf>) -> Result<(), DiscoveryError> {
        let root = absolute_root(&root.into())?;
        self.clear();
        self.root = Some(root);
        self.scan()
    }

    /// Scan the current root, appending to the existing buckets.
    pub fn scan(&mut self) -> Result<(), DiscoveryError> {
        let root = self.root.as_deref().ok_or(DiscoveryError::NoRoot)?;
        let (main, editor) = scan(root)?;
        self.main.extend(main);
        self.editor.extend(editor);
        Ok(())
    }

    /// Drop all scanned files, keeping the root.
    pub fn clear(&mut self) {
        self.main.clear();
        self.editor.clear();
    }

    /// The root last passed to [`SourceList::set_root`].
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Files in one bucket.
    pub fn files(&self, kind: SourceKind) -> &[SourceFile] {
        match kind {
            SourceKind::Main => &self.main,
            SourceKind::EditorOnly => &self.editor,
        }
    }

    /// Mutable access to one bucket, for toggling inclusion.
    pub fn files_mut(&mut self, kind: SourceKind) -> &mut [SourceFile] {
        match kind {
            SourceKind::Main => &mut self.main,
            SourceKind::EditorOnly => &mut self.editor,
        }
    }

    /// Toggle inclusion of the file at `index`. Returns false when out of range.
    pub fn set_included(&mut self, kind: SourceKind, index: usize, include: bool) -> bool {
        match self.files_mut(kind).get_mut(index) {
            Some(file) => {
                file.include = include;
                true
            }
            None => false,
        }
    }

    /// Paths of included files in one bucket, in bucket order.
    pub fn included_sources(&self, kind: SourceKind) -> Vec<PathBuf> {
        self.files(kind).iter().filter(|f| f.include).map(|f| f.path.clone()).collect()
    }

    /// Number of files in the main bucket.
    pub fn main_count(&self) -> usize {
        self.main.len()
    }

    /// Number of files in the editor bucket.
    pub fn editor_count(&self) -> usize {
        self.editor.len()
    }

    /// Total number of scanned files.
    pub fn len(&self) -> usize {
        self.main.len() + self.editor.len()
    }

    /// True when no files have been scanned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(&path).unwrap().write_all(b"class X {}").unwrap();
        path
    }

    #[test]
    fn test_discover_files_recursive() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "a.cs");
        create_test_file(temp.path(), "sub/b.cs");
        create_test_file(temp.path(), "sub/deep/c.cs");
        create_test_file(temp.path(), "sub/notes.txt");

        let files = discover_files(temp.path()).unwrap();
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn test_discover_files_ignores_extension_case() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "Foo.CS");
        create_test_file(temp.path(), "Sub/Bar.Cs");
        create_test_file(temp.path(), "Sub/Baz.csx");

        let mut files = discover_files(temp.path()).unwrap();
        files.sort();
        assert_eq!(files, vec![temp.path().join("Foo.CS"), temp.path().join("Sub/Bar.Cs")]);
    }

    #[test]
    fn test_discover_files_missing_root() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        let result = discover_files(&missing);
        assert!(matches!(result, Err(DiscoveryError::InvalidRoot(_))));
    }

    #[test]
    fn test_scan_rejects_file_root() {
        let temp = TempDir::new().unwrap();
        let file = create_test_file(temp.path(), "a.cs");

        assert!(matches!(scan(&file), Err(DiscoveryError::InvalidRoot(_))));
    }

    #[test]
    fn test_scan_sample_tree() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "A.cs");
        create_test_file(temp.path(), "Sub/Editor/B.cs");

        let (main, editor) = scan(temp.path()).unwrap();
        assert_eq!(main.len(), 1);
        assert_eq!(editor.len(), 1);
        assert_eq!(main[0].relative_to(temp.path()), PathBuf::from("A.cs"));
        assert_eq!(editor[0].relative_to(temp.path()), PathBuf::from("Sub/Editor/B.cs"));
        assert_eq!(editor[0].kind(), SourceKind::EditorOnly);
        assert!(main[0].include && editor[0].include);
    }

    #[test]
    fn test_partition_orders_by_path_length() {
        let files = vec![
            PathBuf::from("/r/deeper/longer.cs"),
            PathBuf::from("/r/b.cs"),
            PathBuf::from("/r/a.cs"),
            PathBuf::from("/r/mid/x.cs"),
        ];

        let (main, editor) = partition(files);
        assert!(editor.is_empty());
        let names: Vec<_> = main.iter().map(|f| f.path.to_string_lossy().into_owned()).collect();
        // equal lengths keep input order
        assert_eq!(names, vec!["/r/b.cs", "/r/a.cs", "/r/mid/x.cs", "/r/deeper/longer.cs"]);
    }

    #[test]
    fn test_partition_is_total_and_exclusive() {
        let temp = TempDir::new().unwrap();
        let all = vec![
            create_test_file(temp.path(), "Runtime/Player.cs"),
            create_test_file(temp.path(), "Runtime/Editor/PlayerInspector.cs"),
            create_test_file(temp.path(), "EditorTools/Menu.cs"),
            create_test_file(temp.path(), "editor/lowercase.cs"),
            create_test_file(temp.path(), "Main.cs"),
        ];

        let (main, editor) = scan(temp.path()).unwrap();
        assert_eq!(main.len() + editor.len(), all.len());
        for path in &all {
            let in_main = main.iter().any(|f| &f.path == path);
            let in_editor = editor.iter().any(|f| &f.path == path);
            assert!(in_main != in_editor, "{} must be in exactly one bucket", path.display());
            assert_eq!(in_editor, is_editor_scoped(path));
        }
    }

    #[test]
    fn test_source_list_rescan_appends() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "A.cs");

        let mut list = SourceList::new();
        list.set_root(temp.path()).unwrap();
        assert_eq!(list.main_count(), 1);

        list.scan().unwrap();
        assert_eq!(list.main_count(), 2);

        list.set_root(temp.path()).unwrap();
        assert_eq!(list.main_count(), 1);
    }

    #[test]
    fn test_source_list_scan_without_root() {
        let mut list = SourceList::new();
        assert!(matches!(list.scan(), Err(DiscoveryError::NoRoot)));
    }

    #[test]
    fn test_included_sources_respects_toggles() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "A.cs");
        create_test_file(temp.path(), "BB.cs");

        let mut list = SourceList::new();
        list.set_root(temp.path()).unwrap();
        assert!(list.set_included(SourceKind::Main, 0, false));
        assert!(!list.set_included(SourceKind::Main, 9, false));

        let sources = list.included_sources(SourceKind::Main);
        assert_eq!(sources.len(), 1);
        assert!(sources[0].ends_with("BB.cs"));
    }
}
