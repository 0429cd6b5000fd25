//! Build requests handed to the compiler service.

use std::path::PathBuf;

/// Warning level requested from the compiler: report everything.
pub const WARNING_LEVEL: u8 = 1;

/// How the compiler treats diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticsPolicy {
    /// Promote warnings to errors
    pub warnings_as_errors: bool,
    /// Warning level passed to the compiler
    pub warning_level: u8,
}

impl Default for DiagnosticsPolicy {
    fn default() -> Self {
        Self { warnings_as_errors: true, warning_level: WARNING_LEVEL }
    }
}

/// Snapshot of everything one compiler invocation needs.
///
/// Built fresh for every phase and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Artifact to write
    pub output: PathBuf,
    /// Source files, in compile order
    pub sources: Vec<PathBuf>,
    /// Artifacts to reference
    pub references: Vec<PathBuf>,
    /// Conditional-compilation symbols
    pub defines: Vec<String>,
    /// Diagnostics policy
    pub policy: DiagnosticsPolicy,
    /// Request an optimized build
    pub optimize: bool,
}

impl BuildRequest {
    /// Create a request with the fixed policy and optimization on.
    pub fn new(
        output: PathBuf,
        sources: Vec<PathBuf>,
        references: Vec<PathBuf>,
        defines: Vec<String>,
    ) -> Self {
        Self {
            output,
            sources,
            references,
            defines,
            policy: DiagnosticsPolicy::default(),
            optimize: true,
        }
    }
}
