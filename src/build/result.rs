//! Build result types.
//!
//! Contains types for representing the outcome of build phases and of a
//! whole two-phase run.

use crate::build::pipeline::{BuildError, BuildState};
use crate::build::request::DiagnosticsPolicy;
use crate::build::target::{BuildTarget, Phase};
use std::path::PathBuf;
use std::time::Duration;

/// Severity of a compiler diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Fails the build
    Error,
    /// Fails the build when warnings are promoted
    Warning,
    /// Informational message
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Position of a diagnostic in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Source file
    pub file: PathBuf,
    /// 1-based line
    pub line: u32,
    /// 1-based column
    pub column: u32,
}

/// A single message reported by the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity as reported
    pub severity: Severity,
    /// Compiler code (e.g., "CS0246")
    pub code: Option<String>,
    /// Message text
    pub message: String,
    /// Where it was reported, if known
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    /// Create a diagnostic without code or location.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self { severity, code: None, message: message.into(), location: None }
    }

    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Set the compiler code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the source location.
    pub fn with_location(mut self, file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        self.location = Some(SourceLocation { file: file.into(), line, column });
        self
    }

    /// Whether this diagnostic fails a phase under `policy`.
    pub fn is_failure(&self, policy: &DiagnosticsPolicy) -> bool {
        match self.severity {
            Severity::Error => true,
            Severity::Warning => policy.warnings_as_errors,
            Severity::Info => false,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(loc) = &self.location {
            write!(f, "{}({},{}): ", loc.file.display(), loc.line, loc.column)?;
        }
        write!(f, "{}", self.severity)?;
        if let Some(code) = &self.code {
            write!(f, " {}", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Status of a single build phase.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildStatus {
    /// Artifact produced
    Success,
    /// Phase not attempted
    Skipped(String),
    /// Phase failed
    Failed(BuildError),
}

impl BuildStatus {
    /// Check if the status indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, BuildStatus::Success)
    }

    /// Check if the status indicates failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, BuildStatus::Failed(_))
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildStatus::Success => write!(f, "success"),
            BuildStatus::Skipped(reason) => write!(f, "skipped: {}", reason),
            BuildStatus::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Result of running one phase.
#[derive(Debug, Clone)]
pub struct PhaseResult {
    /// Artifact the phase targeted
    pub target: BuildTarget,
    /// Phase status
    pub status: BuildStatus,
    /// Diagnostics reported by the compiler
    pub diagnostics: Vec<Diagnostic>,
    /// Raw compiler output lines
    pub output_log: Vec<String>,
    /// Produced artifact, on success
    pub artifact: Option<PathBuf>,
    /// Phase duration
    pub duration: Duration,
}

impl PhaseResult {
    /// Create a successful result.
    pub fn success(target: BuildTarget, artifact: PathBuf, duration: Duration) -> Self {
        Self {
            target,
            status: BuildStatus::Success,
            diagnostics: vec![],
            output_log: vec![],
            artifact: Some(artifact),
            duration,
        }
    }

    /// Create a skipped result.
    pub fn skipped(target: BuildTarget, reason: impl Into<String>) -> Self {
        Self {
            target,
            status: BuildStatus::Skipped(reason.into()),
            diagnostics: vec![],
            output_log: vec![],
            artifact: None,
            duration: Duration::ZERO,
        }
    }

    /// Create a failed result.
    pub fn failed(target: BuildTarget, error: BuildError, duration: Duration) -> Self {
        Self {
            target,
            status: BuildStatus::Failed(error),
            diagnostics: vec![],
            output_log: vec![],
            artifact: None,
            duration,
        }
    }

    /// Attach compiler diagnostics.
    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Attach raw compiler output.
    pub fn with_output_log(mut self, output_log: Vec<String>) -> Self {
        self.output_log = output_log;
        self
    }

    /// Phase this result belongs to.
    pub fn phase(&self) -> Phase {
        self.target.phase
    }

    /// Check if this result is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The error that failed this phase, if any.
    pub fn error(&self) -> Option<&BuildError> {
        match &self.status {
            BuildStatus::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Diagnostics of error or warning severity.
    pub fn problems(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity != Severity::Info)
    }
}

/// Result of a complete build run.
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Results for each attempted or skipped phase, in order
    pub phases: Vec<PhaseResult>,
    /// Final pipeline state
    pub state: BuildState,
    /// Total build duration
    pub total_duration: Duration,
}

impl Default for BuildResult {
    fn default() -> Self {
        Self { phases: Vec::new(), state: BuildState::Pending, total_duration: Duration::ZERO }
    }
}

impl BuildResult {
    /// Create a new empty build result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a phase result.
    pub fn add_result(&mut self, result: PhaseResult) {
        self.phases.push(result);
    }

    /// Set the total duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.total_duration = duration;
        self
    }

    /// Result of `phase`, if it was recorded.
    pub fn phase(&self, phase: Phase) -> Option<&PhaseResult> {
        self.phases.iter().find(|r| r.phase() == phase)
    }

    /// Check if the overall build succeeded.
    pub fn is_success(&self) -> bool {
        !matches!(self.state, BuildState::Failed(_) | BuildState::Pending)
    }

    /// The failed phase result, if any.
    pub fn failure(&self) -> Option<&PhaseResult> {
        self.phases.iter().find(|r| r.status.is_failure())
    }

    /// All produced artifacts.
    pub fn artifacts(&self) -> Vec<&PathBuf> {
        self.phases.iter().filter_map(|r| r.artifact.as_ref()).collect()
    }

    /// All diagnostics across phases.
    pub fn all_diagnostics(&self) -> Vec<&Diagnostic> {
        self.phases.iter().flat_map(|r| r.diagnostics.iter()).collect()
    }

    /// Format a summary of the build result.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        match self.failure() {
            Some(failed) => {
                lines.push(format!("Build failed: {}", failed.target.file_name()));
                if let Some(err) = failed.error() {
                    lines.push(format!("  {}", err));
                }
                let problems: Vec<_> = failed.problems().collect();
                for diagnostic in problems.iter().take(10) {
                    lines.push(format!("  - {}", diagnostic));
                }
                if problems.len() > 10 {
                    lines.push(format!("  ... and {} more", problems.len() - 10));
                }
            }
            None => {
                let built: Vec<_> = self
                    .phases
                    .iter()
                    .filter(|r| r.is_success())
                    .map(|r| r.target.file_name())
                    .collect();
                lines.push(format!(
                    "Build succeeded: {} in {:?}",
                    if built.is_empty() { "nothing built".to_string() } else { built.join(", ") },
                    self.total_duration
                ));
            }
        }

        for result in &self.phases {
            lines.push(format!("  {} ({}): {}", result.target.file_name(), result.phase(), result.status));
        }

        lines.join("\n")
    }
}
