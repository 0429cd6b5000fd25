//! Build pipeline orchestration.
//!
//! The pipeline turns the scanned sources, the reference set and the define
//! set into one [`BuildRequest`] per phase and hands each to a
//! [`CompilerService`]. Phases run strictly in order: the editor phase only
//! runs once the main phase has produced its artifact.

use crate::build::compiler::{CompilerError, CompilerService};
use crate::build::context::BuildContext;
use crate::build::discovery::SourceList;
use crate::build::progress::{NullProgress, ProgressEvent, ProgressReporter, TargetStatus};
use crate::build::request::BuildRequest;
use crate::build::result::{BuildResult, BuildStatus, PhaseResult, Severity};
use crate::build::target::{BuildTarget, Phase};
use crate::defines::DefineSet;
use crate::references::ReferenceSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Error that fails a build phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BuildError {
    /// The scanned source root is gone or is not a directory
    #[error("source root is not a directory: {}", .0.display())]
    InvalidRoot(PathBuf),
    /// The output directory does not exist
    #[error("output directory does not exist: {}", .0.display())]
    MissingOutputDir(PathBuf),
    /// The phase has no included source files
    #[error("no source files included for {artifact}")]
    NoSources {
        /// Artifact file name
        artifact: String,
    },
    /// The compiler reported errors (including promoted warnings)
    #[error("compilation of {artifact} failed with {errors} error(s)")]
    CompilationFailed {
        /// Artifact file name
        artifact: String,
        /// Number of failing diagnostics
        errors: usize,
    },
    /// The compiler reported no errors but wrote nothing
    #[error("compiler reported success but did not write {artifact}")]
    NoArtifact {
        /// Artifact file name
        artifact: String,
    },
    /// The compiler could not be run
    #[error("could not compile {artifact}: {source}")]
    Compiler {
        /// Artifact file name
        artifact: String,
        /// Underlying service failure
        #[source]
        source: CompilerError,
    },
}

/// Where a two-phase build stands.
///
/// `Pending -> MainBuilt -> EditorBuilt`, with `Failed` reachable from
/// either build step. A build that skips the editor phase ends in
/// `MainBuilt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// Nothing built yet
    Pending,
    /// Main artifact produced
    MainBuilt,
    /// Both artifacts produced
    EditorBuilt,
    /// The given phase failed
    Failed(Phase),
}

impl std::fmt::Display for BuildState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildState::Pending => write!(f, "pending"),
            BuildState::MainBuilt => write!(f, "main built"),
            BuildState::EditorBuilt => write!(f, "editor built"),
            BuildState::Failed(phase) => write!(f, "{} phase failed", phase),
        }
    }
}

/// Whether the main artifact can be referenced by the editor phase.
///
/// Presence only: a stale artifact left by an earlier build also counts.
pub fn main_artifact_available(path: &Path) -> bool {
    path.is_file()
}

/// Build pipeline for a two-phase build.
pub struct BuildPipeline<'a> {
    context: &'a BuildContext,
    sources: &'a SourceList,
    references: &'a ReferenceSet,
    defines: &'a DefineSet,
    reporter: Arc<dyn ProgressReporter>,
}

impl<'a> BuildPipeline<'a> {
    /// Create a new build pipeline over borrowed build inputs.
    pub fn new(
        context: &'a BuildContext,
        sources: &'a SourceList,
        references: &'a ReferenceSet,
        defines: &'a DefineSet,
    ) -> Self {
        Self { context, sources, references, defines, reporter: Arc::new(NullProgress) }
    }

    /// Report progress events to `reporter`.
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Phases a full run will go through, in order.
    pub fn planned_phases(&self) -> Vec<Phase> {
        if self.context.build_editor() {
            vec![Phase::Main, Phase::Editor]
        } else {
            vec![Phase::Main]
        }
    }

    fn source_root(&self) -> PathBuf {
        self.sources.root().map(Path::to_path_buf).unwrap_or_else(|| self.context.src_dir())
    }

    /// Assemble the compiler request for `phase`.
    ///
    /// Fails without touching the filesystem beyond existence checks.
    pub fn assemble_request(&self, phase: Phase) -> Result<BuildRequest, BuildError> {
        let target = self.context.target(phase);

        let out_dir = self.context.out_dir();
        if !out_dir.is_dir() {
            return Err(BuildError::MissingOutputDir(out_dir));
        }

        let root = self.source_root();
        if !root.is_dir() {
            return Err(BuildError::InvalidRoot(root));
        }

        let sources = self.sources.included_sources(phase.source_kind());
        if sources.is_empty() {
            return Err(BuildError::NoSources { artifact: target.file_name() });
        }

        let mut references = self.references.paths_for(phase.is_editor());
        if phase.is_editor() {
            let main_artifact = self.context.target(Phase::Main).output;
            if main_artifact_available(&main_artifact) {
                if !references.contains(&main_artifact) {
                    tracing::debug!(artifact = %main_artifact.display(), "referencing main artifact");
                    references.push(main_artifact);
                }
            } else {
                tracing::warn!(
                    artifact = %main_artifact.display(),
                    "main artifact not found, editor build will not reference it"
                );
            }
        }

        let defines = self.defines.active_for(phase.is_editor());

        Ok(BuildRequest::new(target.output, sources, references, defines))
    }

    /// Run one phase against `compiler`.
    pub fn build_phase(&self, phase: Phase, compiler: &dyn CompilerService) -> PhaseResult {
        let target = self.context.target(phase);
        self.reporter.report(ProgressEvent::PhaseStarted { target_id: target.id.clone() });

        let result = self.execute_phase(target, compiler);

        for diagnostic in result.problems() {
            let target_id = Some(result.target.id.clone());
            let message = diagnostic.to_string();
            self.reporter.report(match diagnostic.severity {
                Severity::Error => ProgressEvent::Error { target_id, message },
                _ => ProgressEvent::Warning { target_id, message },
            });
        }
        self.report_completed(&result);
        result
    }

    fn execute_phase(&self, target: BuildTarget, compiler: &dyn CompilerService) -> PhaseResult {
        let start = Instant::now();
        let artifact = target.file_name();

        let request = match self.assemble_request(target.phase) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(phase = %target.phase, error = %e, "phase not started");
                return PhaseResult::failed(target, e, start.elapsed());
            }
        };

        tracing::info!(
            phase = %target.phase,
            artifact = %artifact,
            sources = request.sources.len(),
            references = request.references.len(),
            "compiling"
        );

        let output = match compiler.compile(&request) {
            Ok(output) => output,
            Err(source) => {
                tracing::error!(phase = %target.phase, error = %source, "compiler unavailable");
                return PhaseResult::failed(
                    target,
                    BuildError::Compiler { artifact, source },
                    start.elapsed(),
                );
            }
        };

        let errors = output.diagnostics.iter().filter(|d| d.is_failure(&request.policy)).count();
        let duration = start.elapsed();

        let result = if errors > 0 {
            tracing::error!(phase = %target.phase, artifact = %artifact, errors, "compilation failed");
            PhaseResult::failed(target, BuildError::CompilationFailed { artifact, errors }, duration)
        } else {
            match output.artifact {
                Some(path) => {
                    tracing::info!(phase = %target.phase, artifact = %path.display(), "built");
                    PhaseResult::success(target, path, duration)
                }
                None => PhaseResult::failed(target, BuildError::NoArtifact { artifact }, duration),
            }
        };

        result.with_diagnostics(output.diagnostics).with_output_log(output.output_log)
    }

    fn report_completed(&self, result: &PhaseResult) {
        let status = match &result.status {
            BuildStatus::Success => TargetStatus::Success,
            BuildStatus::Skipped(_) => TargetStatus::Skipped,
            BuildStatus::Failed(e) => TargetStatus::Failed(e.to_string()),
        };
        self.reporter.report(ProgressEvent::PhaseCompleted {
            target_id: result.target.id.clone(),
            status,
            duration_ms: result.duration.as_millis() as u64,
        });
    }

    fn skip(&self, phase: Phase, reason: &str) -> PhaseResult {
        tracing::info!(phase = %phase, reason, "phase skipped");
        let result = PhaseResult::skipped(self.context.target(phase), reason);
        self.report_completed(&result);
        result
    }

    /// Run the whole build: main phase, then the editor phase when enabled.
    ///
    /// A failed main phase is terminal and the compiler is not invoked
    /// again. An editor phase with no editor sources at all is skipped.
    pub fn run(&self, compiler: &dyn CompilerService) -> BuildResult {
        let start = Instant::now();
        let phases = self.planned_phases();
        self.reporter.report(ProgressEvent::BuildStarted { total_phases: phases.len() });

        let mut result = BuildResult::new();

        let main = self.build_phase(Phase::Main, compiler);
        result.state =
            if main.is_success() { BuildState::MainBuilt } else { BuildState::Failed(Phase::Main) };
        result.add_result(main);

        if phases.contains(&Phase::Editor) {
            let editor = if result.state != BuildState::MainBuilt {
                self.skip(Phase::Editor, "main phase failed")
            } else if self.sources.editor_count() == 0 {
                self.skip(Phase::Editor, "no editor sources")
            } else {
                let editor = self.build_phase(Phase::Editor, compiler);
                result.state = if editor.is_success() {
                    BuildState::EditorBuilt
                } else {
                    BuildState::Failed(Phase::Editor)
                };
                editor
            };
            result.add_result(editor);
        }

        let result = result.with_duration(start.elapsed());

        let built = result.phases.iter().filter(|r| r.is_success()).count();
        let skipped =
            result.phases.iter().filter(|r| matches!(r.status, BuildStatus::Skipped(_))).count();
        self.reporter.report(ProgressEvent::BuildCompleted {
            success: result.is_success(),
            duration_ms: result.total_duration.as_millis() as u64,
            built,
            skipped,
        });

        tracing::debug!(state = %result.state, "build finished");
        result
    }
}
