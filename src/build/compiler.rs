//! Compiler service boundary.
//!
//! The pipeline never compiles anything itself. It hands a [`BuildRequest`]
//! to a [`CompilerService`] and interprets the [`CompileOutput`] it gets
//! back. [`ProcessCompiler`] drives a Mono/Roslyn style command-line compiler
//! (`mcs`, `csc`).

use crate::build::request::BuildRequest;
use crate::build::result::{Diagnostic, Severity};
use regex::Regex;
use std::path::PathBuf;
use std::process::Command;
use std::sync::LazyLock;
use thiserror::Error;

/// Failure to run the compiler at all (as opposed to compile errors).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilerError {
    /// The compiler program could not be started
    #[error("failed to start compiler '{program}': {message}")]
    Spawn {
        /// Program that was invoked
        program: String,
        /// OS error text
        message: String,
    },
    /// The invocation was cancelled by a wrapping service
    #[error("compiler invocation cancelled: {0}")]
    Cancelled(String),
}

/// What the compiler reported for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutput {
    /// Parsed diagnostics
    pub diagnostics: Vec<Diagnostic>,
    /// Raw output lines, verbatim
    pub output_log: Vec<String>,
    /// Artifact written, if any
    pub artifact: Option<PathBuf>,
}

impl CompileOutput {
    /// Output with no diagnostics that produced `artifact`.
    pub fn produced(artifact: impl Into<PathBuf>) -> Self {
        Self { artifact: Some(artifact.into()), ..Default::default() }
    }

    /// Output carrying only diagnostics.
    pub fn with_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics, ..Default::default() }
    }
}

/// External compiler invoked once per build phase.
///
/// Calls are synchronous. A service that supports cancellation reports a
/// cancelled call as [`CompilerError::Cancelled`].
pub trait CompilerService {
    /// Compile `request`, blocking until the compiler finishes.
    fn compile(&self, request: &BuildRequest) -> Result<CompileOutput, CompilerError>;
}

impl<T: CompilerService + ?Sized> CompilerService for &T {
    fn compile(&self, request: &BuildRequest) -> Result<CompileOutput, CompilerError> {
        (**self).compile(request)
    }
}

/// Default compiler program.
pub const DEFAULT_COMPILER: &str = "mcs";

/// Runs a command-line C# compiler as a child process.
#[derive(Debug, Clone)]
pub struct ProcessCompiler {
    program: String,
    leading_args: Vec<String>,
}

impl Default for ProcessCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_COMPILER)
    }
}

impl ProcessCompiler {
    /// Compiler invoking `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), leading_args: Vec::new() }
    }

    /// Arguments placed before the generated ones (e.g., a wrapper script).
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.leading_args = args;
        self
    }

    /// Program this compiler runs.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument list for `request`, including leading arguments.
    pub fn command_args(&self, request: &BuildRequest) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.push("-target:library".to_string());
        args.push("-nologo".to_string());
        args.push(format!("-out:{}", request.output.display()));
        if request.optimize {
            args.push("-optimize+".to_string());
        }
        if request.policy.warnings_as_errors {
            args.push("-warnaserror+".to_string());
        }
        args.push(format!("-warn:{}", request.policy.warning_level));
        if !request.defines.is_empty() {
            args.push(format!("-define:{}", request.defines.join(";")));
        }
        for reference in &request.references {
            args.push(format!("-r:{}", reference.display()));
        }
        for source in &request.sources {
            args.push(source.display().to_string());
        }
        args
    }
}

impl CompilerService for ProcessCompiler {
    fn compile(&self, request: &BuildRequest) -> Result<CompileOutput, CompilerError> {
        let args = self.command_args(request);
        tracing::debug!(program = %self.program, args = ?args, "invoking compiler");

        let output = Command::new(&self.program).args(&args).output().map_err(|e| {
            CompilerError::Spawn { program: self.program.clone(), message: e.to_string() }
        })?;

        let mut output_log: Vec<String> = Vec::new();
        for stream in [&output.stdout, &output.stderr] {
            output_log.extend(
                String::from_utf8_lossy(stream)
                    .lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(str::to_string),
            );
        }

        let mut diagnostics = parse_diagnostics(&output_log);

        // A failing exit must never read as success.
        if !output.status.success() && !diagnostics.iter().any(|d| d.severity == Severity::Error)
        {
            diagnostics.push(Diagnostic::error(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        let artifact = if output.status.success() && request.output.is_file() {
            Some(request.output.clone())
        } else {
            None
        };

        Ok(CompileOutput { diagnostics, output_log, artifact })
    }
}

/// `file(line,col): error CS0001: message`
static LOCATED_DIAGNOSTIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<file>.+?)\((?P<line>\d+),(?P<col>\d+)\):\s*(?P<sev>error|warning|info)\s+(?P<code>[A-Z]+\d+):\s*(?P<msg>.*)$",
    )
    .expect("Invalid located diagnostic regex")
});

/// `error CS2001: message`
static BARE_DIAGNOSTIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<sev>error|warning|info)\s+(?P<code>[A-Z]+\d+):\s*(?P<msg>.*)$")
        .expect("Invalid bare diagnostic regex")
});

fn parse_severity(text: &str) -> Severity {
    match text {
        "error" => Severity::Error,
        "warning" => Severity::Warning,
        _ => Severity::Info,
    }
}

/// Parse compiler output lines into diagnostics.
///
/// Understands `file(line,col): error CS0001: message` and the location-less
/// `error CS2001: message`. Other lines (banners, totals) are ignored.
pub fn parse_diagnostics(lines: &[String]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for line in lines {
        let line = line.trim();
        if let Some(caps) = LOCATED_DIAGNOSTIC.captures(line) {
            let line_no = caps["line"].parse().unwrap_or(0);
            let col_no = caps["col"].parse().unwrap_or(0);
            diagnostics.push(
                Diagnostic::new(parse_severity(&caps["sev"]), caps["msg"].trim())
                    .with_code(&caps["code"])
                    .with_location(&caps["file"], line_no, col_no),
            );
        } else if let Some(caps) = BARE_DIAGNOSTIC.captures(line) {
            diagnostics.push(
                Diagnostic::new(parse_severity(&caps["sev"]), caps["msg"].trim())
                    .with_code(&caps["code"]),
            );
        }
    }

    diagnostics
}
