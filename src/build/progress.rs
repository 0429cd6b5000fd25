//! Build progress reporting.
//!
//! The pipeline emits one event when a build starts, one per phase start and
//! completion, one per diagnostic, and one when the build ends. Reporters
//! decide how (and whether) to show them.
//!
//! # Example
//!
//! ```ignore
//! use dllbuilder::build::progress::{ConsoleProgress, ProgressEvent, ProgressReporter};
//!
//! let reporter = ConsoleProgress::new();
//! reporter.report(ProgressEvent::BuildStarted { total_phases: 2 });
//! reporter.report(ProgressEvent::PhaseStarted { target_id: "main:Assembly".to_string() });
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Status of a phase in progress events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetStatus {
    /// Artifact produced
    Success,
    /// Phase not attempted
    Skipped,
    /// Phase failed
    Failed(String),
}

impl std::fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetStatus::Success => write!(f, "success"),
            TargetStatus::Skipped => write!(f, "skipped"),
            TargetStatus::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

/// Events that can be reported during a build.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Build process started
    BuildStarted {
        /// Number of phases planned
        total_phases: usize,
    },
    /// A phase started
    PhaseStarted {
        /// Target identifier
        target_id: String,
    },
    /// A phase completed
    PhaseCompleted {
        /// Target identifier
        target_id: String,
        /// Phase status
        status: TargetStatus,
        /// Duration in milliseconds
        duration_ms: u64,
    },
    /// The compiler reported a warning
    Warning {
        /// Target the warning belongs to
        target_id: Option<String>,
        /// Warning text
        message: String,
    },
    /// The compiler reported an error
    Error {
        /// Target the error belongs to
        target_id: Option<String>,
        /// Error text
        message: String,
    },
    /// Build process completed
    BuildCompleted {
        /// Whether the overall build succeeded
        success: bool,
        /// Total duration in milliseconds
        duration_ms: u64,
        /// Number of artifacts built
        built: usize,
        /// Number of phases skipped
        skipped: usize,
    },
}

/// Trait for progress reporters.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event.
    fn report(&self, event: ProgressEvent);
}

/// A progress reporter that discards all events.
#[derive(Debug, Default)]
pub struct NullProgress;

impl NullProgress {
    /// Create a new null progress reporter.
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for NullProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Console progress reporter with optional colors.
pub struct ConsoleProgress {
    use_colors: bool,
    current: AtomicUsize,
    total: AtomicUsize,
    output: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for ConsoleProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleProgress")
            .field("use_colors", &self.use_colors)
            .field("current", &self.current)
            .field("total", &self.total)
            .finish()
    }
}

impl ConsoleProgress {
    /// Create a new console progress reporter writing to stderr.
    pub fn new() -> Self {
        Self {
            use_colors: true,
            current: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            output: Mutex::new(Box::new(std::io::stderr())),
        }
    }

    /// Create a console progress reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self {
            use_colors: false,
            current: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            output: Mutex::new(Box::new(output)),
        }
    }

    /// Set whether to use colors.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{}{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.color(text, "\x1b[32m")
    }

    fn yellow(&self, text: &str) -> String {
        self.color(text, "\x1b[33m")
    }

    fn red(&self, text: &str) -> String {
        self.color(text, "\x1b[31m")
    }

    fn cyan(&self, text: &str) -> String {
        self.color(text, "\x1b[36m")
    }

    fn writeln(&self, line: &str) {
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", line);
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::BuildStarted { total_phases } => {
                self.total.store(total_phases, Ordering::SeqCst);
                self.current.store(0, Ordering::SeqCst);
                self.writeln(&format!(
                    "{} Building {} phase{}...",
                    self.cyan("[build]"),
                    total_phases,
                    if total_phases == 1 { "" } else { "s" }
                ));
            }
            ProgressEvent::PhaseStarted { target_id } => {
                let current = self.current.load(Ordering::SeqCst) + 1;
                let total = self.total.load(Ordering::SeqCst);
                self.writeln(&format!(
                    "{} [{}/{}] Compiling {}...",
                    self.cyan("[build]"),
                    current,
                    total,
                    target_id
                ));
            }
            ProgressEvent::PhaseCompleted { target_id, status, duration_ms } => {
                let current = self.current.fetch_add(1, Ordering::SeqCst) + 1;
                let total = self.total.load(Ordering::SeqCst);

                let status_str = match &status {
                    TargetStatus::Success => self.green("ok"),
                    TargetStatus::Skipped => self.yellow("skipped"),
                    TargetStatus::Failed(_) => self.red("FAILED"),
                };

                self.writeln(&format!(
                    "{} [{}/{}] {} {} ({})",
                    self.cyan("[build]"),
                    current,
                    total,
                    status_str,
                    target_id,
                    format_duration(duration_ms)
                ));

                if let TargetStatus::Failed(err) = status {
                    self.writeln(&format!("        {}", self.red(&err)));
                }
            }
            ProgressEvent::Warning { target_id, message } => {
                let prefix = target_id.map(|id| format!("{}: ", id)).unwrap_or_default();
                self.writeln(&format!("{} {}{}", self.yellow("[warn]"), prefix, message));
            }
            ProgressEvent::Error { target_id, message } => {
                let prefix = target_id.map(|id| format!("{}: ", id)).unwrap_or_default();
                self.writeln(&format!("{} {}{}", self.red("[error]"), prefix, message));
            }
            ProgressEvent::BuildCompleted { success, duration_ms, built, skipped } => {
                if success {
                    self.writeln(&format!(
                        "{} {} artifact{} built, {} skipped in {}",
                        self.green("[done]"),
                        built,
                        if built == 1 { "" } else { "s" },
                        skipped,
                        format_duration(duration_ms)
                    ));
                } else {
                    self.writeln(&format!(
                        "{} Build failed after {}",
                        self.red("[error]"),
                        format_duration(duration_ms)
                    ));
                }
            }
        }
    }
}

/// Format a duration in milliseconds to a human-readable string.
fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60_000;
        let seconds = (ms % 60_000) / 1000;
        format!("{}m {}s", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct TestWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture() -> (Arc<Mutex<Vec<u8>>>, ConsoleProgress) {
        let output = Arc::new(Mutex::new(Vec::new()));
        let reporter = ConsoleProgress::with_output(TestWriter(Arc::clone(&output)));
        (output, reporter)
    }

    fn text(output: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8_lossy(&output.lock().unwrap()).into_owned()
    }

    #[test]
    fn test_target_status_display() {
        assert_eq!(TargetStatus::Success.to_string(), "success");
        assert_eq!(TargetStatus::Skipped.to_string(), "skipped");
        assert_eq!(TargetStatus::Failed("error".to_string()).to_string(), "failed: error");
    }

    #[test]
    fn test_null_progress() {
        let reporter = NullProgress::new();
        reporter.report(ProgressEvent::BuildStarted { total_phases: 2 });
        reporter.report(ProgressEvent::PhaseStarted { target_id: "main:A".to_string() });
    }

    #[test]
    fn test_console_progress_phase_success() {
        let (output, reporter) = capture();
        reporter.report(ProgressEvent::BuildStarted { total_phases: 2 });
        reporter.report(ProgressEvent::PhaseStarted { target_id: "main:Assembly".to_string() });
        reporter.report(ProgressEvent::PhaseCompleted {
            target_id: "main:Assembly".to_string(),
            status: TargetStatus::Success,
            duration_ms: 150,
        });

        let text = text(&output);
        assert!(text.contains("Building 2 phases"));
        assert!(text.contains("[1/2] Compiling main:Assembly"));
        assert!(text.contains("[1/2] ok main:Assembly (150ms)"));
    }

    #[test]
    fn test_console_progress_phase_failed() {
        let (output, reporter) = capture();
        reporter.report(ProgressEvent::BuildStarted { total_phases: 1 });
        reporter.report(ProgressEvent::PhaseCompleted {
            target_id: "main:Assembly".to_string(),
            status: TargetStatus::Failed("1 error".to_string()),
            duration_ms: 50,
        });
        reporter.report(ProgressEvent::Error {
            target_id: Some("main:Assembly".to_string()),
            message: "A.cs(1,1): error CS1002: ; expected".to_string(),
        });

        let text = text(&output);
        assert!(text.contains("FAILED"));
        assert!(text.contains("1 error"));
        assert!(text.contains("[error] main:Assembly: A.cs(1,1)"));
    }

    #[test]
    fn test_console_progress_build_completed() {
        let (output, reporter) = capture();
        reporter.report(ProgressEvent::BuildCompleted {
            success: true,
            duration_ms: 1500,
            built: 2,
            skipped: 0,
        });
        assert!(text(&output).contains("2 artifacts built, 0 skipped in 1.5s"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(500), "500ms");
        assert_eq!(format_duration(1500), "1.5s");
        assert_eq!(format_duration(90_000), "1m 30s");
    }
}
