//! dllb - Command-line tool for building a main and an editor-only DLL

use std::process::ExitCode;

use dllbuilder::cli;

fn main() -> ExitCode {
    cli::run()
}
