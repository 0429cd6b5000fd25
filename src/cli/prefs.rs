//! Preference commands (refs, defines)

use clap::Subcommand;
use std::path::Path;
use std::process::ExitCode;

use crate::config::CliOverrides;

use super::{
    load_context, load_defines, load_references, open_store, EXIT_ERROR, EXIT_INVALID_ARGS,
    EXIT_SUCCESS,
};

#[derive(Subcommand)]
pub enum RefsAction {
    /// List references in build order
    List,
    /// Add a reference artifact
    Add {
        /// Path to the artifact (stored exactly as given)
        path: String,
    },
    /// Remove the reference at an index shown by `list`
    Remove {
        /// Index of the reference
        index: usize,
    },
}

#[derive(Subcommand)]
pub enum DefinesAction {
    /// List conditional-compilation symbols
    List,
    /// Add a symbol
    Add {
        /// Symbol name
        flag: String,
    },
    /// Remove the symbol at an index shown by `list`
    Remove {
        /// Index of the symbol
        index: usize,
    },
}

/// Execute the refs command
pub fn run_refs(config: Option<&Path>, action: RefsAction) -> ExitCode {
    let context = match load_context(config, &CliOverrides::default()) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let mut references = load_references(&context, open_store(&context));

    match action {
        RefsAction::List => {
            if references.is_empty() {
                println!("No references");
            }
            for (index, entry) in references.entries().iter().enumerate() {
                let scope = if entry.is_editor_only() { "  (editor)" } else { "" };
                println!("{:>3}  {}{}", index, entry.path, scope);
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        RefsAction::Add { path } => match references.add(&path) {
            Ok(true) => {
                println!("Added {}", path);
                ExitCode::from(EXIT_SUCCESS)
            }
            Ok(false) => {
                println!("Already present: {}", path);
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        },
        RefsAction::Remove { index } => match references.remove(index) {
            Ok(Some(entry)) => {
                println!("Removed {}", entry.path);
                ExitCode::from(EXIT_SUCCESS)
            }
            Ok(None) => {
                eprintln!("Error: no reference at index {} ({} listed)", index, references.len());
                ExitCode::from(EXIT_INVALID_ARGS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        },
    }
}

/// Execute the defines command
pub fn run_defines(config: Option<&Path>, action: DefinesAction) -> ExitCode {
    let context = match load_context(config, &CliOverrides::default()) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let mut defines = load_defines(open_store(&context));

    match action {
        DefinesAction::List => {
            for (index, symbol) in defines.list().iter().enumerate() {
                println!("{:>3}  {}", index, symbol);
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        DefinesAction::Add { flag } => match defines.add(&flag) {
            Ok(true) => {
                println!("Added {}", flag.trim());
                ExitCode::from(EXIT_SUCCESS)
            }
            Ok(false) => {
                println!("Not added: '{}' is empty or already present", flag);
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        },
        DefinesAction::Remove { index } => match defines.remove(index) {
            Ok(Some(symbol)) => {
                println!("Removed {}", symbol);
                ExitCode::from(EXIT_SUCCESS)
            }
            Ok(None) => {
                eprintln!("Error: no define at index {} ({} listed)", index, defines.len());
                ExitCode::from(EXIT_INVALID_ARGS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        },
    }
}
