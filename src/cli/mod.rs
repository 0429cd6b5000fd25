//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod build;
mod prefs;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use crate::build::BuildContext;
use crate::config::loader::{find_config, load_config, merge_cli_overrides, CliOverrides};
use crate::config::ConfigError;
use crate::defines::DefineSet;
use crate::references::ReferenceSet;
use crate::store::{ConfigStore, FileStore};

pub use prefs::{DefinesAction, RefsAction};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// dllb - Build a main and an editor-only DLL from a C# source tree
#[derive(Parser)]
#[command(name = "dllb")]
#[command(about = "Build a main DLL and an editor-only DLL from a tree of C# sources")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Use this dllb.toml instead of searching for one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile the main artifact, then the editor artifact
    Build {
        /// Override source directory
        #[arg(long)]
        src: Option<PathBuf>,

        /// Override output directory (must exist)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Override main artifact name
        #[arg(short, long)]
        name: Option<String>,

        /// Only build the main artifact
        #[arg(long)]
        no_editor: bool,

        /// Host contents directory holding the default references
        #[arg(long)]
        host: Option<PathBuf>,

        /// Compiler executable
        #[arg(long)]
        compiler: Option<String>,

        /// Dry run (print the compiler requests without compiling)
        #[arg(long)]
        dry_run: bool,
    },

    /// List source files split into main and editor buckets
    Scan {
        /// Override source directory
        #[arg(long)]
        src: Option<PathBuf>,
    },

    /// Manage persisted references
    Refs {
        #[command(subcommand)]
        action: RefsAction,
    },

    /// Manage persisted conditional-compilation symbols
    Defines {
        #[command(subcommand)]
        action: DefinesAction,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    crate::logging::init_logging(cli.verbose);

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Build { src, out, name, no_editor, host, compiler, dry_run } => {
            let overrides = CliOverrides {
                out,
                src,
                name,
                editor: if no_editor { Some(false) } else { None },
                host,
                compiler,
            };
            build::run_build(config, &overrides, dry_run)
        }
        Commands::Scan { src } => {
            let overrides = CliOverrides { src, ..Default::default() };
            build::run_scan(config, &overrides)
        }
        Commands::Refs { action } => prefs::run_refs(config, action),
        Commands::Defines { action } => prefs::run_defines(config, action),
    }
}

/// Load configuration and resolve the project root.
///
/// With no explicit path, searches upward for dllb.toml. Without one the
/// current directory is the project root and defaults apply.
pub(crate) fn load_context(
    config_path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<BuildContext, ConfigError> {
    let found = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => find_config(),
    };

    let (mut config, project_root) = match found {
        Some(path) => {
            tracing::info!(config = %path.display(), "using config");
            let config = load_config(Some(&path))?;
            let root = match crate::config::loader::project_root(&path) {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => std::env::current_dir()?,
            };
            (config, root)
        }
        None => {
            tracing::info!("no dllb.toml found, using defaults");
            (crate::config::default_config(), std::env::current_dir()?)
        }
    };

    merge_cli_overrides(&mut config, overrides);
    Ok(BuildContext::new(config, project_root))
}

/// Open the preference store for a project.
pub(crate) fn open_store(context: &BuildContext) -> Arc<dyn ConfigStore> {
    Arc::new(FileStore::new(context.store_path()))
}

/// Load the persisted reference set.
pub(crate) fn load_references(
    context: &BuildContext,
    store: Arc<dyn ConfigStore>,
) -> ReferenceSet {
    let mut references = ReferenceSet::new(store, context.host_contents());
    references.load();
    references
}

/// Load the persisted define set.
pub(crate) fn load_defines(store: Arc<dyn ConfigStore>) -> DefineSet {
    let mut defines = DefineSet::new(store);
    defines.load();
    defines
}
