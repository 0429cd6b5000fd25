//! Build command implementations (build, scan)

use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use crate::build::{
    BuildContext, BuildPipeline, ConsoleProgress, ProcessCompiler, SourceKind, SourceList,
};
use crate::config::CliOverrides;

use super::{load_context, load_defines, load_references, open_store, EXIT_ERROR, EXIT_SUCCESS};

fn scan_sources(context: &BuildContext) -> Option<SourceList> {
    let mut sources = SourceList::new();
    match sources.set_root(context.src_dir()) {
        Ok(()) => Some(sources),
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Create the directory or specify a different path with --src");
            None
        }
    }
}

/// Run the build command
pub fn run_build(config: Option<&Path>, overrides: &CliOverrides, dry_run: bool) -> ExitCode {
    let context = match load_context(config, overrides) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let Some(sources) = scan_sources(&context) else {
        return ExitCode::from(EXIT_ERROR);
    };

    let store = open_store(&context);
    let references = load_references(&context, store.clone());
    let defines = load_defines(store);

    let pipeline = BuildPipeline::new(&context, &sources, &references, &defines);

    if dry_run {
        println!("Dry run - would build:");
        println!("  Source: {}", context.src_dir().display());
        println!("  Output: {}", context.out_dir().display());

        for phase in pipeline.planned_phases() {
            println!();
            match pipeline.assemble_request(phase) {
                Ok(request) => {
                    println!("  [{}] {}", phase, request.output.display());
                    println!("    Sources ({}):", request.sources.len());
                    for source in &request.sources {
                        println!("      {}", source.display());
                    }
                    println!("    References ({}):", request.references.len());
                    for reference in &request.references {
                        println!("      {}", reference.display());
                    }
                    println!("    Defines: {}", request.defines.join(";"));
                }
                Err(e) => println!("  [{}] would fail: {}", phase, e),
            }
        }
        return ExitCode::from(EXIT_SUCCESS);
    }

    let compiler_config = &context.config().compiler;
    let compiler = ProcessCompiler::new(compiler_config.program.clone())
        .with_args(compiler_config.args.clone());
    let progress = ConsoleProgress::new().with_colors(std::io::stderr().is_terminal());

    let result = pipeline.with_reporter(Arc::new(progress)).run(&compiler);

    if result.is_success() {
        println!("{}", result.summary());
        ExitCode::from(EXIT_SUCCESS)
    } else {
        eprintln!("{}", result.summary());
        ExitCode::from(EXIT_ERROR)
    }
}

/// Run the scan command
pub fn run_scan(config: Option<&Path>, overrides: &CliOverrides) -> ExitCode {
    let context = match load_context(config, overrides) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let Some(sources) = scan_sources(&context) else {
        return ExitCode::from(EXIT_ERROR);
    };
    let root = sources.root().map(Path::to_path_buf).unwrap_or_else(|| context.src_dir());

    for (title, kind) in [("Main", SourceKind::Main), ("Editor", SourceKind::EditorOnly)] {
        let files = sources.files(kind);
        println!("{} ({}):", title, files.len());
        for file in files {
            println!("  {}", file.relative_to(&root).display());
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}
