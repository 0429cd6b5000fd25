//! Build pipeline module for dllbuilder
//!
//! Turns a tree of `.cs` sources into a main artifact and an editor-only
//! artifact by driving an external compiler twice.
//!
//! # Overview
//!
//! The build pipeline consists of:
//! - **Discovery**: Scan the source root and partition files by editor scope
//! - **Assembly**: Build one compiler request per phase from sources,
//!   references and defines
//! - **Execution**: Invoke the compiler service, main phase first
//!
//! # Example
//!
//! ```ignore
//! use dllbuilder::build::{BuildContext, BuildPipeline, ProcessCompiler, SourceList};
//! use dllbuilder::config::load_config;
//!
//! let config = load_config(None)?;
//! let context = BuildContext::new(config, project_root);
//! let mut sources = SourceList::new();
//! sources.set_root(context.src_dir())?;
//!
//! let pipeline = BuildPipeline::new(&context, &sources, &references, &defines);
//! let result = pipeline.run(&ProcessCompiler::default());
//! println!("{}", result.summary());
//! ```

pub mod compiler;
pub mod context;
pub mod discovery;
pub mod pipeline;
pub mod progress;
pub mod request;
pub mod result;
pub mod scope;
pub mod target;

pub use compiler::*;
pub use context::*;
pub use discovery::*;
pub use pipeline::*;
pub use progress::*;
pub use request::*;
pub use result::*;
pub use scope::*;
pub use target::*;
