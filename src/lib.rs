//! dllbuilder - Two-phase DLL build orchestration
//!
//! This library provides functionality to:
//! - Partition a C# source tree into main and editor-only buckets
//! - Keep persisted reference and define lists
//! - Drive an external compiler to produce a main artifact and an
//!   editor artifact that references it

pub mod build;
pub mod cli;
pub mod config;
pub mod defines;
pub mod logging;
pub mod references;
pub mod store;
