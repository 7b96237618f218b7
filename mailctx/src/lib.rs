// mailctx/src/lib.rs
//! # mailctx CLI
//!
//! Operator tooling around `mailctx-core`: preview the context a template receives for a
//! client, and check single values against the sanitizer.

pub mod cli;
pub mod commands;
pub mod logger;

pub use commands::preview::{run_preview, PreviewOptions, RenderedEmail};
