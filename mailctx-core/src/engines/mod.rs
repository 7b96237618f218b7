// mailctx-core/src/engines/mod.rs
//! Concrete `TemplateSanitizer` implementations.
//!
//! Each engine lives in its own file and is declared here. The regex engine covers any
//! directive syntax expressible as non-greedy delimiter patterns.

pub mod regex_engine;
