//! Directive pattern handling for the template sanitizer.
//!
//! Patterns come from `config` and are compiled here into the immutable set that
//! `engines::regex_engine` applies to strings and URLs.

pub mod compiler;
