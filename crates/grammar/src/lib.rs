#![deny(clippy::print_stderr, clippy::print_stdout)]

//! Tree-sitter grammar handles.
//!
//! A grammar is the static parse table a generated `parser.c` exposes through
//! its `tree_sitter_<name>()` entry point. This crate obtains that table,
//! either from a binding compiled into the binary or from a shared library
//! built by `tsvendor sync`, and checks that it is usable before handing out a
//! [`Language`].
//!
//! # Architecture
//!
//! * [`language`]: the validated [`Language`] handle over `tree_sitter::Language`
//! * [`builtin`]: grammars compiled in through their published binding crates
//! * [`dynamic`]: loading `tree_sitter_<name>` out of a shared library
//! * [`loader`]: search path resolution over built-ins and installed libraries
//! * [`check`]: the load check run by `tsvendor grammar check`

pub mod builtin;
pub mod check;
pub mod dynamic;
pub mod error;
pub mod language;
pub mod loader;

pub use check::{CheckOutcome, CheckStatus, check_grammar, check_grammars};
pub use dynamic::{language_symbol, library_extension, library_file_names, load_library};
pub use error::{GrammarError, Result};
pub use language::{ABI_VERSION, GrammarSource, Language, LanguageInfo, MIN_COMPATIBLE_ABI_VERSION};
pub use loader::{GrammarLoader, RUNTIME_ENV};
