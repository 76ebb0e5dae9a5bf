#![deny(clippy::print_stderr, clippy::print_stdout)]

//! Shared plumbing for the tsvendor crates.
//!
//! * [`layout`]: where manifests, vendored sources and installed parsers live
//! * [`process`]: logged external command execution behind [`CommandRunner`]

pub mod error;
pub mod layout;
pub mod process;

pub use error::{CommonError, Result};
pub use layout::{CONFIG_FILE_NAME, Layout, LayoutPaths, ROOT_ENV, repo_root};
pub use process::{CommandRunner, CommandSpec, RecordingRunner, SystemRunner, format_command};
