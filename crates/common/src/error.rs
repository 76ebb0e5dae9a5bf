//! Error types for layout discovery and command execution.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the shared plumbing.
#[derive(Debug, Error)]
pub enum CommonError {
	/// The repository root could not be determined.
	#[error("failed to determine git repository root: {0}")]
	RepoRoot(String),

	/// `tsvendor.toml` could not be read.
	#[error("I/O error reading {path}: {error}")]
	ConfigRead {
		/// Path to the configuration file.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// `tsvendor.toml` is not valid.
	#[error("invalid configuration in {path}: {error}")]
	ConfigParse {
		/// Path to the configuration file.
		path: PathBuf,
		/// The TOML decode error.
		error: toml::de::Error,
	},

	/// A command could not be started at all.
	#[error("failed to run `{command}`: {error}")]
	Spawn {
		/// The shell-quoted command line.
		command: String,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// A checked command exited unsuccessfully.
	#[error("command `{command}` failed ({status}){}", stderr_suffix(.stderr))]
	CommandFailed {
		/// The shell-quoted command line.
		command: String,
		/// Exit status description.
		status: String,
		/// Captured standard error, trimmed.
		stderr: String,
	},
}

fn stderr_suffix(stderr: &str) -> String {
	if stderr.is_empty() { String::new() } else { format!(": {stderr}") }
}

/// Result type for shared plumbing operations.
pub type Result<T> = std::result::Result<T, CommonError>;
