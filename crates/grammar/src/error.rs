//! Errors that can occur when loading a grammar.

use std::path::PathBuf;

use thiserror::Error;

/// A grammar could not be turned into a usable [`Language`](crate::Language).
///
/// `grammar` fields hold the display name (`CUDA`, `Regex`, or the plain
/// grammar name), so every message reads `Error loading <name> grammar: ...`.
#[derive(Error, Debug)]
pub enum GrammarError {
	/// The language function returned a null pointer.
	#[error("Error loading {grammar} grammar: language function returned a null handle")]
	NullHandle { grammar: String },

	/// The grammar was generated for an ABI this runtime cannot read.
	#[error(
		"Error loading {grammar} grammar: incompatible ABI version {version} (supported {}..={})",
		crate::MIN_COMPATIBLE_ABI_VERSION,
		crate::ABI_VERSION
	)]
	IncompatibleAbi { grammar: String, version: u32 },

	/// Not compiled in and not present in any search path.
	#[error("Error loading {0} grammar: not found in any search path")]
	NotFound(String),

	/// The shared library could not be opened.
	#[error("Error loading {grammar} grammar: failed to open {}: {reason}", .path.display())]
	LoadError { grammar: String, path: PathBuf, reason: String },

	/// The shared library does not export the language function.
	#[error("Error loading {grammar} grammar: {} has no symbol {symbol}", .path.display())]
	MissingSymbol { grammar: String, path: PathBuf, symbol: String },

	/// Filesystem I/O error while scanning search paths.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

/// Result type for grammar loading.
pub type Result<T> = std::result::Result<T, GrammarError>;
