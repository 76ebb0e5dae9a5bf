//! The validated grammar handle.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use libloading::Library;
use tree_sitter_language::LanguageFn;

use crate::builtin::display_name;
use crate::error::{GrammarError, Result};

/// Newest grammar ABI this crate understands.
pub const ABI_VERSION: u32 = 15;

/// Oldest grammar ABI this crate understands.
pub const MIN_COMPATIBLE_ABI_VERSION: u32 = 13;

/// Table sizes reported by the tree-sitter runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
	pub abi_version: u32,
	/// Symbols plus aliases.
	pub node_kind_count: usize,
	pub parse_state_count: usize,
	pub field_count: usize,
}

/// Where a grammar was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarSource {
	/// Compiled into the binary.
	Builtin,
	/// Loaded from a shared library at the given path.
	Library(PathBuf),
}

impl fmt::Display for GrammarSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			GrammarSource::Builtin => f.write_str("builtin"),
			GrammarSource::Library(path) => write!(f, "{}", path.display()),
		}
	}
}

/// A loaded, non-null grammar with a supported ABI.
///
/// Cloning is cheap. Handles loaded from a shared library keep that library
/// mapped until the last clone is dropped.
#[derive(Clone)]
pub struct Language {
	name: Arc<str>,
	source: GrammarSource,
	inner: tree_sitter::Language,
	// Declared after `inner` so the table is released before its library.
	library: Option<Arc<Library>>,
}

impl Language {
	/// Calls a binding's language function and validates the result.
	pub fn from_fn(name: &str, language_fn: LanguageFn) -> Result<Self> {
		// SAFETY: a LanguageFn wraps a generated `tree_sitter_<name>` entry
		// point, which takes no arguments and returns a static TSLanguage.
		let raw = unsafe { (language_fn.into_raw())() };
		// SAFETY: non-null results of a language function point at a TSLanguage.
		unsafe { Self::from_raw(name, GrammarSource::Builtin, raw) }
	}

	/// Wraps a raw grammar handle.
	///
	/// # Errors
	///
	/// * [`GrammarError::NullHandle`] if `raw` is null.
	/// * [`GrammarError::IncompatibleAbi`] if the grammar's ABI version is unsupported.
	///
	/// # Safety
	///
	/// A non-null `raw` must point at a `TSLanguage` that stays valid for as
	/// long as the returned handle (and its clones) live.
	pub unsafe fn from_raw(name: &str, source: GrammarSource, raw: *const ()) -> Result<Self> {
		if raw.is_null() {
			return Err(GrammarError::NullHandle {
				grammar: display_name(name).to_string(),
			});
		}
		// SAFETY: checked non-null above; validity is the caller's contract.
		let inner = unsafe { tree_sitter::Language::from_raw(raw.cast::<tree_sitter::ffi::TSLanguage>()) };

		let version = inner.abi_version();
		if !(MIN_COMPATIBLE_ABI_VERSION as usize..=ABI_VERSION as usize).contains(&version) {
			return Err(GrammarError::IncompatibleAbi {
				grammar: display_name(name).to_string(),
				version: u32::try_from(version).unwrap_or(u32::MAX),
			});
		}

		tracing::trace!(grammar = name, abi = version, source = %source, "Grammar handle validated");
		Ok(Self {
			name: Arc::from(name),
			source,
			inner,
			library: None,
		})
	}

	/// Ties the handle's lifetime to the library it was loaded from.
	pub(crate) fn with_library(mut self, library: Arc<Library>) -> Self {
		self.library = Some(library);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn source(&self) -> &GrammarSource {
		&self.source
	}

	/// The runtime's view of the grammar, for handing to a `tree_sitter::Parser`.
	pub fn tree_sitter(&self) -> &tree_sitter::Language {
		&self.inner
	}

	/// Returns the raw `const TSLanguage *`.
	pub fn as_ptr(&self) -> *const () {
		self.inner.clone().into_raw().cast()
	}

	pub fn abi_version(&self) -> u32 {
		// The range check in `from_raw` keeps this in bounds.
		self.inner.abi_version() as u32
	}

	pub fn info(&self) -> LanguageInfo {
		LanguageInfo {
			abi_version: self.abi_version(),
			node_kind_count: self.inner.node_kind_count(),
			parse_state_count: self.inner.parse_state_count(),
			field_count: self.inner.field_count(),
		}
	}
}

impl PartialEq for Language {
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl Eq for Language {}

impl fmt::Debug for Language {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Language")
			.field("name", &self.name)
			.field("source", &self.source)
			.field("abi_version", &self.abi_version())
			.field("library", &self.library.is_some())
			.finish()
	}
}
