//! Grammars loaded from shared libraries.

use std::path::Path;
use std::sync::Arc;

use libloading::{Library, Symbol};
use tracing::debug;

use crate::builtin::display_name;
use crate::error::{GrammarError, Result};
use crate::language::{GrammarSource, Language};

type LanguageEntry = unsafe extern "C" fn() -> *const ();

/// Returns the exported entry point for a grammar: `tree_sitter_<name>`.
pub fn language_symbol(name: &str) -> String {
	format!("tree_sitter_{}", name.replace('-', "_"))
}

/// Get the library file extension for the current platform.
pub fn library_extension() -> &'static str {
	if cfg!(target_os = "windows") {
		"dll"
	} else if cfg!(target_os = "macos") {
		"dylib"
	} else {
		"so"
	}
}

/// Candidate file names for a grammar library, most specific first.
///
/// `<name>.<ext>` is what `tsvendor sync` installs. `lib<name>.<ext>` covers
/// libraries built by editors that use the linker naming convention.
pub fn library_file_names(name: &str) -> Vec<String> {
	let ext = library_extension();
	let mut names = vec![format!("{name}.{ext}")];
	if !cfg!(target_os = "windows") {
		names.push(format!("lib{}.{ext}", name.replace('-', "_")));
	}
	names
}

/// Loads a grammar from a specific library path.
///
/// The returned handle keeps the library open, so it stays valid for as long
/// as the handle or any clone of it is alive.
pub fn load_library(name: &str, path: &Path) -> Result<Language> {
	// SAFETY: loading a tree-sitter grammar runs no initialisers beyond the
	// C runtime's; generated parsers have no constructors.
	let library = unsafe { Library::new(path) }.map_err(|e| GrammarError::LoadError {
		grammar: display_name(name).to_string(),
		path: path.to_path_buf(),
		reason: e.to_string(),
	})?;

	let symbol = language_symbol(name);
	let raw = {
		// SAFETY: generated parsers export `tree_sitter_<name>` with this signature.
		let entry: Symbol<LanguageEntry> =
			unsafe { library.get(symbol.as_bytes()) }.map_err(|_| GrammarError::MissingSymbol {
				grammar: display_name(name).to_string(),
				path: path.to_path_buf(),
				symbol: symbol.clone(),
			})?;
		// SAFETY: the entry point takes no arguments and returns a static table.
		unsafe { entry() }
	};

	debug!(grammar = name, path = %path.display(), "Loaded grammar library");
	// SAFETY: the table lives inside `library`, which the handle keeps alive.
	let language = unsafe { Language::from_raw(name, GrammarSource::Library(path.to_path_buf()), raw)? };
	Ok(language.with_library(Arc::new(library)))
}
