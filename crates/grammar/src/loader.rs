//! Grammar search paths.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::builtin;
use crate::dynamic::{library_extension, library_file_names, load_library};
use crate::error::{GrammarError, Result};
use crate::language::Language;

/// Environment variable naming an extra runtime directory with a `parser/` subdir.
pub const RUNTIME_ENV: &str = "TSVENDOR_RUNTIME";

/// Resolves grammar names to [`Language`] handles.
///
/// Built-in grammars win over libraries. Libraries are looked up in each
/// search directory in order, trying every name from [`library_file_names`].
#[derive(Debug, Clone)]
pub struct GrammarLoader {
	search_paths: Vec<PathBuf>,
	builtins: bool,
}

impl Default for GrammarLoader {
	/// Searches `$TSVENDOR_RUNTIME/parser`, then `<data-local>/tsvendor/parser`.
	fn default() -> Self {
		let mut paths = Vec::new();
		if let Some(runtime) = std::env::var_os(RUNTIME_ENV).filter(|v| !v.is_empty()) {
			paths.push(PathBuf::from(runtime).join("parser"));
		}
		if let Some(data) = dirs::data_local_dir() {
			paths.push(data.join("tsvendor").join("parser"));
		}
		Self::new(paths)
	}
}

impl GrammarLoader {
	pub fn new(search_paths: impl IntoIterator<Item = PathBuf>) -> Self {
		Self {
			search_paths: search_paths.into_iter().collect(),
			builtins: true,
		}
	}

	/// Puts `dir` ahead of every existing search directory.
	pub fn with_priority_path(mut self, dir: impl Into<PathBuf>) -> Self {
		self.search_paths.insert(0, dir.into());
		self
	}

	/// Only consider shared libraries.
	pub fn without_builtins(mut self) -> Self {
		self.builtins = false;
		self
	}

	pub fn search_paths(&self) -> &[PathBuf] {
		&self.search_paths
	}

	/// Loads a grammar by name.
	///
	/// # Errors
	///
	/// Returns [`GrammarError::NotFound`] if the grammar is neither built in nor
	/// installed, or the validation error of whichever source was found.
	pub fn load(&self, name: &str) -> Result<Language> {
		if self.builtins
			&& let Some(result) = builtin::language(name)
		{
			return result;
		}

		match self.find_library(name) {
			Some(path) => load_library(name, &path),
			None => {
				debug!(grammar = name, paths = ?self.search_paths, "Grammar not found");
				Err(GrammarError::NotFound(builtin::display_name(name).to_string()))
			}
		}
	}

	/// Returns the first existing library file for `name`.
	pub fn find_library(&self, name: &str) -> Option<PathBuf> {
		let candidates = library_file_names(name);
		self.search_paths
			.iter()
			.flat_map(|dir| candidates.iter().map(move |file| dir.join(file)))
			.find(|path| path.is_file())
	}

	/// Lists installed libraries by grammar name, first search path wins.
	pub fn installed(&self) -> BTreeMap<String, PathBuf> {
		let mut found = BTreeMap::new();
		for dir in &self.search_paths {
			let entries = match fs::read_dir(dir) {
				Ok(entries) => entries,
				Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
				Err(e) => {
					warn!(dir = %dir.display(), error = %e, "Cannot read grammar directory");
					continue;
				}
			};
			for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
				if let Some(name) = grammar_name_of(&path) {
					found.entry(name).or_insert(path);
				}
			}
		}
		found
	}
}

fn grammar_name_of(path: &Path) -> Option<String> {
	if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(library_extension()) {
		return None;
	}
	let stem = path.file_stem()?.to_str()?;
	let name = stem.strip_prefix("lib").filter(|s| !s.is_empty()).unwrap_or(stem);
	Some(name.to_string())
}
