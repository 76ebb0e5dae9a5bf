//! Grammars compiled into the binary.
//!
//! Each entry is backed by the grammar's published Rust binding crate and is
//! enabled by the cargo feature of the same name.

use tree_sitter_language::LanguageFn;

use crate::error::Result;
use crate::language::Language;

struct Builtin {
	name: &'static str,
	display: &'static str,
	language: Option<LanguageFn>,
}

/// Known built-in grammars. `language` is `None` when the feature is off.
const BUILTINS: &[Builtin] = &[
	Builtin {
		name: "cuda",
		display: "CUDA",
		#[cfg(feature = "cuda")]
		language: Some(tree_sitter_cuda::LANGUAGE),
		#[cfg(not(feature = "cuda"))]
		language: None,
	},
	Builtin {
		name: "regex",
		display: "Regex",
		#[cfg(feature = "regex")]
		language: Some(tree_sitter_regex::LANGUAGE),
		#[cfg(not(feature = "regex"))]
		language: None,
	},
];

fn lookup(name: &str) -> Option<&'static Builtin> {
	BUILTINS.iter().find(|b| b.name == name)
}

/// Returns the name used in user-facing messages (`cuda` becomes `CUDA`).
pub fn display_name(name: &str) -> &str {
	lookup(name).map_or(name, |b| b.display)
}

/// Names of the grammars compiled into this build.
pub fn names() -> impl Iterator<Item = &'static str> {
	BUILTINS.iter().filter(|b| b.language.is_some()).map(|b| b.name)
}

/// Loads a compiled-in grammar, or `None` if this build does not include it.
pub fn language(name: &str) -> Option<Result<Language>> {
	let builtin = lookup(name)?;
	let language_fn = builtin.language?;
	Some(Language::from_fn(builtin.name, language_fn))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_names() {
		assert_eq!(display_name("cuda"), "CUDA");
		assert_eq!(display_name("regex"), "Regex");
		assert_eq!(display_name("lua"), "lua");
	}

	#[test]
	fn unknown_names_are_not_builtin() {
		assert!(language("lua").is_none());
		assert!(!names().any(|n| n == "lua"));
	}

	#[cfg(feature = "cuda")]
	#[test]
	fn cuda_is_listed_when_enabled() {
		assert!(names().any(|n| n == "cuda"));
	}
}
