//! Grammar load checks.
//!
//! A check loads a grammar once and records the outcome. Failures are values,
//! never panics, so one broken grammar does not hide the others.

use std::fmt;

use tracing::{info, warn};

use crate::error::GrammarError;
use crate::language::{GrammarSource, LanguageInfo};
use crate::loader::GrammarLoader;

/// What happened when a grammar was loaded.
#[derive(Debug)]
pub enum CheckStatus {
	Loaded { source: GrammarSource, info: LanguageInfo },
	Failed(GrammarError),
}

/// Result of checking one grammar.
#[derive(Debug)]
pub struct CheckOutcome {
	pub name: String,
	pub status: CheckStatus,
}

impl CheckOutcome {
	pub fn is_ok(&self) -> bool {
		matches!(self.status, CheckStatus::Loaded { .. })
	}
}

impl fmt::Display for CheckOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.status {
			CheckStatus::Loaded { source, info } => write!(
				f,
				"ok {} (abi {}, {} symbols, {} states, {source})",
				self.name, info.abi_version, info.node_kind_count, info.parse_state_count
			),
			CheckStatus::Failed(err) => write!(f, "{err}"),
		}
	}
}

/// Loads `name` and reports whether it produced a usable handle.
pub fn check_grammar(loader: &GrammarLoader, name: &str) -> CheckOutcome {
	let status = match loader.load(name) {
		Ok(language) => {
			let info = language.info();
			info!(grammar = name, abi = info.abi_version, source = %language.source(), "Grammar loaded");
			CheckStatus::Loaded {
				source: language.source().clone(),
				info,
			}
		}
		Err(err) => {
			warn!(grammar = name, error = %err, "Grammar failed to load");
			CheckStatus::Failed(err)
		}
	};
	CheckOutcome {
		name: name.to_string(),
		status,
	}
}

/// Checks every grammar in `names`, in order.
pub fn check_grammars<I, S>(loader: &GrammarLoader, names: I) -> Vec<CheckOutcome>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	names.into_iter().map(|n| check_grammar(loader, n.as_ref())).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_grammar_is_a_failed_outcome() {
		let dir = tempfile::tempdir().unwrap();
		let loader = GrammarLoader::new([dir.path().to_path_buf()]);
		let outcomes = check_grammars(&loader, ["does-not-exist"]);

		assert_eq!(outcomes.len(), 1);
		assert!(!outcomes[0].is_ok());
		assert_eq!(
			outcomes[0].to_string(),
			"Error loading does-not-exist grammar: not found in any search path"
		);
	}

	#[cfg(feature = "regex")]
	#[test]
	fn builtin_regex_checks_ok() {
		let outcome = check_grammar(&GrammarLoader::new(Vec::new()), "regex");
		assert!(outcome.is_ok(), "{outcome}");
		assert!(outcome.to_string().starts_with("ok regex (abi "), "{outcome}");
		assert!(outcome.to_string().ends_with(", builtin)"), "{outcome}");
	}
}
