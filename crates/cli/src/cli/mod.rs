//! CLI schema for the tsvendor binary.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// Vendor, build and check tree-sitter grammars for an offline Neovim setup.
#[derive(Parser, Debug)]
#[command(name = "tsvendor", version, about)]
pub struct Cli {
	/// Repository root (defaults to $TSVENDOR_ROOT, then the enclosing git repository)
	#[arg(long, global = true, value_name = "DIR")]
	pub root: Option<PathBuf>,

	/// Increase log verbosity (-v debug, -vv trace)
	#[arg(short, long, global = true, action = ArgAction::Count)]
	pub verbose: u8,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Grammar load checks
	Grammar {
		/// Grammar subcommand action.
		#[command(subcommand)]
		action: GrammarAction,
	},
	/// Snapshot grammar sources and runtime headers into the vendor directory
	Vendor {
		/// Parser manifest (defaults to the layout's manifest)
		#[arg(long)]
		manifest: Option<PathBuf>,
		/// Output directory for snapshots and metadata.json
		#[arg(long)]
		output: Option<PathBuf>,
		/// Ask this Neovim binary for nvim-treesitter's install info
		#[arg(long, env = "NVIM_BIN")]
		nvim: Option<String>,
		/// Validate existing snapshots without touching anything
		#[arg(long)]
		check: bool,
		/// Do not `git add` the vendor directory afterwards
		#[arg(long)]
		no_stage: bool,
	},
	/// Build vendored parsers and install them into the parser directory
	Sync {
		/// Parser manifest (defaults to the layout's manifest)
		#[arg(long)]
		manifest: Option<PathBuf>,
		/// Only verify the installed parsers
		#[arg(long)]
		check: bool,
		/// Remove installed parsers missing from the manifest (default)
		#[arg(long, overrides_with = "no_prune")]
		prune: bool,
		/// Keep installed parsers missing from the manifest
		#[arg(long, overrides_with = "prune")]
		no_prune: bool,
		/// Parallel build jobs
		#[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
		jobs: Option<u16>,
	},
	/// Add, update and prune git-subtree vendored plugins
	Plugins(PluginsArgs),
	/// Install the Neovim configuration into the user's config directory
	Install {
		/// Copy files instead of creating a symbolic link
		#[arg(long)]
		copy: bool,
		/// Remove existing targets instead of backing them up
		#[arg(long)]
		force: bool,
		/// Install into this directory instead of $XDG_CONFIG_HOME/nvim
		#[arg(long)]
		target: Option<PathBuf>,
	},
}

/// Grammar subcommands.
#[derive(Subcommand, Debug)]
pub enum GrammarAction {
	/// Load grammars and report whether each produced a usable handle
	Check {
		/// Grammars to check (defaults to every built-in grammar)
		names: Vec<String>,
		/// Search this directory for parser libraries first
		#[arg(long)]
		parser_dir: Option<PathBuf>,
	},
	/// List built-in grammars and installed parser libraries
	List,
}

#[derive(clap::Args, Debug)]
pub struct PluginsArgs {
	/// Plugin list (defaults to the layout's plugins-list.txt)
	#[arg(long)]
	pub list_file: Option<PathBuf>,
	/// Restrict to these plugin names (repeatable or comma-separated)
	#[arg(long, value_delimiter = ',')]
	pub only: Vec<String>,
	/// Only add missing plugins
	#[arg(long, conflicts_with = "pull_only")]
	pub add_only: bool,
	/// Only pull existing plugins
	#[arg(long)]
	pub pull_only: bool,
	/// Do not pass --squash to git subtree
	#[arg(long)]
	pub no_squash: bool,
	/// Print the commands instead of running them
	#[arg(long)]
	pub dry_run: bool,
	/// Commit the result
	#[arg(long)]
	pub commit: bool,
	/// Push after committing
	#[arg(long, requires = "commit")]
	pub push: bool,
	/// Remove plugin directories that are not listed
	#[arg(long)]
	pub prune: bool,
	/// Skip the clean working tree check
	#[arg(long)]
	pub allow_dirty: bool,
	/// Print the parsed list and exit
	#[arg(long)]
	pub list: bool,
}
