mod cli;
mod install;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, GrammarAction, PluginsArgs};
use install::{InstallMode, InstallOptions};
use tracing::{debug, info};
use tsvendor_common::{Layout, LayoutPaths, SystemRunner};
use tsvendor_grammar::{GrammarLoader, builtin, check_grammars};
use tsvendor_vendor::{ProgressCallback, SyncOptions, Toolchain, VendorOptions, run_sync, run_vendor};

fn main() -> ExitCode {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	match run(cli) {
		Ok(code) => code,
		Err(err) => {
			eprintln!("error: {err:#}");
			ExitCode::FAILURE
		}
	}
}

fn setup_tracing(verbose: u8) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
		0 => EnvFilter::new("info"),
		1 => EnvFilter::new("debug"),
		_ => EnvFilter::new("trace"),
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbose > 0)
		.init();
}

fn run(cli: Cli) -> Result<ExitCode> {
	let root = cli.root.as_deref();
	match cli.command {
		Command::Grammar { action } => match action {
			GrammarAction::Check { names, parser_dir } => grammar_check(root, names, parser_dir),
			GrammarAction::List => grammar_list(root),
		},
		Command::Vendor {
			manifest,
			output,
			nvim,
			check,
			no_stage,
		} => {
			let layout = discover(root)?;
			let opts = VendorOptions {
				manifest,
				output,
				nvim,
				check,
				no_stage,
			};
			let report = run_vendor(&SystemRunner, &layout, &opts).context("vendoring parser sources")?;
			if check {
				println!("Vendored sources match the manifest ({} parsers).", report.languages.len());
			} else {
				println!(
					"Vendored {} parser(s); runtime headers in {}.",
					report.metadata.len(),
					report.runtime_dir.display()
				);
				for lang in &report.pruned {
					println!("Removed stale snapshot {lang}");
				}
			}
			Ok(ExitCode::SUCCESS)
		}
		Command::Sync {
			manifest,
			check,
			prune: _,
			no_prune,
			jobs,
		} => {
			let layout = discover(root)?;
			let opts = SyncOptions {
				manifest,
				check,
				no_prune,
				jobs: jobs.map(usize::from),
			};
			let progress: ProgressCallback = Box::new(|lang: &str, status: &str| info!("[sync] {lang}: {status}"));
			let report = run_sync(&SystemRunner, &Toolchain::detect(), &layout, &opts, Some(progress))
				.context("syncing parsers")?;
			if check {
				println!("All {} parser(s) are installed and up to date.", report.languages.len());
			} else {
				println!("Installed {} parser(s) into {}.", report.built.len(), layout.parser_dir().display());
				for lang in &report.pruned {
					println!("Removed {lang}");
				}
			}
			Ok(ExitCode::SUCCESS)
		}
		Command::Plugins(args) => plugins(root, args),
		Command::Install { copy, force, target } => {
			let layout = discover(root)?;
			let report = install::install(&layout, &InstallOptions { copy, force, target }).context("installing")?;
			for backup in &report.backups {
				println!("Previous files moved to {}", backup.display());
			}
			match &report.mode {
				InstallMode::Linked { source } => {
					println!("Neovim configuration linked at {} -> {}", report.target.display(), source.display());
					println!("Vendored plugins will be loaded from the repository's vendor directory");
				}
				InstallMode::Copied { vendor } => {
					println!("Neovim configuration copied to {}", report.target.display());
					println!("Vendored plugins copied to {}", vendor.display());
				}
			}
			println!();
			println!("You can now start Neovim without an internet connection using: nvim");
			Ok(ExitCode::SUCCESS)
		}
	}
}

fn discover(root: Option<&Path>) -> Result<Layout> {
	let layout = Layout::discover(root).context("locating the repository root")?;
	debug!(root = %layout.root().display(), "Using repository layout");
	Ok(layout)
}

/// Built-ins, then `--parser-dir`, the repository's parser dir and the
/// default search paths.
fn grammar_loader(root: Option<&Path>, parser_dir: Option<PathBuf>) -> GrammarLoader {
	let mut loader = GrammarLoader::default();
	match Layout::discover(root) {
		Ok(layout) => loader = loader.with_priority_path(layout.parser_dir()),
		Err(e) => debug!(error = %e, "No repository layout; using default grammar search paths"),
	}
	if let Some(dir) = parser_dir {
		loader = loader.with_priority_path(dir);
	}
	loader
}

fn grammar_check(root: Option<&Path>, names: Vec<String>, parser_dir: Option<PathBuf>) -> Result<ExitCode> {
	let loader = grammar_loader(root, parser_dir);
	let names = if names.is_empty() {
		builtin::names().map(str::to_string).collect()
	} else {
		names
	};

	let outcomes = check_grammars(&loader, &names);
	for outcome in &outcomes {
		println!("{outcome}");
	}
	let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
	if failed > 0 {
		eprintln!("{failed} of {} grammar(s) failed to load", outcomes.len());
		return Ok(ExitCode::FAILURE);
	}
	Ok(ExitCode::SUCCESS)
}

fn grammar_list(root: Option<&Path>) -> Result<ExitCode> {
	let loader = grammar_loader(root, None);
	println!("Built-in:");
	for name in builtin::names() {
		println!("  {name}");
	}
	println!("Installed:");
	for (name, path) in loader.installed() {
		println!("  {name:<16} {}", path.display());
	}
	Ok(ExitCode::SUCCESS)
}

fn plugins(root: Option<&Path>, args: PluginsArgs) -> Result<ExitCode> {
	let mut layout = discover(root)?;
	if let Some(list_file) = args.list_file {
		let paths = LayoutPaths {
			plugins_list: layout.resolve(&list_file),
			..layout.paths().clone()
		};
		layout = Layout::with_paths(layout.root(), paths);
	}

	if args.list {
		let path = layout.plugins_list();
		let plugins = tsvendor_subtree::parse_list(&path)?;
		print!("{}", tsvendor_subtree::format_list(&path, &plugins));
		return Ok(ExitCode::SUCCESS);
	}

	let opts = tsvendor_subtree::SyncOptions {
		only: args.only,
		add_only: args.add_only,
		pull_only: args.pull_only,
		squash: !args.no_squash,
		dry_run: args.dry_run,
		commit: args.commit,
		push: args.push,
		prune: args.prune,
		allow_dirty: args.allow_dirty,
	};
	let summary = tsvendor_subtree::sync_plugins(&SystemRunner, &layout, &opts).context("syncing plugins")?;
	println!("{summary}");
	Ok(ExitCode::SUCCESS)
}
