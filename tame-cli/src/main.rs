mod config;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use config::{ConfigMerger, MergedConfig};
use std::process::ExitCode;
use tame_core::{run_check, run_fix, AtomicFsWriter, CheckSettings, FixSettings, FsRepoView};
use tame_render::{render_check_text, render_fix_text, render_json};
use tame_types::{ReconcileMode, TameError};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "tame",
    version,
    about = "Keep workspace dependency versions in line with the catalog."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Report packages whose dependencies disagree with the catalog.
    Check(CheckArgs),
    /// Rewrite package manifests to match the catalog.
    Fix(FixArgs),
}

#[derive(Debug, clap::Args)]
struct CommonArgs {
    /// Workspace root (default: current directory).
    #[arg(default_value = ".")]
    path: Utf8PathBuf,

    /// Reconciliation mode (default: tame.toml, else pin).
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Worker threads for reading and writing manifests (0: all cores).
    #[arg(long, short = 'j')]
    jobs: Option<usize>,

    /// Extra membership exclusion glob (repeatable).
    #[arg(long)]
    exclude: Vec<String>,
}

#[derive(Debug, Parser)]
struct CheckArgs {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Debug, Parser)]
struct FixArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Show what would change without writing anything.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ModeArg {
    /// Explicit versions must equal the catalog's.
    Pin,
    /// Catalog dependencies must use `catalog:`.
    Reference,
}

impl From<ModeArg> for ReconcileMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Pin => ReconcileMode::Pin,
            ModeArg::Reference => ReconcileMode::Reference,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and succeed; usage errors fail.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match real_main(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e.downcast_ref::<TameError>().map_or(1, TameError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn real_main(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Fix(args) => cmd_fix(args),
    }
}

fn settings(common: &CommonArgs) -> anyhow::Result<CheckSettings> {
    let file_config = config::load_or_default(&common.path).context("load tame.toml config")?;
    let MergedConfig {
        mode,
        sections,
        jobs,
        exclude,
    } = ConfigMerger::new(file_config).merge(
        common.mode.map(ReconcileMode::from),
        common.jobs,
        &common.exclude,
    );
    debug!(%mode, ?sections, ?jobs, ?exclude, "merged config");

    Ok(CheckSettings {
        mode,
        sections,
        jobs,
        exclude,
    })
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<ExitCode> {
    let settings = settings(&args.common)?;
    let repo = FsRepoView::new(args.common.path.clone());
    let outcome = run_check(&settings, &repo)?;

    if !outcome.has_catalog {
        println!("No catalog entries found in workspace");
        return Ok(ExitCode::from(1));
    }

    match args.common.format {
        OutputFormat::Text => print!("{}", render_check_text(&outcome.report)),
        OutputFormat::Json => print!("{}", render_json(&outcome.report)?),
    }

    if outcome.report.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

fn cmd_fix(args: FixArgs) -> anyhow::Result<ExitCode> {
    let settings = FixSettings {
        check: settings(&args.common)?,
        dry_run: args.dry_run,
    };
    let repo = FsRepoView::new(args.common.path.clone());
    let report = run_fix(&settings, &repo, &AtomicFsWriter)?;

    match args.common.format {
        OutputFormat::Text => print!("{}", render_fix_text(&report)),
        OutputFormat::Json => print!("{}", render_json(&report)?),
    }
    Ok(ExitCode::SUCCESS)
}
