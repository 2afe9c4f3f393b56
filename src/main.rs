//! @ai:module:intent CLI entry point for showing and checking process annotations
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on check, config, output

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use proc_annotate::{
    check_path, format_report, AnnotationReport, CheckStatus, OutputFormat, ProcessFile,
    ProcessInfo, RuntimeConfig,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "proc-annotate")]
#[command(author, version, about = "Parse and enrich pipeline process annotations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the enriched annotation of a process definition
    Show {
        /// Path to the process definition (TOML)
        path: PathBuf,

        /// Runtime configuration layer applied before rendering
        #[arg(long, short)]
        runtime: Option<PathBuf>,

        /// Only render this section
        #[arg(long, short)]
        section: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Check process definitions for malformed annotations
    Check {
        /// Path to a process definition or a directory of them
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

fn main() -> ExitCode {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("proc_annotate=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show {
            path,
            runtime,
            section,
            format,
        } => match show(&path, runtime.as_deref(), section.as_deref(), format.into()) {
            Ok(rendered) => {
                println!("{}", rendered);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::from(2)
            }
        },

        Commands::Check { path } => check(&path),
    }
}

/// @ai:intent Load, enrich and render one process definition
/// @ai:effects fs:read
fn show(
    path: &Path,
    runtime: Option<&Path>,
    section: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let process = ProcessFile::load(path)?.into_proc()?;

    if let Some(runtime) = runtime {
        RuntimeConfig::load(runtime)?.apply(&process)?;
    }

    let process = process.borrow();
    let annotation = process
        .annotation()
        .context("process has no annotate field")?;
    let report = AnnotationReport::build(process.id(), annotation, section)
        .with_context(|| format!("failed to parse annotation of {}", path.display()))?;

    Ok(format_report(&report, format)?)
}

/// @ai:intent Check every process definition under a path
/// @ai:post exit code is 1 on malformed annotations, 2 on unreadable definitions
/// @ai:effects fs:read
fn check(path: &Path) -> ExitCode {
    let report = check_path(path);

    for (file, status) in &report.files {
        match status {
            CheckStatus::Ok => println!("{} {}", "OK".green().bold(), file.display()),
            CheckStatus::Malformed(e) => {
                println!("{} {} - {}", "ERROR".red().bold(), file.display(), e)
            }
            CheckStatus::Unreadable(e) => {
                println!("{} {} - {}", "SKIP".yellow().bold(), file.display(), e)
            }
        }
    }

    println!(
        "\nChecked {} files, {} malformed, {} unreadable",
        report.files.len(),
        report.malformed(),
        report.unreadable()
    );

    ExitCode::from(report.exit_code())
}
