//! ccrec - Entry Point

use ccrec::config;
use ccrec::integration::{Analysis, Analyzer};
use ccrec::model::AppError;
use ccrec::report::Report;
use ccrec::source;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Reconstruct source files from Claude Code JSONL session logs
#[derive(Parser, Debug)]
#[command(name = "ccrec")]
#[command(version)]
#[command(about = "Reconstruct source files from Claude Code JSONL session logs")]
pub struct Args {
    /// JSONL log files or directories of them (reads stdin if none given)
    pub logs: Vec<PathBuf>,

    /// Project directory whose session logs should be read
    #[arg(short, long, conflicts_with = "logs")]
    pub project: Option<PathBuf>,

    /// Only reconstruct files under this path prefix
    #[arg(long)]
    pub project_root: Option<String>,

    /// Print the full analysis as JSON instead of a summary
    #[arg(long, conflicts_with = "show")]
    pub json: bool,

    /// Print the reconstructed content of one file
    #[arg(long, value_name = "PATH")]
    pub show: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ccrec: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    // Defaults → Config File → Env Vars → CLI Args
    let mut config = config::resolve_config(args.config.clone(), args.project_root.clone())?;
    if let Some(project) = &args.project {
        // --project limits output to that project unless a root was configured.
        if config.project_root.is_none() {
            config.project_root = Some(source::project_path_prefix(project));
        }
    }

    ccrec::logging::init(
        &config.log_file_path,
        if args.verbose { "debug" } else { "info" },
    )?;
    info!(config = ?config, "Configuration loaded and resolved");

    let input = match &args.project {
        Some(project) => source::detect_project_source(project, &config.claude_projects_dir)?,
        None => source::detect_input_source(args.logs.clone())?,
    };
    info!("Reading {} log sources", input.len());

    let mut analyzer = Analyzer::new(config.analysis_options());
    input.load_into(&mut analyzer)?;
    let analysis = analyzer.finish();

    write_output(&args, &analysis)
}

fn write_output(args: &Args, analysis: &Analysis) -> Result<(), AppError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Some(path) = &args.show {
        let result = analysis
            .files
            .get(path)
            .ok_or_else(|| AppError::UnknownPath(path.clone()))?;
        let Some(content) = &result.content else {
            return Err(AppError::Unrecoverable {
                path: path.clone(),
                diagnostic: result.no_baseline_diagnostic(),
            });
        };
        out.write_all(content.as_bytes())?;
    } else if args.json {
        serde_json::to_writer_pretty(&mut out, analysis)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", Report::new(analysis))?;
    }
    out.flush()?;
    Ok(())
}
