//! Treeline CLI - dependency and quality analysis for Python codebases.

use std::io::stdout;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use treeline::cli::{Cli, Command, OutputFormat};
use treeline::config::Config;
use treeline::output::Format;
use treeline::quality::QualityAnalyzer;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output on stdout stays machine-readable.
    let default_filter = if cli.verbose { "treeline=debug" } else { "treeline=warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> treeline::core::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_default()?,
    };
    if let Some(jobs) = cli.jobs {
        config.workers = jobs;
    }
    if cli.no_cache {
        config.cache_enabled = false;
    }

    let format = match cli.format {
        OutputFormat::Json => Format::Json,
        OutputFormat::Text => Format::Text,
    };

    match cli.command {
        Command::Analyze(args) => {
            let bundle = treeline::graph::analyze(&args.path, &config, args.quality)?;
            format.format(&bundle, &mut stdout())?;
        }
        Command::File(args) => {
            let outline = QualityAnalyzer::new(&config).analyze_file(&args.file)?;
            format.format(&outline, &mut stdout())?;
        }
    }
    Ok(())
}
