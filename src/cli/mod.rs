//! CLI implementation using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Treeline - dependency graph and code quality analysis for Python codebases.
#[derive(Parser)]
#[command(name = "treeline")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Disable result caching
    #[arg(long)]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Analyze a directory into its dependency graph and metrics bundle
    Analyze(AnalyzeArgs),

    /// Analyze a single Python file into its function/class outline
    File(FileArgs),
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Directory to analyze
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Attach quality issues to graph nodes and include the issue list
    #[arg(long)]
    pub quality: bool,
}

#[derive(Args)]
pub struct FileArgs {
    /// Python file to analyze
    pub file: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_defaults_to_current_directory() {
        let cli = Cli::try_parse_from(["treeline", "analyze"]).unwrap();
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.path, PathBuf::from("."));
                assert!(!args.quality);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "treeline", "--format", "text", "--jobs", "2", "--no-cache", "analyze", "src",
            "--quality",
        ])
        .unwrap();
        assert!(matches!(cli.format, OutputFormat::Text));
        assert_eq!(cli.jobs, Some(2));
        assert!(cli.no_cache);
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.path, PathBuf::from("src"));
                assert!(args.quality);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_file_subcommand_requires_path() {
        assert!(Cli::try_parse_from(["treeline", "file"]).is_err());
        let cli = Cli::try_parse_from(["treeline", "file", "app.py"]).unwrap();
        match cli.command {
            Command::File(args) => assert_eq!(args.file, PathBuf::from("app.py")),
            _ => panic!("expected file"),
        }
    }
}
