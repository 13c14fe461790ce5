use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "class-depend")]
#[command(about = "Package dependency metrics and cycle reports for compiled Java classes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Property file (default: ~/class-depend.properties when present)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Analyze directories and archives of class files
    Analyze {
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Comma-separated package prefixes merged into one node each
        #[arg(long, value_name = "LIST")]
        components: Option<String>,

        #[arg(long)]
        no_inner_classes: bool,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Trace every cycle reachable from each package, not just the first
        #[arg(long)]
        all_cycles: bool,

        /// JSON file describing the expected package graph
        #[arg(long, value_name = "FILE")]
        constraint: Option<PathBuf>,
    },
    /// Count the class files that would be analyzed
    Count {
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        #[arg(long)]
        no_inner_classes: bool,
    },
    /// Decode a single class file and print it as JSON
    Inspect {
        #[arg(value_name = "CLASS_FILE")]
        class_file: PathBuf,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
