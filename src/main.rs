//! JIT Trace Studio CLI
//!
//! Decodes HotSpot JIT compilation logs into JSON reports.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use jit_trace_studio::commands::{
    display_schema, display_version, execute_analyze, validate_args, validate_report_file,
    AnalyzeArgs,
};

/// JIT Trace Studio - HotSpot compilation log decoder
#[derive(Parser, Debug)]
#[command(name = "jit-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a HotSpot compilation log
    Analyze {
        /// Log written with -XX:+LogCompilation
        #[arg(short, long, env = "JIT_TRACE_LOG")]
        log: PathBuf,

        /// Output path for JSON report
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Number of methods in each ranking
        #[arg(long, default_value = "20")]
        top: usize,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Extra tag prefix to skip in the compilation stream (e.g. "<dependency")
        #[arg(long = "skip-tag")]
        skip_tags: Vec<String>,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Analyze {
            log,
            output,
            top,
            summary,
            skip_tags,
        } => {
            let args = AnalyzeArgs {
                log_file: log,
                output_json: output,
                top_methods: top,
                print_summary: summary,
                skip_tags,
            };

            validate_args(&args)?;
            execute_analyze(args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(&file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
