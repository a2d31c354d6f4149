use crate::utils::config::DEFAULT_TOP_METHODS;
use std::path::PathBuf;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// HotSpot log written with -XX:+LogCompilation
    pub log_file: PathBuf,

    /// Output path for JSON report
    pub output_json: PathBuf,

    /// Number of methods in each ranking
    pub top_methods: usize,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Extra compilation-stream prefixes to skip
    pub skip_tags: Vec<String>,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            log_file: PathBuf::new(),
            output_json: PathBuf::from("report.json"),
            top_methods: DEFAULT_TOP_METHODS,
            print_summary: false,
            skip_tags: Vec::new(),
        }
    }
}
