//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Parses the HotSpot log
//! 2. Ranks compiled methods
//! 3. Builds the report
//! 4. Writes output files

use super::models::AnalyzeArgs;
use crate::aggregator::{calculate_size_distribution, largest_compiled_methods, slowest_compilations};
use crate::model::{ClassModel, LoggingErrorListener};
use crate::output::{validate_output_path, write_report};
use crate::parser::schema::{CompiledMethod, LogReport};
use crate::parser::HotSpotLogParser;
use crate::utils::config::MAX_TOP_METHODS;
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Analyze command arguments
///
/// # Returns
/// The report that was written
///
/// # Errors
/// * Log file cannot be opened
/// * File write errors
pub fn execute_analyze(args: AnalyzeArgs) -> Result<LogReport> {
    let start_time = Instant::now();

    info!("Starting analysis of: {}", args.log_file.display());

    // Step 1: Parse log
    info!("Step 1/4: Parsing HotSpot log...");
    let mut parser = HotSpotLogParser::new().with_body_skip(args.skip_tags.iter().cloned());
    let mut listener = LoggingErrorListener;
    let lines_read = parser
        .parse(&args.log_file, &mut listener)
        .with_context(|| format!("Failed to parse log {}", args.log_file.display()))?;

    debug!(
        "Parsed {} lines, {} classes, {} members, {} tags ignored",
        lines_read,
        parser.model().package_manager().class_count(),
        parser.model().package_manager().member_count(),
        parser.ignored_tags()
    );

    // Step 2: Rank methods
    info!("Step 2/4: Ranking top {} compiled methods...", args.top_methods);
    let package_manager = parser.model().package_manager();
    let largest = largest_compiled_methods(package_manager, args.top_methods);
    let slowest = slowest_compilations(package_manager, args.top_methods);

    let size_dist = calculate_size_distribution(package_manager);
    info!("Native size distribution: {}", size_dist.summary());

    // Step 3: Build report
    info!("Step 3/4: Building report...");
    let report = parser.to_report(&args.log_file, largest, slowest);

    // Step 4: Write output
    info!("Step 4/4: Writing output files...");
    write_report(&report, &args.output_json).context("Failed to write report JSON")?;

    info!("✓ Report written to: {}", args.output_json.display());

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("JIT COMPILATION SUMMARY");
        println!("{}", "=".repeat(80));
        println!("{}", generate_text_summary(&report));
        println!("{}", "=".repeat(80));
    }

    let elapsed = start_time.elapsed();
    info!("Analysis completed in {:.2}s", elapsed.as_secs_f64());

    Ok(report)
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
///
/// # Arguments
/// * `args` - Arguments to validate
///
/// # Returns
/// Ok if arguments are valid, Err with message if not
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.log_file.as_os_str().is_empty() {
        anyhow::bail!("Log file path cannot be empty");
    }

    if !args.log_file.is_file() {
        anyhow::bail!("Log file not found: {}", args.log_file.display());
    }

    if args.top_methods == 0 {
        anyhow::bail!("top must be greater than 0");
    }

    if args.top_methods > MAX_TOP_METHODS {
        anyhow::bail!("top is too large (max {})", MAX_TOP_METHODS);
    }

    if let Some(tag) = args.skip_tags.iter().find(|t| !t.starts_with('<')) {
        anyhow::bail!("Skip tag '{}' must start with '<'", tag);
    }

    validate_output_path(&args.output_json).context("Invalid output path")?;

    Ok(())
}

/// Render a report as a text summary
///
/// **Public** - used by --summary and the validate command
pub fn generate_text_summary(report: &LogReport) -> String {
    let stats = &report.jit_stats;
    let mut lines = Vec::new();

    lines.push(format!("Log:            {}", report.log_file));
    lines.push(format!(
        "VM:             {}",
        report.vm_release.as_deref().unwrap_or("unknown")
    ));
    lines.push(format!(
        "Lines:          {} read ({} header, {} compilation, {} class loader, {} assembly)",
        report.streams.lines_read,
        report.streams.header_lines,
        report.streams.compilation_lines,
        report.streams.class_loader_lines,
        report.streams.assembly_lines
    ));
    lines.push(format!(
        "Classes:        {} loaded from {} locations",
        report.class_count,
        report.classpath.len()
    ));
    lines.push(format!(
        "Compilations:   {} queued, {} installed (C1 {}, C2 {}, OSR {}), {} failed",
        stats.queued_tasks,
        stats.compiled_methods,
        stats.c1_compilations,
        stats.c2_compilations,
        stats.osr_compilations,
        stats.failed_tasks
    ));
    lines.push(format!("Native code:    {} bytes", stats.native_bytes));
    lines.push(format!(
        "Code cache:     {} sweeps, {} full",
        stats.sweeper_events, stats.cache_full_events
    ));

    if let Some(error) = &report.parse_error {
        lines.push(format!("Warning:        {}", error.title));
    }

    lines.push(String::new());
    lines.push("  LARGEST COMPILED METHODS".to_string());
    push_method_table(&mut lines, &report.largest_methods, |m| {
        m.native_size.map(|s| format!("{} B", s))
    });

    lines.push(String::new());
    lines.push("  SLOWEST COMPILATIONS".to_string());
    push_method_table(&mut lines, &report.slowest_compilations, |m| {
        m.compile_time_ms.map(|ms| format!("{:.3} ms", ms))
    });

    lines.join("\n")
}

/// **Private** - internal helper for generate_text_summary
fn push_method_table<F>(lines: &mut Vec<String>, methods: &[CompiledMethod], value: F)
where
    F: Fn(&CompiledMethod) -> Option<String>,
{
    if methods.is_empty() {
        lines.push("  (none)".to_string());
        return;
    }

    lines.push(format!("  {:<60} {:>8} {:>14}", "Method", "Compiler", "Value"));
    for method in methods {
        lines.push(format!(
            "  {:<60} {:>8} {:>14}",
            truncate_left(&method.method, 60),
            method.compiler.as_deref().unwrap_or("-"),
            value(method).unwrap_or_else(|| "-".to_string())
        ));
    }
}

/// Keep the end of a long name, which holds the method
///
/// **Private** - internal helper
fn truncate_left(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        return text.to_string();
    }
    let tail: String = text.chars().skip(count - (width - 3)).collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn log_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "<tty>").unwrap();
        file
    }

    #[test]
    fn test_validate_args_valid() {
        let log = log_file();
        let args = AnalyzeArgs {
            log_file: log.path().to_path_buf(),
            ..Default::default()
        };

        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_empty_log_path() {
        let args = AnalyzeArgs::default();
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_missing_log() {
        let args = AnalyzeArgs {
            log_file: "/definitely/not/here.log".into(),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_top_zero() {
        let log = log_file();
        let args = AnalyzeArgs {
            log_file: log.path().to_path_buf(),
            top_methods: 0,
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_top_too_large() {
        let log = log_file();
        let args = AnalyzeArgs {
            log_file: log.path().to_path_buf(),
            top_methods: 2000,
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_bad_skip_tag() {
        let log = log_file();
        let args = AnalyzeArgs {
            log_file: log.path().to_path_buf(),
            skip_tags: vec!["dependency".to_string()],
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_truncate_left() {
        assert_eq!(truncate_left("short", 10), "short");
        assert_eq!(truncate_left("com.example.Long::method()V", 12), "...method()V");
    }
}
