use super::analyze::generate_text_summary;
use crate::output::read_report;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use std::path::Path;

/// Validate a report JSON file
pub fn validate_report_file(file_path: &Path) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(file_path)
        .with_context(|| format!("Failed to read report {}", file_path.display()))?;

    if report.version != SCHEMA_VERSION {
        log::warn!(
            "Report schema v{} differs from current v{}",
            report.version,
            SCHEMA_VERSION
        );
    }

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Generated: {}", report.generated_at);
    println!();
    println!("{}", generate_text_summary(&report));

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("JIT Trace Studio Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string              - Schema version (e.g., '1.0.0')");
        println!("  log_file: string             - Decoded HotSpot log");
        println!("  vm_release: string?          - VM release from <vm_version>");
        println!("  vm_command: string?          - Command from <vm_arguments>");
        println!("  end_of_log_stamp: number?    - Stamp of <hotspot_log_done>");
        println!("  streams: object              - Line counts per stream");
        println!("    lines_read: number         - Physical lines read");
        println!("    header_lines: number");
        println!("    compilation_lines: number");
        println!("    class_loader_lines: number");
        println!("    assembly_lines: number");
        println!("  class_count: number          - Classes in the model");
        println!("  member_count: number         - Methods with compilation events");
        println!("  classpath: array             - Decoded file: locations");
        println!("  jit_stats: object            - Queued/installed/C1/C2/OSR/failed counts");
        println!("  code_cache_events: array     - Sweeper, cache full and compilation events");
        println!("    kind: string               - sweeper | cache_full | compilation");
        println!("    stamp: number?             - Seconds since VM start");
        println!("    attributes: object         - Tag attributes");
        println!("  assembly: object             - Attached/unmatched disassembly blocks");
        println!("  largest_methods: array       - Top methods by native size");
        println!("  slowest_compilations: array  - Top methods by compile time");
        println!("    method: string             - Class::name(descriptor)");
        println!("    compile_id: string?");
        println!("    compiler: string?");
        println!("    native_size: number?");
        println!("    bytecode_size: number?");
        println!("    compile_time_ms: number?");
        println!("    has_assembly: bool");
        println!("  parse_error: object?         - title and body of a parse error");
        println!("  generated_at: string         - ISO 8601 timestamp");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("JIT Trace Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("A decoder for HotSpot JIT compilation logs.");
}
