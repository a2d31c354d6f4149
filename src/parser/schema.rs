//! Output JSON schema definitions for log reports.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use crate::model::{AttachSummary, CodeCacheEvent, JitStats};
use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Log file that was decoded
    pub log_file: String,

    /// VM release from the `<vm_version>` header
    pub vm_release: Option<String>,

    /// Java command line from the `<vm_arguments>` header
    pub vm_command: Option<String>,

    /// `stamp` of `<hotspot_log_done>`, absent for truncated logs
    pub end_of_log_stamp: Option<f64>,

    /// Line counts per classified stream
    pub streams: StreamCounts,

    pub class_count: usize,

    /// Members referenced by compilation events
    pub member_count: usize,

    pub classpath: Vec<String>,

    pub jit_stats: JitStats,

    pub code_cache_events: Vec<CodeCacheEvent>,

    /// How many disassembly blocks found their method
    pub assembly: AttachSummary,

    /// Top methods by native code size
    pub largest_methods: Vec<CompiledMethod>,

    /// Top methods by compile time
    pub slowest_compilations: Vec<CompiledMethod>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<ParseErrorSummary>,

    /// Timestamp when report was generated
    pub generated_at: String,
}

/// Number of lines routed to each stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCounts {
    /// Physical lines read, including discarded ones
    pub lines_read: usize,
    pub header_lines: usize,
    pub compilation_lines: usize,
    pub class_loader_lines: usize,
    pub assembly_lines: usize,
}

/// Error raised at the end of a parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseErrorSummary {
    pub title: String,
    pub body: String,
}

/// One compiled method in a ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledMethod {
    /// `pkg.Class::name(descriptor)`
    pub method: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub compile_id: Option<String>,

    /// `C1` or `C2`, as written by the VM
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,

    /// Native code size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_size: Option<u64>,

    /// Bytecode size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytecode_size: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub compile_time_ms: Option<f64>,

    /// True if disassembly was attached
    #[serde(default)]
    pub has_assembly: bool,
}
