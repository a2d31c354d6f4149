//! Output writers for log reports.
//!
//! This module handles writing reports to disk as JSON and reading them back.

pub mod json;

// Re-export main functions
pub use json::{read_report, report_to_string, validate_output_path, write_report};
