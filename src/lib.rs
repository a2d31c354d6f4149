//! JIT Trace Studio
//!
//! Decoder for HotSpot JVM compilation logs written with
//! `-XX:+LogCompilation -XX:+TraceClassLoading`.
//!
//! This crate provides the core implementation for the
//! `jit-trace` CLI tool: the line classifier, the streaming tag
//! processor, the in-memory class model and the JSON report.
//!
//! ## Getting Started
//!
//! ```ignore
//! use jit_trace_studio::model::{ClassModel, LoggingErrorListener};
//! use jit_trace_studio::parser::HotSpotLogParser;
//!
//! let mut parser = HotSpotLogParser::new();
//! parser.parse("hotspot_pid1234.log", &mut LoggingErrorListener)?;
//! println!("{} classes", parser.model().package_manager().class_count());
//! ```

pub mod aggregator;
pub mod commands;
pub mod model;
pub mod output;
pub mod parser;
pub mod utils;
