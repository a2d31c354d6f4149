//! HotSpot log decoding and report schema definitions.
//!
//! This module handles:
//! - Splitting a log into header, compilation, class-loader and assembly streams
//! - Rebuilding tags from XML fragments
//! - Dispatching tags to the class model
//! - Defining output schema

pub mod classpath;
pub mod context;
pub mod dispatch;
pub mod hotspot_log;
pub mod schema;
pub mod skip;
pub mod splitter;
pub mod tag;
pub mod tag_processor;

// Re-export main types
pub use context::ParseContext;
pub use dispatch::EventDispatcher;
pub use hotspot_log::{HotSpotLogParser, StopHandle};
pub use schema::{CompiledMethod, LogReport, ParseErrorSummary, StreamCounts};
pub use skip::SkipSet;
pub use splitter::{LineClassifier, NumberedLine, SplitLog};
pub use tag::{Attributes, Element, Tag, Task};
pub use tag_processor::TagProcessor;
