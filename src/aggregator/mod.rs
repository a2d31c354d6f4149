//! Aggregation of the parsed model into report metrics.
//!
//! This module turns the class model into:
//! - Rankings of compiled methods (native size, compile time)
//! - Native size distribution statistics

pub mod metrics;

// Re-export main types and functions
pub use metrics::{
    calculate_size_distribution, create_compiled_method, largest_compiled_methods,
    slowest_compilations, SizeDistribution,
};
