//! Rank compiled methods and summarise compilation activity.
//!
//! Large native methods and slow compilations are the usual starting points
//! when looking at JIT behaviour.

use crate::model::{MetaMember, PackageManager};
use crate::parser::schema::CompiledMethod;
use crate::utils::config::ATTR_COMPILER;
use log::debug;
use std::cmp::Ordering;

/// Largest installed methods by native code size
///
/// **Public** - main entry point for the size ranking
///
/// # Arguments
/// * `package_manager` - Classes and members from the parsed log
/// * `top_n` - Number of methods to return
///
/// # Returns
/// Methods sorted by native size (descending), ties by name
pub fn largest_compiled_methods(package_manager: &PackageManager, top_n: usize) -> Vec<CompiledMethod> {
    let mut ranked: Vec<(&MetaMember, u64)> = package_manager
        .members()
        .filter_map(|member| member.native_size().map(|size| (member, size)))
        .collect();

    debug!("Ranking {} installed methods by native size", ranked.len());

    ranked.sort_by(|(a, size_a), (b, size_b)| {
        size_b
            .cmp(size_a)
            .then_with(|| a.signature.cmp(&b.signature))
    });

    ranked
        .into_iter()
        .take(top_n)
        .map(|(member, _)| create_compiled_method(member))
        .collect()
}

/// Slowest compilations, by time between task start and `task_done`
///
/// **Public** - main entry point for the compile time ranking
///
/// # Arguments
/// * `package_manager` - Classes and members from the parsed log
/// * `top_n` - Number of methods to return
///
/// # Returns
/// Methods sorted by compile time (descending), ties by name
pub fn slowest_compilations(package_manager: &PackageManager, top_n: usize) -> Vec<CompiledMethod> {
    let mut ranked: Vec<(&MetaMember, f64)> = package_manager
        .members()
        .filter_map(|member| member.compile_time().map(|time| (member, time)))
        .collect();

    debug!("Ranking {} timed compilations", ranked.len());

    ranked.sort_by(|(a, time_a), (b, time_b)| {
        time_b
            .partial_cmp(time_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.signature.cmp(&b.signature))
    });

    ranked
        .into_iter()
        .take(top_n)
        .map(|(member, _)| create_compiled_method(member))
        .collect()
}

/// Create a CompiledMethod from a member
///
/// **Public** - report conversion, also used by tests
pub fn create_compiled_method(member: &MetaMember) -> CompiledMethod {
    let compile_id = member
        .compiled_attribute("compile_id")
        .or_else(|| member.task_attribute("compile_id"))
        .or_else(|| member.queued_attribute("compile_id"))
        .map(str::to_string);

    let compiler = member
        .compiled_attribute(ATTR_COMPILER)
        .or_else(|| member.queued_attribute(ATTR_COMPILER))
        .map(str::to_string);

    let bytecode_size = member
        .task_attribute("bytes")
        .or_else(|| member.queued_attribute("bytes"))
        .and_then(|b| b.parse().ok());

    CompiledMethod {
        method: member.signature.to_string(),
        compile_id,
        compiler,
        native_size: member.native_size(),
        bytecode_size,
        compile_time_ms: member.compile_time().map(|seconds| seconds * 1000.0),
        has_assembly: member.assembly().is_some(),
    }
}

/// Native code size distribution over installed methods
///
/// **Public** - summary statistics for logging and the text summary
pub fn calculate_size_distribution(package_manager: &PackageManager) -> SizeDistribution {
    let mut sizes: Vec<u64> = package_manager
        .members()
        .filter_map(MetaMember::native_size)
        .collect();

    if sizes.is_empty() {
        return SizeDistribution::default();
    }

    sizes.sort_unstable();
    let total: u64 = sizes.iter().sum();
    let count = sizes.len();

    SizeDistribution {
        total_bytes: total,
        method_count: count,
        mean_bytes: total / count as u64,
        median_bytes: sizes[count / 2],
        largest_bytes: sizes[count - 1],
    }
}

/// Native size statistics
///
/// **Public** - returned from calculate_size_distribution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeDistribution {
    /// Total native bytes across installed methods
    pub total_bytes: u64,

    /// Number of methods with a known size
    pub method_count: usize,

    pub mean_bytes: u64,

    pub median_bytes: u64,

    pub largest_bytes: u64,
}

impl SizeDistribution {
    /// Get human-readable summary
    ///
    /// **Public** - for logging and debugging
    pub fn summary(&self) -> String {
        format!(
            "Total: {} bytes | Methods: {} | Mean: {} | Median: {} | Largest: {}",
            self.total_bytes,
            self.method_count,
            self.mean_bytes,
            self.median_bytes,
            self.largest_bytes
        )
    }
}
