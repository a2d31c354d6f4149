//! Counters kept while dispatching compilation events.

use crate::parser::tag::Attributes;
use crate::utils::config::{ATTR_COMPILER, ATTR_COMPILE_KIND, ATTR_SIZE};
use serde::{Deserialize, Serialize};

/// Which JIT produced a compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompilerKind {
    C1,
    C2,
    Unknown,
}

impl CompilerKind {
    /// Classify from `compiler='C2'` (or `compiler='c1'`), falling back to the
    /// tiered `level` attribute
    pub fn from_attributes(attributes: &Attributes) -> Self {
        if let Some(compiler) = attributes.get(ATTR_COMPILER) {
            if compiler.eq_ignore_ascii_case("c2") {
                return CompilerKind::C2;
            } else if compiler.eq_ignore_ascii_case("c1") {
                return CompilerKind::C1;
            }
        }

        match attributes.get("level").and_then(|l| l.parse::<u8>().ok()) {
            Some(4) => CompilerKind::C2,
            Some(1..=3) => CompilerKind::C1,
            _ => CompilerKind::Unknown,
        }
    }
}

/// JIT statistics for one log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JitStats {
    pub compiler_threads: u64,
    pub queued_tasks: u64,
    /// Installed nmethods
    pub compiled_methods: u64,
    pub c1_compilations: u64,
    pub c2_compilations: u64,
    pub osr_compilations: u64,
    /// Sum of nmethod `size` attributes
    pub native_bytes: u64,
    pub completed_tasks: u64,
    pub failed_tasks: u64,
    pub sweeper_events: u64,
    pub cache_full_events: u64,
}

impl JitStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_compiler_threads(&mut self) {
        self.compiler_threads += 1;
    }

    pub fn record_queued(&mut self) {
        self.queued_tasks += 1;
    }

    /// Count an installed nmethod by compiler and kind
    pub fn record_nmethod(&mut self, attributes: &Attributes) {
        self.compiled_methods += 1;

        match CompilerKind::from_attributes(attributes) {
            CompilerKind::C1 => self.c1_compilations += 1,
            CompilerKind::C2 => self.c2_compilations += 1,
            CompilerKind::Unknown => {}
        }

        if attributes.get(ATTR_COMPILE_KIND) == Some("osr") {
            self.osr_compilations += 1;
        }

        if let Some(size) = attributes.get(ATTR_SIZE).and_then(|s| s.parse::<u64>().ok()) {
            self.native_bytes += size;
        }
    }

    pub fn record_task_done(&mut self, success: bool) {
        if success {
            self.completed_tasks += 1;
        } else {
            self.failed_tasks += 1;
        }
    }

    pub fn total_tasks(&self) -> u64 {
        self.completed_tasks + self.failed_tasks
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiler_kind_from_name_and_level() {
        let c2 = Attributes::parse("compiler='C2' level='4'").unwrap();
        let c1 = Attributes::parse("compiler='c1'").unwrap();
        let tiered = Attributes::parse("level='3'").unwrap();
        let none = Attributes::parse("compile_id='1'").unwrap();

        assert_eq!(CompilerKind::from_attributes(&c2), CompilerKind::C2);
        assert_eq!(CompilerKind::from_attributes(&c1), CompilerKind::C1);
        assert_eq!(CompilerKind::from_attributes(&tiered), CompilerKind::C1);
        assert_eq!(CompilerKind::from_attributes(&none), CompilerKind::Unknown);
    }

    #[test]
    fn test_record_nmethod() {
        let mut stats = JitStats::new();
        stats.record_nmethod(&Attributes::parse("compiler='C2' compile_kind='osr' size='400'").unwrap());
        stats.record_nmethod(&Attributes::parse("compiler='C1' size='100'").unwrap());

        assert_eq!(stats.compiled_methods, 2);
        assert_eq!(stats.c1_compilations, 1);
        assert_eq!(stats.c2_compilations, 1);
        assert_eq!(stats.osr_compilations, 1);
        assert_eq!(stats.native_bytes, 500);
    }

    #[test]
    fn test_task_outcomes() {
        let mut stats = JitStats::new();
        stats.record_task_done(true);
        stats.record_task_done(false);
        stats.record_task_done(true);
        assert_eq!(stats.completed_tasks, 2);
        assert_eq!(stats.failed_tasks, 1);
        assert_eq!(stats.total_tasks(), 3);
    }
}
