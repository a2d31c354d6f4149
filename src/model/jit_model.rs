//! The class model populated by the log parser.

use super::code_cache::{CodeCacheEvent, CodeCacheEventKind};
use super::package::PackageManager;
use super::stats::JitStats;
use crate::parser::tag::Tag;
use crate::utils::config::ATTR_STAMP;

/// Operations the parser performs on the class model
pub trait ClassModel {
    fn add_class(&mut self, fq_class_name: &str);

    fn set_vm_version_release(&mut self, release: &str);

    fn set_vm_command(&mut self, command: &str);

    /// Record the `hotspot_log_done` tag
    fn set_end_of_log(&mut self, tag: Tag);

    fn jit_stats_mut(&mut self) -> &mut JitStats;

    fn package_manager(&self) -> &PackageManager;

    fn package_manager_mut(&mut self) -> &mut PackageManager;

    fn add_code_cache_event(&mut self, event: CodeCacheEvent);

    /// Forget everything recorded by a previous parse
    fn reset(&mut self);
}

/// In-memory [`ClassModel`]
#[derive(Debug, Clone, Default)]
pub struct JitDataModel {
    vm_version_release: Option<String>,
    vm_command: Option<String>,
    end_of_log: Option<Tag>,
    package_manager: PackageManager,
    jit_stats: JitStats,
    code_cache_events: Vec<CodeCacheEvent>,
}

impl JitDataModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vm_version_release(&self) -> Option<&str> {
        self.vm_version_release.as_deref()
    }

    pub fn vm_command(&self) -> Option<&str> {
        self.vm_command.as_deref()
    }

    pub fn end_of_log(&self) -> Option<&Tag> {
        self.end_of_log.as_ref()
    }

    /// `stamp` of the end-of-log tag, in seconds
    pub fn end_of_log_stamp(&self) -> Option<f64> {
        self.end_of_log
            .as_ref()?
            .attribute(ATTR_STAMP)?
            .parse()
            .ok()
    }

    pub fn jit_stats(&self) -> &JitStats {
        &self.jit_stats
    }

    pub fn code_cache_events(&self) -> &[CodeCacheEvent] {
        &self.code_cache_events
    }
}

impl ClassModel for JitDataModel {
    fn add_class(&mut self, fq_class_name: &str) {
        self.package_manager.add_class(fq_class_name);
    }

    fn set_vm_version_release(&mut self, release: &str) {
        self.vm_version_release = Some(release.to_string());
    }

    fn set_vm_command(&mut self, command: &str) {
        self.vm_command = Some(command.to_string());
    }

    fn set_end_of_log(&mut self, tag: Tag) {
        self.end_of_log = Some(tag);
    }

    fn jit_stats_mut(&mut self) -> &mut JitStats {
        &mut self.jit_stats
    }

    fn package_manager(&self) -> &PackageManager {
        &self.package_manager
    }

    fn package_manager_mut(&mut self) -> &mut PackageManager {
        &mut self.package_manager
    }

    fn add_code_cache_event(&mut self, event: CodeCacheEvent) {
        match event.kind {
            CodeCacheEventKind::Sweeper => self.jit_stats.sweeper_events += 1,
            CodeCacheEventKind::CacheFull => self.jit_stats.cache_full_events += 1,
            CodeCacheEventKind::Compilation => {}
        }
        self.code_cache_events.push(event);
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}
