//! Routes completed top-level elements to the class model.

use super::tag::{Attributes, Element, Tag, Task};
use crate::model::{
    ClassModel, CodeCacheEvent, CodeCacheEventKind, JournalKind, MemberSignature,
};
use crate::utils::config::{
    ATTR_METHOD, ATTR_STAMP, ATTR_SUCCESS, TAG_CODE_CACHE, TAG_CODE_CACHE_FULL, TAG_COMMAND,
    TAG_HOTSPOT_LOG_DONE, TAG_NMETHOD, TAG_RELEASE, TAG_START_COMPILE_THREAD, TAG_SWEEPER,
    TAG_TASK, TAG_TASK_QUEUED, TAG_VM_ARGUMENTS, TAG_VM_VERSION,
};
use crate::utils::error::TagError;
use log::debug;

/// Attribute under which the `task_done` stamp is kept on the task
pub const ATTR_DONE_STAMP: &str = "done_stamp";

/// Invokes model operations for each element, by tag name
///
/// **Public** - used by the orchestrator for header and body dispatch
pub struct EventDispatcher<'a, M: ClassModel + ?Sized> {
    model: &'a mut M,
    ignored: usize,
}

impl<'a, M: ClassModel + ?Sized> EventDispatcher<'a, M> {
    pub fn new(model: &'a mut M) -> Self {
        Self { model, ignored: 0 }
    }

    /// Elements dropped because of a missing or malformed `method`
    pub fn ignored(&self) -> usize {
        self.ignored
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut *self.model
    }

    pub fn handle_tag(&mut self, element: Element) {
        let result = match element.name() {
            TAG_VM_VERSION => {
                if let Some(release) = child_text(element.tag(), TAG_RELEASE) {
                    self.model.set_vm_version_release(release);
                }
                Ok(())
            }
            TAG_VM_ARGUMENTS => {
                if let Some(command) = child_text(element.tag(), TAG_COMMAND) {
                    self.model.set_vm_command(command);
                }
                Ok(())
            }
            TAG_TASK_QUEUED => self.handle_task_queued(element),
            TAG_NMETHOD => self.handle_nmethod(element),
            TAG_TASK => self.handle_task(element),
            TAG_SWEEPER => {
                self.model.add_code_cache_event(CodeCacheEvent::new(
                    CodeCacheEventKind::Sweeper,
                    element.into_tag().attributes,
                ));
                Ok(())
            }
            TAG_CODE_CACHE_FULL => {
                self.model.add_code_cache_event(CodeCacheEvent::new(
                    CodeCacheEventKind::CacheFull,
                    element.into_tag().attributes,
                ));
                Ok(())
            }
            TAG_START_COMPILE_THREAD => {
                self.model.jit_stats_mut().inc_compiler_threads();
                Ok(())
            }
            TAG_HOTSPOT_LOG_DONE => {
                self.model.set_end_of_log(element.into_tag());
                Ok(())
            }
            _ => Ok(()),
        };

        if let Err(e) = result {
            debug!("Ignoring tag: {}", e);
            self.ignored += 1;
        }
    }

    fn handle_task_queued(&mut self, element: Element) -> Result<(), TagError> {
        let signature = method_signature(element.tag())?;
        self.model.jit_stats_mut().record_queued();

        let member = self
            .model
            .package_manager_mut()
            .member_mut_or_insert(&signature);
        member.set_queued_attributes(element.tag().attributes.clone());
        member.add_journal_entry(JournalKind::Queued, element);
        Ok(())
    }

    fn handle_nmethod(&mut self, element: Element) -> Result<(), TagError> {
        let signature = method_signature(element.tag())?;
        self.model
            .jit_stats_mut()
            .record_nmethod(&element.tag().attributes);

        let member = self
            .model
            .package_manager_mut()
            .member_mut_or_insert(&signature);
        member.set_compiled_attributes(element.tag().attributes.clone());
        member.add_journal_entry(JournalKind::Compiled, element);
        Ok(())
    }

    fn handle_task(&mut self, element: Element) -> Result<(), TagError> {
        let signature = method_signature(element.tag())?;

        let (attributes, outcome, code_cache) = match element.as_task() {
            Some(task) => summarise_task(task),
            None => (element.tag().attributes.clone(), None, None),
        };

        if let Some(outcome) = &outcome {
            self.model.jit_stats_mut().record_task_done(outcome.success);
        }
        if let Some(event) = code_cache {
            self.model.add_code_cache_event(event);
        }

        let member = self
            .model
            .package_manager_mut()
            .member_mut_or_insert(&signature);
        if let Some(seconds) = outcome.and_then(|o| o.compile_time) {
            member.set_compile_time(seconds);
        }
        member.set_task_attributes(attributes);
        member.add_journal_entry(JournalKind::Task, element);
        Ok(())
    }
}

struct TaskOutcome {
    success: bool,
    compile_time: Option<f64>,
}

/// Task attributes merged with its `task_done`, the outcome, and the
/// `code_cache` snapshot taken after it
fn summarise_task(task: &Task) -> (Attributes, Option<TaskOutcome>, Option<CodeCacheEvent>) {
    let tag = task.tag();
    let mut attributes = tag.attributes.clone();
    let start = stamp_of(tag);

    let outcome = task.task_done().map(|done| {
        for (key, value) in done.attributes.iter() {
            if key == ATTR_STAMP {
                attributes.set(ATTR_DONE_STAMP, value);
            } else {
                attributes.set(key, value);
            }
        }

        let compile_time = match (start, stamp_of(done)) {
            (Some(start), Some(end)) if end >= start => Some(end - start),
            _ => None,
        };

        TaskOutcome {
            success: done.attribute(ATTR_SUCCESS) != Some("0"),
            compile_time,
        }
    });

    let code_cache = tag.first_named_child(TAG_CODE_CACHE).map(|cache| {
        let stamp = task.task_done().and_then(stamp_of).or(start);
        CodeCacheEvent::with_stamp(
            CodeCacheEventKind::Compilation,
            cache.attributes.clone(),
            stamp,
        )
    });

    (attributes, outcome, code_cache)
}

fn method_signature(tag: &Tag) -> Result<MemberSignature, TagError> {
    let method = tag
        .attribute(ATTR_METHOD)
        .ok_or_else(|| TagError::MissingMethod(tag.name.clone()))?;
    MemberSignature::parse(method)
}

fn stamp_of(tag: &Tag) -> Option<f64> {
    tag.attribute(ATTR_STAMP)?.parse().ok()
}

/// Trimmed text of the first child with this name, if not empty
fn child_text<'t>(tag: &'t Tag, name: &str) -> Option<&'t str> {
    let text = tag.first_named_child(name)?.text_content.trim();
    (!text.is_empty()).then_some(text)
}
