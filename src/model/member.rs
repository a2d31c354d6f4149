//! Methods seen in the log and their compilation journal.

use super::assembly::AssemblyBlock;
use crate::parser::tag::{Attributes, Element};
use crate::utils::config::ATTR_SIZE;
use crate::utils::error::TagError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A method identified by a HotSpot `method` attribute
/// (`java/lang/String hashCode ()I`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberSignature {
    /// Dotted class name
    pub class_name: String,
    pub member_name: String,
    /// JVM method descriptor, e.g. `(Ljava/lang/String;)V`
    pub descriptor: String,
}

impl MemberSignature {
    pub fn parse(method: &str) -> Result<Self, TagError> {
        let mut parts = method.splitn(3, ' ');
        let (Some(class), Some(name), Some(descriptor)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(TagError::MalformedMethod(method.to_string()));
        };

        if class.is_empty() || name.is_empty() || !descriptor.starts_with('(') {
            return Err(TagError::MalformedMethod(method.to_string()));
        }

        Ok(Self {
            class_name: class.replace('/', "."),
            member_name: name.to_string(),
            descriptor: descriptor.to_string(),
        })
    }

    /// Key of the member within its class
    pub fn member_key(&self) -> String {
        format!("{} {}", self.member_name, self.descriptor)
    }
}

impl fmt::Display for MemberSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}{}", self.class_name, self.member_name, self.descriptor)
    }
}

/// What a journal entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalKind {
    Queued,
    Compiled,
    Task,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub kind: JournalKind,
    pub element: Element,
}

/// Ordered compilation history of one member
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn add(&mut self, kind: JournalKind, element: Element) {
        self.entries.push(JournalEntry { kind, element });
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn of_kind(&self, kind: JournalKind) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }
}

/// A method known to the model.
///
/// Queued (`task_queued`), compiled (`nmethod`) and task (`task`, `task_done`)
/// attributes are kept apart; later events of the same kind overwrite.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaMember {
    pub signature: MemberSignature,
    queued_attributes: Attributes,
    compiled_attributes: Attributes,
    task_attributes: Attributes,
    compile_time: Option<f64>,
    journal: Journal,
    assembly: Option<AssemblyBlock>,
}

impl MetaMember {
    pub fn new(signature: MemberSignature) -> Self {
        Self {
            signature,
            queued_attributes: Attributes::new(),
            compiled_attributes: Attributes::new(),
            task_attributes: Attributes::new(),
            compile_time: None,
            journal: Journal::default(),
            assembly: None,
        }
    }

    pub fn set_queued_attributes(&mut self, attributes: Attributes) {
        self.queued_attributes = attributes;
    }

    pub fn queued_attributes(&self) -> &Attributes {
        &self.queued_attributes
    }

    pub fn queued_attribute(&self, key: &str) -> Option<&str> {
        self.queued_attributes.get(key)
    }

    pub fn is_queued(&self) -> bool {
        !self.queued_attributes.is_empty()
    }

    pub fn set_compiled_attributes(&mut self, attributes: Attributes) {
        self.compiled_attributes = attributes;
    }

    pub fn add_compiled_attributes(&mut self, attributes: &Attributes) {
        self.compiled_attributes.extend_from(attributes);
    }

    pub fn compiled_attributes(&self) -> &Attributes {
        &self.compiled_attributes
    }

    pub fn compiled_attribute(&self, key: &str) -> Option<&str> {
        self.compiled_attributes.get(key)
    }

    pub fn is_compiled(&self) -> bool {
        !self.compiled_attributes.is_empty()
    }

    pub fn set_task_attributes(&mut self, attributes: Attributes) {
        self.task_attributes = attributes;
    }

    pub fn task_attributes(&self) -> &Attributes {
        &self.task_attributes
    }

    pub fn task_attribute(&self, key: &str) -> Option<&str> {
        self.task_attributes.get(key)
    }

    /// Seconds between the last task start and its `task_done`
    pub fn compile_time(&self) -> Option<f64> {
        self.compile_time
    }

    pub fn set_compile_time(&mut self, seconds: f64) {
        self.compile_time = Some(seconds);
    }

    /// Native code size of the installed nmethod
    pub fn native_size(&self) -> Option<u64> {
        self.compiled_attribute(ATTR_SIZE)?.parse().ok()
    }

    pub fn add_journal_entry(&mut self, kind: JournalKind, element: Element) {
        self.journal.add(kind, element);
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn set_assembly(&mut self, block: AssemblyBlock) {
        self.assembly = Some(block);
    }

    pub fn assembly(&self) -> Option<&AssemblyBlock> {
        self.assembly.as_ref()
    }
}
