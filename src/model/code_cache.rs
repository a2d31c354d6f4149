//! Code cache activity reported by the VM.

use crate::parser::tag::Attributes;
use crate::utils::config::ATTR_STAMP;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeCacheEventKind {
    Sweeper,
    CacheFull,
    /// Code cache state after a compilation task
    Compilation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeCacheEvent {
    pub kind: CodeCacheEventKind,
    /// Seconds since VM start, if the tag carried a `stamp`
    pub stamp: Option<f64>,
    pub attributes: Attributes,
}

impl CodeCacheEvent {
    pub fn new(kind: CodeCacheEventKind, attributes: Attributes) -> Self {
        let stamp = attributes.get(ATTR_STAMP).and_then(|s| s.parse().ok());
        Self {
            kind,
            stamp,
            attributes,
        }
    }

    /// Same as [`CodeCacheEvent::new`] with a stamp taken from elsewhere
    /// (a `code_cache` child carries none of its own)
    pub fn with_stamp(kind: CodeCacheEventKind, attributes: Attributes, stamp: Option<f64>) -> Self {
        let mut event = Self::new(kind, attributes);
        if event.stamp.is_none() {
            event.stamp = stamp;
        }
        event
    }
}
