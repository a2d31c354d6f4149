//! Prefix filter for lines that never reach the tag processor.

use crate::utils::config::{SKIP_BODY_TAGS, SKIP_HEADER_TAGS};

/// A set of line prefixes. A line matching any of them is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet {
    prefixes: Vec<String>,
}

impl SkipSet {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Defaults for lines before `<tty>`
    pub fn header() -> Self {
        Self::new(SKIP_HEADER_TAGS.iter().copied())
    }

    /// Defaults for the compilation stream
    pub fn body() -> Self {
        Self::new(SKIP_BODY_TAGS.iter().copied())
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    pub fn matches(&self, line: &str) -> bool {
        self.prefixes.iter().any(|prefix| line.starts_with(prefix.as_str()))
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}
