//! Class locations recovered from class-load tracing.

use serde::{Deserialize, Serialize};

/// Ordered, de-duplicated list of classpath locations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedClasspath {
    locations: Vec<String>,
}

impl ParsedClasspath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a location. Returns false if it was already known.
    pub fn add_class_location(&mut self, location: &str) -> bool {
        if self.contains(location) {
            return false;
        }
        self.locations.push(location.to_string());
        true
    }

    pub fn contains(&self, location: &str) -> bool {
        self.locations.iter().any(|l| l == location)
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn clear(&mut self) {
        self.locations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_order_without_duplicates() {
        let mut classpath = ParsedClasspath::new();
        assert!(classpath.add_class_location("/b.jar"));
        assert!(classpath.add_class_location("/a.jar"));
        assert!(!classpath.add_class_location("/b.jar"));
        assert_eq!(classpath.locations(), &["/b.jar".to_string(), "/a.jar".to_string()]);
    }
}
