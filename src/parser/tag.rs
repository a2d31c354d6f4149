//! Tag tree reconstituted from HotSpot log XML fragments.
//!
//! A [`Tag`] is a plain element: name, ordered attributes, children and text.
//! Tags named in [`TASK_TAGS`] are promoted to a [`Task`] when they close at
//! top level, which adds a flattened view over the compile tree.

use crate::utils::config::{TAG_TASK_DONE, TASK_TAGS};
use crate::utils::error::TagError;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

const ENTITIES: &[(&str, char)] = &[
    ("lt", '<'),
    ("gt", '>'),
    ("amp", '&'),
    ("apos", '\''),
    ("quot", '"'),
];

/// Ordered attribute map. Keys are unique and keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whitespace-separated `key='value'` / `key="value"` list.
    ///
    /// Entity escapes in values are decoded; unknown escapes are kept as is.
    /// A repeated key keeps its first value.
    pub fn parse(input: &str) -> Result<Self, TagError> {
        let mut attributes = Self::new();
        let mut rest = input.trim_start();

        while !rest.is_empty() {
            let Some(eq) = rest.find('=') else {
                return Err(TagError::MissingValue(rest.trim().to_string()));
            };

            let key = rest[..eq].trim();
            if key.is_empty() {
                return Err(TagError::EmptyName(input.to_string()));
            }
            if let Some(space) = key.find(char::is_whitespace) {
                return Err(TagError::MissingValue(key[..space].to_string()));
            }

            let after = rest[eq + 1..].trim_start();
            let (raw_value, remainder) = match after.chars().next() {
                Some(quote @ ('\'' | '"')) => {
                    let body = &after[1..];
                    let Some(end) = body.find(quote) else {
                        return Err(TagError::UnterminatedValue(key.to_string()));
                    };
                    (&body[..end], &body[end + 1..])
                }
                Some(_) => {
                    let end = after.find(char::is_whitespace).unwrap_or(after.len());
                    (&after[..end], &after[end..])
                }
                None => return Err(TagError::MissingValue(key.to_string())),
            };

            attributes.insert(key, decode_entities(raw_value));
            rest = remainder.trim_start();
        }

        Ok(attributes)
    }

    /// Insert a new key. Returns false (and keeps the old value) if the key exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.contains_key(&key) {
            return false;
        }
        self.entries.push((key, value.into()));
        true
    }

    /// Insert or overwrite a key, keeping its original position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Overwrite with every entry of `other`
    pub fn extend_from(&mut self, other: &Attributes) {
        for (key, value) in other.iter() {
            self.set(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Canonical `key="value"` serialisation, space separated
    pub fn to_attribute_string(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, encode_entities(v)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (k, v) in iter {
            attributes.insert(k, v);
        }
        attributes
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttributesVisitor;

        impl<'de> Visitor<'de> for AttributesVisitor {
            type Value = Attributes;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of attribute names to values")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Attributes, M::Error> {
                let mut attributes = Attributes::new();
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    attributes.insert(k, v);
                }
                Ok(attributes)
            }
        }

        deserializer.deserialize_map(AttributesVisitor)
    }
}

/// Decode the five XML entities. Anything else after `&` is kept literally.
pub fn decode_entities(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp + 1..];

        let decoded = candidate.find(';').and_then(|semi| {
            ENTITIES
                .iter()
                .find(|(name, _)| *name == &candidate[..semi])
                .map(|(_, ch)| (*ch, semi))
        });

        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &candidate[semi + 1..];
            }
            None => {
                out.push('&');
                rest = candidate;
            }
        }
    }

    out.push_str(rest);
    Cow::Owned(out)
}

/// Escape a value for a double-quoted attribute
pub fn encode_entities(input: &str) -> Cow<'_, str> {
    if !input.contains(&['&', '<', '>', '"'][..]) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// A reconstituted XML element from the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub attributes: Attributes,
    pub children: Vec<Tag>,
    /// Text and CDATA content, lines joined with `\n`
    pub text_content: String,
    /// Line the tag was opened on (1-based, 0 if unknown)
    pub line_number: usize,
}

impl Tag {
    pub fn new(name: impl Into<String>, attributes: Attributes, line_number: usize) -> Self {
        Self {
            name: name.into(),
            attributes,
            children: Vec::new(),
            text_content: String::new(),
            line_number,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }

    pub fn named_children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Tag> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn first_named_child(&self, name: &str) -> Option<&Tag> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn is_task_like(&self) -> bool {
        TASK_TAGS.contains(&self.name.as_str())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        if !self.attributes.is_empty() {
            write!(f, " {}", self.attributes.to_attribute_string())?;
        }

        if self.children.is_empty() && self.text_content.is_empty() {
            return write!(f, "/>");
        }

        write!(f, ">{}", self.text_content)?;
        for child in &self.children {
            write!(f, "{}", child)?;
        }
        write!(f, "</{}>", self.name)
    }
}

/// A compilation task: a `Tag` plus a cached pre-order view of its compile tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    tag: Tag,
    // child-index path from the task root to each descendant
    compilation: Vec<Vec<usize>>,
}

impl Task {
    pub fn new(tag: Tag) -> Self {
        let mut compilation = Vec::new();
        let mut path = Vec::new();
        collect_paths(&tag, &mut path, &mut compilation);
        Self { tag, compilation }
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn into_tag(self) -> Tag {
        self.tag
    }

    /// Every descendant of the task, depth first, in document order
    pub fn compilation(&self) -> impl Iterator<Item = &Tag> + '_ {
        self.compilation.iter().map(|path| self.resolve(path))
    }

    pub fn compilation_len(&self) -> usize {
        self.compilation.len()
    }

    pub fn task_done(&self) -> Option<&Tag> {
        self.tag.first_named_child(TAG_TASK_DONE)
    }

    fn resolve(&self, path: &[usize]) -> &Tag {
        path.iter().fold(&self.tag, |tag, &i| &tag.children[i])
    }
}

fn collect_paths(tag: &Tag, path: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
    for (i, child) in tag.children.iter().enumerate() {
        path.push(i);
        out.push(path.clone());
        collect_paths(child, path, out);
        path.pop();
    }
}

/// A completed top-level element handed to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Tag(Tag),
    Task(Task),
}

impl Element {
    /// Wrap a closed root tag, promoting task-like tags
    pub fn from_root(tag: Tag) -> Self {
        if tag.is_task_like() {
            Element::Task(Task::new(tag))
        } else {
            Element::Tag(tag)
        }
    }

    pub fn tag(&self) -> &Tag {
        match self {
            Element::Tag(tag) => tag,
            Element::Task(task) => task.tag(),
        }
    }

    pub fn name(&self) -> &str {
        &self.tag().name
    }

    pub fn as_task(&self) -> Option<&Task> {
        match self {
            Element::Task(task) => Some(task),
            Element::Tag(_) => None,
        }
    }

    pub fn into_tag(self) -> Tag {
        match self {
            Element::Tag(tag) => tag,
            Element::Task(task) => task.into_tag(),
        }
    }
}
