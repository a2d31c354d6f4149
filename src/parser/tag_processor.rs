//! Streaming reconstruction of tags from XML fragment lines.
//!
//! The processor is fed one line at a time and keeps a stack of partially
//! built tags. Whenever the outermost tag closes it is handed back as an
//! [`Element`]. Lines that straddle tags (`<name>text</name>`, or a closing
//! tag followed by another tag) are scanned token by token.

use super::tag::{decode_entities, Attributes, Element, Tag};
use crate::utils::config::{
    TAG_CLOSE_CDATA, TAG_FRAGMENT, TAG_OPEN_CDATA, TAG_OPEN_CLOSE_CDATA, TOP_LEVEL_TAGS,
};
use crate::utils::error::TagError;
use log::debug;

/// Stateful tag accumulator
#[derive(Debug, Default)]
pub struct TagProcessor {
    /// Open tags, outermost first
    stack: Vec<Tag>,
    in_cdata: bool,
    /// Stack depth that last received text on the current line
    line_text_depth: Option<usize>,
}

/// One lexical token at the start of the unconsumed part of a line
enum Token<'a> {
    Open { name: &'a str, attrs: &'a str, self_closing: bool },
    Close(&'a str),
}

impl TagProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a top-level tag is open
    pub fn is_open(&self) -> bool {
        !self.stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn in_cdata(&self) -> bool {
        self.in_cdata
    }

    /// Drop any partial tag
    pub fn reset(&mut self) {
        self.stack.clear();
        self.in_cdata = false;
        self.line_text_depth = None;
    }

    /// Feed one line; returns every top-level element closed by it.
    pub fn process_line(&mut self, line: &str, line_number: usize) -> Vec<Element> {
        let mut emitted = Vec::new();
        let mut rest = line;
        self.line_text_depth = None;

        while !rest.is_empty() {
            if self.in_raw_text() {
                rest = self.consume_raw_text(rest, line_number, &mut emitted);
                continue;
            }

            if let Some(after) = rest.strip_prefix(TAG_OPEN_CLOSE_CDATA) {
                rest = after;
            } else if let Some(after) = rest.strip_prefix(TAG_OPEN_CDATA) {
                if self.is_open() {
                    self.in_cdata = true;
                } else {
                    debug!("Ignoring CDATA outside of a tag at line {}", line_number);
                }
                rest = after;
            } else if let Some(after) = rest.strip_prefix(TAG_CLOSE_CDATA) {
                rest = after;
            } else if rest.starts_with('<') {
                rest = self.consume_markup(rest, line_number, &mut emitted);
            } else {
                let end = rest.find('<').unwrap_or(rest.len());
                self.append_text(&decode_entities(&rest[..end]));
                rest = &rest[end..];
            }
        }

        emitted
    }

    /// Inside CDATA or a `<fragment>`, everything but the terminator is text
    fn in_raw_text(&self) -> bool {
        self.in_cdata
            || self
                .stack
                .last()
                .is_some_and(|tag| tag.name == TAG_FRAGMENT)
    }

    fn consume_raw_text<'a>(
        &mut self,
        rest: &'a str,
        line_number: usize,
        emitted: &mut Vec<Element>,
    ) -> &'a str {
        if self.in_cdata {
            return match rest.find(TAG_CLOSE_CDATA) {
                Some(end) => {
                    self.append_text(&rest[..end]);
                    self.in_cdata = false;
                    &rest[end + TAG_CLOSE_CDATA.len()..]
                }
                None => {
                    self.append_text(rest);
                    ""
                }
            };
        }

        // Inside a fragment: strip CDATA sentinels, stop at </fragment>
        if let Some(after) = rest.strip_prefix(TAG_OPEN_CLOSE_CDATA) {
            return after;
        }
        if let Some(after) = rest.strip_prefix(TAG_OPEN_CDATA) {
            self.in_cdata = true;
            return after;
        }
        if let Some(after) = rest.strip_prefix(TAG_CLOSE_CDATA) {
            return after;
        }

        let close = "</fragment>";
        match rest.find(close) {
            Some(0) => {
                self.close_tag(TAG_FRAGMENT, line_number, emitted);
                &rest[close.len()..]
            }
            Some(end) => {
                self.append_text(&rest[..end]);
                &rest[end..]
            }
            None => {
                self.append_text(rest);
                ""
            }
        }
    }

    fn consume_markup<'a>(
        &mut self,
        rest: &'a str,
        line_number: usize,
        emitted: &mut Vec<Element>,
    ) -> &'a str {
        let Some(end) = find_token_end(rest) else {
            // no closing '>' on this line: not markup we understand
            debug!("Unterminated markup at line {}: '{}'", line_number, rest);
            self.append_text(rest);
            return "";
        };

        let token = &rest[..=end];
        let remainder = &rest[end + 1..];

        match parse_token(token) {
            Ok(Some(Token::Open { name, attrs, self_closing })) => {
                self.open_tag(name, attrs, self_closing, line_number, emitted);
            }
            Ok(Some(Token::Close(name))) => {
                self.close_tag(name, line_number, emitted);
            }
            Ok(None) => {
                // comments, processing instructions, doctype
            }
            Err(e) => {
                debug!("Skipping malformed tag at line {}: {}", line_number, e);
                self.append_text(token);
            }
        }

        remainder
    }

    fn open_tag(
        &mut self,
        name: &str,
        attrs: &str,
        self_closing: bool,
        line_number: usize,
        emitted: &mut Vec<Element>,
    ) {
        let attributes = match Attributes::parse(attrs) {
            Ok(attributes) => attributes,
            Err(e) => {
                debug!("Bad attributes on <{}> at line {}: {}", name, line_number, e);
                Attributes::new()
            }
        };

        if self.is_open() && TOP_LEVEL_TAGS.contains(&name) {
            debug!(
                "Discarding unterminated <{}> at line {}",
                self.stack[0].name, line_number
            );
            self.reset();
        }

        let tag = Tag::new(name, attributes, line_number);

        if self_closing {
            match self.stack.last_mut() {
                Some(parent) => parent.children.push(tag),
                None => emitted.push(Element::from_root(tag)),
            }
        } else {
            self.stack.push(tag);
        }
    }

    fn close_tag(&mut self, name: &str, line_number: usize, emitted: &mut Vec<Element>) {
        let Some(position) = self.stack.iter().rposition(|tag| tag.name == name) else {
            debug!("Ignoring unmatched </{}> at line {}", name, line_number);
            return;
        };

        while self.stack.len() > position + 1 {
            debug!(
                "Implicitly closing <{}> at line {}",
                self.stack[self.stack.len() - 1].name,
                line_number
            );
            self.close_innermost();
        }

        if let Some(root) = self.close_innermost() {
            emitted.push(Element::from_root(root));
        }
    }

    /// Pop the innermost tag into its parent. Returns it if it was the root.
    fn close_innermost(&mut self) -> Option<Tag> {
        let tag = self.stack.pop()?;
        match self.stack.last_mut() {
            Some(parent) => {
                parent.children.push(tag);
                None
            }
            None => {
                self.in_cdata = false;
                Some(tag)
            }
        }
    }

    fn append_text(&mut self, text: &str) {
        let depth = self.stack.len();
        let Some(current) = self.stack.last_mut() else {
            return;
        };

        if self.line_text_depth != Some(depth) {
            if text.trim().is_empty() {
                return;
            }
            if !current.text_content.is_empty() {
                current.text_content.push('\n');
            }
            self.line_text_depth = Some(depth);
        }
        current.text_content.push_str(text);
    }
}

/// Index of the '>' ending the token at the start of `input`, honouring quotes
fn find_token_end(input: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, ch) in input.char_indices().skip(1) {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '>') => return Some(i),
            (None, '<') => return None,
            _ => {}
        }
    }
    None
}

fn parse_token(token: &str) -> Result<Option<Token<'_>>, TagError> {
    let inner = &token[1..token.len() - 1];

    if inner.starts_with('?') || inner.starts_with('!') {
        return Ok(None);
    }

    if let Some(name) = inner.strip_prefix('/') {
        let name = name.trim();
        if name.is_empty() {
            return Err(TagError::EmptyName(token.to_string()));
        }
        return Ok(Some(Token::Close(name)));
    }

    let (inner, self_closing) = match inner.strip_suffix('/') {
        Some(stripped) => (stripped, true),
        None => (inner, false),
    };

    let name_end = inner.find(char::is_whitespace).unwrap_or(inner.len());
    let name = &inner[..name_end];
    if name.is_empty() {
        return Err(TagError::EmptyName(token.to_string()));
    }

    Ok(Some(Token::Open {
        name,
        attrs: &inner[name_end..],
        self_closing,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(processor: &mut TagProcessor, lines: &[&str]) -> Vec<Element> {
        lines
            .iter()
            .enumerate()
            .flat_map(|(i, line)| processor.process_line(line, i + 1))
            .collect()
    }

    #[test]
    fn test_token_end_skips_quoted_angle() {
        assert_eq!(find_token_end("<a b='x>y'>"), Some(10));
        assert_eq!(find_token_end("<a b='x"), None);
    }

    #[test]
    fn test_self_closing_emits_immediately() {
        let mut processor = TagProcessor::new();
        let out = processor.process_line("<task_queued compile_id='1' method='A m ()V'/>", 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name(), "task_queued");
        assert!(!processor.is_open());
    }

    #[test]
    fn test_nested_children_and_text() {
        let mut processor = TagProcessor::new();
        let out = feed(
            &mut processor,
            &["<vm_version>", "<name>", "OpenJDK 64-Bit Server VM", "</name>", "<release>", "17.0.2+8", "</release>", "</vm_version>"],
        );

        assert_eq!(out.len(), 1);
        let tag = out[0].tag();
        assert_eq!(tag.children.len(), 2);
        assert_eq!(tag.first_named_child("release").unwrap().text_content, "17.0.2+8");
        assert_eq!(tag.line_number, 1);
    }

    #[test]
    fn test_inline_text_and_trailing_tag() {
        let mut processor = TagProcessor::new();
        let out = processor.process_line("<a><b>x</b></a><c/>", 1);
        let names: Vec<&str> = out.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(out[0].tag().children[0].text_content, "x");
    }

    #[test]
    fn test_mismatched_close_recovers() {
        let mut processor = TagProcessor::new();
        let out = feed(&mut processor, &["<a>", "<b>", "</a>"]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].tag().children[0].name, "b");
    }

    #[test]
    fn test_top_level_tag_discards_partial_tree() {
        let mut processor = TagProcessor::new();
        let out = feed(&mut processor, &["<task compile_id='1'>", "<parse method='2'>", "<task_queued compile_id='2'/>"]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name(), "task_queued");
        assert!(!processor.is_open());
    }

    #[test]
    fn test_fragment_is_raw_text() {
        let mut processor = TagProcessor::new();
        let out = feed(
            &mut processor,
            &["<x>", "<fragment>", "<![CDATA[", "a <b> c", "]]>", "</fragment>", "</x>"],
        );
        assert_eq!(out.len(), 1);
        let fragment = out[0].tag().first_named_child("fragment").unwrap();
        assert_eq!(fragment.text_content, "a <b> c");
        assert!(fragment.children.is_empty());
    }
}
