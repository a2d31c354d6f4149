//! Line classifier: splits a HotSpot log into four ordered streams.
//!
//! A LogCompilation file mixes an XML header, XML compilation fragments,
//! `TraceClassLoading` output and raw disassembly. Each line is routed to
//! exactly one stream of a [`SplitLog`], keeping its physical line number so
//! downstream consumers can re-interleave them.

use super::classpath::is_class_loader_line;
use super::context::ParseContext;
use crate::utils::config::{
    C_AT, C_OPEN_ANGLE, C_OPEN_SQUARE_BRACKET, S_AT, S_OPEN_ANGLE, TAG_CLOSE_CDATA,
    TAG_OPEN_CDATA, TAG_OPEN_CLOSE_CDATA, TAG_OPEN_NMETHOD, TAG_TTY, TAG_XML,
};
use log::debug;
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};

/// A line of the log with its 1-based physical line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedLine {
    pub line_number: usize,
    pub line: String,
}

impl NumberedLine {
    pub fn new(line_number: usize, line: impl Into<String>) -> Self {
        Self {
            line_number,
            line: line.into(),
        }
    }
}

/// The four classified streams of a log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitLog {
    header_lines: Vec<NumberedLine>,
    compilation_lines: Vec<NumberedLine>,
    class_loader_lines: Vec<NumberedLine>,
    assembly_lines: Vec<NumberedLine>,
}

impl SplitLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_header_line(&mut self, line: NumberedLine) {
        self.header_lines.push(line);
    }

    pub fn add_compilation_line(&mut self, line: NumberedLine) {
        self.compilation_lines.push(line);
    }

    pub fn add_class_loader_line(&mut self, line: NumberedLine) {
        self.class_loader_lines.push(line);
    }

    pub fn add_assembly_line(&mut self, line: NumberedLine) {
        self.assembly_lines.push(line);
    }

    pub fn header_lines(&self) -> &[NumberedLine] {
        &self.header_lines
    }

    pub fn compilation_lines(&self) -> &[NumberedLine] {
        &self.compilation_lines
    }

    pub fn class_loader_lines(&self) -> &[NumberedLine] {
        &self.class_loader_lines
    }

    pub fn assembly_lines(&self) -> &[NumberedLine] {
        &self.assembly_lines
    }

    pub fn total_lines(&self) -> usize {
        self.header_lines.len()
            + self.compilation_lines.len()
            + self.class_loader_lines.len()
            + self.assembly_lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_lines() == 0
    }

    pub fn clear(&mut self) {
        self.header_lines.clear();
        self.compilation_lines.clear();
        self.class_loader_lines.clear();
        self.assembly_lines.clear();
    }
}

/// Routes raw log lines into a [`SplitLog`]
///
/// **Public** - used by the orchestrator for phase 1
pub struct LineClassifier<'a> {
    split_log: &'a mut SplitLog,
    context: &'a mut ParseContext,
}

impl<'a> LineClassifier<'a> {
    pub fn new(split_log: &'a mut SplitLog, context: &'a mut ParseContext) -> Self {
        Self { split_log, context }
    }

    /// Read and classify lines until EOF or until `reading` is cleared
    ///
    /// # Arguments
    /// * `reader` - Buffered log source
    /// * `reading` - Checked before every read; clear it to stop early
    ///
    /// # Returns
    /// The number of physical lines read
    ///
    /// # Errors
    /// Any I/O error from the reader. Lines classified before the error stay in
    /// the split log.
    pub fn split_reader<R: BufRead>(
        &mut self,
        mut reader: R,
        reading: &AtomicBool,
    ) -> std::io::Result<usize> {
        let mut buf = Vec::with_capacity(256);

        while reading.load(Ordering::SeqCst) {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            let line_number = self.context.parse_line_number + 1;
            self.context.parse_line_number = line_number;

            let text = String::from_utf8_lossy(&buf);
            let text = text.trim_end_matches(|c| c == '\n' || c == '\r');
            self.classify_line(text, line_number);
        }

        Ok(self.context.parse_line_number)
    }

    /// Normalise one raw line and route it
    pub fn classify_line(&mut self, raw: &str, line_number: usize) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return;
        }

        let line = match trimmed.chars().next() {
            Some(C_OPEN_ANGLE | C_OPEN_SQUARE_BRACKET | C_AT) => trimmed,
            _ => raw,
        };

        self.handle_log_line(line, line_number);
    }

    fn handle_log_line(&mut self, line: &str, line_number: usize) {
        if line == TAG_TTY {
            self.context.in_header = false;
            return;
        } else if line.starts_with(TAG_XML) {
            self.context.in_header = true;
        }

        if self.context.in_header {
            // the header XML has text nodes, so keep every line
            self.split_log
                .add_header_line(NumberedLine::new(line_number, line));
            return;
        }

        if line.starts_with(TAG_OPEN_CDATA)
            || line.starts_with(TAG_CLOSE_CDATA)
            || line.starts_with(TAG_OPEN_CLOSE_CDATA)
        {
            // reconstructed from the enclosing <fragment>
        } else if line.starts_with(S_OPEN_ANGLE) {
            match trailing_text_start(line) {
                Some(index) => {
                    // <task_queued .../>[Loaded A from file:/a.jar]
                    debug!("Detected text after a closing tag at line {}", line_number);
                    self.split_log
                        .add_compilation_line(NumberedLine::new(line_number, &line[..index]));
                    self.classify_line(&line[index..], line_number);
                }
                None => self
                    .split_log
                    .add_compilation_line(NumberedLine::new(line_number, line)),
            }
        } else if is_class_loader_line(line) {
            self.split_log
                .add_class_loader_line(NumberedLine::new(line_number, line));
        } else if line.starts_with(S_AT) {
            // PrintCompilation inlining output
        } else if let Some(index) = line.find(TAG_OPEN_NMETHOD) {
            // 0x0000 hlt <nmethod compile_id= ...
            debug!("Detected nmethod tag mangled with assembly at line {}", line_number);
            self.split_log
                .add_assembly_line(NumberedLine::new(line_number, &line[..index]));
            self.handle_log_line(&line[index..], line_number);
        } else {
            self.split_log
                .add_assembly_line(NumberedLine::new(line_number, line));
        }
    }
}

/// Byte index just past the first closing token (`</name>` or `/>`) that is
/// followed by text which is not markup
fn trailing_text_start(line: &str) -> Option<usize> {
    let mut token_start: Option<usize> = None;
    let mut quote: Option<char> = None;

    for (i, ch) in line.char_indices() {
        let Some(start) = token_start else {
            if ch == '<' {
                token_start = Some(i);
            }
            continue;
        };

        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '>') => {
                token_start = None;
                let closing = line[start..].starts_with("</") || line[..i].ends_with('/');
                let rest = line[i + 1..].trim_start();
                if closing && !rest.is_empty() && !rest.starts_with('<') {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, Read};
    use std::sync::Arc;

    fn classify(input: &str) -> (SplitLog, ParseContext) {
        let mut split_log = SplitLog::new();
        let mut context = ParseContext::new();
        let reading = AtomicBool::new(true);
        LineClassifier::new(&mut split_log, &mut context)
            .split_reader(input.as_bytes(), &reading)
            .unwrap();
        (split_log, context)
    }

    /// Serves one line per fill and clears the flag after `stop_after` lines
    struct StoppingReader {
        lines: Vec<Vec<u8>>,
        served: usize,
        stop_after: usize,
        reading: Arc<AtomicBool>,
    }

    impl Read for StoppingReader {
        fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
            let n = {
                let buf = self.fill_buf()?;
                let n = buf.len().min(out.len());
                out[..n].copy_from_slice(&buf[..n]);
                n
            };
            self.consume(n);
            Ok(n)
        }
    }

    impl BufRead for StoppingReader {
        fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
            Ok(self.lines.get(self.served).map(Vec::as_slice).unwrap_or(&[]))
        }

        fn consume(&mut self, amt: usize) {
            if amt > 0 {
                self.served += 1;
                if self.served == self.stop_after {
                    self.reading.store(false, Ordering::SeqCst);
                }
            }
        }
    }

    #[test]
    fn test_header_lines_until_tty() {
        let (split, context) = classify("<?xml version='1.0'?>\n<hotspot_log>\n<tty>\n<task_queued compile_id='1'/>\n");
        assert_eq!(split.header_lines().len(), 2);
        assert_eq!(split.compilation_lines().len(), 1);
        assert_eq!(split.compilation_lines()[0].line_number, 4);
        assert!(!context.in_header);
    }

    #[test]
    fn test_blank_lines_keep_physical_numbering() {
        let (split, _) = classify("\n\n<sweeper id='1'/>\n   \n  0x01 nop\n");
        assert_eq!(split.compilation_lines()[0].line_number, 3);
        assert_eq!(split.assembly_lines()[0], NumberedLine::new(5, "  0x01 nop"));
    }

    #[test]
    fn test_cdata_sentinels_dropped_in_body() {
        let (split, _) = classify("<![CDATA[\n]]>\n<![CDATA[]]>\n");
        assert!(split.is_empty());
    }

    #[test]
    fn test_indented_xml_is_trimmed() {
        let (split, _) = classify("    <nmethod compile_id='2'/>   \n");
        assert_eq!(split.compilation_lines()[0].line, "<nmethod compile_id='2'/>");
    }

    #[test]
    fn test_stop_before_next_read() {
        let reading = Arc::new(AtomicBool::new(true));
        let reader = StoppingReader {
            lines: vec![
                b"<sweeper id='1'/>\n".to_vec(),
                b"<sweeper id='2'/>\n".to_vec(),
                b"<sweeper id='3'/>\n".to_vec(),
            ],
            served: 0,
            stop_after: 2,
            reading: Arc::clone(&reading),
        };

        let mut split_log = SplitLog::new();
        let mut context = ParseContext::new();
        let read = LineClassifier::new(&mut split_log, &mut context)
            .split_reader(reader, &reading)
            .unwrap();

        assert_eq!(read, 2);
        assert_eq!(split_log.compilation_lines().len(), 2);
    }
}
