//! HotSpot LogCompilation decoder.
//!
//! The parse runs in fixed phases:
//! 1. Classify lines into header, compilation, class-loader and assembly streams
//! 2. Dispatch header tags
//! 3. Build the classpath
//! 4. Build the class model
//! 5. Dispatch compilation tags
//! 6. Hand the assembly stream to the assembly processor
//!
//! followed by a final check that the log was written with class-load tracing.

use super::classpath::{build_class_model, build_parsed_classpath};
use super::context::ParseContext;
use super::dispatch::EventDispatcher;
use super::schema::{CompiledMethod, LogReport, ParseErrorSummary, StreamCounts};
use super::skip::SkipSet;
use super::splitter::{LineClassifier, NumberedLine, SplitLog};
use super::tag_processor::TagProcessor;
use crate::model::{
    AssemblyCollector, AssemblyProcessor, AttachSummary, ClassModel, ErrorListener,
    JitDataModel, ParsedClasspath,
};
use crate::utils::config::{
    MISSING_TRACE_CLASS_LOADING_BODY, MISSING_TRACE_CLASS_LOADING_TITLE, READ_BUFFER_SIZE,
    SCHEMA_VERSION,
};
use crate::utils::error::LogError;
use log::{debug, error};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable handle that stops a running parse from another thread
#[derive(Debug, Clone)]
pub struct StopHandle {
    reading: Arc<AtomicBool>,
}

impl StopHandle {
    /// Stop reading. Lines already read are still processed.
    pub fn stop(&self) {
        self.reading.store(false, Ordering::SeqCst);
    }

    pub fn is_reading(&self) -> bool {
        self.reading.load(Ordering::SeqCst)
    }
}

/// Decoder for one HotSpot log at a time
pub struct HotSpotLogParser<M: ClassModel = JitDataModel> {
    model: M,
    classpath: ParsedClasspath,
    split_log: SplitLog,
    context: ParseContext,
    tag_processor: TagProcessor,
    assembly_processor: Box<dyn AssemblyProcessor>,
    header_skip: SkipSet,
    body_skip: SkipSet,
    reading: Arc<AtomicBool>,
    attach_summary: AttachSummary,
    ignored_tags: usize,
}

impl Default for HotSpotLogParser<JitDataModel> {
    fn default() -> Self {
        Self::with_model(JitDataModel::new())
    }
}

impl HotSpotLogParser<JitDataModel> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M: ClassModel> HotSpotLogParser<M> {
    pub fn with_model(model: M) -> Self {
        Self {
            model,
            classpath: ParsedClasspath::new(),
            split_log: SplitLog::new(),
            context: ParseContext::new(),
            tag_processor: TagProcessor::new(),
            assembly_processor: Box::new(AssemblyCollector::new()),
            header_skip: SkipSet::header(),
            body_skip: SkipSet::body(),
            reading: Arc::new(AtomicBool::new(false)),
            attach_summary: AttachSummary::default(),
            ignored_tags: 0,
        }
    }

    pub fn with_assembly_processor(mut self, processor: Box<dyn AssemblyProcessor>) -> Self {
        self.assembly_processor = processor;
        self
    }

    /// Skip compilation-stream lines starting with any of these prefixes too
    pub fn with_body_skip<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for prefix in prefixes {
            self.body_skip = self.body_skip.with_prefix(prefix);
        }
        self
    }

    /// Parse a log file
    ///
    /// **Public** - main entry point
    ///
    /// # Arguments
    /// * `path` - HotSpot log written with `-XX:+LogCompilation`
    /// * `listener` - Receives the error dialog text, if any
    ///
    /// # Returns
    /// Number of lines read
    ///
    /// # Errors
    /// * `LogError::Open` - the file cannot be opened. Nothing else aborts a parse.
    pub fn parse(
        &mut self,
        path: impl AsRef<Path>,
        listener: &mut dyn ErrorListener,
    ) -> Result<usize, LogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LogError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Parsing HotSpot log: {}", path.display());
        Ok(self.parse_reader(BufReader::with_capacity(READ_BUFFER_SIZE, file), listener))
    }

    /// Parse a log from any buffered reader
    ///
    /// **Public** - used by `parse` and by callers holding the log in memory
    ///
    /// # Returns
    /// Number of lines read
    pub fn parse_reader<R: BufRead>(&mut self, reader: R, listener: &mut dyn ErrorListener) -> usize {
        self.reset();
        self.reading.store(true, Ordering::SeqCst);

        // Phase 1
        let lines_read = LineClassifier::new(&mut self.split_log, &mut self.context)
            .split_reader(reader, &self.reading);
        if let Err(e) = lines_read {
            error!(
                "Error reading log after line {}: {}",
                self.context.parse_line_number, e
            );
        }
        self.reading.store(false, Ordering::SeqCst);

        debug!(
            "Split log: {} header, {} compilation, {} class loader, {} assembly lines",
            self.split_log.header_lines().len(),
            self.split_log.compilation_lines().len(),
            self.split_log.class_loader_lines().len(),
            self.split_log.assembly_lines().len()
        );

        // Phase 2
        let mut dispatcher = EventDispatcher::new(&mut self.model);
        process_lines(
            self.split_log.header_lines(),
            &self.header_skip,
            &mut self.tag_processor,
            &mut self.context,
            &mut dispatcher,
        );
        self.tag_processor.reset();

        // Phase 3 and 4
        build_parsed_classpath(
            self.split_log.class_loader_lines(),
            &mut self.classpath,
            &mut self.context,
        );
        build_class_model(self.split_log.class_loader_lines(), dispatcher.model_mut());

        // Phase 5
        process_lines(
            self.split_log.compilation_lines(),
            &self.body_skip,
            &mut self.tag_processor,
            &mut self.context,
            &mut dispatcher,
        );
        if self.tag_processor.is_open() {
            debug!("Log ended inside an unterminated tag");
        }
        self.ignored_tags = dispatcher.ignored();

        // Phase 6
        for numbered_line in self.split_log.assembly_lines() {
            self.assembly_processor.handle_line(&numbered_line.line);
        }
        self.assembly_processor.complete();
        self.attach_summary = self
            .assembly_processor
            .attach_assembly_to_members(self.model.package_manager_mut());
        self.assembly_processor.clear();

        self.check_if_error_dialog_needed(listener);

        self.context.parse_line_number
    }

    /// Stop the read loop before its next read
    pub fn stop(&self) {
        self.reading.store(false, Ordering::SeqCst);
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            reading: Arc::clone(&self.reading),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    pub fn classpath(&self) -> &ParsedClasspath {
        &self.classpath
    }

    pub fn split_log(&self) -> &SplitLog {
        &self.split_log
    }

    pub fn context(&self) -> &ParseContext {
        &self.context
    }

    pub fn attach_summary(&self) -> AttachSummary {
        self.attach_summary
    }

    /// Tags dropped for a missing or malformed `method` attribute
    pub fn ignored_tags(&self) -> usize {
        self.ignored_tags
    }

    fn reset(&mut self) {
        self.model.reset();
        self.classpath.clear();
        self.split_log.clear();
        self.context.reset();
        self.tag_processor.reset();
        self.assembly_processor.clear();
        self.attach_summary = AttachSummary::default();
        self.ignored_tags = 0;
    }

    fn check_if_error_dialog_needed(&mut self, listener: &mut dyn ErrorListener) {
        if !self.context.has_parse_error() && !self.context.has_trace_class_load {
            self.context.raise_error(
                MISSING_TRACE_CLASS_LOADING_TITLE,
                MISSING_TRACE_CLASS_LOADING_BODY,
            );
        }

        if let Some((title, body)) = self.context.error() {
            listener.handle_error(title, body);
        }
    }
}

impl HotSpotLogParser<JitDataModel> {
    /// Convert the parsed model to the output report format
    ///
    /// **Public** - used by the analyze command before writing JSON
    ///
    /// # Arguments
    /// * `log_file` - Path of the decoded log, recorded in the report
    /// * `largest_methods` - Ranking by native size, from the aggregator
    /// * `slowest_compilations` - Ranking by compile time, from the aggregator
    pub fn to_report(
        &self,
        log_file: &Path,
        largest_methods: Vec<CompiledMethod>,
        slowest_compilations: Vec<CompiledMethod>,
    ) -> LogReport {
        use chrono::Utc;

        let model = &self.model;
        LogReport {
            version: SCHEMA_VERSION.to_string(),
            log_file: log_file.display().to_string(),
            vm_release: model.vm_version_release().map(str::to_string),
            vm_command: model.vm_command().map(str::to_string),
            end_of_log_stamp: model.end_of_log_stamp(),
            streams: StreamCounts {
                lines_read: self.context.parse_line_number,
                header_lines: self.split_log.header_lines().len(),
                compilation_lines: self.split_log.compilation_lines().len(),
                class_loader_lines: self.split_log.class_loader_lines().len(),
                assembly_lines: self.split_log.assembly_lines().len(),
            },
            class_count: model.package_manager().class_count(),
            member_count: model.package_manager().member_count(),
            classpath: self.classpath.locations().to_vec(),
            jit_stats: model.jit_stats().clone(),
            code_cache_events: model.code_cache_events().to_vec(),
            assembly: self.attach_summary,
            largest_methods,
            slowest_compilations,
            parse_error: self.context.error().map(|(title, body)| ParseErrorSummary {
                title: title.to_string(),
                body: body.to_string(),
            }),
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Feed a stream through the tag processor and dispatch what it emits
fn process_lines<M: ClassModel + ?Sized>(
    lines: &[NumberedLine],
    skip: &SkipSet,
    tag_processor: &mut TagProcessor,
    context: &mut ParseContext,
    dispatcher: &mut EventDispatcher<'_, M>,
) {
    for numbered_line in lines {
        if skip.matches(&numbered_line.line) {
            continue;
        }

        context.process_line_number = numbered_line.line_number;
        for element in tag_processor.process_line(&numbered_line.line, numbered_line.line_number) {
            dispatcher.handle_tag(element);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> (HotSpotLogParser, Vec<(String, String)>) {
        let mut errors = Vec::new();
        let mut parser = HotSpotLogParser::new();
        parser.parse_reader(input.as_bytes(), &mut |title: &str, body: &str| {
            errors.push((title.to_string(), body.to_string()))
        });
        (parser, errors)
    }

    #[test]
    fn test_missing_switch_raised_once() {
        let (parser, errors) = parse("<?xml version='1.0'?>\n<hotspot_log>\n<tty>\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, MISSING_TRACE_CLASS_LOADING_TITLE);
        assert!(parser.context().has_parse_error());
    }

    #[test]
    fn test_second_parse_starts_clean() {
        let mut parser = HotSpotLogParser::new();
        let mut ignore = |_: &str, _: &str| {};
        parser.parse_reader(
            "[Loaded A from file:/a.jar]\n<task_queued compile_id='1' method='A m ()V'/>\n".as_bytes(),
            &mut ignore,
        );
        assert_eq!(parser.model().package_manager().member_count(), 1);

        parser.parse_reader("[Loaded B from file:/b.jar]\n".as_bytes(), &mut ignore);
        assert_eq!(parser.model().package_manager().member_count(), 0);
        assert_eq!(parser.classpath().locations(), &["/b.jar".to_string()]);
    }

    #[test]
    fn test_stop_handle_shares_flag() {
        let parser = HotSpotLogParser::new();
        let handle = parser.stop_handle();
        assert!(!handle.is_reading());
        handle.stop();
        assert!(!handle.is_reading());
    }
}
