//! Per-run parse state shared by the classifier and the orchestrator.

/// State for one parse of one log file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseContext {
    /// True between `<?xml` and `<tty>`
    pub in_header: bool,
    /// Last physical line number read by the classifier
    pub parse_line_number: usize,
    /// Line number of the line currently being dispatched
    pub process_line_number: usize,
    /// Set once a class-loader line has been seen
    pub has_trace_class_load: bool,
    has_parse_error: bool,
    error_title: String,
    error_body: String,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_parse_error(&self) -> bool {
        self.has_parse_error
    }

    /// Flag a parse error. The first error raised wins.
    pub fn raise_error(&mut self, title: impl Into<String>, body: impl Into<String>) {
        if self.has_parse_error {
            return;
        }
        self.has_parse_error = true;
        self.error_title = title.into();
        self.error_body = body.into();
    }

    /// Title and body of the raised error, if any
    pub fn error(&self) -> Option<(&str, &str)> {
        self.has_parse_error
            .then_some((self.error_title.as_str(), self.error_body.as_str()))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
