//! Surface for errors that should reach the user.

use log::warn;

/// Receives parse errors that need the user's attention
pub trait ErrorListener {
    fn handle_error(&mut self, title: &str, body: &str);
}

impl<F: FnMut(&str, &str)> ErrorListener for F {
    fn handle_error(&mut self, title: &str, body: &str) {
        self(title, body)
    }
}

/// Writes errors to the log at warn level
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingErrorListener;

impl ErrorListener for LoggingErrorListener {
    fn handle_error(&mut self, title: &str, body: &str) {
        warn!("{}", title);
        for line in body.lines() {
            warn!("  {}", line);
        }
    }
}
