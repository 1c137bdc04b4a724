//! Console output streams
//!
//! Everything user-facing goes through an [`OutputSink`] so that command output
//! and echoed child-process output share one ordered destination per run.

use colored::Colorize;
use std::io::Write;
use std::sync::Mutex;

pub use crate::domain::value_objects::output_filter::OutputStream;

/// Destination for primary (stdout) and diagnostic (stderr) lines
pub trait OutputSink: Send + Sync {
    fn write_line(&self, stream: OutputStream, line: &str);

    fn primary(&self, line: &str) {
        self.write_line(OutputStream::Stdout, line);
    }

    fn diagnostic(&self, line: &str) {
        self.write_line(OutputStream::Stderr, line);
    }
}

/// Writes to the process' stdout / stderr; diagnostics are highlighted
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl OutputSink for ConsoleSink {
    fn write_line(&self, stream: OutputStream, line: &str) {
        // Broken pipes (e.g. `wctree tree | head`) are not worth a panic
        match stream {
            OutputStream::Stdout => {
                let _ = writeln!(std::io::stdout().lock(), "{}", line);
            }
            OutputStream::Stderr => {
                let _ = writeln!(std::io::stderr().lock(), "{}", line.yellow());
            }
        }
    }
}

/// Keeps every line in memory, in the order written
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(OutputStream, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(OutputStream, String)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// All lines regardless of stream
    pub fn combined(&self) -> Vec<String> {
        self.lines().into_iter().map(|(_, line)| line).collect()
    }

    pub fn stream(&self, stream: OutputStream) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(s, _)| *s == stream)
            .map(|(_, line)| line)
            .collect()
    }
}

impl OutputSink for MemorySink {
    fn write_line(&self, stream: OutputStream, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((stream, line.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_keeps_order_and_streams() {
        let sink = MemorySink::new();
        sink.primary("one");
        sink.diagnostic("two");
        sink.primary("three");

        assert_eq!(sink.combined(), vec!["one", "two", "three"]);
        assert_eq!(sink.stream(OutputStream::Stdout), vec!["one", "three"]);
        assert_eq!(sink.stream(OutputStream::Stderr), vec!["two"]);
    }
}
