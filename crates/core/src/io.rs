//! Output handling with stdout/stderr separation contract
//!
//! Commands write their results through [`Output`] instead of `println!`, so
//! stdout only ever carries command output while logs go to stderr via
//! tracing.

use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};

/// Output helper that enforces stdout/stderr separation contract
///
/// # Examples
///
/// ```
/// use devmanifest_core::io::Output;
/// use serde_json::json;
///
/// let mut output = Output::stdout();
/// output.write_json(&json!({"status": "ok"})).unwrap();
/// output.write_line("done").unwrap();
/// ```
pub struct Output {
    writer: Box<dyn Write>,
}

impl Output {
    /// Output bound to the process stdout.
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Output bound to an arbitrary writer.
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }

    /// Write a JSON-serializable value as a single line.
    pub fn write_json<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let json_output = serde_json::to_string(value)?;
        self.write_line(&json_output)
    }

    /// Write a text line.
    pub fn write_line(&mut self, text: &str) -> Result<()> {
        writeln!(self.writer, "{}", text)?;
        Ok(())
    }

    pub fn write_lines(&mut self, lines: &[&str]) -> Result<()> {
        for line in lines {
            self.write_line(line)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for Output {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
