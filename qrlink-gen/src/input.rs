//! Interactive prompt input
//!
//! Reads answers line by line from any [`BufRead`] source (stdin in the
//! binary, an in-memory cursor in tests) and writes prompts to any [`Write`]
//! sink. Read failures never escape: callers either get a typed
//! [`StageError::InputUnavailable`] from [`PromptInput::next_line`] or a fixed
//! default from [`PromptInput::get_line`].

use crate::models::DEFAULT_URL;
use qrlink_common::{Release, StageError, StageResult};
use std::io::{BufRead, Stdin, StdinLock, Stdout, Write};
use tracing::{info, warn};

const DEFAULT_LINE_PROMPT: &str = "Please enter the input: ";
const DEFAULT_INT_PROMPT: &str = "Please enter a number: ";

/// Returned by [`PromptInput::get_int`] when no integer could be read
pub const INVALID_INT: i64 = -1;

/// Prompt-and-read console source
pub struct PromptInput<R, W> {
    reader: Option<R>,
    writer: W,
}

impl PromptInput<StdinLock<'static>, Stdout> {
    /// Attach to the process console
    pub fn stdin() -> Self {
        let stdin: Stdin = std::io::stdin();
        Self::new(stdin.lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> PromptInput<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: Some(reader),
            writer,
        }
    }

    /// Print `prompt` and read one trimmed line
    ///
    /// An empty line yields `Ok("")`. End of input, a closed source, or a read
    /// error yields [`StageError::InputUnavailable`].
    pub fn next_line(&mut self, prompt: &str) -> StageResult<String> {
        let prompt = if prompt.trim().is_empty() {
            DEFAULT_LINE_PROMPT
        } else {
            prompt
        };
        self.say(prompt);

        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| StageError::InputUnavailable("input source is closed".to_string()))?;

        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => Err(StageError::InputUnavailable(
                "no more input available".to_string(),
            )),
            Ok(_) => Ok(line.trim().to_string()),
            Err(e) => Err(StageError::InputUnavailable(e.to_string())),
        }
    }

    /// Print `prompt` and read one line, falling back to the default URL
    ///
    /// Empty or blank lines, end of input, and read errors all yield
    /// `https://devfolios.online`.
    pub fn get_line(&mut self, prompt: &str) -> String {
        match self.next_line(prompt) {
            Ok(line) if !line.is_empty() => line,
            Ok(_) => {
                info!("Input was empty, defaulting to: {}", DEFAULT_URL);
                self.say(&format!("Input was empty, defaulting to: {}\n", DEFAULT_URL));
                DEFAULT_URL.to_string()
            }
            Err(e) => {
                warn!(error = %e, "No input available, using default");
                DEFAULT_URL.to_string()
            }
        }
    }

    /// Print `prompt` and read an integer from the first token of the next line
    ///
    /// The rest of the line is discarded. A missing or malformed token, end of
    /// input, or a read error yields [`INVALID_INT`].
    pub fn get_int(&mut self, prompt: &str) -> i64 {
        let prompt = if prompt.trim().is_empty() {
            DEFAULT_INT_PROMPT
        } else {
            prompt
        };

        let line = match self.next_line(prompt) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Error reading integer input");
                return INVALID_INT;
            }
        };

        match line.split_whitespace().next().map(str::parse::<i64>) {
            Some(Ok(value)) => value,
            _ => {
                warn!("Invalid integer input");
                INVALID_INT
            }
        }
    }

    /// Release the underlying reader; later reads report unavailable input
    pub fn close(&mut self) -> StageResult<()> {
        self.reader = None;
        self.writer
            .flush()
            .map_err(|e| StageError::Release(format!("flushing prompt output: {}", e)))
    }

    /// Write a line of user-facing text to the prompt sink
    pub fn say(&mut self, text: &str) {
        let result = if text.ends_with('\n') {
            self.writer.write_all(text.as_bytes())
        } else {
            writeln!(self.writer, "{}", text)
        };
        if let Err(e) = result.and_then(|_| self.writer.flush()) {
            warn!(error = %e, "Failed to write prompt");
        }
    }

    /// Sink the prompts are written to
    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<R: BufRead, W: Write> Release for PromptInput<R, W> {
    fn resource_name(&self) -> &'static str {
        "prompt input"
    }

    fn release(&mut self) -> StageResult<()> {
        self.close()
    }
}
