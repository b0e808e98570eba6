//! Output targets for the progress line.
//!
//! A sink receives complete frames. A frame is the carriage return, the line
//! and any padding, written in one call so concurrent renders can never mix
//! characters.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Destination of rendered progress frames
pub trait ProgressSink: Send {
    /// Write one frame and flush it
    fn write_frame(&mut self, frame: &str) -> io::Result<()>;
}

/// Standard output
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressSink for ConsoleSink {
    fn write_frame(&mut self, frame: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(frame.as_bytes())?;
        out.flush()
    }
}

/// Any [`Write`] implementation, e.g. a file or a socket
#[derive(Debug)]
pub struct WriterSink<W: Write + Send> {
    inner: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Send> ProgressSink for WriterSink<W> {
    fn write_frame(&mut self, frame: &str) -> io::Result<()> {
        self.inner.write_all(frame.as_bytes())?;
        self.inner.flush()
    }
}

/// Discards every frame
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn write_frame(&mut self, _frame: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Keeps every frame in memory.
///
/// Clones share the same buffer, so one handle can go to the reporter while
/// another is inspected afterwards.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    frames: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All frames written so far, in order
    pub fn frames(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Number of writes received
    pub fn write_count(&self) -> usize {
        self.lock().len()
    }

    /// Concatenation of every frame, as a terminal would have received it
    pub fn contents(&self) -> String {
        self.lock().concat()
    }

    /// The last progress line, without carriage return, padding or newline
    pub fn last_line(&self) -> Option<String> {
        self.lock()
            .iter()
            .rev()
            .find(|frame| frame.starts_with('\r'))
            .map(|frame| frame.trim_start_matches('\r').trim_end().to_string())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.frames.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ProgressSink for MemorySink {
    fn write_frame(&mut self, frame: &str) -> io::Result<()> {
        self.lock().push(frame.to_string());
        Ok(())
    }
}

impl ProgressSink for Box<dyn ProgressSink> {
    fn write_frame(&mut self, frame: &str) -> io::Result<()> {
        (**self).write_frame(frame)
    }
}
