use crate::{LineSource, SourceError};
use log::debug;
use std::io::{ErrorKind, Read};

/// Longest line kept before it is handed out without a terminator.
pub const MAX_LINE_LEN: usize = 1024;

/// Assembles `\n` terminated lines out of a byte stream whose reads may time out.
///
/// Bytes received before a timeout are kept, so a line split across two
/// reads comes out whole.
pub struct LineReader<R> {
    inner: R,
    pending: Vec<u8>,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::with_capacity(MAX_LINE_LEN),
        }
    }

    fn take_line(&mut self) -> Option<Vec<u8>> {
        if let Some(end) = self.pending.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=end).collect();
            line.pop();
            return Some(line);
        }

        if self.pending.len() >= MAX_LINE_LEN {
            debug!("No terminator in {} bytes, flushing", self.pending.len());
            return Some(std::mem::take(&mut self.pending));
        }

        None
    }
}

impl<R: Read> LineSource for LineReader<R> {
    fn read_line(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        let mut chunk = [0u8; 64];

        loop {
            if let Some(line) = self.take_line() {
                return Ok(Some(line));
            }

            match self.inner.read(&mut chunk) {
                Ok(0) if self.pending.is_empty() => return Err(SourceError::Closed),
                Ok(0) => return Ok(Some(std::mem::take(&mut self.pending))),
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => {
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
