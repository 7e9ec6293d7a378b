use std::{fmt, io};

pub mod reader;
pub mod serial;

pub use reader::LineReader;
pub use serial::{SerialLineSource, discover_port, open_serial, pick_port};

/// A blocking source of text lines, such as a serial link to the sensor board.
pub trait LineSource {
    /// Reads the next line, without its `\n` terminator.
    ///
    /// Returns `Ok(None)` when the read timeout elapsed before a complete
    /// line arrived. Callers are expected to simply try again.
    fn read_line(&mut self) -> Result<Option<Vec<u8>>, SourceError>;
}

#[derive(Debug)]
pub enum SourceError {
    /// The device could not be opened.
    Open {
        path: String,
        source: serialport::Error,
    },
    /// The stream ended.
    Closed,
    Io(io::Error),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Open { path, source } => write!(f, "cannot open {}: {}", path, source),
            SourceError::Closed => write!(f, "stream closed"),
            SourceError::Io(e) => write!(f, "read failed: {}", e),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Open { source, .. } => Some(source),
            SourceError::Closed => None,
            SourceError::Io(e) => Some(e),
        }
    }
}

impl From<io::Error> for SourceError {
    fn from(e: io::Error) -> Self {
        SourceError::Io(e)
    }
}
