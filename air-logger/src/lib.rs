pub mod config;
pub mod station;

pub use crate::config::Config;
pub use crate::station::{LineError, LineOutcome, Station, StationError, decode_line, read_frame};
