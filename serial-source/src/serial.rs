use crate::{LineReader, SourceError};
use log::debug;
use serialport::SerialPort;
use std::time::Duration;

/// Line source backed by a serial port.
pub type SerialLineSource = LineReader<Box<dyn SerialPort>>;

/// Opens `path` at `baud_rate`; every read blocks for at most `read_timeout`.
///
/// The port is closed when the returned source is dropped.
pub fn open_serial(
    path: &str,
    baud_rate: u32,
    read_timeout: Duration,
) -> Result<SerialLineSource, SourceError> {
    let port = serialport::new(path, baud_rate)
        .timeout(read_timeout)
        .open()
        .map_err(|source| SourceError::Open {
            path: path.to_string(),
            source,
        })?;

    Ok(LineReader::new(port))
}

/// Picks the first attached port whose name starts with `prefix`, or `fallback`.
pub fn discover_port(prefix: &str, fallback: &str) -> String {
    let names: Vec<String> = match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(e) => {
            debug!("Port enumeration failed: {}", e);
            Vec::new()
        }
    };

    pick_port(names, prefix, fallback)
}

pub fn pick_port<I>(candidates: I, prefix: &str, fallback: &str) -> String
where
    I: IntoIterator<Item = String>,
{
    candidates
        .into_iter()
        .filter(|name| name.starts_with(prefix))
        .min()
        .unwrap_or_else(|| fallback.to_string())
}
