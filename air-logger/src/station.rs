use log::{debug, info, warn};
use sensor_frame::{ChecksumError, ParseError, TelemetryRecord};
use serial_source::{LineSource, SourceError};
use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};
use uploader::{Transport, UploadError, Uploader};

/// What happened to one line read from the sensor.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Nothing but whitespace.
    Empty,
    Rejected(ChecksumError),
    Unparsed(ParseError),
    Uploaded(TelemetryRecord),
    UploadFailed(TelemetryRecord, UploadError),
}

/// Why a frame did not yield a record.
#[derive(Debug, Clone, PartialEq)]
pub enum LineError {
    Checksum(ChecksumError),
    Parse(ParseError),
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineError::Checksum(e) => write!(f, "checksum failed: {}", e),
            LineError::Parse(e) => write!(f, "parse failed: {}", e),
        }
    }
}

impl std::error::Error for LineError {}

#[derive(Debug)]
pub enum StationError {
    Source(SourceError),
}

impl fmt::Display for StationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationError::Source(e) => write!(f, "serial source: {}", e),
        }
    }
}

impl std::error::Error for StationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StationError::Source(e) => Some(e),
        }
    }
}

/// Turns raw serial bytes into text: invalid UTF-8 is dropped, surrounding
/// whitespace (including `\r`) trimmed.
pub fn decode_line(raw: &[u8]) -> String {
    let text: String = raw.utf8_chunks().map(|chunk| chunk.valid()).collect();
    text.trim().to_string()
}

/// Validates a decoded frame and parses it into a record.
pub fn read_frame(line: &str) -> Result<TelemetryRecord, LineError> {
    sensor_frame::validate(line).map_err(LineError::Checksum)?;
    sensor_frame::parse(line).map_err(LineError::Parse)
}

/// The read, validate, parse, upload loop.
///
/// Owns the line source for its whole life; dropping the station closes the port.
pub struct Station<S, T> {
    source: S,
    uploader: Uploader<T>,
}

impl<S: LineSource, T: Transport> Station<S, T> {
    pub fn new(source: S, uploader: Uploader<T>) -> Self {
        Self { source, uploader }
    }

    pub fn uploader(&self) -> &Uploader<T> {
        &self.uploader
    }

    /// Reads and handles lines until `running` is cleared.
    ///
    /// Returns `Ok(())` after an interrupt. A failing or closed source ends the loop
    /// with an error; nothing that goes wrong with a single line does.
    pub fn run(&mut self, running: &AtomicBool) -> Result<(), StationError> {
        while running.load(Ordering::SeqCst) {
            match self.source.read_line() {
                Ok(Some(raw)) => {
                    self.process_line(&raw);
                }
                Ok(None) => {}
                Err(e) => return Err(StationError::Source(e)),
            }
        }

        Ok(())
    }

    /// Runs a single line through validation, parsing and upload, logging the result.
    pub fn process_line(&self, raw: &[u8]) -> LineOutcome {
        let line = decode_line(raw);
        if line.is_empty() {
            return LineOutcome::Empty;
        }

        let record = match read_frame(&line) {
            Ok(record) => record,
            Err(LineError::Checksum(e)) => {
                warn!("Checksum failed: {}", e);
                debug!("Rejected line {:?}", line);
                return LineOutcome::Rejected(e);
            }
            Err(LineError::Parse(e)) => {
                warn!("Parse failed: {}", e);
                return LineOutcome::Unparsed(e);
            }
        };

        info!("{}", record);

        match self.uploader.upload(&record) {
            Ok(()) => {
                info!("Uploaded");
                LineOutcome::Uploaded(record)
            }
            Err(e) => {
                warn!("Upload failed: {}", e);
                LineOutcome::UploadFailed(record, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensor_frame::checksum;
    use serial_source::LineReader;
    use std::{collections::VecDeque, io::Cursor};
    use uploader::{Response, Target, TransportError, mock::MockTransport};

    const DATA: &str = "12,34,56,21.5,101325.0,45.0,120.3";

    fn frame(data: &str) -> String {
        format!("{},{:X}", data, checksum(data))
    }

    fn reference() -> TelemetryRecord {
        TelemetryRecord {
            pm1_0: 12,
            pm2_5: 34,
            pm10_0: 56,
            temp_c: 21.5,
            press_pa: 101325.0,
            humidity_pct: 45.0,
            alt_m: 120.3,
        }
    }

    /// Hands out queued lines and clears `running` once `stop_after` lines went out,
    /// the way the interrupt handler would between two reads.
    struct InterruptedSource<'a> {
        lines: VecDeque<Vec<u8>>,
        running: &'a AtomicBool,
        stop_after: usize,
    }

    impl LineSource for InterruptedSource<'_> {
        fn read_line(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
            let line = self.lines.pop_front().ok_or(SourceError::Closed)?;
            self.stop_after = self.stop_after.saturating_sub(1);
            if self.stop_after == 0 {
                self.running.store(false, Ordering::SeqCst);
            }
            Ok(Some(line))
        }
    }

    fn station(transport: &MockTransport) -> Station<LineReader<Cursor<Vec<u8>>>, &MockTransport> {
        let uploader = Uploader::new(transport, Target::new("https://ingest.invalid/update", "KEY"));
        Station::new(LineReader::new(Cursor::new(Vec::new())), uploader)
    }

    #[test]
    fn test_decode_line() {
        assert_eq!(decode_line(b"  1,2,3\r"), "1,2,3");
        assert_eq!(decode_line(b"1,\xff2\xfe,3"), "1,2,3");
        assert_eq!(decode_line(b"\r\n"), "");
    }

    #[test]
    fn test_valid_frame_is_uploaded() {
        let transport = MockTransport::default();
        let station = station(&transport);

        let outcome = station.process_line(format!("{}\r", frame(DATA)).as_bytes());

        assert_eq!(outcome, LineOutcome::Uploaded(reference()));
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(transport.requests()[0].param("field1"), Some("12"));
    }

    #[test]
    fn test_empty_line_is_ignored() {
        let transport = MockTransport::default();
        let station = station(&transport);

        assert_eq!(station.process_line(b""), LineOutcome::Empty);
        assert_eq!(station.process_line(b"   \r"), LineOutcome::Empty);
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_bad_checksum_skips_upload() {
        let transport = MockTransport::default();
        let station = station(&transport);
        let line = format!("{},{:X}", DATA, checksum(DATA) ^ 0x10);

        assert!(matches!(
            station.process_line(line.as_bytes()),
            LineOutcome::Rejected(ChecksumError::Mismatch { .. })
        ));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_missing_checksum_skips_upload() {
        let transport = MockTransport::default();
        let station = station(&transport);

        assert_eq!(
            station.process_line(DATA.as_bytes()),
            LineOutcome::Rejected(ChecksumError::FieldCount(7))
        );
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_unparsable_frame_skips_upload() {
        let transport = MockTransport::default();
        let station = station(&transport);
        let line = frame("12,34,56,warm,101325.0,45.0,120.3");

        assert!(matches!(
            station.process_line(line.as_bytes()),
            LineOutcome::Unparsed(ParseError::Field { .. })
        ));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_rejected_upload_is_reported() {
        let transport = MockTransport::new(vec![Ok(Response::new(200, "0"))]);
        let station = station(&transport);

        assert_eq!(
            station.process_line(frame(DATA).as_bytes()),
            LineOutcome::UploadFailed(reference(), UploadError::Rejected)
        );
    }

    #[test]
    fn test_timed_out_upload_is_reported() {
        let transport = MockTransport::new(vec![Err(TransportError::Timeout)]);
        let station = station(&transport);

        assert_eq!(
            station.process_line(frame(DATA).as_bytes()),
            LineOutcome::UploadFailed(
                reference(),
                UploadError::Transport(TransportError::Timeout)
            )
        );
    }

    #[test]
    fn test_run_stops_when_flag_is_cleared() {
        let transport = MockTransport::default();
        let mut station = station(&transport);

        let running = AtomicBool::new(false);
        assert!(station.run(&running).is_ok());
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_run_stops_mid_stream() {
        let transport = MockTransport::default();
        let running = AtomicBool::new(true);

        let lines = ["12", "13", "14", "15"]
            .map(|pm| frame(&format!("{pm},34,56,21.5,101325.0,45.0,120.3")).into_bytes());
        let source = InterruptedSource {
            lines: lines.into(),
            running: &running,
            stop_after: 2,
        };
        let uploader = Uploader::new(&transport, Target::new("https://ingest.invalid/update", "KEY"));
        let mut station = Station::new(source, uploader);

        assert!(station.run(&running).is_ok());

        // the line in hand when the flag dropped is still handled, the rest never are
        let pm: Vec<_> = transport
            .requests()
            .iter()
            .map(|r| r.param("field1").unwrap().to_string())
            .collect();
        assert_eq!(pm, ["12", "13"]);
        assert_eq!(station.source.lines.len(), 2);
    }

    #[test]
    fn test_negative_count_is_uploaded() {
        let transport = MockTransport::default();
        let station = station(&transport);

        let outcome = station.process_line(frame("-1,34,56,21.5,101325.0,45.0,120.3").as_bytes());

        assert!(matches!(outcome, LineOutcome::Uploaded(ref r) if r.pm1_0 == -1));
        assert_eq!(transport.requests()[0].param("field1"), Some("-1"));
    }
}
