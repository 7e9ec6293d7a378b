use log::debug;
use sensor_frame::{FieldValue, NumericKind, RecordField, TelemetryRecord};
use std::{fmt, time::Duration};

pub mod http;
pub mod mock;

pub use http::HttpTransport;

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Timeout,
    Connect(String),
    Other(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Timeout => write!(f, "request timed out"),
            TransportError::Connect(e) => write!(f, "connection failed: {}", e),
            TransportError::Other(e) => write!(f, "request failed: {}", e),
        }
    }
}

impl std::error::Error for TransportError {}

/// Something able to perform a blocking HTTP GET.
pub trait Transport {
    fn get(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Response, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Response, TransportError> {
        (**self).get(url, params, timeout)
    }
}

/// Associates a record field with the ingestion channel it is sent as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    pub field: RecordField,
    pub channel: &'static str,
    pub kind: NumericKind,
}

const fn mapping(field: RecordField, channel: &'static str, kind: NumericKind) -> FieldMapping {
    FieldMapping {
        field,
        channel,
        kind,
    }
}

pub const FIELD_MAPPING: [FieldMapping; 7] = [
    mapping(RecordField::Pm1_0, "field1", NumericKind::Integer),
    mapping(RecordField::Pm2_5, "field2", NumericKind::Integer),
    mapping(RecordField::Pm10_0, "field3", NumericKind::Integer),
    mapping(RecordField::TempC, "field4", NumericKind::Float),
    mapping(RecordField::PressPa, "field5", NumericKind::Float),
    mapping(RecordField::HumidityPct, "field6", NumericKind::Float),
    mapping(RecordField::AltM, "field7", NumericKind::Float),
];

/// Query parameters for one record: the API key, then one entry per mapped channel.
pub fn query_params(api_key: &str, record: &TelemetryRecord) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(FIELD_MAPPING.len() + 1);
    params.push(("api_key", api_key.to_string()));

    for m in FIELD_MAPPING {
        params.push((m.channel, render(m.kind, record.value(m.field))));
    }

    params
}

/// Renders a value the way its channel expects it, whatever it is carried as.
fn render(kind: NumericKind, value: FieldValue) -> String {
    match (kind, value) {
        (NumericKind::Integer, FieldValue::Integer(v)) => v.to_string(),
        (NumericKind::Integer, FieldValue::Float(v)) => format!("{:.0}", v),
        (NumericKind::Float, FieldValue::Integer(v)) => format_float(v as f64),
        (NumericKind::Float, FieldValue::Float(v)) => format_float(v),
    }
}

// Integral floats keep a ".0" so the channel still reads as decimal.
fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

/// Where and how readings are delivered.
#[derive(Clone)]
pub struct Target {
    pub url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl Target {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(url: &str, api_key: &str) -> Self {
        Self {
            url: url.to_string(),
            api_key: api_key.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    Transport(TransportError),
    /// The endpoint answered with something other than 200.
    Status(u16),
    /// The endpoint answered 200 with its `0` failure body.
    Rejected,
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Transport(e) => write!(f, "{}", e),
            UploadError::Status(code) => write!(f, "unexpected status {}", code),
            UploadError::Rejected => write!(f, "rejected by endpoint"),
        }
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UploadError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TransportError> for UploadError {
    fn from(e: TransportError) -> Self {
        UploadError::Transport(e)
    }
}

/// Delivers records to the ingestion endpoint, one GET request each.
///
/// There is no retry: a failed upload is reported and the reading is gone.
pub struct Uploader<T> {
    transport: T,
    target: Target,
}

impl<T: Transport> Uploader<T> {
    pub fn new(transport: T, target: Target) -> Self {
        Self { transport, target }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn upload(&self, record: &TelemetryRecord) -> Result<(), UploadError> {
        let params = query_params(&self.target.api_key, record);
        let response = self
            .transport
            .get(&self.target.url, &params, self.target.timeout)?;

        debug!(
            "{} answered {} {:?}",
            self.target.url, response.status, response.body
        );

        if response.status != 200 {
            return Err(UploadError::Status(response.status));
        }
        if response.body == "0" {
            return Err(UploadError::Rejected);
        }

        Ok(())
    }
}
