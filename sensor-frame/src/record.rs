use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric type a measurement is carried as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Integer,
    Float,
}

/// The seven measurements of a frame, in frame order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Pm1_0,
    Pm2_5,
    Pm10_0,
    TempC,
    PressPa,
    HumidityPct,
    AltM,
}

impl RecordField {
    /// All fields, in the order they appear in a frame.
    pub const ALL: [RecordField; 7] = [
        RecordField::Pm1_0,
        RecordField::Pm2_5,
        RecordField::Pm10_0,
        RecordField::TempC,
        RecordField::PressPa,
        RecordField::HumidityPct,
        RecordField::AltM,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RecordField::Pm1_0 => "pm1_0",
            RecordField::Pm2_5 => "pm2_5",
            RecordField::Pm10_0 => "pm10_0",
            RecordField::TempC => "temp_c",
            RecordField::PressPa => "press_pa",
            RecordField::HumidityPct => "humidity_pct",
            RecordField::AltM => "alt_m",
        }
    }

    pub fn kind(&self) -> NumericKind {
        match self {
            RecordField::Pm1_0 | RecordField::Pm2_5 | RecordField::Pm10_0 => NumericKind::Integer,
            _ => NumericKind::Float,
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single measurement value taken out of a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
}

/// One decoded sensor reading.
///
/// Particulate counts are in µg/m³, temperature in °C, pressure in Pa,
/// relative humidity in % and altitude in m.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub pm1_0: i64,
    pub pm2_5: i64,
    pub pm10_0: i64,
    pub temp_c: f64,
    pub press_pa: f64,
    pub humidity_pct: f64,
    pub alt_m: f64,
}

impl TelemetryRecord {
    pub fn value(&self, field: RecordField) -> FieldValue {
        match field {
            RecordField::Pm1_0 => FieldValue::Integer(self.pm1_0),
            RecordField::Pm2_5 => FieldValue::Integer(self.pm2_5),
            RecordField::Pm10_0 => FieldValue::Integer(self.pm10_0),
            RecordField::TempC => FieldValue::Float(self.temp_c),
            RecordField::PressPa => FieldValue::Float(self.press_pa),
            RecordField::HumidityPct => FieldValue::Float(self.humidity_pct),
            RecordField::AltM => FieldValue::Float(self.alt_m),
        }
    }
}

impl fmt::Display for TelemetryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PM1.0={} PM2.5={} PM10={} | T={:.1}°C RH={:.0}% | P={:.0}Pa Alt={:.1}m",
            self.pm1_0,
            self.pm2_5,
            self.pm10_0,
            self.temp_c,
            self.humidity_pct,
            self.press_pa,
            self.alt_m
        )
    }
}
