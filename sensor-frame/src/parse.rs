use crate::{FIELD_COUNT, RecordField, SEPARATOR, TelemetryRecord};
use std::{fmt, str::FromStr};

/// Reason a frame could not be turned into a [`TelemetryRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The frame did not split into exactly eight fields.
    FieldCount(usize),
    /// A measurement is not a number of the type its field requires.
    Field { field: RecordField, value: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::FieldCount(n) => {
                write!(f, "expected {} fields, got {}", FIELD_COUNT, n)
            }
            ParseError::Field { field, value } => {
                write!(f, "invalid {} value {:?}", field, value)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Decodes the seven measurements of a frame. The checksum field is not looked at.
///
/// Either every field converts or the whole frame is rejected.
pub fn parse(line: &str) -> Result<TelemetryRecord, ParseError> {
    let fields: Vec<&str> = line.split(SEPARATOR).collect();
    let &[pm1_0, pm2_5, pm10_0, temp_c, press_pa, humidity_pct, alt_m, _] = fields.as_slice()
    else {
        return Err(ParseError::FieldCount(fields.len()));
    };

    Ok(TelemetryRecord {
        pm1_0: number(pm1_0, RecordField::Pm1_0)?,
        pm2_5: number(pm2_5, RecordField::Pm2_5)?,
        pm10_0: number(pm10_0, RecordField::Pm10_0)?,
        temp_c: number(temp_c, RecordField::TempC)?,
        press_pa: number(press_pa, RecordField::PressPa)?,
        humidity_pct: number(humidity_pct, RecordField::HumidityPct)?,
        alt_m: number(alt_m, RecordField::AltM)?,
    })
}

fn number<N: FromStr>(raw: &str, field: RecordField) -> Result<N, ParseError> {
    raw.trim().parse().map_err(|_| ParseError::Field {
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference_frame() {
        let record = parse("12,34,56,21.5,101325.0,45.0,120.3,5A").unwrap();

        assert_eq!(
            record,
            TelemetryRecord {
                pm1_0: 12,
                pm2_5: 34,
                pm10_0: 56,
                temp_c: 21.5,
                press_pa: 101325.0,
                humidity_pct: 45.0,
                alt_m: 120.3,
            }
        );
    }

    #[test]
    fn test_checksum_field_is_ignored() {
        assert!(parse("1,2,3,4,5,6,7,not-hex").is_ok());
    }

    #[test]
    fn test_wrong_field_count() {
        assert_eq!(
            parse("1,2,3,4,5,6,7"),
            Err(ParseError::FieldCount(7))
        );
        assert_eq!(
            parse("1,2,3,4,5,6,7,8,9"),
            Err(ParseError::FieldCount(9))
        );
    }

    #[test]
    fn test_fractional_particulate_count_rejected() {
        assert_eq!(
            parse("1,2.5,3,4,5,6,7,0"),
            Err(ParseError::Field {
                field: RecordField::Pm2_5,
                value: "2.5".to_string()
            })
        );
    }

    #[test]
    fn test_negative_particulate_count_accepted() {
        // -1 is what boards report for a sensor that is not ready
        let record = parse("-1,34,56,21.5,101325.0,45.0,120.3,0").unwrap();

        assert_eq!(record.pm1_0, -1);
        assert_eq!(record.pm2_5, 34);
    }

    #[test]
    fn test_non_numeric_float_rejected() {
        assert_eq!(
            parse("1,2,3,4,5,dry,7,0"),
            Err(ParseError::Field {
                field: RecordField::HumidityPct,
                value: "dry".to_string()
            })
        );
    }

    #[test]
    fn test_empty_field_rejected() {
        assert!(matches!(
            parse("1,2,3,4,,6,7,0"),
            Err(ParseError::Field {
                field: RecordField::PressPa,
                ..
            })
        ));
    }

    #[test]
    fn test_surrounding_whitespace_accepted() {
        let record = parse(" 1, 2 ,3,-4.25 ,5,6,7,0").unwrap();

        assert_eq!(record.pm1_0, 1);
        assert_eq!(record.pm2_5, 2);
        assert_eq!(record.temp_c, -4.25);
    }
}
