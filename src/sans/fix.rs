//! Conversion of `GPRMC` sentences into position fixes.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;
use zerocopy::FromBytes;

use super::{
    geo::Position,
    sentence::{FromSentence, SentenceError, tokenize},
};

/// Factor converting speed over ground from knots to meters per second.
pub const KNOTS_TO_METERS_PER_SECOND: f64 = 0.514444;

/// A timestamped position and velocity sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    /// UTC date and time reported by the receiver.
    pub timestamp: NaiveDateTime,
    /// Latitude in signed decimal degrees (positive = North).
    pub latitude: f64,
    /// Longitude in signed decimal degrees (positive = East).
    pub longitude: f64,
    /// Speed over ground in m/s.
    pub speed: f64,
    /// Whether the receiver flagged the fix as valid (status `A`).
    pub valid: bool,
}

impl Fix {
    pub fn position(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }
}

/// A rejected line. No fix is produced for it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line does not begin with `$`.
    #[error("Line is not a sentence.")]
    NotSentence,
    /// The sentence is not a `GPRMC` fix.
    #[error("Sentence is not a position fix.")]
    UnsupportedSentence,
    /// Wrong number of fields after the tag.
    #[error("Found {found} sentence fields, expected {expected}.")]
    FieldCount { found: usize, expected: usize },
    /// No checksum was transmitted.
    #[error("Sentence has no checksum.")]
    MissingChecksum,
    /// The checksum is not two hexadecimal digits.
    #[error("Malformed sentence checksum.")]
    MalformedChecksum,
    /// Calculated and found checksums do not match.
    #[error("Calculated ({calculated:02X}) and found ({found:02X}) checksums do not match.")]
    Checksum { found: u8, calculated: u8 },
    /// A hemisphere indicator is not one of `N`, `S`, `E` or `W`.
    #[error("Unrecognised hemisphere indicator.")]
    Hemisphere,
    /// A numeric or date field failed to convert.
    #[error("Invalid {0} field.")]
    InvalidField(&'static str),
}

impl From<SentenceError> for ParseError {
    fn from(err: SentenceError) -> Self {
        match err {
            SentenceError::NotSentence => Self::NotSentence,
            SentenceError::UnexpectedTag => Self::UnsupportedSentence,
            SentenceError::FieldCount { found, expected } => Self::FieldCount { found, expected },
            SentenceError::MissingChecksum => Self::MissingChecksum,
            SentenceError::MalformedChecksum => Self::MalformedChecksum,
            SentenceError::Checksum { found, calculated } => Self::Checksum { found, calculated },
        }
    }
}

impl ParseError {
    /// Whether the line was rejected for transmission damage rather than for
    /// its content.
    pub fn is_checksum(&self) -> bool {
        matches!(
            self,
            Self::MissingChecksum | Self::MalformedChecksum | Self::Checksum { .. }
        )
    }
}

/// Fields of a recommended minimum (`GPRMC`) sentence.
///
/// Fields are held as received; the accessors convert them.
#[derive(Debug, Default, FromSentence)]
#[sentence(tag = "GPRMC", fields = 12)]
pub struct Rmc<'a> {
    #[field(1)]
    pub utc_time: &'a str,
    #[field(2)]
    pub status: &'a str,
    #[field(3)]
    pub lat: &'a str,
    #[field(4)]
    pub lat_hemisphere: &'a str,
    #[field(5)]
    pub lng: &'a str,
    #[field(6)]
    pub lng_hemisphere: &'a str,
    #[field(7)]
    pub speed_knots: &'a str,
    #[field(8)]
    pub track_angle: &'a str,
    #[field(9)]
    pub utc_date: &'a str,
    #[field(10)]
    pub magnetic_variation: &'a str,
    #[field(11)]
    pub magnetic_hemisphere: &'a str,
    #[field(12)]
    pub mode: &'a str,
}

#[repr(C)]
#[derive(FromBytes)]
struct DateField {
    day: [u8; 2],
    month: [u8; 2],
    year: [u8; 2],
}

#[repr(C)]
#[derive(FromBytes)]
struct TimeField {
    hour: [u8; 2],
    minute: [u8; 2],
    second: [u8; 2],
}

impl Rmc<'_> {
    /// Whether the receiver flagged the fix as valid.
    pub fn is_valid(&self) -> bool {
        self.status == "A"
    }

    /// UTC date and time, from `ddmmyy` and `hhmmss[.s]` fields.
    ///
    /// Two-digit years from 70 onward fall in the twentieth century.
    pub fn timestamp(&self) -> Result<NaiveDateTime, ParseError> {
        let invalid = || ParseError::InvalidField("timestamp");

        let date: [u8; 6] = self.utc_date.as_bytes().try_into().map_err(|_| invalid())?;
        let DateField { day, month, year } = zerocopy::transmute!(date);

        let (time, fraction) = match self.utc_time.split_once('.') {
            Some((time, fraction)) => (time, Some(fraction)),
            None => (self.utc_time, None),
        };

        let time: [u8; 6] = time.as_bytes().try_into().map_err(|_| invalid())?;
        let TimeField {
            hour,
            minute,
            second,
        } = zerocopy::transmute!(time);

        let year = match digits(year).ok_or_else(invalid)? {
            y @ 70.. => 1900 + y,
            y => 2000 + y,
        };

        let nanos = match fraction {
            Some(fraction) => fraction_nanos(fraction).ok_or_else(invalid)?,
            None => 0,
        };

        let date = NaiveDate::from_ymd_opt(
            year as i32,
            digits(month).ok_or_else(invalid)?,
            digits(day).ok_or_else(invalid)?,
        )
        .ok_or_else(invalid)?;

        let time = NaiveTime::from_hms_nano_opt(
            digits(hour).ok_or_else(invalid)?,
            digits(minute).ok_or_else(invalid)?,
            digits(second).ok_or_else(invalid)?,
            nanos,
        )
        .ok_or_else(invalid)?;

        Ok(date.and_time(time))
    }

    /// Latitude in signed decimal degrees, from a `ddmm.mmmm` field.
    pub fn latitude(&self) -> Result<f64, ParseError> {
        let value = coordinate(self.lat, 2, 90.0).ok_or(ParseError::InvalidField("latitude"))?;

        match self.lat_hemisphere {
            "N" => Ok(value),
            "S" => Ok(-value),
            _ => Err(ParseError::Hemisphere),
        }
    }

    /// Longitude in signed decimal degrees, from a `dddmm.mmmm` field.
    pub fn longitude(&self) -> Result<f64, ParseError> {
        let value = coordinate(self.lng, 3, 180.0).ok_or(ParseError::InvalidField("longitude"))?;

        match self.lng_hemisphere {
            "E" => Ok(value),
            "W" => Ok(-value),
            _ => Err(ParseError::Hemisphere),
        }
    }

    /// Speed over ground in m/s.
    pub fn speed(&self) -> Result<f64, ParseError> {
        let knots = decimal(self.speed_knots).ok_or(ParseError::InvalidField("speed"))?;
        Ok(knots * KNOTS_TO_METERS_PER_SECOND)
    }

    /// Track angle in degrees true, if reported.
    pub fn track(&self) -> Result<Option<f64>, ParseError> {
        if self.track_angle.is_empty() {
            return Ok(None);
        }

        decimal(self.track_angle)
            .map(Some)
            .ok_or(ParseError::InvalidField("track angle"))
    }

    /// Magnetic variation in signed degrees (positive = East), if reported.
    pub fn magnetic_variation(&self) -> Result<Option<f64>, ParseError> {
        if self.magnetic_variation.is_empty() {
            return Ok(None);
        }

        let value = decimal(self.magnetic_variation)
            .ok_or(ParseError::InvalidField("magnetic variation"))?;

        match self.magnetic_hemisphere {
            "E" => Ok(Some(value)),
            "W" => Ok(Some(-value)),
            _ => Err(ParseError::Hemisphere),
        }
    }

    /// Convert the sentence into a fix.
    pub fn fix(&self) -> Result<Fix, ParseError> {
        Ok(Fix {
            timestamp: self.timestamp()?,
            latitude: self.latitude()?,
            longitude: self.longitude()?,
            speed: self.speed()?,
            valid: self.is_valid(),
        })
    }
}

/// Parse a line into a fix, or reject it.
///
/// The transmitted checksum is not verified; see [`parse_checked`].
pub fn parse(line: &str) -> Result<Fix, ParseError> {
    let rmc: Rmc = tokenize(line)?.decode()?;
    rmc.fix()
}

/// Parse a line into a fix, rejecting it unless its checksum matches.
pub fn parse_checked(line: &str) -> Result<Fix, ParseError> {
    let sentence = tokenize(line)?;
    sentence.verify()?;

    let rmc: Rmc = sentence.decode()?;
    rmc.fix()
}

/// Two ASCII digits as a number.
fn digits([a, b]: [u8; 2]) -> Option<u32> {
    if a.is_ascii_digit() && b.is_ascii_digit() {
        Some(u32::from(a - b'0') * 10 + u32::from(b - b'0'))
    } else {
        None
    }
}

/// Fractional seconds (the digits after the point) as nanoseconds.
fn fraction_nanos(r: &str) -> Option<u32> {
    if r.is_empty() || r.len() > 9 || !r.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let value: u32 = r.parse().ok()?;
    Some(value * 10u32.pow(9 - r.len() as u32))
}

/// An unsigned decimal number of digits and at most one point.
fn decimal(r: &str) -> Option<f64> {
    let mut points = 0;

    for b in r.bytes() {
        match b {
            b'0'..=b'9' => {}
            b'.' => points += 1,
            _ => return None,
        }
    }

    if points > 1 || !r.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    r.parse().ok()
}

/// Degrees and minutes concatenated, with a fixed number of degree digits.
fn coordinate(r: &str, degree_digits: usize, max: f64) -> Option<f64> {
    let degrees = r.get(..degree_digits)?;
    let minutes = r.get(degree_digits..)?;

    if !degrees.bytes().all(|b| b.is_ascii_digit())
        || !minutes.starts_with(|c: char| c.is_ascii_digit())
    {
        return None;
    }

    let degrees: f64 = degrees.parse().ok()?;
    let minutes = decimal(minutes)?;

    if !(0.0..60.0).contains(&minutes) {
        return None;
    }

    let value = degrees + minutes / 60.0;
    (value <= max).then_some(value)
}
