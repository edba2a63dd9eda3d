use std::fmt;

use jiff::Timestamp;
use thiserror::Error;
use tracing::warn;

/// Formatting/parsing profile for timestamp text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimestampMode {
    #[default]
    Iso8601,
}

impl fmt::Display for TimestampMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iso8601 => f.write_str("iso8601"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("unable to parse timestamp {value:?} by {mode}")]
    Parse { value: String, mode: TimestampMode },
    #[error("unable to format timestamp {value} by {mode}")]
    Format {
        value: Timestamp,
        mode: TimestampMode,
    },
}

/// The ISO 8601 variants tried by [`parse`], in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iso8601Variant {
    /// `20240601T120000Z`, `20240601T120000+0100`
    Basic,
    /// `2024-06-01T12:00:00Z`, `2024-06-01T12:00:00+01:00`
    InternetDateTime,
    /// `2024-06-01T12:00:00.250Z`
    InternetDateTimeFractional,
}

impl Iso8601Variant {
    pub const CHAIN: [Iso8601Variant; 3] = [
        Self::Basic,
        Self::InternetDateTime,
        Self::InternetDateTimeFractional,
    ];

    pub fn parse(self, text: &str) -> Option<Timestamp> {
        match self {
            Self::Basic => parse_basic(text),
            Self::InternetDateTime => {
                let (date_time, fraction, offset) = split_internet(text)?;
                if fraction.is_some() {
                    return None;
                }
                format!("{date_time}{offset}").parse().ok()
            }
            Self::InternetDateTimeFractional => {
                let (date_time, fraction, offset) = split_internet(text)?;
                let fraction = fraction?;
                format!("{date_time}.{fraction}{offset}").parse().ok()
            }
        }
    }
}

/// Canonical text for `value`: whole seconds, UTC, `Z` suffix.
pub fn format(value: Timestamp, mode: TimestampMode) -> Result<String, TimestampError> {
    let text = match mode {
        TimestampMode::Iso8601 => value.strftime("%Y-%m-%dT%H:%M:%SZ").to_string(),
    };

    if text.is_empty() {
        let err = TimestampError::Format { value, mode };
        warn!(error = %err, "timestamp formatting produced no text");
        return Err(err);
    }

    Ok(text)
}

/// Full-precision RFC 3339 text for `value`, restricted to what [`parse`]
/// reads back. Years before 0000 have no such text and are refused.
pub fn format_lossless(value: Timestamp) -> Result<String, TimestampError> {
    let text = value.to_string();

    if split_internet(&text).is_none() {
        let err = TimestampError::Format {
            value,
            mode: TimestampMode::Iso8601,
        };
        warn!(error = %err, "timestamp has no readable lossless text");
        return Err(err);
    }

    Ok(text)
}

/// Parses `text`, returning the result of the first variant in
/// [`Iso8601Variant::CHAIN`] that accepts it.
pub fn parse(text: &str, mode: TimestampMode) -> Result<Timestamp, TimestampError> {
    let parsed = match mode {
        TimestampMode::Iso8601 => Iso8601Variant::CHAIN
            .iter()
            .find_map(|variant| variant.parse(text)),
    };

    parsed.ok_or_else(|| {
        let err = TimestampError::Parse {
            value: text.to_string(),
            mode,
        };
        warn!(error = %err, "timestamp did not match any supported variant");
        err
    })
}

fn all_digits(bytes: &[u8]) -> bool {
    !bytes.is_empty() && bytes.iter().all(u8::is_ascii_digit)
}

fn parse_basic(text: &str) -> Option<Timestamp> {
    let (stamp, offset) = text.split_at_checked(15)?;
    let b = stamp.as_bytes();
    if b[8] != b'T' || !all_digits(&b[..8]) || !all_digits(&b[9..]) {
        return None;
    }

    let offset = match offset {
        "Z" => "Z".to_string(),
        o if o.len() == 5 && o.starts_with(['+', '-']) && all_digits(&o.as_bytes()[1..]) => {
            format!("{}:{}", &o[..3], &o[3..])
        }
        _ => return None,
    };

    format!(
        "{}-{}-{}T{}:{}:{}{}",
        &stamp[0..4],
        &stamp[4..6],
        &stamp[6..8],
        &stamp[9..11],
        &stamp[11..13],
        &stamp[13..15],
        offset
    )
    .parse()
    .ok()
}

/// Splits `YYYY-MM-DDTHH:MM:SS[.fff]<offset>` into its parts.
fn split_internet(text: &str) -> Option<(&str, Option<&str>, &str)> {
    let (date_time, rest) = text.split_at_checked(19)?;
    let b = date_time.as_bytes();
    let shape_ok = b[4] == b'-'
        && b[7] == b'-'
        && b[10] == b'T'
        && b[13] == b':'
        && b[16] == b':'
        && [&b[0..4], &b[5..7], &b[8..10], &b[11..13], &b[14..16], &b[17..19]]
            .iter()
            .all(|part| all_digits(part));
    if !shape_ok {
        return None;
    }

    let (fraction, offset) = match rest.strip_prefix('.') {
        Some(rest) => {
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            if digits == 0 || digits > 9 {
                return None;
            }
            let (fraction, offset) = rest.split_at(digits);
            (Some(fraction), offset)
        }
        None => (None, rest),
    };

    let offset_ok = offset == "Z"
        || (offset.len() == 6
            && offset.starts_with(['+', '-'])
            && offset.as_bytes()[3] == b':'
            && all_digits(&offset.as_bytes()[1..3])
            && all_digits(&offset.as_bytes()[4..6]));

    offset_ok.then_some((date_time, fraction, offset))
}

/// Serde adapter for date-valued leaves: [`format_lossless`] out, the
/// [`parse`] chain in.
pub mod iso8601 {
    use jiff::Timestamp;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _, ser::Error as _};

    use super::TimestampMode;

    pub fn serialize<S>(value: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = super::format_lossless(*value).map_err(S::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        super::parse(&text, TimestampMode::Iso8601).map_err(D::Error::custom)
    }
}
