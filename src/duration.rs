use crate::error::ParseError;
use crate::models::ClockDuration;

/// Parser for clock-style durations ("H:MM:SS") and paces ("MM:SS")
///
/// Exports occasionally carry fractional seconds ("1:02:03.4"). Everything
/// from the first `.` onward is discarded before the fields are read.
pub struct DurationParser;

impl DurationParser {
    /// Parse "H:MM:SS" (or "MM:SS") into whole minutes plus leftover seconds
    ///
    /// `total_minutes` is `hours * 60 + minutes`; `seconds` is the trailing
    /// field as written.
    pub fn parse_clock(raw: &str) -> Result<ClockDuration, ParseError> {
        let trimmed = Self::strip_fraction(raw);
        let fields = Self::split_fields(raw, trimmed)?;

        match fields.as_slice() {
            [minutes, seconds] => Ok(ClockDuration::new(*minutes, *seconds)),
            [hours, minutes, seconds] => {
                let total_minutes = hours
                    .checked_mul(60)
                    .and_then(|m| m.checked_add(*minutes))
                    .ok_or_else(|| ParseError::InvalidField {
                        raw: raw.to_string(),
                        field: trimmed.to_string(),
                    })?;
                Ok(ClockDuration::new(total_minutes, *seconds))
            }
            _ => Err(ParseError::TooManyFields {
                raw: raw.to_string(),
            }),
        }
    }

    /// Parse a pace string ("MM:SS" per mile) into total seconds
    pub fn parse_pace(raw: &str) -> Result<u32, ParseError> {
        let clock = Self::parse_clock(raw)?;
        u32::try_from(clock.total_seconds()).map_err(|_| ParseError::InvalidField {
            raw: raw.to_string(),
            field: Self::strip_fraction(raw).to_string(),
        })
    }

    fn strip_fraction(raw: &str) -> &str {
        raw.split('.').next().unwrap_or_default().trim()
    }

    fn split_fields(raw: &str, trimmed: &str) -> Result<Vec<u32>, ParseError> {
        if trimmed.is_empty() {
            return Err(ParseError::Empty);
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        if parts.len() < 2 {
            return Err(ParseError::MissingFields {
                raw: raw.to_string(),
            });
        }
        if parts.len() > 3 {
            return Err(ParseError::TooManyFields {
                raw: raw.to_string(),
            });
        }

        parts
            .iter()
            .map(|part| Self::parse_field(raw, part))
            .collect()
    }

    fn parse_field(raw: &str, field: &str) -> Result<u32, ParseError> {
        let field = field.trim();
        let invalid = || ParseError::InvalidField {
            raw: raw.to_string(),
            field: field.to_string(),
        };

        // u32::from_str accepts a leading '+', which no export produces
        if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        field.parse::<u32>().map_err(|_| invalid())
    }
}
