//! Pace display formatting
//!
//! Monthly pace means are fractional seconds per mile. They are shown as
//! `M:SS`, truncating rather than rounding, and the seconds field is always
//! two digits (541 s -> "9:01", not "9:1").

/// Format mean seconds-per-mile as `M:SS`
///
/// Both fields are truncated. The value is floored once and split with
/// integer arithmetic, so the seconds field stays within 0..=59 and never
/// renders as `M:60`. Negative or non-finite input formats as `0:00`.
pub fn format_pace(seconds: f64) -> String {
    try_format_pace(seconds).unwrap_or_else(|| "0:00".to_string())
}

/// Like [`format_pace`] but returns `None` for negative or non-finite input
pub fn try_format_pace(seconds: f64) -> Option<String> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }

    let whole = seconds.floor() as u64;
    let minutes = whole / 60;
    let secs = (whole % 60).to_string();

    let secs = if secs.len() == 1 {
        format!("0{}", secs)
    } else {
        secs
    };

    Some(format!("{}:{}", minutes, secs))
}

/// Format an optional mean, keeping absence as absence
pub fn format_optional_pace(seconds: Option<f64>) -> Option<String> {
    seconds.and_then(try_format_pace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_padding() {
        assert_eq!(format_pace(541.0), "9:01");
        assert_eq!(format_pace(552.0), "9:12");
        assert_eq!(format_pace(540.0), "9:00");
        assert_eq!(format_pace(495.0), "8:15");
    }

    #[test]
    fn test_truncates_fractional_seconds() {
        assert_eq!(format_pace(653.5), "10:53");
        assert_eq!(format_pace(554.45), "9:14");
    }

    #[test]
    fn test_seconds_never_reach_sixty() {
        assert_eq!(format_pace(599.9999999), "9:59");
        assert_eq!(format_pace(600.0), "10:00");
    }

    #[test]
    fn test_small_and_large_values() {
        assert_eq!(format_pace(0.0), "0:00");
        assert_eq!(format_pace(59.9), "0:59");
        assert_eq!(format_pace(3725.0), "62:05");
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(try_format_pace(f64::NAN), None);
        assert_eq!(try_format_pace(-1.0), None);
        assert_eq!(try_format_pace(f64::INFINITY), None);
        assert_eq!(format_pace(-5.0), "0:00");
    }

    #[test]
    fn test_absent_stays_absent() {
        assert_eq!(format_optional_pace(None), None);
        assert_eq!(format_optional_pace(Some(541.0)), Some("9:01".to_string()));
    }

    proptest! {
        #[test]
        fn test_always_minutes_colon_two_digits(x in 0.0f64..100_000.0) {
            let formatted = format_pace(x);
            let (minutes, secs) = formatted.split_once(':').unwrap();

            prop_assert!(!minutes.is_empty());
            prop_assert!(minutes.bytes().all(|b| b.is_ascii_digit()));
            prop_assert_eq!(secs.len(), 2);
            prop_assert!(secs.parse::<u32>().unwrap() < 60);
            prop_assert_eq!(minutes.parse::<u64>().unwrap(), x.floor() as u64 / 60);
        }
    }
}
