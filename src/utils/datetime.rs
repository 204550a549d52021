use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use thiserror::Error;

/// Input shapes accepted by [`parse_datetime`], in the wording shown to users.
pub const ACCEPTED_FORMATS: &str = "DD.MM.YYYY HH:mm, DD.MM HH:mm or HH:mm";

/// Failure to read a user-supplied date/time. The message always lists the
/// accepted shapes so it can be sent back to the chat as-is.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("could not read \"{input}\" as a date/time (expected {ACCEPTED_FORMATS})")]
pub struct ParseError {
    input: String,
}

impl ParseError {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}

/// Parses `DD.MM.YYYY HH:mm`, `DD.MM HH:mm` or `HH:mm` into an instant in
/// `now`'s timezone.
///
/// A date without a year uses the current year. A bare time means today,
/// or tomorrow when that moment has already passed. Local times skipped by
/// a DST transition are rejected; ambiguous ones resolve to the earlier
/// instant.
pub fn parse_datetime(input: &str, now: DateTime<Tz>) -> Result<DateTime<Tz>, ParseError> {
    let trimmed = input.trim();
    let err = || ParseError::new(trimmed);
    let parts: Vec<&str> = trimmed.split_whitespace().collect();

    let (date, time) = match parts.as_slice() {
        [time_part] => {
            let time = parse_time(time_part).ok_or_else(err)?;
            let mut date = now.date_naive();
            if date.and_time(time) <= now.naive_local() {
                date = date.succ_opt().ok_or_else(err)?;
            }
            (date, time)
        }
        [date_part, time_part] => {
            let date = parse_date(date_part, now.year()).ok_or_else(err)?;
            let time = parse_time(time_part).ok_or_else(err)?;
            (date, time)
        }
        _ => return Err(err()),
    };

    now.timezone()
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .ok_or_else(err)
}

/// Renders a fire time the same way inputs are written: `DD.MM.YYYY HH:mm`.
pub fn format_datetime(dt: &DateTime<Tz>) -> String {
    dt.format("%d.%m.%Y %H:%M").to_string()
}

fn parse_time(token: &str) -> Option<NaiveTime> {
    let (hour, minute) = token.split_once(':')?;
    NaiveTime::from_hms_opt(field(hour, 2)?, field(minute, 2)?, 0)
}

fn parse_date(token: &str, current_year: i32) -> Option<NaiveDate> {
    let mut fields = token.split('.');
    let day = field(fields.next()?, 2)?;
    let month = field(fields.next()?, 2)?;
    let year = match fields.next() {
        // Only four-digit years; "24" is more likely a typo than 24 AD
        Some(y) if y.len() == 4 => i32::try_from(field(y, 4)?).ok()?,
        Some(_) => return None,
        None => current_year,
    };
    if fields.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn field(s: &str, max_digits: usize) -> Option<u32> {
    if s.is_empty() || s.len() > max_digits || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn moscow_noon() -> DateTime<Tz> {
        chrono_tz::Europe::Moscow
            .with_ymd_and_hms(2024, 3, 15, 12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_full_date() {
        let dt = parse_datetime("31.12.2024 23:59", moscow_noon()).unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 12);
        assert_eq!(dt.day(), 31);
        assert_eq!(dt.hour(), 23);
        assert_eq!(dt.minute(), 59);
    }

    #[test]
    fn test_parse_date_without_year_uses_current_year() {
        let dt = parse_datetime("01.04 09:30", moscow_noon()).unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 4);
        assert_eq!(dt.day(), 1);

        // An already-passed date still parses; rejecting it is the
        // scheduler's call, not the parser's.
        let past = parse_datetime("01.01 09:30", moscow_noon()).unwrap();
        assert_eq!(past.year(), 2024);
        assert_eq!(past.month(), 1);
    }

    #[test]
    fn test_parse_time_only_later_today() {
        let dt = parse_datetime("18:45", moscow_noon()).unwrap();
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 18);
        assert_eq!(dt.minute(), 45);
    }

    #[test]
    fn test_parse_time_only_rolls_to_tomorrow() {
        let dt = parse_datetime("09:15", moscow_noon()).unwrap();
        assert_eq!(dt.day(), 16);
        assert_eq!(dt.hour(), 9);

        // Exactly "now" is not in the future either
        let dt = parse_datetime("12:00", moscow_noon()).unwrap();
        assert_eq!(dt.day(), 16);
    }

    #[test]
    fn test_parse_trims_and_collapses_whitespace() {
        assert!(parse_datetime("  18:45  ", moscow_noon()).is_ok());
        assert!(parse_datetime("31.12.2024   23:59", moscow_noon()).is_ok());
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        for input in [
            "",
            "tomorrow",
            "15.06",
            "18.00",
            "10:00 15.06.2024",
            "15.06.2024 10:00 extra",
            "15.06.24 10:00",
            "15.06.2024.1 10:00",
            "1,5:00",
        ] {
            assert!(parse_datetime(input, moscow_noon()).is_err(), "{input}");
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range_values() {
        for input in [
            "31.02.2024 10:00",
            "15.13.2024 10:00",
            "00.06.2024 10:00",
            "24:00",
            "12:60",
            "15.06.2024 123:00",
        ] {
            assert!(parse_datetime(input, moscow_noon()).is_err(), "{input}");
        }
    }

    #[test]
    fn test_parse_error_lists_accepted_formats() {
        let err = parse_datetime("gibberish", moscow_noon()).unwrap_err();
        assert!(err.to_string().contains(ACCEPTED_FORMATS));
        assert!(err.to_string().contains("gibberish"));
    }

    #[test]
    fn test_parse_rejects_time_inside_dst_gap() {
        // 02:30 on 2024-03-10 does not exist in New York
        let now = chrono_tz::America::New_York
            .with_ymd_and_hms(2024, 3, 9, 12, 0, 0)
            .unwrap();
        assert!(parse_datetime("10.03.2024 02:30", now).is_err());
        assert!(parse_datetime("10.03.2024 03:30", now).is_ok());
    }

    #[test]
    fn test_format_datetime_zero_pads() {
        let dt = chrono_tz::Europe::Moscow
            .with_ymd_and_hms(2024, 1, 5, 7, 5, 0)
            .unwrap();
        assert_eq!(format_datetime(&dt), "05.01.2024 07:05");
    }

    #[test]
    fn test_format_matches_parse() {
        let dt = parse_datetime("31.12.2024 23:59", moscow_noon()).unwrap();
        assert_eq!(format_datetime(&dt), "31.12.2024 23:59");
    }
}
