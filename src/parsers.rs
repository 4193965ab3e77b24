//! Pure input parsers for the onboarding steps.
//!
//! Each parser validates free-text input and returns either a typed value or
//! a rejection carrying the user-facing retry prompt. No side effects; the
//! engine decides what to do with rejections (always: re-prompt, no state
//! change).

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

// Latin + Cyrillic letters, space, hyphen, apostrophe. Everything else is
// stripped. This drops other scripts entirely, which is deliberate
// compatibility behavior (confirmation echoes depend on it).
static NAME_STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{Latin}\p{Cyrillic}\s'\-]").expect("valid regex"));

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})[./-](\d{1,2})[./-](\d{4})").expect("valid regex"));

// Permissive on purpose: extracts a valid-looking H:MM substring even from
// inputs with extraneous surroundings ("-9:30", "9:30 PM").
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}):(\d{2})").expect("valid regex"));

/// Why a name was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameRejection {
    TooShort,
}

impl NameRejection {
    pub fn user_message(&self) -> &'static str {
        "That name looks too short. Please send me a name with at least two letters."
    }
}

/// Why a birth date was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateRejection {
    /// No recognizable D.M.YYYY pattern.
    Format,
    /// Components don't form a real calendar date (31 February, month 13).
    Impossible,
    /// Strictly after today.
    Future,
    /// Year before 1900.
    TooOld,
}

impl DateRejection {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Format => {
                "Please send your birth date as DD.MM.YYYY, for example 15.06.1990."
            }
            Self::Impossible => {
                "That doesn't look like a valid date. Please double-check the day and month, for example 15.06.1990."
            }
            Self::Future => "Your birth date can't be in the future. Please try again.",
            Self::TooOld => "Please enter a birth year of 1900 or later.",
        }
    }
}

/// Why a birth time was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeRejection {
    Invalid,
}

impl TimeRejection {
    pub fn user_message(&self) -> &'static str {
        "Please send your birth time as HH:MM (24-hour), for example 09:30 — or say \"unknown\"."
    }
}

/// Why a birth place was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceRejection {
    TooShort,
}

impl PlaceRejection {
    pub fn user_message(&self) -> &'static str {
        "That place looks too short. Please send a city and country, for example \"Berlin, Germany\"."
    }
}

/// A parsed birth date plus the original component strings, kept for
/// echoing back in the confirmation message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDate {
    pub date: NaiveDate,
    pub day: String,
    pub month: String,
    pub year: String,
}

/// Trim, strip characters outside Latin/Cyrillic + space/hyphen/apostrophe,
/// reject if fewer than 2 characters remain.
pub fn parse_name(raw: &str) -> Result<String, NameRejection> {
    let stripped = NAME_STRIP.replace_all(raw.trim(), "");
    let name = stripped.trim().to_string();
    if name.chars().count() < 2 {
        return Err(NameRejection::TooShort);
    }
    Ok(name)
}

/// Extract the first `D[./-]M[./-]YYYY` pattern and validate it as a real
/// calendar date not after `today` and not before 1900.
pub fn parse_birth_date(raw: &str, today: NaiveDate) -> Result<ParsedDate, DateRejection> {
    let caps = DATE_RE.captures(raw).ok_or(DateRejection::Format)?;
    let day_str = caps[1].to_string();
    let month_str = caps[2].to_string();
    let year_str = caps[3].to_string();

    let day: u32 = day_str.parse().map_err(|_| DateRejection::Format)?;
    let month: u32 = month_str.parse().map_err(|_| DateRejection::Format)?;
    let year: i32 = year_str.parse().map_err(|_| DateRejection::Format)?;

    // Checked construction rejects impossible dates (Feb 31, month 13) the
    // same way the echo-back comparison did.
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(DateRejection::Impossible)?;

    if date > today {
        return Err(DateRejection::Future);
    }
    if year < 1900 {
        return Err(DateRejection::TooOld);
    }

    Ok(ParsedDate {
        date,
        day: day_str,
        month: month_str,
        year: year_str,
    })
}

/// Parse a birth time into "HH:MM" (24-hour, zero-padded hour).
///
/// "unknown" / "don't know" anywhere in the input yields the noon sentinel
/// "12:00". Otherwise the first `H:MM` substring is extracted; surrounding
/// characters are ignored rather than rejected.
pub fn parse_birth_time(raw: &str) -> Result<String, TimeRejection> {
    let lower = raw.to_lowercase();
    if lower.contains("unknown") || lower.contains("don't know") {
        return Ok("12:00".to_string());
    }

    let caps = TIME_RE.captures(raw).ok_or(TimeRejection::Invalid)?;
    let hour: u32 = caps[1].parse().map_err(|_| TimeRejection::Invalid)?;
    let minute: u32 = caps[2].parse().map_err(|_| TimeRejection::Invalid)?;
    if hour > 23 || minute > 59 {
        return Err(TimeRejection::Invalid);
    }
    Ok(format!("{:02}:{}", hour, &caps[2]))
}

/// Trim and require at least 2 characters; geocoding decides real validity.
pub fn parse_place(raw: &str) -> Result<String, PlaceRejection> {
    let place = raw.trim().to_string();
    if place.chars().count() < 2 {
        return Err(PlaceRejection::TooShort);
    }
    Ok(place)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn name_trims_and_accepts() {
        assert_eq!(parse_name("  Alice  ").unwrap(), "Alice");
        assert_eq!(parse_name("Анна").unwrap(), "Анна");
        assert_eq!(parse_name("Mary-Jane O'Neil").unwrap(), "Mary-Jane O'Neil");
    }

    #[test]
    fn name_strips_digits_and_symbols() {
        assert_eq!(parse_name("Bob123!").unwrap(), "Bob");
        assert_eq!(parse_name("@@Eve##").unwrap(), "Eve");
    }

    #[test]
    fn name_rejects_too_short() {
        assert_eq!(parse_name("B"), Err(NameRejection::TooShort));
        assert_eq!(parse_name("42"), Err(NameRejection::TooShort));
        assert_eq!(parse_name("   "), Err(NameRejection::TooShort));
    }

    #[test]
    fn date_accepts_common_separators() {
        for raw in ["15.06.1990", "15/06/1990", "15-06-1990", "born 15.06.1990 thanks"] {
            let parsed = parse_birth_date(raw, today()).unwrap();
            assert_eq!(parsed.date, NaiveDate::from_ymd_opt(1990, 6, 15).unwrap());
            assert_eq!(parsed.day, "15");
            assert_eq!(parsed.month, "06");
            assert_eq!(parsed.year, "1990");
        }
    }

    #[test]
    fn date_accepts_single_digit_components() {
        let parsed = parse_birth_date("1.2.2000", today()).unwrap();
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2000, 2, 1).unwrap());
        assert_eq!(parsed.day, "1");
        assert_eq!(parsed.month, "2");
    }

    #[test]
    fn date_rejects_impossible_dates() {
        assert_eq!(
            parse_birth_date("31.02.1990", today()),
            Err(DateRejection::Impossible)
        );
        assert_eq!(
            parse_birth_date("15.13.1990", today()),
            Err(DateRejection::Impossible)
        );
    }

    #[test]
    fn date_feb_29_only_in_leap_years() {
        assert!(parse_birth_date("29.02.2000", today()).is_ok());
        assert_eq!(
            parse_birth_date("29.02.1999", today()),
            Err(DateRejection::Impossible)
        );
    }

    #[test]
    fn date_rejects_future_and_pre_1900() {
        assert_eq!(
            parse_birth_date("02.06.2025", today()),
            Err(DateRejection::Future)
        );
        assert_eq!(
            parse_birth_date("15.06.1899", today()),
            Err(DateRejection::TooOld)
        );
        // Today itself is not "after now".
        assert!(parse_birth_date("01.06.2025", today()).is_ok());
    }

    #[test]
    fn date_rejects_garbage() {
        assert_eq!(parse_birth_date("yesterday", today()), Err(DateRejection::Format));
        assert_eq!(parse_birth_date("15.06.90", today()), Err(DateRejection::Format));
    }

    #[test]
    fn time_unknown_sentinel() {
        assert_eq!(parse_birth_time("unknown").unwrap(), "12:00");
        assert_eq!(parse_birth_time("I don't know").unwrap(), "12:00");
        assert_eq!(parse_birth_time("UNKNOWN, sorry").unwrap(), "12:00");
    }

    #[test]
    fn time_zero_pads_hour() {
        assert_eq!(parse_birth_time("9:30").unwrap(), "09:30");
        assert_eq!(parse_birth_time("14:05").unwrap(), "14:05");
        assert_eq!(parse_birth_time("0:00").unwrap(), "00:00");
    }

    #[test]
    fn time_is_permissive_about_surroundings() {
        // Extraneous leading/trailing characters are ignored, not rejected.
        assert_eq!(parse_birth_time("-9:30").unwrap(), "09:30");
        assert_eq!(parse_birth_time("around 9:30 PM I think").unwrap(), "09:30");
    }

    #[test]
    fn time_rejects_out_of_range() {
        assert_eq!(parse_birth_time("25:00"), Err(TimeRejection::Invalid));
        assert_eq!(parse_birth_time("14:99"), Err(TimeRejection::Invalid));
        assert_eq!(parse_birth_time("noonish"), Err(TimeRejection::Invalid));
    }

    #[test]
    fn place_trims_and_validates_length() {
        assert_eq!(parse_place("  Berlin, Germany ").unwrap(), "Berlin, Germany");
        assert_eq!(parse_place(" x "), Err(PlaceRejection::TooShort));
    }
}
