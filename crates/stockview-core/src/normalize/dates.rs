//! Date coercion for ledger values.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tracing::debug;

use super::patterns::{DATE_DMY_SHORT, DATE_INDONESIAN_LONG};

const MS_PER_DAY: f64 = 86_400_000.0;

/// Explicit patterns tried after ISO parsing, in order. Day-first wins ties.
const KNOWN_FORMATS: &[&str] = &["%d/%m/%Y", "%-d/%-m/%Y", "%m/%d/%Y", "%-m/%-d/%Y", "%Y/%m/%d"];

const FALLBACK_DATE_FORMATS: &[&str] = &[
    "%d.%m.%Y",
    "%d-%m-%Y",
    "%Y.%m.%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d-%b-%Y",
];

/// Parse a date from any of the formats seen in ledger exports.
///
/// Strategies, first success wins:
/// 1. a positive number is a spreadsheet serial day count;
/// 2. ISO 8601 (date, date-time, RFC 3339);
/// 3. `dd/MM/yyyy`, `d/M/yyyy`, `MM/dd/yyyy`, `M/d/yyyy`, `yyyy/MM/dd`;
/// 4. dotted/dashed/long-month forms, two-digit years and Indonesian month names.
pub fn parse_flexible_date(input: &str) -> Option<NaiveDateTime> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Serial detection precedes ISO parsing: "45931" must not be read as a year.
    if let Ok(serial) = trimmed.parse::<f64>() {
        if serial.is_finite() && serial > 0.0 {
            if let Some(date) = serial_to_datetime(serial) {
                return Some(date);
            }
        }
    }

    if let Some(date) = parse_iso(trimmed) {
        return Some(date);
    }

    for format in KNOWN_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            if has_four_digit_year(date) {
                return Some(date.and_time(NaiveTime::MIN));
            }
        }
    }

    parse_fallback(trimmed).map(|date| date.and_time(NaiveTime::MIN))
}

/// Parse a date and keep only the calendar day.
pub fn parse_flexible_day(input: &str) -> Option<NaiveDate> {
    parse_flexible_date(input).map(|dt| dt.date())
}

/// Normalise to `YYYY-MM-DD`, falling back to today's date (UTC).
///
/// The fallback is lossy: an unreadable date is recorded as the day of import.
pub fn normalize_to_iso_date(input: &str) -> String {
    normalize_to_iso_date_or(input, Utc::now().date_naive())
}

/// Normalise to `YYYY-MM-DD`, falling back to `fallback`.
pub fn normalize_to_iso_date_or(input: &str, fallback: NaiveDate) -> String {
    match parse_flexible_day(input) {
        Some(date) => to_iso(date),
        None => {
            debug!("Unparseable date {:?}, using {}", input, fallback);
            to_iso(fallback)
        }
    }
}

/// Format a date as `YYYY-MM-DD`.
pub fn to_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Convert a spreadsheet serial day count to a timestamp.
///
/// Day 1 is 1900-01-01. Spreadsheets count a 1900-02-29 that never existed
/// (serial 60), so serials past 59 are shifted back one day. The fractional
/// part is the time of day.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial <= 0.0 {
        return None;
    }

    let whole = serial.floor();
    let fraction = serial - whole;
    let whole = whole as i64;
    let day_offset = if whole > 59 { whole - 1 } else { whole };

    let day_zero = NaiveDate::from_ymd_opt(1899, 12, 31)?.and_time(NaiveTime::MIN);
    let millis = (fraction * MS_PER_DAY).round() as i64;

    day_zero
        .checked_add_signed(Duration::try_days(day_offset)?)?
        .checked_add_signed(Duration::try_milliseconds(millis)?)
}

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

fn parse_fallback(s: &str) -> Option<NaiveDate> {
    for format in FALLBACK_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            if has_four_digit_year(date) {
                return Some(date);
            }
        }
    }

    if let Some(caps) = DATE_DMY_SHORT.captures(s) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year = expand_two_digit_year(caps[3].parse().ok()?);
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DATE_INDONESIAN_LONG.captures(s) {
        let day: u32 = caps[1].parse().ok()?;
        let month = indonesian_month_to_number(&caps[2])?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    DateTime::parse_from_rfc2822(s).ok().map(|dt| dt.date_naive())
}

// "%Y" happily reads "25" as year 25; leave two-digit years to the pivot below.
fn has_four_digit_year(date: NaiveDate) -> bool {
    (1000..=9999).contains(&date.year())
}

fn expand_two_digit_year(year: i32) -> i32 {
    // 00-50 are 2000s, 51-99 are 1900s
    if year <= 50 { 2000 + year } else { 1900 + year }
}

fn indonesian_month_to_number(month: &str) -> Option<u32> {
    let number = match month.to_lowercase().as_str() {
        "januari" => 1,
        "februari" => 2,
        "maret" => 3,
        "april" => 4,
        "mei" => 5,
        "juni" => 6,
        "juli" => 7,
        "agustus" => 8,
        "september" => 9,
        "oktober" => 10,
        "november" => 11,
        "desember" => 12,
        _ => return None,
    };
    Some(number)
}
