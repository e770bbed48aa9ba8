use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::prayer::PrayerTimings;

/// Canonical Gregorian calendar date. Display form is the storage key
/// format, zero-padded "DD-MM-YYYY".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    pub fn new(day: u32, month: u32, year: i32) -> Self {
        Self { year, month, day }
    }

    pub fn from_naive(date: chrono::NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl std::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}-{:02}-{}", self.day, self.month, self.year)
    }
}

/// One cached row: Gregorian date key, Hijri date label, Arabic weekday
/// name and the day's prayer times.
///
/// `date` and `date_hijri` hold the stored textual encoding. New rows are
/// written as plain "DD-MM-YYYY"; legacy rows may hold a JSON-serialized
/// date descriptor instead, so reads go through [`normalize_date`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDayRecord {
    pub date: String,
    pub date_hijri: String,
    pub name_arabic: String,
    pub timings: PrayerTimings,
}

impl CalendarDayRecord {
    pub fn normalized_date(&self) -> Result<CalendarDate, Error> {
        normalize_date(&self.date)
    }
}

// The API serializes dates either as plain strings or as descriptor objects
// where numbers sometimes arrive as JSON strings.
#[derive(Deserialize)]
struct DateDescriptor {
    day: Numberish,
    month: MonthField,
    year: Numberish,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MonthField {
    Code(Numberish),
    Descriptor { number: Numberish },
}

impl MonthField {
    fn number(&self) -> Option<i64> {
        match self {
            MonthField::Code(n) => n.value(),
            MonthField::Descriptor { number } => number.value(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Numberish {
    Int(i64),
    Text(String),
}

impl Numberish {
    fn value(&self) -> Option<i64> {
        match self {
            Numberish::Int(n) => Some(*n),
            Numberish::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Parses a stored date of unknown encoding into a canonical date.
///
/// Tries a structured decode of the JSON date descriptor first, then falls
/// back to splitting a delimited "DD-MM-YYYY" / "YYYY-MM-DD" string. For the
/// delimited form the order is disambiguated heuristically: a first part
/// above 12 must be the day, and a 4-digit final part means API-style
/// DD-MM-YYYY. Days <= 12 with ambiguous year placement are best-effort.
pub fn normalize_date(raw: &str) -> Result<CalendarDate, Error> {
    if let Ok(desc) = serde_json::from_str::<DateDescriptor>(raw) {
        if let (Some(day), Some(month), Some(year)) =
            (desc.day.value(), desc.month.number(), desc.year.value())
        {
            return checked(day, month, year, raw);
        }
    }

    let parts: Vec<&str> = raw.trim().split('-').collect();
    if parts.len() != 3 {
        return Err(Error::UnparseableDate { raw: raw.into() });
    }
    let nums: Vec<i64> = parts
        .iter()
        .map(|p| p.trim().parse::<i64>())
        .collect::<Result<_, _>>()
        .map_err(|_| Error::UnparseableDate { raw: raw.to_string() })?;

    let (first, mid, last) = (nums[0], nums[1], nums[2]);
    if first > 12 && first <= 31 {
        // Day cannot be a month, so this is DD-MM-YYYY.
        checked(first, mid, last, raw)
    } else if last >= 1000 {
        // API-sourced rows standardize on DD-MM-YYYY.
        checked(first, mid, last, raw)
    } else if first >= 1000 {
        // YYYY-MM-DD
        checked(last, mid, first, raw)
    } else {
        Err(Error::UnparseableDate { raw: raw.into() })
    }
}

fn checked(day: i64, month: i64, year: i64, raw: &str) -> Result<CalendarDate, Error> {
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return Err(Error::UnparseableDate { raw: raw.into() });
    }
    Ok(CalendarDate::new(day as u32, month as u32, year as i32))
}
