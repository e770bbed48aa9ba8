use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerName {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    /// The five daily prayers in chronological order within a day.
    pub fn all() -> [PrayerName; 5] {
        [
            PrayerName::Fajr,
            PrayerName::Dhuhr,
            PrayerName::Asr,
            PrayerName::Maghrib,
            PrayerName::Isha,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "fajr",
            PrayerName::Dhuhr => "dhuhr",
            PrayerName::Asr => "asr",
            PrayerName::Maghrib => "maghrib",
            PrayerName::Isha => "isha",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
        }
    }

    pub fn name_arabic(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "الفجر",
            PrayerName::Dhuhr => "الظهر",
            PrayerName::Asr => "العصر",
            PrayerName::Maghrib => "المغرب",
            PrayerName::Isha => "العشاء",
        }
    }
}

impl std::fmt::Display for PrayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PrayerName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fajr" => Ok(PrayerName::Fajr),
            "dhuhr" | "zuhr" | "dhuhur" => Ok(PrayerName::Dhuhr),
            "asr" => Ok(PrayerName::Asr),
            "maghrib" => Ok(PrayerName::Maghrib),
            "isha" => Ok(PrayerName::Isha),
            _ => Err(anyhow::anyhow!("Unknown prayer name: {}", s)),
        }
    }
}

/// Five wall-clock "HH:MM" strings for one calendar day.
///
/// Entries may be missing (sparse legacy rows); consumers skip absent keys
/// rather than treating them as midnight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrayerTimings {
    pub fajr: Option<String>,
    pub sunrise: Option<String>,
    pub dhuhr: Option<String>,
    pub asr: Option<String>,
    pub maghrib: Option<String>,
    pub isha: Option<String>,
}

impl PrayerTimings {
    /// Builds timings from raw API values, stripping timezone annotations
    /// ("05:12 (GMT)" -> "05:12"). Empty values become `None`.
    pub fn from_raw(
        fajr: Option<&str>,
        sunrise: Option<&str>,
        dhuhr: Option<&str>,
        asr: Option<&str>,
        maghrib: Option<&str>,
        isha: Option<&str>,
    ) -> Self {
        Self {
            fajr: fajr.and_then(strip_tz),
            sunrise: sunrise.and_then(strip_tz),
            dhuhr: dhuhr.and_then(strip_tz),
            asr: asr.and_then(strip_tz),
            maghrib: maghrib.and_then(strip_tz),
            isha: isha.and_then(strip_tz),
        }
    }

    pub fn get(&self, name: PrayerName) -> Option<&str> {
        match name {
            PrayerName::Fajr => self.fajr.as_deref(),
            PrayerName::Dhuhr => self.dhuhr.as_deref(),
            PrayerName::Asr => self.asr.as_deref(),
            PrayerName::Maghrib => self.maghrib.as_deref(),
            PrayerName::Isha => self.isha.as_deref(),
        }
    }

    /// Present prayers in canonical order as (name, time string, minutes
    /// since midnight). Absent or malformed entries are skipped.
    pub fn ordered(&self) -> Vec<(PrayerName, &str, u32)> {
        PrayerName::all()
            .into_iter()
            .filter_map(|name| {
                let raw = self.get(name)?;
                let minutes = time_to_minutes(raw)?;
                Some((name, raw, minutes))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered().is_empty()
    }
}

/// Parses "HH:MM" (optionally suffixed with a timezone annotation) into
/// minutes since midnight. Returns `None` for anything malformed.
pub fn time_to_minutes(time: &str) -> Option<u32> {
    let time_only = time.split_whitespace().next()?;
    let (h, m) = time_only.split_once(':')?;
    let hours: u32 = h.parse().ok()?;
    let minutes: u32 = m.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

fn strip_tz(time: &str) -> Option<String> {
    let time_only = time.split_whitespace().next()?;
    if time_only.is_empty() {
        None
    } else {
        Some(time_only.to_string())
    }
}
