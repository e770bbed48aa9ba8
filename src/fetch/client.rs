use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::models::{CalendarDate, CalendarDayRecord, City, PrayerTimings};

/// Default request timeout. The API has no retry policy; callers re-invoke
/// manually on failure.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(12);

pub const DEFAULT_BASE_URL: &str = "https://api.aladhan.com";

/// Thin client for the AlAdhan-style prayer times service.
#[derive(Clone)]
pub struct PrayerApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl PrayerApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Fetches a full calendar month of timings for the given city.
    ///
    /// The whole response body is deserialized before anything is returned,
    /// so a failed fetch yields nothing partial. Non-2xx responses map to
    /// `Error::Api`, transport failures to `Error::Fetch`; both carry the
    /// attempted (city, year, month).
    pub async fn fetch_month(
        &self,
        city: &City,
        year: i32,
        month: u32,
    ) -> Result<Vec<CalendarDayRecord>> {
        let url = format!(
            "{}/v1/calendarByCity/{}/{}?country={}&city={}",
            self.base_url, year, month, city.country, city.api_name
        );
        log::debug!("GET {}", url);

        let fetch_err = |source: reqwest::Error| Error::Fetch {
            city: city.api_name.clone(),
            year,
            month,
            source,
        };

        let response = self.http.get(&url).send().await.map_err(fetch_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api {
                city: city.api_name.clone(),
                year,
                month,
                status: status.as_u16(),
            });
        }

        let body: CalendarResponse = response.json().await.map_err(fetch_err)?;
        Ok(body.data.into_iter().map(map_entry).collect())
    }

    /// Fetches a single day's timings by city and date.
    pub async fn fetch_day(&self, city: &City, date: CalendarDate) -> Result<PrayerTimings> {
        let url = format!(
            "{}/v1/timingsByCity?country={}&city={}&date={}",
            self.base_url, city.country, city.api_name, date
        );
        log::debug!("GET {}", url);

        let fetch_err = |source: reqwest::Error| Error::Fetch {
            city: city.api_name.clone(),
            year: date.year,
            month: date.month,
            source,
        };

        let response = self.http.get(&url).send().await.map_err(fetch_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api {
                city: city.api_name.clone(),
                year: date.year,
                month: date.month,
                status: status.as_u16(),
            });
        }

        let body: TimingsResponse = response.json().await.map_err(fetch_err)?;
        Ok(timings_from_map(&body.data.timings))
    }
}

// Response shape of the service: an array of day entries, each with a
// prayer-name -> "HH:MM (TZ)" map and Gregorian/Hijri date descriptors.

#[derive(Deserialize)]
struct CalendarResponse {
    data: Vec<DayEntry>,
}

#[derive(Deserialize)]
struct DayEntry {
    timings: HashMap<String, String>,
    date: DateInfo,
}

#[derive(Deserialize)]
struct DateInfo {
    gregorian: GregorianInfo,
    hijri: HijriInfo,
}

#[derive(Deserialize)]
struct GregorianInfo {
    date: String,
}

#[derive(Deserialize)]
struct HijriInfo {
    date: String,
    weekday: Option<Weekday>,
}

#[derive(Deserialize)]
struct Weekday {
    ar: Option<String>,
}

#[derive(Deserialize)]
struct TimingsResponse {
    data: TimingsData,
}

#[derive(Deserialize)]
struct TimingsData {
    timings: HashMap<String, String>,
}

fn map_entry(entry: DayEntry) -> CalendarDayRecord {
    CalendarDayRecord {
        date: entry.date.gregorian.date,
        date_hijri: entry.date.hijri.date,
        name_arabic: entry
            .date
            .hijri
            .weekday
            .and_then(|w| w.ar)
            .unwrap_or_default(),
        timings: timings_from_map(&entry.timings),
    }
}

fn timings_from_map(timings: &HashMap<String, String>) -> PrayerTimings {
    let get = |key: &str| timings.get(key).map(String::as_str);
    PrayerTimings::from_raw(
        get("Fajr"),
        get("Sunrise"),
        get("Dhuhr"),
        get("Asr"),
        get("Maghrib"),
        get("Isha"),
    )
}
