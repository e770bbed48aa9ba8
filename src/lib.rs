//! Offline-first prayer times: a local SQLite cache of daily timings, a
//! fetcher for the remote calendar API, a cache-or-fetch sync layer, and a
//! pure countdown engine over the current day's timings.

pub mod cli;
pub mod config;
pub mod countdown;
pub mod db;
pub mod error;
pub mod fetch;
pub mod models;
pub mod sync;
pub mod utils;

pub use config::AppConfig;
pub use countdown::{CountdownState, tick};
pub use db::{CacheStore, PrayerSettings, SettingsRepo};
pub use error::{Error, Result};
pub use fetch::{ConnectivityProbe, PrayerApiClient, StaticProbe, TcpProbe};
pub use models::{CalendarDate, CalendarDayRecord, City, PrayerName, PrayerTimings};
pub use sync::{CurrentDay, MonthTimetable, SyncService, SyncStatus};
