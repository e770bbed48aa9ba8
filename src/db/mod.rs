pub mod migrations;
pub mod repository;

pub use repository::{CacheStore, PrayerSettings, SettingsRepo};
