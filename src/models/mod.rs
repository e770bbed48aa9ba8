pub mod city;
pub mod day;
pub mod prayer;

pub use city::City;
pub use day::{CalendarDate, CalendarDayRecord, normalize_date};
pub use prayer::{PrayerName, PrayerTimings, time_to_minutes};
