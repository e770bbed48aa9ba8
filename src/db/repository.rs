use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

use crate::db::migrations::run_migrations;
use crate::error::{Error, Result};
use crate::models::{CalendarDate, CalendarDayRecord, City, PrayerTimings, normalize_date};

/// Date-encoding version written with every new row. Legacy rows carry 1.
const ROW_FORMAT: i64 = 2;

// ─── Calendar cache ──────────────────────────────────────────────────────────

/// Local cache of prayer-time rows, one per Gregorian calendar date.
///
/// Writes always use the canonical "DD-MM-YYYY" key; reads tolerate legacy
/// rows whose date column holds a JSON descriptor, by normalizing during
/// the scan.
pub struct CacheStore {
    conn: Connection,
}

impl CacheStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Inserts or replaces the row for the record's Gregorian date.
    /// Idempotent: the canonical date is the primary key.
    pub fn upsert_day(&self, record: &CalendarDayRecord) -> Result<()> {
        let date = record.normalized_date()?;
        upsert_row(&self.conn, date, record)
    }

    /// Persists a full month in one transaction: either every row lands or
    /// none do, leaving previously committed months untouched.
    pub fn insert_month(&mut self, records: &[CalendarDayRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut written = 0;
        for record in records {
            let date = record.normalized_date()?;
            upsert_row(&tx, date, record)?;
            written += 1;
        }
        tx.commit()?;
        Ok(written)
    }

    /// Exact-match lookup by canonical date, falling back to a normalizing
    /// scan for rows stored under a legacy encoding.
    pub fn get_day(&self, date: CalendarDate) -> Result<Option<CalendarDayRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT date, date_hijri, name_arabic, fajr, dhuhr, asr, maghrib, isha
                 FROM prayer_times WHERE date = ?1",
                params![date.to_string()],
                map_row,
            )
            .optional()?;
        if let Some(record) = row {
            return Ok(Some(record));
        }

        for record in self.all_rows()? {
            match normalize_date(&record.date) {
                Ok(d) if d == date => return Ok(Some(record)),
                Ok(_) => {}
                Err(Error::UnparseableDate { raw }) => {
                    log::debug!("skipping row with unparseable date '{}'", raw);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    pub fn has_any_data(&self) -> Result<bool> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM prayer_times", [], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// All rows whose normalized date falls in (year, month), ascending by
    /// day. Rows that fail to normalize are skipped.
    pub fn get_month(&self, year: i32, month: u32) -> Result<Vec<CalendarDayRecord>> {
        let mut days: Vec<(CalendarDate, CalendarDayRecord)> = Vec::new();
        for record in self.all_rows()? {
            match normalize_date(&record.date) {
                Ok(d) if d.year == year && d.month == month => days.push((d, record)),
                Ok(_) => {}
                Err(Error::UnparseableDate { raw }) => {
                    log::debug!("skipping row with unparseable date '{}'", raw);
                }
                Err(e) => return Err(e),
            }
        }
        days.sort_by_key(|(d, _)| *d);
        Ok(days.into_iter().map(|(_, r)| r).collect())
    }

    pub fn has_month(&self, year: i32, month: u32) -> Result<bool> {
        Ok(!self.get_month(year, month)?.is_empty())
    }

    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM prayer_times", [])?;
        Ok(())
    }

    /// Distinct (year, month) pairs present in the cache, ascending.
    pub fn cached_months(&self) -> Result<Vec<(i32, u32)>> {
        let mut months: Vec<(i32, u32)> = Vec::new();
        for record in self.all_rows()? {
            if let Ok(d) = normalize_date(&record.date) {
                if !months.contains(&(d.year, d.month)) {
                    months.push((d.year, d.month));
                }
            }
        }
        months.sort();
        Ok(months)
    }

    fn all_rows(&self) -> Result<Vec<CalendarDayRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, date_hijri, name_arabic, fajr, dhuhr, asr, maghrib, isha
             FROM prayer_times",
        )?;
        let rows = stmt.query_map([], map_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::from)
    }
}

fn upsert_row(conn: &Connection, date: CalendarDate, record: &CalendarDayRecord) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO prayer_times
            (date, date_hijri, name_arabic, fajr, dhuhr, asr, maghrib, isha, format)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            date.to_string(),
            record.date_hijri,
            record.name_arabic,
            record.timings.fajr,
            record.timings.dhuhr,
            record.timings.asr,
            record.timings.maghrib,
            record.timings.isha,
            ROW_FORMAT,
        ],
    )?;
    Ok(())
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CalendarDayRecord> {
    Ok(CalendarDayRecord {
        date: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
        date_hijri: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        name_arabic: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        timings: PrayerTimings {
            fajr: row.get(3)?,
            sunrise: None,
            dhuhr: row.get(4)?,
            asr: row.get(5)?,
            maghrib: row.get(6)?,
            isha: row.get(7)?,
        },
    })
}

// ─── Settings ────────────────────────────────────────────────────────────────

/// The singleton user settings row.
#[derive(Debug, Clone, PartialEq)]
pub struct PrayerSettings {
    pub location: City,
    pub method_calculate: String,
    pub method_asr: String,
}

impl Default for PrayerSettings {
    fn default() -> Self {
        Self {
            location: City::default(),
            method_calculate: "رابطة العالم الاسلامية".to_string(),
            method_asr: "الشافعي".to_string(),
        }
    }
}

pub struct SettingsRepo;

impl SettingsRepo {
    /// Returns the stored settings, or `None` when absent or when the
    /// serialized location fails to decode (a corrupt row is treated as
    /// unconfigured, not an error).
    pub fn get(conn: &Connection) -> Result<Option<PrayerSettings>> {
        let row: Option<(Option<String>, Option<String>, Option<String>)> = conn
            .query_row(
                "SELECT location, method_calculate, method_asr
                 FROM prayer_settings WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((location_json, method_calculate, method_asr)) = row else {
            return Ok(None);
        };
        let Some(location_json) = location_json else {
            return Ok(None);
        };
        let location: City = match serde_json::from_str(&location_json) {
            Ok(city) => city,
            Err(e) => {
                log::warn!("stored location failed to decode: {}", e);
                return Ok(None);
            }
        };
        let defaults = PrayerSettings::default();
        Ok(Some(PrayerSettings {
            location,
            method_calculate: method_calculate.unwrap_or(defaults.method_calculate),
            method_asr: method_asr.unwrap_or(defaults.method_asr),
        }))
    }

    pub fn save(conn: &Connection, settings: &PrayerSettings) -> Result<()> {
        let location_json = serde_json::to_string(&settings.location)
            .map_err(|e| Error::InvalidCity(e.to_string()))?;
        conn.execute(
            "INSERT INTO prayer_settings (id, location, method_calculate, method_asr)
             VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                location = ?1, method_calculate = ?2, method_asr = ?3",
            params![location_json, settings.method_calculate, settings.method_asr],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, fajr: &str) -> CalendarDayRecord {
        CalendarDayRecord {
            date: date.to_string(),
            date_hijri: "03-12-1446".to_string(),
            name_arabic: "السبت".to_string(),
            timings: PrayerTimings {
                fajr: Some(fajr.to_string()),
                sunrise: None,
                dhuhr: Some("12:30".to_string()),
                asr: Some("15:45".to_string()),
                maghrib: Some("18:10".to_string()),
                isha: Some("19:40".to_string()),
            },
        }
    }

    #[test]
    fn upsert_is_idempotent() {
        let store = CacheStore::open_in_memory().unwrap();
        let r = record("31-05-2025", "04:05");
        store.upsert_day(&r).unwrap();
        store.upsert_day(&r).unwrap();
        assert_eq!(store.get_month(2025, 5).unwrap().len(), 1);
    }

    #[test]
    fn upsert_replaces_existing_date() {
        let store = CacheStore::open_in_memory().unwrap();
        store.upsert_day(&record("31-05-2025", "04:05")).unwrap();
        store.upsert_day(&record("31-05-2025", "04:07")).unwrap();
        let rows = store.get_month(2025, 5).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].timings.fajr.as_deref(), Some("04:07"));
    }

    #[test]
    fn get_day_falls_back_to_legacy_encoding() {
        let store = CacheStore::open_in_memory().unwrap();
        // Simulate a legacy row written with a JSON descriptor date.
        store
            .connection()
            .execute(
                "INSERT INTO prayer_times (date, date_hijri, name_arabic, fajr, format)
                 VALUES (?1, '03-12-1446', 'السبت', '04:05', 1)",
                params![r#"{"day":"31","month":{"number":5},"year":"2025"}"#],
            )
            .unwrap();

        let found = store.get_day(CalendarDate::new(31, 5, 2025)).unwrap();
        assert_eq!(found.unwrap().timings.fajr.as_deref(), Some("04:05"));
    }

    #[test]
    fn month_query_respects_boundaries() {
        let store = CacheStore::open_in_memory().unwrap();
        store.upsert_day(&record("31-01-2025", "05:30")).unwrap();
        store.upsert_day(&record("01-02-2025", "05:29")).unwrap();
        store.upsert_day(&record("28-02-2025", "05:10")).unwrap();

        let january = store.get_month(2025, 1).unwrap();
        assert_eq!(january.len(), 1);
        assert_eq!(january[0].date, "31-01-2025");

        let february = store.get_month(2025, 2).unwrap();
        let dates: Vec<_> = february.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["01-02-2025", "28-02-2025"]);
    }

    #[test]
    fn month_rows_are_sorted_by_day() {
        let store = CacheStore::open_in_memory().unwrap();
        store.upsert_day(&record("09-03-2025", "05:00")).unwrap();
        store.upsert_day(&record("10-03-2025", "04:59")).unwrap();
        store.upsert_day(&record("01-03-2025", "05:05")).unwrap();
        let dates: Vec<_> = store
            .get_month(2025, 3)
            .unwrap()
            .iter()
            .map(|r| r.date.clone())
            .collect();
        assert_eq!(dates, vec!["01-03-2025", "09-03-2025", "10-03-2025"]);
    }

    #[test]
    fn has_any_data_and_clear_all() {
        let store = CacheStore::open_in_memory().unwrap();
        assert!(!store.has_any_data().unwrap());
        store.upsert_day(&record("15-06-2025", "03:30")).unwrap();
        assert!(store.has_any_data().unwrap());
        store.clear_all().unwrap();
        assert!(!store.has_any_data().unwrap());
    }

    #[test]
    fn insert_month_is_transactional() {
        let mut store = CacheStore::open_in_memory().unwrap();
        store.upsert_day(&record("30-04-2025", "04:20")).unwrap();

        let batch = vec![record("01-05-2025", "04:18"), record("bogus", "04:17")];
        assert!(store.insert_month(&batch).is_err());
        // The failed bulk load must not commit anything, and the previously
        // committed April row survives.
        assert!(!store.has_month(2025, 5).unwrap());
        assert!(store.has_month(2025, 4).unwrap());
    }

    #[test]
    fn settings_round_trip() {
        let store = CacheStore::open_in_memory().unwrap();
        assert!(SettingsRepo::get(store.connection()).unwrap().is_none());

        let settings = PrayerSettings::default();
        SettingsRepo::save(store.connection(), &settings).unwrap();
        let loaded = SettingsRepo::get(store.connection()).unwrap().unwrap();
        assert_eq!(loaded, settings);

        // Saving again keeps the singleton a singleton.
        SettingsRepo::save(store.connection(), &settings).unwrap();
        let count: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM prayer_settings", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn corrupt_location_reads_as_unconfigured() {
        let store = CacheStore::open_in_memory().unwrap();
        store
            .connection()
            .execute(
                "INSERT INTO prayer_settings (id, location) VALUES (1, 'not json')",
                [],
            )
            .unwrap();
        assert!(SettingsRepo::get(store.connection()).unwrap().is_none());
    }
}
