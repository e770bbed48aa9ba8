//! Cache-or-fetch orchestration.
//!
//! For a (city, year, month) request there are three outcomes, evaluated in
//! order: serve from cache, fetch over the network and serve the fresh rows,
//! or report an empty set when offline with nothing cached. Callers must
//! treat "empty and not from cache" as a connectivity state, not as "no
//! prayers exist".

use chrono::{Datelike, Local};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

use crate::db::CacheStore;
use crate::error::Result;
use crate::fetch::{ConnectivityProbe, PrayerApiClient};
use crate::models::{CalendarDate, CalendarDayRecord, City, PrayerTimings};

/// A month of cached rows plus where they came from.
#[derive(Debug)]
pub struct MonthTimetable {
    pub days: Vec<CalendarDayRecord>,
    pub from_cache: bool,
}

/// Observable state of the one-shot baseline sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Syncing,
    Done,
    Failed,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Done => "done",
            SyncStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Today's Gregorian/Hijri labels and Arabic weekday, as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentDay {
    pub date: String,
    pub date_hijri: String,
    pub name_arabic: String,
}

pub struct SyncService<P: ConnectivityProbe> {
    store: CacheStore,
    client: PrayerApiClient,
    probe: P,
    baseline: watch::Sender<SyncStatus>,
    baseline_started: AtomicBool,
}

impl<P: ConnectivityProbe> SyncService<P> {
    pub fn new(store: CacheStore, client: PrayerApiClient, probe: P) -> Self {
        let (baseline, _) = watch::channel(SyncStatus::Idle);
        Self {
            store,
            client,
            probe,
            baseline,
            baseline_started: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Cache-or-fetch for one calendar month. Fetch and storage errors
    /// propagate; there is no silent retry.
    pub async fn get_or_fetch_month(
        &mut self,
        city: &City,
        year: i32,
        month: u32,
    ) -> Result<MonthTimetable> {
        if self.store.has_month(year, month)? {
            log::debug!("cache hit for {:02}/{}", month, year);
            return Ok(MonthTimetable {
                days: self.store.get_month(year, month)?,
                from_cache: true,
            });
        }

        if !self.probe.is_reachable().await {
            log::info!("offline with no cached rows for {:02}/{}", month, year);
            return Ok(MonthTimetable {
                days: Vec::new(),
                from_cache: false,
            });
        }

        let records = self.client.fetch_month(city, year, month).await?;
        let written = self.store.insert_month(&records)?;
        log::info!("fetched and cached {} days for {:02}/{}", written, month, year);
        Ok(MonthTimetable {
            days: self.store.get_month(year, month)?,
            from_cache: false,
        })
    }

    /// Drops every cached row. Used by the explicit `sync --force` path
    /// before a full re-fetch; the regular path upserts per day and never
    /// destroys other months.
    pub fn clear_cache(&self) -> Result<()> {
        self.store.clear_all()
    }

    pub fn today_timings(&self, today: CalendarDate) -> Result<Option<PrayerTimings>> {
        Ok(self.store.get_day(today)?.map(|r| r.timings))
    }

    pub fn current_day(&self, today: CalendarDate) -> Result<Option<CurrentDay>> {
        Ok(self.store.get_day(today)?.map(|r| CurrentDay {
            date: r.date,
            date_hijri: r.date_hijri,
            name_arabic: r.name_arabic,
        }))
    }

    pub fn baseline_status(&self) -> SyncStatus {
        *self.baseline.borrow()
    }
}

impl<P> SyncService<P>
where
    P: ConnectivityProbe + Clone + Send + 'static,
{
    /// One-shot startup sync: when the store is empty and the network is
    /// reachable, fetch and persist the current calendar month in the
    /// background. Never blocks the caller; progress is observable through
    /// the returned receiver. Calling this again while a baseline is
    /// already running does not start a second fetch.
    ///
    /// The task opens its own connection from `db_path` since the fetch
    /// outlives the caller's borrow of the store.
    pub fn ensure_baseline(&self, db_path: PathBuf, city: City) -> watch::Receiver<SyncStatus> {
        let rx = self.baseline.subscribe();
        if self.baseline_started.swap(true, Ordering::SeqCst) {
            return rx;
        }

        match self.store.has_any_data() {
            Ok(true) => {
                self.baseline.send_replace(SyncStatus::Done);
                return rx;
            }
            Ok(false) => {}
            Err(e) => {
                log::warn!("baseline skipped, cache unreadable: {}", e);
                self.baseline.send_replace(SyncStatus::Failed);
                return rx;
            }
        }

        let tx = self.baseline.clone();
        let client = self.client.clone();
        let probe = self.probe.clone();
        tokio::spawn(async move {
            tx.send_replace(SyncStatus::Syncing);
            let status = run_baseline(&db_path, &client, &probe, &city).await;
            tx.send_replace(status);
        });
        rx
    }
}

async fn run_baseline<P: ConnectivityProbe>(
    db_path: &std::path::Path,
    client: &PrayerApiClient,
    probe: &P,
    city: &City,
) -> SyncStatus {
    if !probe.is_reachable().await {
        log::info!("baseline sync skipped: offline");
        return SyncStatus::Failed;
    }

    let today = Local::now().date_naive();
    let (year, month) = (today.year(), today.month());
    let records = match client.fetch_month(city, year, month).await {
        Ok(records) => records,
        Err(e) => {
            log::warn!("baseline fetch failed: {}", e);
            return SyncStatus::Failed;
        }
    };

    let mut store = match CacheStore::open(db_path) {
        Ok(store) => store,
        Err(e) => {
            log::warn!("baseline could not open cache: {}", e);
            return SyncStatus::Failed;
        }
    };
    match store.insert_month(&records) {
        Ok(written) => {
            log::info!("baseline cached {} days for {:02}/{}", written, month, year);
            SyncStatus::Done
        }
        Err(e) => {
            log::warn!("baseline persist failed: {}", e);
            SyncStatus::Failed
        }
    }
}
