use anyhow::{Result, anyhow};
use chrono::{Datelike, Local};

use crate::countdown;
use crate::db::{PrayerSettings, SettingsRepo};
use crate::fetch::TcpProbe;
use crate::models::{CalendarDate, City, normalize_date};
use crate::sync::{SyncService, SyncStatus};
use crate::utils::format::{format_duration_secs, format_hms, progress_bar};
use crate::utils::qibla::qibla_bearing;

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

// ─── Setup ───────────────────────────────────────────────────────────────────

pub fn handle_setup(
    service: &SyncService<TcpProbe>,
    city: &str,
    country: &str,
    api_name: Option<&str>,
    id: Option<&str>,
) -> Result<()> {
    let location = City::new(
        id.unwrap_or("1"),
        city,
        api_name.unwrap_or(city),
        &country.to_uppercase(),
    );
    let settings = PrayerSettings {
        location,
        ..Default::default()
    };
    SettingsRepo::save(service.store().connection(), &settings)?;
    println!();
    println_colored!(
        GOLD,
        "  Location saved: {} ({})",
        settings.location.name,
        settings.location.country
    );
    println!();
    Ok(())
}

pub fn load_settings(service: &SyncService<TcpProbe>) -> Result<PrayerSettings> {
    SettingsRepo::get(service.store().connection())?.ok_or_else(|| {
        anyhow!("No location configured. Run: mawaqit setup --city <name> --country <code>")
    })
}

// ─── Times ───────────────────────────────────────────────────────────────────

pub async fn handle_times(
    service: &mut SyncService<TcpProbe>,
    watch: bool,
    date: Option<&str>,
) -> Result<()> {
    let settings = load_settings(service)?;
    let day = match date {
        Some(raw) => normalize_date(raw)?,
        None => CalendarDate::from_naive(Local::now().date_naive()),
    };

    // Cache first; on a miss pull the whole month so neighbors are warm too.
    let mut timings = service.today_timings(day)?;
    if timings.is_none() {
        let result = service
            .get_or_fetch_month(&settings.location, day.year, day.month)
            .await?;
        if result.days.is_empty() && !result.from_cache {
            print_network_error();
            return Ok(());
        }
        timings = service.today_timings(day)?;
    }
    let Some(timings) = timings else {
        println!();
        println_colored!(DIM, "  No prayer times stored for {}", day);
        println!();
        return Ok(());
    };

    println!();
    println_colored!(
        GOLD,
        "  Prayer Times · {} ({})",
        settings.location.name,
        day
    );
    if let Some(current) = service.current_day(day)? {
        if !current.date_hijri.is_empty() {
            println_colored!(
                DIM,
                "  {} {}",
                current.name_arabic,
                current.date_hijri
            );
        }
    }
    println!();

    let now = Local::now().time();
    use chrono::Timelike;
    let now_minutes = now.hour() * 60 + now.minute();
    for (name, raw, minutes) in timings.ordered() {
        let label = format!("{} {}", name.display_name(), name.name_arabic());
        if minutes <= now_minutes {
            println_colored!(DIM, "  {:<16}  {}", label, raw);
        } else {
            println_colored!(BOLD, "  {:<16}  {}", label, raw);
        }
    }

    if watch {
        watch_countdown(&timings).await?;
    } else if let Some(state) = countdown::tick(&timings, now) {
        println!();
        println_colored!(
            AMBER,
            "  Next: {} ({}) in {}{}",
            state.next_prayer.display_name(),
            state.next_prayer_arabic,
            format_duration_secs(state.total_seconds()),
            if state.is_next_day { " (tomorrow)" } else { "" }
        );
        println_colored!(DIM, "  [{}]", progress_bar(state.progress, 30));
    }
    println!();
    Ok(())
}

/// 1 Hz countdown loop; ends on ctrl-c so the interval never outlives the
/// command.
async fn watch_countdown(timings: &crate::models::PrayerTimings) -> Result<()> {
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1));
    println!();
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(state) = countdown::tick(timings, Local::now().time()) else {
                    println_colored!(DIM, "  No countdown data");
                    return Ok(());
                };
                print!(
                    "\r  {} {}  {}  [{}] ",
                    state.next_prayer.display_name(),
                    state.next_prayer_arabic,
                    format_hms(state.hours, state.minutes, state.seconds),
                    progress_bar(state.progress, 30),
                );
                use std::io::Write;
                std::io::stdout().flush()?;
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                return Ok(());
            }
        }
    }
}

// ─── Month ───────────────────────────────────────────────────────────────────

pub async fn handle_month(
    service: &mut SyncService<TcpProbe>,
    year: Option<i32>,
    month: Option<u32>,
) -> Result<()> {
    let settings = load_settings(service)?;
    let today = Local::now().date_naive();
    let year = year.unwrap_or_else(|| today.year());
    let month = month.unwrap_or_else(|| today.month());
    if !(1..=12).contains(&month) {
        return Err(anyhow!("Month must be 1-12, got {}", month));
    }

    let result = service
        .get_or_fetch_month(&settings.location, year, month)
        .await?;
    if result.days.is_empty() {
        if result.from_cache {
            println_colored!(DIM, "  No data for {:02}/{}", month, year);
        } else {
            print_network_error();
        }
        return Ok(());
    }

    println!();
    println_colored!(
        GOLD,
        "  {} · {:02}/{} {}",
        settings.location.name,
        month,
        year,
        if result.from_cache { "(cached)" } else { "(fetched)" }
    );
    println!();
    println_colored!(
        DIM,
        "  {:<12} {:<12} {:<10} {:>6} {:>6} {:>6} {:>7} {:>6}",
        "Date",
        "Hijri",
        "Day",
        "Fajr",
        "Dhuhr",
        "Asr",
        "Maghrib",
        "Isha"
    );
    for record in &result.days {
        let t = &record.timings;
        let cell = |v: &Option<String>| v.clone().unwrap_or_else(|| "--:--".into());
        println!(
            "  {:<12} {:<12} {:<10} {:>6} {:>6} {:>6} {:>7} {:>6}",
            record.date,
            record.date_hijri,
            record.name_arabic,
            cell(&t.fajr),
            cell(&t.dhuhr),
            cell(&t.asr),
            cell(&t.maghrib),
            cell(&t.isha),
        );
    }
    println!();
    Ok(())
}

// ─── Sync ────────────────────────────────────────────────────────────────────

pub async fn handle_sync(
    service: &mut SyncService<TcpProbe>,
    year: Option<i32>,
    month: Option<u32>,
    force: bool,
) -> Result<()> {
    let settings = load_settings(service)?;
    let today = Local::now().date_naive();
    let year = year.unwrap_or_else(|| today.year());
    let month = month.unwrap_or_else(|| today.month());

    if force {
        service.clear_cache()?;
        println_colored!(DIM, "  Cache cleared");
    }

    let result = service
        .get_or_fetch_month(&settings.location, year, month)
        .await?;
    if result.days.is_empty() && !result.from_cache {
        print_network_error();
    } else {
        println_colored!(
            GOLD,
            "  {} days cached for {:02}/{} {}",
            result.days.len(),
            month,
            year,
            if result.from_cache { "(already cached)" } else { "(fetched)" }
        );
    }
    Ok(())
}

// ─── Status ──────────────────────────────────────────────────────────────────

pub fn handle_status(service: &SyncService<TcpProbe>) -> Result<()> {
    let store = service.store();
    println!();
    println_colored!(GOLD, "  Cache status");
    println!();
    println!("  has data:       {}", store.has_any_data()?);
    println!("  baseline sync:  {}", service.baseline_status());
    let months = store.cached_months()?;
    if months.is_empty() {
        println_colored!(DIM, "  cached months:  none");
    } else {
        let listed: Vec<String> = months
            .iter()
            .map(|(y, m)| format!("{:02}/{}", m, y))
            .collect();
        println!("  cached months:  {}", listed.join(", "));
    }
    match SettingsRepo::get(store.connection())? {
        Some(settings) => println!(
            "  location:       {} ({})",
            settings.location.name, settings.location.country
        ),
        None => println_colored!(DIM, "  location:       not configured"),
    }
    println!();
    Ok(())
}

// ─── Qibla ───────────────────────────────────────────────────────────────────

pub fn handle_qibla(
    service: &SyncService<TcpProbe>,
    lat: Option<f64>,
    lng: Option<f64>,
) -> Result<()> {
    let (lat, lng) = match (lat, lng) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => {
            let settings = load_settings(service)?;
            settings.location.coords().ok_or_else(|| {
                anyhow!(
                    "City '{}' has no stored coordinates; pass --lat and --lng",
                    settings.location.name
                )
            })?
        }
    };
    let bearing = qibla_bearing(lat, lng);
    println!();
    println_colored!(GOLD, "  Qibla bearing: {:.1}° from North", bearing);
    println_colored!(DIM, "  from {:.4}, {:.4}", lat, lng);
    println!();
    Ok(())
}

// ─── Shared ──────────────────────────────────────────────────────────────────

fn print_network_error() {
    println!();
    println_colored!(RED, "  No connection and nothing cached yet.");
    println_colored!(DIM, "  Check your network and retry with: mawaqit sync");
    println!();
}

/// Default times view used when no subcommand is given: kick off the
/// baseline sync in the background, then render today.
pub async fn handle_default(service: &mut SyncService<TcpProbe>) -> Result<()> {
    let settings = load_settings(service)?;
    let db_path = crate::config::AppConfig::db_path()?;
    let mut baseline = service.ensure_baseline(db_path, settings.location.clone());

    // Give a fresh install a moment to pull the current month, without
    // holding the prompt hostage when offline.
    if *baseline.borrow() == SyncStatus::Syncing || *baseline.borrow() == SyncStatus::Idle {
        let wait = tokio::time::timeout(std::time::Duration::from_secs(20), async {
            while baseline.changed().await.is_ok() {
                let status = *baseline.borrow();
                if status == SyncStatus::Done || status == SyncStatus::Failed {
                    break;
                }
            }
        });
        let _ = wait.await;
    }

    handle_times(service, false, None).await
}
