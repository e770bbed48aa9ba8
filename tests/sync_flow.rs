//! End-to-end sync flows against a mock prayer times API and a real
//! (temporary) SQLite cache.

use chrono::{Datelike, Local};
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mawaqit::db::CacheStore;
use mawaqit::error::Error;
use mawaqit::fetch::{PrayerApiClient, StaticProbe};
use mawaqit::models::City;
use mawaqit::sync::{SyncService, SyncStatus};

const TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

fn calendar_json(year: i32, month: u32, days: u32) -> serde_json::Value {
    let entries: Vec<serde_json::Value> = (1..=days)
        .map(|day| {
            json!({
                "timings": {
                    "Fajr": "04:05 (CET)",
                    "Sunrise": "05:40 (CET)",
                    "Dhuhr": "12:28 (CET)",
                    "Asr": "16:05 (CET)",
                    "Maghrib": "19:10 (CET)",
                    "Isha": "20:35 (CET)"
                },
                "date": {
                    "gregorian": {
                        "date": format!("{:02}-{:02}-{}", day, month, year),
                        "weekday": {"en": "Saturday"},
                        "month": {"number": month, "en": "June"},
                        "year": year.to_string()
                    },
                    "hijri": {
                        "date": format!("{:02}-{:02}-{}", day, 12, 1446),
                        "weekday": {"en": "Al Sabt", "ar": "السبت"},
                        "month": {"number": 12, "en": "Dhu al-Hijjah"},
                        "year": "1446"
                    }
                }
            })
        })
        .collect();
    json!({ "code": 200, "status": "OK", "data": entries })
}

async fn online_service(server: &MockServer) -> SyncService<StaticProbe> {
    let store = CacheStore::open_in_memory().unwrap();
    let client = PrayerApiClient::new(&server.uri(), TIMEOUT).unwrap();
    SyncService::new(store, client, StaticProbe(true))
}

#[tokio::test]
async fn fetch_persists_month_then_serves_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/calendarByCity/2025/6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(calendar_json(2025, 6, 30)))
        .expect(1)
        .mount(&server)
        .await;

    let mut service = online_service(&server).await;
    let city = City::default();

    let first = service.get_or_fetch_month(&city, 2025, 6).await.unwrap();
    assert!(!first.from_cache);
    assert_eq!(first.days.len(), 30);
    assert!(service.store().has_month(2025, 6).unwrap());

    // Second request must be answered from the cache; the mock's expect(1)
    // verifies no second HTTP call went out.
    let second = service.get_or_fetch_month(&city, 2025, 6).await.unwrap();
    assert!(second.from_cache);
    assert_eq!(second.days.len(), 30);

    // Rows are ordered and carry stripped times.
    assert_eq!(second.days[0].date, "01-06-2025");
    assert_eq!(second.days[0].timings.fajr.as_deref(), Some("04:05"));
    assert_eq!(second.days[29].date, "30-06-2025");
}

#[tokio::test]
async fn offline_miss_short_circuits_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(calendar_json(2025, 6, 30)))
        .expect(0)
        .mount(&server)
        .await;

    let store = CacheStore::open_in_memory().unwrap();
    let client = PrayerApiClient::new(&server.uri(), TIMEOUT).unwrap();
    let mut service = SyncService::new(store, client, StaticProbe(false));

    let result = service
        .get_or_fetch_month(&City::default(), 2025, 6)
        .await
        .unwrap();
    assert!(result.days.is_empty());
    assert!(!result.from_cache);
    assert!(!service.store().has_any_data().unwrap());
}

#[tokio::test]
async fn server_error_surfaces_as_api_error_and_commits_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/calendarByCity/2025/6"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut service = online_service(&server).await;
    let err = service
        .get_or_fetch_month(&City::default(), 2025, 6)
        .await
        .unwrap_err();
    match err {
        Error::Api { status, month, year, .. } => {
            assert_eq!(status, 500);
            assert_eq!((year, month), (2025, 6));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
    assert!(!service.store().has_any_data().unwrap());
}

#[tokio::test]
async fn baseline_fetches_current_month_into_empty_cache() {
    let today = Local::now().date_naive();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/calendarByCity/\d+/\d+$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(calendar_json(today.year(), today.month(), 28)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("prayer_times.db");
    let store = CacheStore::open(&db_path).unwrap();
    let client = PrayerApiClient::new(&server.uri(), TIMEOUT).unwrap();
    let service = SyncService::new(store, client, StaticProbe(true));

    let mut status = service.ensure_baseline(db_path.clone(), City::default());
    let finished = tokio::time::timeout(
        TIMEOUT,
        status.wait_for(|s| matches!(*s, SyncStatus::Done | SyncStatus::Failed)),
    )
    .await
    .expect("baseline did not finish in time")
    .unwrap();
    assert_eq!(*finished, SyncStatus::Done);

    // A fresh connection sees the baseline's writes.
    let store = CacheStore::open(&db_path).unwrap();
    assert!(store.has_any_data().unwrap());
    let month = store.get_month(today.year(), today.month()).unwrap();
    assert_eq!(month.len(), 28);

    // A second call must not start another fetch (expect(1) above).
    let mut again = service.ensure_baseline(db_path, City::default());
    let settled = tokio::time::timeout(
        TIMEOUT,
        again.wait_for(|s| matches!(*s, SyncStatus::Done | SyncStatus::Failed)),
    )
    .await
    .expect("second baseline call did not settle")
    .unwrap();
    assert_eq!(*settled, SyncStatus::Done);
}

#[tokio::test]
async fn baseline_offline_fails_without_touching_network_or_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("prayer_times.db");
    let store = CacheStore::open(&db_path).unwrap();
    let client = PrayerApiClient::new(&server.uri(), TIMEOUT).unwrap();
    let service = SyncService::new(store, client, StaticProbe(false));

    let mut status = service.ensure_baseline(db_path.clone(), City::default());
    let finished = tokio::time::timeout(
        TIMEOUT,
        status.wait_for(|s| matches!(*s, SyncStatus::Done | SyncStatus::Failed)),
    )
    .await
    .expect("baseline did not finish in time")
    .unwrap();
    assert_eq!(*finished, SyncStatus::Failed);

    let store = CacheStore::open(&db_path).unwrap();
    assert!(!store.has_any_data().unwrap());
}

#[tokio::test]
async fn baseline_completes_immediately_when_cache_has_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("prayer_times.db");
    let store = CacheStore::open(&db_path).unwrap();
    store
        .upsert_day(&mawaqit::models::CalendarDayRecord {
            date: "01-01-2025".into(),
            date_hijri: "01-07-1446".into(),
            name_arabic: "الأربعاء".into(),
            timings: mawaqit::models::PrayerTimings {
                fajr: Some("05:30".into()),
                ..Default::default()
            },
        })
        .unwrap();

    let client = PrayerApiClient::new(&server.uri(), TIMEOUT).unwrap();
    let service = SyncService::new(store, client, StaticProbe(true));
    let status = service.ensure_baseline(db_path, City::default());
    assert_eq!(*status.borrow(), SyncStatus::Done);
}
