use thiserror::Error;

/// Errors surfaced by the cache, fetch, and sync layers.
///
/// `UnparseableDate` is recovered locally during scans (the offending row is
/// skipped); the other variants propagate to the caller. An empty month with
/// no connectivity is *not* an error; see `MonthTimetable::from_cache`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unparseable stored date: '{raw}'")]
    UnparseableDate { raw: String },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("fetch failed for {city} {month:02}/{year}: {source}")]
    Fetch {
        city: String,
        year: i32,
        month: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("prayer times API returned {status} for {city} {month:02}/{year}")]
    Api {
        city: String,
        year: i32,
        month: u32,
        status: u16,
    },

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid city: {0}")]
    InvalidCity(String),
}

pub type Result<T> = std::result::Result<T, Error>;
