pub mod client;
pub mod connectivity;

pub use client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, PrayerApiClient};
pub use connectivity::{ConnectivityProbe, StaticProbe, TcpProbe};
