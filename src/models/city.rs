use serde::{Deserialize, Serialize};

/// A location prayer times are computed for. Stored as JSON inside the
/// settings singleton, so field names match the historical encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// Opaque identifier. May encode coordinates as "{lat}-{lng}".
    pub id: String,
    pub name: String,
    #[serde(rename = "apiName")]
    pub api_name: String,
    /// ISO country code, e.g. "TN".
    pub country: String,
}

impl City {
    pub fn new(id: &str, name: &str, api_name: &str, country: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            api_name: api_name.into(),
            country: country.into(),
        }
    }

    /// Attempts to read the id as a "{lat}-{lng}" pair. Callers fall back
    /// to geocoding by name when this returns `None`.
    ///
    /// The separator is the '-' between the two decimals, which is ambiguous
    /// against a negative longitude sign; the split is therefore tried at
    /// every '-' until both halves parse.
    pub fn coords(&self) -> Option<(f64, f64)> {
        for (idx, ch) in self.id.char_indices().skip(1) {
            if ch != '-' {
                continue;
            }
            let (lat_s, lng_s) = (&self.id[..idx], &self.id[idx + 1..]);
            if let (Ok(lat), Ok(lng)) = (lat_s.parse::<f64>(), lng_s.parse::<f64>()) {
                if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) {
                    return Some((lat, lng));
                }
            }
        }
        None
    }
}

impl Default for City {
    fn default() -> Self {
        // Matches the application's historical default.
        City::new("1", "Thyna", "Thyna", "TN")
    }
}
