//! Qibla direction as a great-circle bearing toward the Kaaba.

const KAABA_LAT: f64 = 21.4225;
const KAABA_LNG: f64 = 39.8262;

/// Compass bearing in degrees from (latitude, longitude) to the Kaaba,
/// normalized to [0, 360) with 0 = North.
pub fn qibla_bearing(latitude: f64, longitude: f64) -> f64 {
    let lat1 = latitude.to_radians();
    let lon1 = longitude.to_radians();
    let lat2 = KAABA_LAT.to_radians();
    let lon2 = KAABA_LNG.to_radians();

    let d_lon = lon2 - lon1;
    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    let bearing = y.atan2(x).to_degrees();
    (bearing + 360.0) % 360.0
}
