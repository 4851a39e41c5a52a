//! Unit conversions from NOAA's metric/WMO measurements to display units.
//! Pure, total functions; no error paths.

const MPH_PER_KPH: f64 = 0.621_371_192_2;
const MPH_PER_MPS: f64 = 2.236_936_292_1;
const MPH_PER_KNOT: f64 = 1.150_779_448;
const INHG_PER_PASCAL: f64 = 0.000_295_299_875_1;

const COMPASS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn pascals_to_inches_mercury(pascals: f64) -> f64 {
    pascals * INHG_PER_PASCAL
}

/// Convert a wind speed to mph, dispatching on the upstream WMO unit code
/// (e.g. `wmoUnit:km_h-1`, `wmoUnit:m_s-1`, `wmoUnit:kt`).
///
/// Unrecognized codes are read as m/s. That is an assumption, not a
/// validated default: m/s is what the NOAA observation feed sends in
/// practice, and an unanticipated code will be converted as if it were m/s.
pub fn speed_to_mph(value: f64, unit_code: &str) -> f64 {
    let code = unit_code.to_ascii_lowercase();
    if code.contains("km_h") || code.contains("km/h") || code.contains("kph") {
        value * MPH_PER_KPH
    } else if code.contains("mi_h") || code.contains("mph") {
        value
    } else if code.contains("kt") || code.contains("kn") {
        value * MPH_PER_KNOT
    } else {
        value * MPH_PER_MPS
    }
}

/// Map a bearing in degrees to one of the 16 compass labels.
pub fn degrees_to_compass(degrees: f64) -> &'static str {
    let idx = (degrees.rem_euclid(360.0) / 22.5).round() as usize % 16;
    COMPASS[idx]
}
