use chrono::{DateTime, TimeZone, Utc};

/// Julian date of the J2000.0 reference epoch
pub const J2000_JD: f64 = 2_451_545.0;

const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_CENTURY: f64 = 36_525.0;

/// J2000.0 as a UTC instant (2000-01-01T12:00:00Z).
///
/// The 64 s TT-UTC offset is ignored; it is far below what precession can
/// resolve.
pub fn j2000() -> DateTime<Utc> {
    Utc.timestamp_opt(946_728_000, 0)
        .single()
        .unwrap_or_default()
}

pub fn julian_date(instant: DateTime<Utc>) -> f64 {
    let seconds = instant.timestamp() as f64 + f64::from(instant.timestamp_subsec_nanos()) * 1e-9;
    UNIX_EPOCH_JD + seconds / SECONDS_PER_DAY
}

/// Julian centuries since J2000.0
pub fn centuries_since_j2000(jd: f64) -> f64 {
    (jd - J2000_JD) / DAYS_PER_CENTURY
}

/// Greenwich mean sidereal time in degrees, [0, 360).
///
/// IAU 1982 expression, UT1 taken as UTC.
pub fn gmst_deg(jd: f64) -> f64 {
    let d = jd - J2000_JD;
    let t = d / DAYS_PER_CENTURY;
    let gmst = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    gmst.rem_euclid(360.0)
}

/// Local mean sidereal time for an east-positive longitude, [0, 360).
pub fn local_sidereal_deg(jd: f64, longitude_deg: f64) -> f64 {
    (gmst_deg(jd) + longitude_deg).rem_euclid(360.0)
}
