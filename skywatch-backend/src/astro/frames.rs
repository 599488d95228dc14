///! Equatorial frame conversions.
///!
///! Precession uses the IAU 1976 angles (Lieske 1977); the horizontal
///! projection is geometric (no refraction, sea-level observer).

use chrono::{DateTime, Utc};
use nalgebra::{Matrix3, Vector3};
use skywatch_common::{EquatorialPosition, ObserverLocation};

use super::time::{centuries_since_j2000, julian_date, local_sidereal_deg};

const ARCSEC_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// Altitude above the horizon and azimuth east of north, degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalPosition {
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
}

/// Coordinate-transform collaborator
pub trait FrameTransform: Send + Sync {
    /// Move a mean equatorial position from the equinox of `from` to the
    /// equinox of `to`. Equal epochs return the position unchanged.
    fn precess(
        &self,
        position: EquatorialPosition,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> EquatorialPosition;

    /// Project an of-date equatorial position into the observer's horizon
    /// frame at `instant`.
    fn to_horizontal(
        &self,
        position: EquatorialPosition,
        observer: &ObserverLocation,
        instant: DateTime<Utc>,
    ) -> HorizontalPosition;
}

/// Default transform: mean equator and equinox of date, mean sidereal time
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanEquatorTransform;

impl FrameTransform for MeanEquatorTransform {
    fn precess(
        &self,
        position: EquatorialPosition,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> EquatorialPosition {
        if from == to {
            return position;
        }

        // J2000 -> to, composed with the inverse of J2000 -> from
        let to_date = precession_matrix(centuries_since_j2000(julian_date(to)));
        let from_date = precession_matrix(centuries_since_j2000(julian_date(from)));
        let rotation = to_date * from_date.transpose();

        from_unit_vector(&(rotation * unit_vector(position)))
    }

    fn to_horizontal(
        &self,
        position: EquatorialPosition,
        observer: &ObserverLocation,
        instant: DateTime<Utc>,
    ) -> HorizontalPosition {
        let lst = local_sidereal_deg(julian_date(instant), observer.longitude);
        let hour_angle = (lst - position.ra_deg).to_radians();
        let dec = position.dec_deg.to_radians();
        let lat = observer.latitude.to_radians();

        let (sin_h, cos_h) = hour_angle.sin_cos();
        let (sin_dec, cos_dec) = dec.sin_cos();
        let (sin_lat, cos_lat) = lat.sin_cos();

        let sin_alt = (sin_lat * sin_dec + cos_lat * cos_dec * cos_h).clamp(-1.0, 1.0);
        let azimuth = (-cos_dec * sin_h).atan2(cos_lat * sin_dec - sin_lat * cos_dec * cos_h);

        HorizontalPosition {
            altitude_deg: sin_alt.asin().to_degrees(),
            azimuth_deg: azimuth.to_degrees().rem_euclid(360.0),
        }
    }
}

/// Rotation taking J2000 mean equatorial vectors to the mean equator of date,
/// `t` Julian centuries after J2000: R3(-z) R2(theta) R3(-zeta).
fn precession_matrix(t: f64) -> Matrix3<f64> {
    let t2 = t * t;
    let t3 = t2 * t;

    let zeta = (2306.2181 * t + 0.30188 * t2 + 0.017998 * t3) * ARCSEC_TO_RAD;
    let z = (2306.2181 * t + 1.09468 * t2 + 0.018203 * t3) * ARCSEC_TO_RAD;
    let theta = (2004.3109 * t - 0.42665 * t2 - 0.041833 * t3) * ARCSEC_TO_RAD;

    rot_z(-z) * rot_y(theta) * rot_z(-zeta)
}

#[rustfmt::skip]
fn rot_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, s, 0.0,
        -s, c, 0.0,
        0.0, 0.0, 1.0,
    )
}

#[rustfmt::skip]
fn rot_y(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, 0.0, -s,
        0.0, 1.0, 0.0,
        s, 0.0, c,
    )
}

fn unit_vector(position: EquatorialPosition) -> Vector3<f64> {
    let (sin_ra, cos_ra) = position.ra_deg.to_radians().sin_cos();
    let (sin_dec, cos_dec) = position.dec_deg.to_radians().sin_cos();
    Vector3::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec)
}

fn from_unit_vector(v: &Vector3<f64>) -> EquatorialPosition {
    let ra = v.y.atan2(v.x).to_degrees();
    let dec = v.z.atan2(v.x.hypot(v.y)).to_degrees();
    EquatorialPosition::new(ra, dec)
}
