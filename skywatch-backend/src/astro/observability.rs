///! Peak-altitude ("transit") search over a fixed window.
///!
///! The window starts at the observation instant and is sampled evenly with
///! both endpoints included. The highest sample is reported as the transit;
///! for circumpolar or never-rising targets this is simply the highest point
///! inside the window, not a meridian crossing.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use skywatch_common::{EquatorialPosition, ObservabilityReport, ObserverLocation};

use super::frames::FrameTransform;
use super::timezone::TimezoneLookup;

const UTC_ZONE: &str = "UTC";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeSample {
    pub instant: DateTime<Utc>,
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
}

pub struct ObservabilityCalculator {
    transform: Arc<dyn FrameTransform>,
    timezones: Arc<dyn TimezoneLookup>,
    sample_count: usize,
    window: Duration,
}

impl ObservabilityCalculator {
    /// `sample_count` is clamped to at least 2 so both window ends are sampled.
    pub fn new(
        transform: Arc<dyn FrameTransform>,
        timezones: Arc<dyn TimezoneLookup>,
        sample_count: usize,
        window_hours: f64,
    ) -> Self {
        Self {
            transform,
            timezones,
            sample_count: sample_count.max(2),
            window: Duration::microseconds((window_hours * 3_600_000_000.0).round() as i64),
        }
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// End of the window starting at `start`, or `None` when it falls outside
    /// the representable date range.
    pub fn window_end(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        start.checked_add_signed(self.window)
    }

    /// Instants `start + window * i / (n - 1)` for `i` in `0..n`. Instants past
    /// the representable range saturate at its end.
    pub fn sample_instants(&self, start: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let window_us = self.window.num_microseconds().unwrap_or(0);
        let last = (self.sample_count - 1) as i64;

        (0..self.sample_count as i64)
            .map(|i| {
                start
                    .checked_add_signed(Duration::microseconds(window_us * i / last))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC)
            })
            .collect()
    }

    pub fn sample_altitudes(
        &self,
        position: EquatorialPosition,
        observer: &ObserverLocation,
        start: DateTime<Utc>,
    ) -> Vec<AltitudeSample> {
        self.sample_instants(start)
            .into_iter()
            .map(|instant| {
                let horizontal = self.transform.to_horizontal(position, observer, instant);
                AltitudeSample {
                    instant,
                    altitude_deg: horizontal.altitude_deg,
                    azimuth_deg: horizontal.azimuth_deg,
                }
            })
            .collect()
    }

    pub fn compute(
        &self,
        position: EquatorialPosition,
        observer: &ObserverLocation,
        start: DateTime<Utc>,
    ) -> ObservabilityReport {
        let samples = self.sample_altitudes(position, observer, start);
        // sample_count >= 2, so there is always a peak
        let peak = peak_sample(&samples).unwrap_or(AltitudeSample {
            instant: start,
            altitude_deg: f64::NAN,
            azimuth_deg: f64::NAN,
        });

        let (timezone, local_zone) = self.resolve_zone(observer);
        let transit_time_local = match local_zone {
            Some(tz) => peak.instant.with_timezone(&tz).fixed_offset(),
            None => peak.instant.fixed_offset(),
        };

        tracing::debug!(
            "Peak altitude {:.2} deg at {} ({} samples, zone {})",
            peak.altitude_deg,
            peak.instant,
            samples.len(),
            timezone
        );

        ObservabilityReport {
            max_altitude_deg: peak.altitude_deg,
            transit_azimuth_deg: peak.azimuth_deg,
            transit_time_utc: peak.instant,
            transit_time_local,
            timezone,
            sample_count: samples.len(),
        }
    }

    /// Observer's zone id and parsed zone; `("UTC", None)` when the lookup
    /// finds nothing or returns an id chrono-tz does not know.
    fn resolve_zone(&self, observer: &ObserverLocation) -> (String, Option<Tz>) {
        let Some(name) = self.timezones.timezone_for(observer.latitude, observer.longitude) else {
            tracing::debug!(
                "No timezone for ({}, {}), falling back to UTC",
                observer.latitude,
                observer.longitude
            );
            return (UTC_ZONE.to_string(), None);
        };

        match name.parse::<Tz>() {
            Ok(tz) => (name, Some(tz)),
            Err(_) => {
                tracing::warn!("Unknown timezone id '{}', falling back to UTC", name);
                (UTC_ZONE.to_string(), None)
            }
        }
    }
}

/// First sample with the highest altitude
pub fn peak_sample(samples: &[AltitudeSample]) -> Option<AltitudeSample> {
    let mut peak: Option<AltitudeSample> = None;
    for sample in samples {
        match peak {
            Some(best) if sample.altitude_deg <= best.altitude_deg => {}
            _ => peak = Some(*sample),
        }
    }
    peak
}
