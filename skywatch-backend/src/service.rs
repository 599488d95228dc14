///! Target lookup orchestration: classify, cache, resolve, observe, format.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use skywatch_common::{format_dec, format_ra, ObserverLocation, TargetResponse};
use tracing::{debug, info};

use crate::astro::ObservabilityCalculator;
use crate::cache::TargetCache;
use crate::error::{LookupError, LookupResult};
use crate::resolver::PositionResolver;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub struct TargetService {
    resolver: PositionResolver,
    calculator: ObservabilityCalculator,
    cache: Arc<TargetCache>,
}

impl TargetService {
    pub fn new(resolver: PositionResolver, calculator: ObservabilityCalculator, cache: Arc<TargetCache>) -> Self {
        Self {
            resolver,
            calculator,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<TargetCache> {
        &self.cache
    }

    /// Look up `name` for raw request parameters. `time` defaults to now.
    pub async fn lookup(
        &self,
        name: &str,
        latitude: f64,
        longitude: f64,
        time: Option<&str>,
    ) -> LookupResult<TargetResponse> {
        let location = ObserverLocation::new(latitude, longitude).map_err(LookupError::InvalidRequest)?;
        let instant = parse_observation_time(time)?;
        self.lookup_at(name, &location, instant).await
    }

    pub async fn lookup_at(
        &self,
        name: &str,
        location: &ObserverLocation,
        instant: DateTime<Utc>,
    ) -> LookupResult<TargetResponse> {
        if name.trim().is_empty() {
            return Err(LookupError::InvalidRequest("target name is empty".to_string()));
        }
        if self.calculator.window_end(instant).is_none() {
            return Err(LookupError::InvalidRequest(format!(
                "time is outside the supported range: {}",
                instant
            )));
        }

        let key = self.cache.key(name, instant, location);
        if let Some(hit) = self.cache.get(&key).await {
            debug!("Cache hit for {} (computed for {})", name, hit.computed_for);
            return Ok(hit.response);
        }

        let target = self.resolver.resolve(name, instant).await?;
        let report = self.calculator.compute(target.position, location, instant);

        let response = TargetResponse {
            name: target.name,
            ra: format_ra(target.position.ra_deg),
            ra_deg: target.position.ra_deg,
            dec: format_dec(target.position.dec_deg),
            dec_deg: target.position.dec_deg,
            max_altitude_deg: report.max_altitude_deg,
            transit_time_utc: report.transit_time_utc.to_rfc3339_opts(SecondsFormat::Secs, true),
            transit_time_local: report.transit_time_local.to_rfc3339_opts(SecondsFormat::Secs, false),
            timezone: report.timezone,
        };

        info!(
            "Computed {} ({}) for ({:.4}, {:.4}) at {}: max altitude {:.2} deg, azimuth {:.2} deg",
            name,
            target.class,
            location.latitude,
            location.longitude,
            instant,
            response.max_altitude_deg,
            report.transit_azimuth_deg
        );

        self.cache.put(key, response.clone(), instant).await;
        Ok(response)
    }
}

/// Observation instant from the optional `time` parameter.
///
/// Accepts RFC 3339, naive ISO-8601 date-times (taken as UTC) and bare dates
/// (midnight UTC). Absent means now.
pub fn parse_observation_time(time: Option<&str>) -> LookupResult<DateTime<Utc>> {
    let Some(raw) = time.map(str::trim) else {
        return Ok(Utc::now());
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(LookupError::InvalidRequest(format!(
        "time is not an ISO-8601 date-time: {}",
        raw
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::astro::MeanEquatorTransform;
    use crate::cache::CachePolicy;
    use crate::pool::TaskPool;
    use crate::resolver::testing::{FixedZone, StubEphemeris, StubNames};
    use chrono::TimeZone;
    use skywatch_common::EquatorialPosition;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    struct Fixture {
        service: TargetService,
        names: Arc<StubNames>,
        ephemeris: Arc<StubEphemeris>,
    }

    fn fixture(zone: Option<&'static str>) -> Fixture {
        let names = Arc::new(StubNames {
            known: vec![("M57", EquatorialPosition::new(283.396_25, 33.029_166_67))],
            ..Default::default()
        });
        let ephemeris = Arc::new(StubEphemeris::with_row(120.5, 21.25));
        let transform = Arc::new(MeanEquatorTransform);

        let resolver = PositionResolver::new(
            names.clone(),
            ephemeris.clone(),
            transform.clone(),
            TaskPool::new(5, Duration::from_secs(5)),
        );
        let calculator = ObservabilityCalculator::new(transform, Arc::new(FixedZone(zone)), 300, 24.0);
        let cache = Arc::new(TargetCache::new(CachePolicy {
            bucket_minutes: 10,
            location_precision_deg: 0.1,
        }));

        Fixture {
            service: TargetService::new(resolver, calculator, cache),
            names,
            ephemeris,
        }
    }

    const NYC_TIME: &str = "2026-10-16T22:00:00Z";

    #[tokio::test]
    async fn test_mars_lookup() {
        let fx = fixture(Some("America/New_York"));
        let response = fx
            .service
            .lookup("Mars", 40.7128, -74.0060, Some(NYC_TIME))
            .await
            .unwrap();

        assert_eq!(response.name, "Mars");
        assert_eq!(response.ra, "08:02:00.00");
        assert_eq!(response.ra_deg, 120.5);
        assert_eq!(response.dec, "21:15:00.0");
        assert_eq!(response.dec_deg, 21.25);
        assert!(response.max_altitude_deg > 0.0 && response.max_altitude_deg <= 90.0);
        assert!(response.transit_time_utc.ends_with('Z'));
        assert!(response.transit_time_local.ends_with("-04:00"));
        assert_eq!(response.timezone, "America/New_York");

        let utc = DateTime::parse_from_rfc3339(&response.transit_time_utc).unwrap();
        let local = DateTime::parse_from_rfc3339(&response.transit_time_local).unwrap();
        assert_eq!(utc, local);
        assert_eq!(fx.names.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_m57_lookup() {
        let fx = fixture(Some("America/New_York"));
        let response = fx
            .service
            .lookup("M57", 40.7128, -74.0060, Some(NYC_TIME))
            .await
            .unwrap();

        assert_eq!(response.name, "M57");
        // Precessed away from the J2000 position
        assert_ne!(response.ra_deg, 283.396_25);
        assert_abs_diff_eq!(response.ra_deg, 283.396_25, epsilon = 1.0);
        assert!(response.ra.starts_with("18:5"));
        // Culminates near 90 - |40.71 - 33.03|
        assert_abs_diff_eq!(response.max_altitude_deg, 82.3, epsilon = 0.5);
        assert_eq!(fx.ephemeris.request_count(), 0);
    }

    #[tokio::test]
    async fn test_utc_fallback_zone() {
        let fx = fixture(None);
        let response = fx
            .service
            .lookup("Mars", -45.0, -140.0, Some(NYC_TIME))
            .await
            .unwrap();

        assert_eq!(response.timezone, "UTC");
        assert!(response.transit_time_local.ends_with("+00:00"));
        assert_eq!(
            DateTime::parse_from_rfc3339(&response.transit_time_utc).unwrap(),
            DateTime::parse_from_rfc3339(&response.transit_time_local).unwrap()
        );
    }

    #[tokio::test]
    async fn test_cache_hit_within_bucket() {
        let fx = fixture(None);
        let first = fx
            .service
            .lookup("Mars", 40.7128, -74.0060, Some("2026-10-16T22:01:00Z"))
            .await
            .unwrap();
        let second = fx
            .service
            .lookup("Mars", 40.7130, -74.0061, Some("2026-10-16T22:04:30Z"))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(fx.ephemeris.request_count(), 1);
    }

    #[tokio::test]
    async fn test_different_time_recomputes() {
        let fx = fixture(None);
        fx.service
            .lookup("M57", 40.7, -74.0, Some("2026-10-16T22:00:00Z"))
            .await
            .unwrap();
        fx.service
            .lookup("M57", 40.7, -74.0, Some("2026-10-17T22:00:00Z"))
            .await
            .unwrap();
        fx.service
            .lookup("M57", 51.5, -0.1, Some("2026-10-17T22:00:00Z"))
            .await
            .unwrap();

        assert_eq!(fx.names.calls.load(Ordering::SeqCst), 3);
        assert_eq!(fx.service.cache().len().await, 3);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let fx = fixture(None);
        for _ in 0..2 {
            let err = fx
                .service
                .lookup("NotAStar123", 40.7, -74.0, Some(NYC_TIME))
                .await
                .unwrap_err();
            assert!(matches!(err, LookupError::ObjectNotFound(_)));
        }
        assert_eq!(fx.names.calls.load(Ordering::SeqCst), 2);
        assert!(fx.service.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_invalid_parameters() {
        let fx = fixture(None);

        let err = fx.service.lookup("Mars", 91.0, 0.0, None).await.unwrap_err();
        assert!(matches!(err, LookupError::InvalidRequest(_)));

        let err = fx.service.lookup("Mars", 0.0, 181.0, None).await.unwrap_err();
        assert!(matches!(err, LookupError::InvalidRequest(_)));

        let err = fx
            .service
            .lookup("Mars", 0.0, 0.0, Some("yesterday"))
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::InvalidRequest(_)));
        assert_eq!(fx.ephemeris.request_count(), 0);
    }

    #[tokio::test]
    async fn test_time_outside_range_rejected() {
        let fx = fixture(None);

        let err = fx
            .service
            .lookup("M57", 40.0, -74.0, Some("+262142-12-31T12:00:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::InvalidRequest(_)));
        assert_eq!(fx.names.calls.load(Ordering::SeqCst), 0);
        assert!(fx.service.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_cache_not_reused_across_buckets() {
        let fx = fixture(None);
        let first = fx
            .service
            .lookup("Mars", 40.7128, -74.0060, Some("2026-10-16T22:09:00Z"))
            .await
            .unwrap();
        let second = fx
            .service
            .lookup("Mars", 40.7128, -74.0060, Some("2026-10-16T22:10:00Z"))
            .await
            .unwrap();

        assert_eq!(fx.ephemeris.request_count(), 2);
        assert_ne!(first.transit_time_utc, second.transit_time_utc);
        assert_eq!(fx.service.cache().len().await, 2);
    }

    #[test]
    fn test_parse_observation_time() {
        let expected = Utc.with_ymd_and_hms(2026, 10, 16, 22, 0, 0).unwrap();

        assert_eq!(parse_observation_time(Some("2026-10-16T22:00:00Z")).unwrap(), expected);
        assert_eq!(parse_observation_time(Some("2026-10-16T18:00:00-04:00")).unwrap(), expected);
        assert_eq!(parse_observation_time(Some("2026-10-16T22:00:00")).unwrap(), expected);
        assert_eq!(parse_observation_time(Some("2026-10-16 22:00:00")).unwrap(), expected);
        assert_eq!(parse_observation_time(Some("2026-10-16T22:00")).unwrap(), expected);
        assert_eq!(
            parse_observation_time(Some("2026-10-16T22:00:00.250")).unwrap(),
            expected + chrono::Duration::milliseconds(250)
        );
        assert_eq!(
            parse_observation_time(Some("2026-10-16")).unwrap(),
            Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap()
        );
        assert!(parse_observation_time(Some("16/10/2026")).is_err());

        let before = Utc::now();
        let now = parse_observation_time(None).unwrap();
        assert!(now >= before);
    }
}
