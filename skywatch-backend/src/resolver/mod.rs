///! Position resolution for a named target.
///!
///! Solar-system bodies come from the ephemeris service already apparent of
///! date. Stars and deep-sky objects come from name resolution at J2000 and
///! are precessed to the observation instant here.

mod horizons;
mod sesame;

pub use horizons::{parse_ephemeris_rows, HorizonsClient};
pub use sesame::{parse_sesame_response, SesameClient};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skywatch_common::{EquatorialPosition, TargetClass};

use crate::astro::classifier::solar_system_body;
use crate::astro::frames::FrameTransform;
use crate::astro::time::j2000;
use crate::error::{LookupError, LookupResult};
use crate::pool::TaskPool;

/// Horizons site code for the geocenter
pub const GEOCENTRIC_OBSERVER: &str = "500";

/// Name-resolution collaborator: catalog name to J2000 position
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// `Ok(None)` when the service knows no object by that name
    async fn resolve(&self, name: &str) -> LookupResult<Option<EquatorialPosition>>;
}

/// One tabulated ephemeris row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EphemerisRow {
    pub ra_deg: f64,
    pub dec_deg: f64,
}

/// Ephemeris collaborator
#[async_trait]
pub trait EphemerisSource: Send + Sync {
    async fn ephemeris(
        &self,
        body_id: &str,
        observer_code: &str,
        instant: DateTime<Utc>,
    ) -> LookupResult<Vec<EphemerisRow>>;
}

/// A named target with a position valid only at `instant`
#[derive(Debug, Clone, PartialEq)]
pub struct CelestialTarget {
    pub name: String,
    pub class: TargetClass,
    pub position: EquatorialPosition,
    pub instant: DateTime<Utc>,
}

pub struct PositionResolver {
    names: Arc<dyn NameResolver>,
    ephemeris: Arc<dyn EphemerisSource>,
    transform: Arc<dyn FrameTransform>,
    pool: TaskPool,
}

impl PositionResolver {
    pub fn new(
        names: Arc<dyn NameResolver>,
        ephemeris: Arc<dyn EphemerisSource>,
        transform: Arc<dyn FrameTransform>,
        pool: TaskPool,
    ) -> Self {
        Self {
            names,
            ephemeris,
            transform,
            pool,
        }
    }

    /// Apparent position of `name` at `instant`.
    pub async fn resolve(&self, name: &str, instant: DateTime<Utc>) -> LookupResult<CelestialTarget> {
        let (class, position) = match solar_system_body(name) {
            Some(body) => {
                let position = self.resolve_body(name, body.horizons_id, instant).await?;
                (TargetClass::SolarSystemBody, position)
            }
            None => {
                let position = self.resolve_stellar(name, instant).await?;
                (TargetClass::StellarOrDso, position)
            }
        };

        tracing::debug!(
            "Resolved {} ({}) to RA {:.5} Dec {:.5} at {}",
            name,
            class,
            position.ra_deg,
            position.dec_deg,
            instant
        );

        Ok(CelestialTarget {
            name: name.to_string(),
            class,
            position,
            instant,
        })
    }

    async fn resolve_body(
        &self,
        name: &str,
        horizons_id: &str,
        instant: DateTime<Utc>,
    ) -> LookupResult<EquatorialPosition> {
        let rows = self
            .pool
            .run(
                "horizons",
                self.ephemeris.ephemeris(horizons_id, GEOCENTRIC_OBSERVER, instant),
            )
            .await?;

        // Apparent of date already; no precession
        let row = rows
            .first()
            .ok_or_else(|| LookupError::NoEphemerisData(name.to_string()))?;
        Ok(EquatorialPosition::new(row.ra_deg, row.dec_deg))
    }

    async fn resolve_stellar(&self, name: &str, instant: DateTime<Utc>) -> LookupResult<EquatorialPosition> {
        let catalog = self
            .pool
            .run("sesame", self.names.resolve(name))
            .await?
            .ok_or_else(|| LookupError::ObjectNotFound(name.to_string()))?;

        Ok(self.transform.precess(catalog, j2000(), instant))
    }
}
