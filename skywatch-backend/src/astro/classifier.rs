use skywatch_common::TargetClass;

/// A body served by the ephemeris service instead of name resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarSystemBody {
    pub name: &'static str,
    /// JPL Horizons major-body identifier
    pub horizons_id: &'static str,
}

pub const SOLAR_SYSTEM_BODIES: &[SolarSystemBody] = &[
    SolarSystemBody { name: "Mercury", horizons_id: "199" },
    SolarSystemBody { name: "Venus", horizons_id: "299" },
    SolarSystemBody { name: "Mars", horizons_id: "499" },
    SolarSystemBody { name: "Jupiter", horizons_id: "599" },
    SolarSystemBody { name: "Saturn", horizons_id: "699" },
    SolarSystemBody { name: "Uranus", horizons_id: "799" },
    SolarSystemBody { name: "Neptune", horizons_id: "899" },
    SolarSystemBody { name: "Pluto", horizons_id: "999" },
    SolarSystemBody { name: "Moon", horizons_id: "301" },
];

/// Exact, case-sensitive lookup in [`SOLAR_SYSTEM_BODIES`]
pub fn solar_system_body(name: &str) -> Option<&'static SolarSystemBody> {
    SOLAR_SYSTEM_BODIES.iter().find(|body| body.name == name)
}

pub fn classify(name: &str) -> TargetClass {
    match solar_system_body(name) {
        Some(_) => TargetClass::SolarSystemBody,
        None => TargetClass::StellarOrDso,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_body_is_solar_system() {
        for body in SOLAR_SYSTEM_BODIES {
            assert_eq!(classify(body.name), TargetClass::SolarSystemBody);
        }
        assert_eq!(SOLAR_SYSTEM_BODIES.len(), 9);
    }

    #[test]
    fn test_other_names_are_stellar() {
        for name in ["M57", "Vega", "NGC 7000", "", "Sun", "Earth", "mars", "MARS", " Mars", "Moon "] {
            assert_eq!(classify(name), TargetClass::StellarOrDso, "{:?}", name);
        }
    }

    #[test]
    fn test_horizons_ids() {
        assert_eq!(solar_system_body("Mars").unwrap().horizons_id, "499");
        assert_eq!(solar_system_body("Moon").unwrap().horizons_id, "301");
        assert!(solar_system_body("Ceres").is_none());
    }
}
