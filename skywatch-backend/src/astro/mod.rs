///! Sky-position arithmetic and observability.
///!
///! - `classifier`: solar-system body vs. star/DSO
///! - `time`: Julian dates and sidereal time
///! - `frames`: precession and horizontal projection
///! - `timezone`: IANA zone from observer coordinates
///! - `observability`: 24-hour altitude sampling and transit extraction

pub mod classifier;
pub mod frames;
pub mod observability;
pub mod time;
pub mod timezone;

pub use classifier::{classify, solar_system_body, SolarSystemBody, SOLAR_SYSTEM_BODIES};
pub use frames::{FrameTransform, HorizontalPosition, MeanEquatorTransform};
pub use observability::{AltitudeSample, ObservabilityCalculator};
pub use timezone::{TimezoneLookup, TzfLookup};
