///! Types shared between the Skywatch backend and its tooling.

pub mod angle;
pub mod types;

pub use angle::{format_dec, format_ra};
pub use types::{
    EquatorialPosition, ErrorBody, ErrorKind, ObservabilityReport, ObserverLocation, TargetClass,
    TargetResponse,
};
