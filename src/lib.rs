//! NORAD TLE parsing and SGP/SGP4/SGP8/SDP4/SDP8/SGP4-R orbital propagation.
//!
//! This crate parses two-line element sets into mean-element records and
//! propagates them with the Spacetrack Report #3 analytic model family, plus
//! the unified SGP4-R revision. All models share the same Kozai mean-motion
//! recovery and deep-space-regime classification (§3/§4.2); near-earth and
//! deep-space kernels are selected automatically from the record's period.
//!
//! # Example
//!
//! ```
//! use sgp4_propagator::Element;
//!
//! let text = "1 25544U 98067A   20206.51782528  .00000836  00000-0  22359-4 0  9990\n\
//!              2 25544  51.6442 208.9163 0001591  96.9066  36.0559 15.49285935238291";
//! let mean = sgp4_propagator::tle::parse(text).unwrap().remove(0);
//! let mut el = Element::new(mean);
//! let (position_km, velocity_km_s) = el.propagate(0.0).unwrap();
//! assert!(position_km[0].is_finite());
//! ```
//!
//! # Coordinate output
//!
//! Propagated states are returned as bare ECI `[f64; 3]` arrays; the
//! [`Icrs`] coordinate system and [`IcrsCoordinateExt`] trait are provided
//! for callers that want a typed handoff into right ascension/declination
//! or another `sguaba` coordinate pipeline (§4.8).

mod ext;
pub use ext::*;

pub mod cached;
pub mod constants;
pub mod deep_space;
pub mod element;
pub mod errors;
pub mod frames;
pub mod gravity;
pub mod kepler;
pub mod model;
pub mod near_earth;
pub mod sgp;
pub mod sgp4r;
pub mod sgp8;
pub mod timed;
pub mod tle;

pub use cached::InitCache;
pub use element::Element;
pub use errors::{PropagatorError, PropagatorResult, Sgp4RError, Sgp4RResult};
pub use frames::{CelestialComponents, CelestialConvention, Icrs};
pub use gravity::{GravityConstants, GravityModel};
pub use model::ModelChoice;
pub use timed::{EphemerisState, TimedCoordinate, VelocityVector};
pub use tle::MeanElements;
