//! Celestial coordinate system definitions.

use sguaba::CoordinateSystem;
use uom::si::f64::Length;
use uom::si::length::meter;

/// Celestial coordinate convention (right-handed XYZ).
///
/// Used for inertial celestial reference frames like ICRS and MCI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CelestialConvention;

/// Components for celestial coordinate systems (X, Y, Z).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CelestialComponents {
    /// X component
    pub x: Length,
    /// Y component
    pub y: Length,
    /// Z component
    pub z: Length,
}

impl From<CelestialComponents> for [Length; 3] {
    fn from(c: CelestialComponents) -> Self {
        [c.x, c.y, c.z]
    }
}

impl From<[Length; 3]> for CelestialComponents {
    fn from([x, y, z]: [Length; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<CelestialComponents> for [f64; 3] {
    fn from(c: CelestialComponents) -> Self {
        [
            c.x.get::<meter>(),
            c.y.get::<meter>(),
            c.z.get::<meter>(),
        ]
    }
}

impl From<[f64; 3]> for CelestialComponents {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self {
            x: Length::new::<meter>(x),
            y: Length::new::<meter>(y),
            z: Length::new::<meter>(z),
        }
    }
}

/// International Celestial Reference System (ICRS).
///
/// ICRS is the fundamental celestial reference frame adopted by the International
/// Astronomical Union (IAU) in 1997. It provides a quasi-inertial reference frame
/// for describing positions and motions of celestial objects.
///
/// # Coordinate Axes
///
/// - **X axis**: Points towards the vernal equinox at the J2000.0 epoch (RA = 0h)
/// - **Y axis**: 90° east in the equatorial plane (RA = 6h)
/// - **Z axis**: Points towards the North Celestial Pole
///
/// # Properties
///
/// - **Origin**: Earth's center of mass (geocenter)
/// - **Orientation**: Aligned with the mean equator and equinox at J2000.0
/// - **Definition**: Established by observed positions of distant extragalactic sources
/// - **Handedness**: Right-handed
///
/// # Time Dependence
///
/// ICRS itself is time-independent and inertial. However, transforms between ICRS
/// and Earth-fixed frames (like [`sguaba::systems::Ecef`]) are time-dependent due to 
/// Earth's rotation and precession.
///
/// # Accuracy
///
/// Transformations to/from ECEF achieve < 30 milliarcseconds accuracy (2020-2050)
/// using the IAU 2006/2000A precession model and Earth Rotation Angle (ERA).
///
/// # Limitations
///
/// - Nutation (short-period wobbles) is not modeled
/// - No polar motion corrections
/// - No corrections for tidal effects on Earth's rotation
///
/// # References
///
/// - [IAU Resolution B2 (1997)](https://www.iau.org/static/resolutions/IAU1997_French.pdf)
/// - [IERS Technical Note 36](https://www.iers.org/IERS/EN/Publications/TechnicalNotes/tn36.html)
/// - [USNO Circular 179](https://aa.usno.navy.mil/publications/docs/Circular_179.pdf)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Icrs;

impl CoordinateSystem for Icrs {
    type Convention = CelestialConvention;
}

// ======================================================================================
// CELESTIAL COORDINATE HELPERS
// ======================================================================================

// Coordinate<Icrs> methods moved to IcrsCoordinateExt trait in ext module

#[cfg(test)]
mod celestial_coords_tests {
    use super::*;
    use crate::IcrsCoordinateExt;
    use uom::si::angle::degree;
    use uom::si::f64::{Angle, Length};
    use uom::si::length::kilometer;

    #[test]
    fn ra_dec_north_pole() {
        let dec = Angle::new::<degree>(90.0);
        let dist = Length::new::<kilometer>(1000.0);
        
        let pos = sguaba::Coordinate::<Icrs>::from_ra_dec(
            Angle::new::<degree>(0.0),
            dec,
            dist,
        );
        
        let [x, y, z] = pos.to_cartesian();
        assert!(x.get::<kilometer>().abs() < 0.001);
        assert!(y.get::<kilometer>().abs() < 0.001);
        assert!((z.get::<kilometer>() - 1000.0).abs() < 0.001);
    }
}

