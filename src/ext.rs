//! Extension traits for adding celestial functionality to sguaba types.
//!
//! Since Rust's orphan rules prevent us from implementing methods on foreign types
//! (like `sguaba::Coordinate`) from an external crate, we provide extension traits
//! that users can import to get the same functionality.

use sguaba::Coordinate;
use uom::si::f64::{Angle, Length};

use crate::Icrs;

/// Extension methods for ICRS coordinates.
///
/// Provides celestial coordinate conversions (RA/Dec) for ICRS frames, used
/// by the output converter (§4.8) to hand a propagated state off in a typed
/// coordinate rather than a bare `[f64; 3]`.
pub trait IcrsCoordinateExt {
    /// Convert to spherical celestial coordinates (Right Ascension, Declination, Distance).
    ///
    /// # Returns
    ///
    /// `(ra, dec, distance)` where:
    /// - `ra`: Right ascension (0 to 2π radians)
    /// - `dec`: Declination (-π/2 to π/2 radians)
    /// - `distance`: Radial distance from origin
    fn to_spherical_celestial(&self) -> (Angle, Angle, Length);

    /// Construct ICRS coordinate from spherical celestial coordinates.
    ///
    /// # Parameters
    ///
    /// - `ra`: Right ascension (any value, will be normalized to 0-2π)
    /// - `dec`: Declination (must be in range [-π/2, π/2])
    /// - `distance`: Radial distance from origin
    fn from_ra_dec(ra: Angle, dec: Angle, distance: Length) -> Self;

    /// Build ICRS coordinate from cartesian components.
    ///
    /// # Parameters
    ///
    /// - `components`: Cartesian X, Y, Z components
    fn build(components: crate::frames::CelestialComponents) -> Self;
}

impl IcrsCoordinateExt for Coordinate<Icrs> {
    fn to_spherical_celestial(&self) -> (Angle, Angle, Length) {
        use uom::si::angle::radian;
        use uom::si::length::meter;

        let [x, y, z] = self.to_cartesian();
        let distance = self.distance_from_origin();

        let x_val = x.get::<meter>();
        let y_val = y.get::<meter>();
        let z_val = z.get::<meter>();

        // Right ascension: atan2(y, x)
        let ra = Angle::new::<radian>(y_val.atan2(x_val));
        let ra = if ra.get::<radian>() < 0.0 {
            Angle::new::<radian>(ra.get::<radian>() + 2.0 * std::f64::consts::PI)
        } else {
            ra
        };

        // Declination: asin(z / r)
        let r = distance.get::<meter>();
        let dec = if r > 0.0 {
            Angle::new::<radian>((z_val / r).asin())
        } else {
            Angle::new::<radian>(0.0)
        };

        (ra, dec, distance)
    }

    fn from_ra_dec(ra: Angle, dec: Angle, distance: Length) -> Self {
        use uom::si::angle::radian;
        use uom::si::length::meter;

        let ra_rad = ra.get::<radian>();
        let dec_rad = dec.get::<radian>();
        let r = distance.get::<meter>();

        let (sin_dec, cos_dec) = dec_rad.sin_cos();
        let (sin_ra, cos_ra) = ra_rad.sin_cos();

        let x = r * cos_dec * cos_ra;
        let y = r * cos_dec * sin_ra;
        let z = r * sin_dec;

        #[allow(deprecated)]
        Self::from_cartesian(
            Length::new::<meter>(x),
            Length::new::<meter>(y),
            Length::new::<meter>(z),
        )
    }

    fn build(components: crate::frames::CelestialComponents) -> Self {
        #[allow(deprecated)]
        Self::from_cartesian(components.x, components.y, components.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uom::si::angle::degree;
    use uom::si::length::kilometer;

    #[test]
    fn ra_dec_roundtrip() {
        let ra_in = Angle::new::<degree>(45.0);
        let dec_in = Angle::new::<degree>(30.0);
        let dist_in = Length::new::<kilometer>(1000.0);

        let pos = Coordinate::<Icrs>::from_ra_dec(ra_in, dec_in, dist_in);
        let (ra_out, dec_out, dist_out) = pos.to_spherical_celestial();

        assert!((ra_out.get::<degree>() - ra_in.get::<degree>()).abs() < 0.001);
        assert!((dec_out.get::<degree>() - dec_in.get::<degree>()).abs() < 0.001);
        assert!((dist_out.get::<kilometer>() - dist_in.get::<kilometer>()).abs() < 0.001);
    }
}
