//! Gravity constant sets for the SGP/SDP propagator family.
//!
//! Three sets are in common use; all three are carried here because the
//! legacy set is required for bit-for-bit reproduction of the original
//! Spacetrack Report No. 3 reference vectors, while `wgs72`/`wgs84` are what
//! the SGP4-R revision uses.

/// A named bundle of Earth gravity-model constants consumed by the propagators.
///
/// All constants are expressed in the models' native "Earth radii / minute" unit
/// system: `ae = 1.0` Earth radius, and `xke` is the corresponding value of
/// `sqrt(GM)` in those units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GravityConstants {
    /// `sqrt(GM)` in (Earth radii)^1.5 / minute.
    pub xke: f64,
    /// Second-degree zonal harmonic term, halved and scaled (`J2/2`).
    pub ck2: f64,
    /// Fourth-degree zonal harmonic term, scaled (`-3/8 J4`).
    pub ck4: f64,
    /// Earth equatorial radius, kilometers.
    pub xkmper: f64,
    /// Minutes per day (used to rescale mean-motion derived rates).
    pub xmnpda: f64,
    /// J2 zonal harmonic.
    pub j2: f64,
    /// J3 zonal harmonic.
    pub j3: f64,
    /// J4 zonal harmonic.
    pub j4: f64,
    /// `j3 / j2`, precomputed since several expansions use the ratio directly.
    pub j3oj2: f64,
    /// Minimum resolvable time unit in minutes (reciprocal of `xke`), used by
    /// the SGP4-R path as a numerical-noise floor.
    pub tumin: f64,
    /// Earth radii per distance unit; always `1.0` but kept explicit per the
    /// canonical report's naming.
    pub ae: f64,
}

/// Selects which published gravity-constant table an element record uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GravityModel {
    /// Truncated values from the original 1980 Spacetrack Report No. 3.
    Wgs72Legacy,
    /// Revised high-precision WGS-72 values (used by SGP4-R).
    Wgs72,
    /// WGS-84 values (used by SGP4-R).
    Wgs84,
}

impl GravityModel {
    /// Look up the constant bundle for this gravity model.
    #[must_use]
    pub fn constants(self) -> GravityConstants {
        match self {
            Self::Wgs72Legacy => WGS72_LEGACY,
            Self::Wgs72 => WGS72,
            Self::Wgs84 => WGS84,
        }
    }
}

impl Default for GravityModel {
    fn default() -> Self {
        Self::Wgs72
    }
}

/// WGS-72 truncated ("legacy") values, used by the original Spacetrack Report
/// No. 3 FORTRAN and required for bit-equivalent classical SGP4/SDP4 output.
pub const WGS72_LEGACY: GravityConstants = GravityConstants {
    xke: 0.074_366_853_80,
    ck2: 5.413_080e-4,
    ck4: 0.620_98e-6,
    xkmper: 6378.135,
    xmnpda: 1440.0,
    j2: 1.082_616e-3,
    j3: -0.253_881e-5,
    j4: -1.655_23e-6,
    j3oj2: -0.253_881e-5 / 1.082_616e-3,
    tumin: 1.0 / 0.074_366_853_80,
    ae: 1.0,
};

/// Revised high-precision WGS-72 values.
pub const WGS72: GravityConstants = GravityConstants {
    xke: 0.074_366_916_36,
    ck2: 5.413_079_6e-4,
    ck4: 0.620_97e-6,
    xkmper: 6378.135,
    xmnpda: 1440.0,
    j2: 1.082_616e-3,
    j3: -0.253_881e-5,
    j4: -1.655_23e-6,
    j3oj2: -0.253_881e-5 / 1.082_616e-3,
    tumin: 1.0 / 0.074_366_916_36,
    ae: 1.0,
};

/// WGS-84 values.
pub const WGS84: GravityConstants = GravityConstants {
    xke: 0.074_366_916_58,
    ck2: 5.413_080_2e-4,
    ck4: 0.620_98e-6,
    xkmper: 6378.137,
    xmnpda: 1440.0,
    j2: 1.082_629_821_063_2e-3,
    j3: -0.253_215_306e-5,
    j4: -1.614_93e-6,
    j3oj2: -0.253_215_306e-5 / 1.082_629_821_063_2e-3,
    tumin: 1.0 / 0.074_366_916_58,
    ae: 1.0,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_and_wgs72_agree_to_four_digits() {
        let a = WGS72_LEGACY;
        let b = WGS72;
        assert!((a.xke - b.xke).abs() < 1e-6);
        assert!((a.ck2 - b.ck2).abs() < 1e-8);
    }

    #[test]
    fn default_model_is_wgs72() {
        assert_eq!(GravityModel::default(), GravityModel::Wgs72);
    }

    #[test]
    fn tumin_is_reciprocal_of_xke() {
        for g in [WGS72_LEGACY, WGS72, WGS84] {
            assert!((g.tumin * g.xke - 1.0).abs() < 1e-9);
        }
    }
}
