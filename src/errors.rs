//! Error types for TLE parsing and propagation.

use std::fmt;

/// Errors that can occur while parsing or propagating classical SGP/SGP4/SGP8/SDP4/SDP8 elements.
#[derive(Debug, Clone, PartialEq)]
pub enum PropagatorError {
    /// Malformed TLE text: a missing/malformed line marker, mismatched catalog
    /// IDs between line 1 and line 2, the unsupported "G" internal format, or
    /// a field that fails to decode as its expected numeric type.
    ParseError {
        /// Human-readable description of what failed to parse.
        reason: String,
    },

    /// A near-earth model (SGP/SGP4/SGP8) was called on a deep-space record, or
    /// a deep-space model (SDP4/SDP8) was called on a near-earth record.
    RegimeMismatch {
        /// Name of the model that was called.
        model: &'static str,
        /// Whether the record is actually deep-space.
        is_deep: bool,
    },

    /// Eccentricity outside `[0, 1)`, or (for SGP4-R) non-positive mean motion.
    InvalidElement {
        /// Human-readable description of the violated constraint.
        reason: String,
    },

    /// `set model` was given a name that is not one of the closed variant set.
    Configuration {
        /// The unrecognized model name.
        name: String,
    },
}

impl fmt::Display for PropagatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseError { reason } => write!(f, "TLE parse error: {reason}"),
            Self::RegimeMismatch { model, is_deep } => {
                let regime = if *is_deep { "deep-space" } else { "near-earth" };
                write!(f, "{model} is not valid for a {regime} element")
            }
            Self::InvalidElement { reason } => write!(f, "invalid orbital element: {reason}"),
            Self::Configuration { name } => write!(f, "unknown model '{name}'"),
        }
    }
}

impl std::error::Error for PropagatorError {}

/// Result type for classical-propagator operations.
pub type PropagatorResult<T> = Result<T, PropagatorError>;

/// The typed error set surfaced by the SGP4-R reference revision (§4.7 of the design doc).
///
/// Unlike [`PropagatorError`], these carry the numeric code used by the
/// canonical reference implementation alongside a message, since SGP4-R
/// attaches both to the record as `model_error` rather than aborting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sgp4RError {
    /// Recovered semimajor axis `a < 0.95` Earth radii, or mean eccentricity
    /// outside `[0, 1)`.
    MeanEccenOutOfRange,
    /// Recovered mean motion is negative.
    MeanMotionNegative,
    /// Instantaneous eccentricity at the requested time makes the orbit
    /// hyperbolic (`elsq >= 1`); also covers Kepler-solve non-convergence
    /// folded into this case.
    InstantaneousEccenOutOfRange,
    /// The semi-latus rectum `p = a*(1-e^2)` went negative.
    NegativeSemiLatusRectum,
    /// Perigee height dropped below the surface of the Earth model.
    SubOrbital,
    /// Mean motion implies the satellite has decayed (orbital radius below
    /// Earth's surface).
    Decayed,
}

impl Sgp4RError {
    /// The numeric code used by the canonical reference implementation.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::MeanEccenOutOfRange => 1,
            Self::MeanMotionNegative => 2,
            Self::InstantaneousEccenOutOfRange => 3,
            Self::NegativeSemiLatusRectum => 4,
            Self::SubOrbital => 5,
            Self::Decayed => 6,
        }
    }

    /// The documented message string for this error code.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MeanEccenOutOfRange => "mean eccentricity not in range 0 <= e < 1",
            Self::MeanMotionNegative => "mean motion less than zero",
            Self::InstantaneousEccenOutOfRange => "pert elements, ecc < 0 or ecc > 1",
            Self::NegativeSemiLatusRectum => "semi-latus rectum < 0",
            Self::SubOrbital => "epoch elements are sub-orbital",
            Self::Decayed => "satellite has decayed",
        }
    }
}

impl fmt::Display for Sgp4RError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for Sgp4RError {}

/// Result type for SGP4-R operations.
pub type Sgp4RResult<T> = Result<T, Sgp4RError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sgp4r_error_codes_match_reference_numbering() {
        assert_eq!(Sgp4RError::MeanEccenOutOfRange.code(), 1);
        assert_eq!(Sgp4RError::InstantaneousEccenOutOfRange.code(), 3);
        assert_eq!(Sgp4RError::Decayed.code(), 6);
    }

    #[test]
    fn regime_mismatch_message_mentions_regime() {
        let err = PropagatorError::RegimeMismatch {
            model: "sgp4",
            is_deep: true,
        };
        assert!(err.to_string().contains("deep-space"));
    }
}
