//! Model dispatcher (§4.5): routes an element record to the correct kernel
//! based on its requested family and deep-space regime.

use std::fmt;

use super::errors::{PropagatorError, PropagatorResult};

/// The closed set of selectable propagator variants (§3 "Configuration").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelChoice {
    /// Original simple near-earth model; rejects deep-space input.
    Sgp,
    /// SGP4, auto-selects SDP4 for deep-space input (`model`/`model4`).
    Sgp4,
    /// SGP8, auto-selects SDP8 for deep-space input (`model8`).
    Sgp8,
    /// Deep-space extension of SGP4; rejects near-earth input.
    Sdp4,
    /// Deep-space extension of SGP8; rejects near-earth input.
    Sdp8,
    /// The unified SGP4-R near-earth/deep-space entry point.
    Sgp4R,
}

impl ModelChoice {
    /// Parse the model name used by `set model`. `model`/`model4` are
    /// synonyms that auto-select SGP4 or SDP4 by regime at call time;
    /// `model8` auto-selects SGP8 or SDP8.
    pub fn parse(name: &str) -> PropagatorResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sgp" => Ok(Self::Sgp),
            "sgp4" | "model" | "model4" => Ok(Self::Sgp4),
            "sgp8" | "model8" => Ok(Self::Sgp8),
            "sdp4" => Ok(Self::Sdp4),
            "sdp8" => Ok(Self::Sdp8),
            "sgp4-r" | "sgp4r" => Ok(Self::Sgp4R),
            other => Err(PropagatorError::Configuration { name: other.to_string() }),
        }
    }

    /// Canonical lowercase name, used in `RegimeMismatch` error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sgp => "sgp",
            Self::Sgp4 => "sgp4",
            Self::Sgp8 => "sgp8",
            Self::Sdp4 => "sdp4",
            Self::Sdp8 => "sdp8",
            Self::Sgp4R => "sgp4-r",
        }
    }

    /// Resolve `Sgp4`/`Sgp8` to their deep-space counterpart given whether
    /// the element is in the deep-space regime; other variants pass through
    /// unchanged (the caller is responsible for rejecting a genuine mismatch
    /// via [`PropagatorError::RegimeMismatch`]).
    #[must_use]
    pub fn resolve(self, is_deep: bool) -> Self {
        match (self, is_deep) {
            (Self::Sgp4, true) => Self::Sdp4,
            (Self::Sgp8, true) => Self::Sdp8,
            (other, _) => other,
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_and_model4_are_synonyms_for_sgp4() {
        assert_eq!(ModelChoice::parse("model").unwrap(), ModelChoice::Sgp4);
        assert_eq!(ModelChoice::parse("model4").unwrap(), ModelChoice::Sgp4);
    }

    #[test]
    fn model8_resolves_to_sdp8_for_deep_space() {
        assert_eq!(ModelChoice::parse("model8").unwrap().resolve(true), ModelChoice::Sdp8);
        assert_eq!(ModelChoice::parse("model8").unwrap().resolve(false), ModelChoice::Sgp8);
    }

    #[test]
    fn unknown_model_name_is_rejected() {
        assert!(ModelChoice::parse("nonsense").is_err());
    }

    #[test]
    fn sgp_and_sdp_variants_pass_through_resolve_unchanged() {
        assert_eq!(ModelChoice::parse("sgp").unwrap().resolve(true), ModelChoice::Sgp);
        assert_eq!(ModelChoice::parse("sdp4").unwrap().resolve(false), ModelChoice::Sdp4);
    }
}
