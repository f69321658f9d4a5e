//! The element record: a parsed mean-element set plus model/gravity
//! configuration and the lazily-computed, setter-invalidated state each
//! propagator model needs (§3).

use tracing::debug;

use super::cached::InitCache;
use super::deep_space::{self, DeepSpaceConstants, DeepSpaceInit};
use super::errors::{PropagatorError, PropagatorResult, Sgp4RError};
use super::gravity::{GravityConstants, GravityModel};
use super::model::ModelChoice;
use super::near_earth::{self, KozaiRecovery};
use super::sgp;
use super::sgp4r;
use super::sgp8;
use super::tle::MeanElements;

/// A mean-element record bound to a propagator model and gravity constant
/// set, with lazily-computed derived state.
///
/// Mutating any mean element or the configuration via the `set_*` methods
/// invalidates every per-model cache (§6 "setters invalidate caches");
/// nothing is recomputed until the next propagation call asks for it.
#[derive(Clone)]
pub struct Element {
    mean: MeanElements,
    model: ModelChoice,
    gravity: GravityModel,

    kozai_cache: InitCache<KozaiRecovery>,
    sgp_cache: InitCache<sgp::SgpConstants>,
    near_earth_cache: InitCache<near_earth::NearEarthConstants>,
    sgp8_cache: InitCache<sgp8::Sgp8Constants>,
    sgp4r_cache: InitCache<Result<sgp4r::Sgp4RConstants, Sgp4RError>>,
    /// Shared by the classical SDP4 and SDP8 paths, since `dscom`/`dsinit`
    /// depend only on the mean elements and Kozai-recovered mean motion, not
    /// on which near-earth drag model (SGP4 vs SGP8) is paired with it.
    deep_space_cache: InitCache<DeepSpaceConstants>,
}

impl Element {
    /// Wrap a parsed mean-element record, defaulting to the SGP4 model and
    /// the legacy WGS-72 gravity constants (the historical SGP4 default).
    #[must_use]
    pub fn new(mean: MeanElements) -> Self {
        Self {
            mean,
            model: ModelChoice::Sgp4,
            gravity: GravityModel::default(),
            kozai_cache: InitCache::new(),
            sgp_cache: InitCache::new(),
            near_earth_cache: InitCache::new(),
            sgp8_cache: InitCache::new(),
            sgp4r_cache: InitCache::new(),
            deep_space_cache: InitCache::new(),
        }
    }

    /// The underlying parsed mean elements, read-only.
    #[must_use]
    pub const fn tle(&self) -> &MeanElements {
        &self.mean
    }

    /// Days since 1950 January 0, 0h UT, read-only (derived from the epoch).
    #[must_use]
    pub const fn ds50(&self) -> f64 {
        self.mean.ds50
    }

    /// Currently selected model.
    #[must_use]
    pub const fn model(&self) -> ModelChoice {
        self.model
    }

    /// Select a new propagator model; invalidates every cache since model
    /// choice changes which initialization path runs.
    pub fn set_model(&mut self, name: &str) -> PropagatorResult<()> {
        self.model = ModelChoice::parse(name)?;
        self.invalidate();
        Ok(())
    }

    /// Select a new gravity constant set; invalidates every cache, since
    /// every kernel's one-shot constants depend on `ck2`/`xke`/etc.
    pub fn set_gravity_model(&mut self, gravity: GravityModel) {
        self.gravity = gravity;
        self.invalidate();
    }

    fn gc(&self) -> GravityConstants {
        self.gravity.constants()
    }

    /// Orbital period implied by the Kozai-recovered mean motion, in
    /// seconds (§4.2).
    pub fn period_seconds(&mut self) -> f64 {
        let kozai = self.kozai();
        near_earth::period_seconds(kozai.xnodp)
    }

    /// Whether the record falls in the deep-space regime: period at or
    /// above 225 minutes (§3).
    pub fn is_deep(&mut self) -> bool {
        let kozai = self.kozai();
        near_earth::is_deep_space(kozai.xnodp)
    }

    fn kozai(&mut self) -> KozaiRecovery {
        let gc = self.gc();
        let mean = &self.mean;
        self.kozai_cache.get_or_init(|| near_earth::recover(&gc, mean.eccentricity, mean.inclination, mean.mean_motion))
    }

    /// Propagate to `tsince` minutes from epoch and return an ECI position
    /// (km) and velocity (km/s), dispatching to the model-appropriate
    /// kernel. Returns [`PropagatorError::RegimeMismatch`] if a near-earth
    /// model is asked to propagate a deep-space record or vice versa.
    pub fn propagate(&mut self, tsince: f64) -> PropagatorResult<([f64; 3], [f64; 3])> {
        let is_deep = self.is_deep();
        let resolved = self.model.resolve(is_deep);

        let span = tracing::debug_span!("element.propagate", model = resolved.name(), tsince);
        let _enter = span.enter();

        match resolved {
            ModelChoice::Sgp => {
                if is_deep {
                    return Err(PropagatorError::RegimeMismatch { model: "sgp", is_deep });
                }
                let gc = self.gc();
                let mean = self.mean.clone();
                let sc = self.sgp_cache.get_or_init(|| {
                    debug!("initializing sgp kernel");
                    sgp::init(&gc, mean.eccentricity, mean.inclination, mean.arg_perigee, mean.raan, mean.mean_anomaly, mean.mean_motion, mean.bstar)
                });
                let state = sgp::propagate(&gc, &sc, tsince);
                Ok((state.position_km, state.velocity_km_s))
            }
            ModelChoice::Sgp4 => {
                if is_deep {
                    return Err(PropagatorError::RegimeMismatch { model: "sgp4", is_deep });
                }
                let gc = self.gc();
                let mean = self.mean.clone();
                let nec = self.near_earth_cache.get_or_init(|| {
                    debug!("initializing sgp4 kernel");
                    near_earth::init(&gc, mean.eccentricity, mean.inclination, mean.arg_perigee, mean.raan, mean.mean_anomaly, mean.mean_motion, mean.bstar)
                });
                let state = near_earth::propagate(&gc, &nec, tsince);
                Ok((state.position_km, state.velocity_km_s))
            }
            ModelChoice::Sgp8 => {
                if is_deep {
                    return Err(PropagatorError::RegimeMismatch { model: "sgp8", is_deep });
                }
                let gc = self.gc();
                let mean = self.mean.clone();
                let sc = self.sgp8_cache.get_or_init(|| {
                    debug!("initializing sgp8 kernel");
                    sgp8::init(&gc, mean.eccentricity, mean.inclination, mean.arg_perigee, mean.raan, mean.mean_anomaly, mean.mean_motion, mean.bstar)
                });
                let state = sgp8::propagate(&gc, &sc, tsince);
                Ok((state.position_km, state.velocity_km_s))
            }
            ModelChoice::Sdp4 => {
                if !is_deep {
                    return Err(PropagatorError::RegimeMismatch { model: "sdp4", is_deep });
                }
                let gc = self.gc();
                let mean = self.mean.clone();
                let nec = self.near_earth_cache.get_or_init(|| {
                    debug!("initializing sdp4 near-earth kernel");
                    near_earth::init(&gc, mean.eccentricity, mean.inclination, mean.arg_perigee, mean.raan, mean.mean_anomaly, mean.mean_motion, mean.bstar)
                });
                let xpidot = nec.xnodot + nec.omgdot;
                let dsc = self.deep_space_init(nec.kozai.xnodp, xpidot);
                let state = near_earth::propagate_deep(&gc, &nec, &dsc, tsince);
                Ok((state.position_km, state.velocity_km_s))
            }
            ModelChoice::Sdp8 => {
                if !is_deep {
                    return Err(PropagatorError::RegimeMismatch { model: "sdp8", is_deep });
                }
                let gc = self.gc();
                let mean = self.mean.clone();
                let sc8 = self.sgp8_cache.get_or_init(|| {
                    debug!("initializing sdp8 sgp8 kernel");
                    sgp8::init(&gc, mean.eccentricity, mean.inclination, mean.arg_perigee, mean.raan, mean.mean_anomaly, mean.mean_motion, mean.bstar)
                });
                let xpidot = sc8.xnodot + sc8.omgdot;
                let dsc = self.deep_space_init(sc8.xnodp, xpidot);
                let state = sgp8::propagate_deep(&gc, &sc8, &dsc, tsince);
                Ok((state.position_km, state.velocity_km_s))
            }
            ModelChoice::Sgp4R => self.propagate_sgp4r(tsince),
        }
    }

    /// Build (or return the cached) deep-space lunisolar extension shared by
    /// the classical SDP4/SDP8 paths (§4.4). `xnodp` is the Kozai-recovered
    /// mean motion from whichever near-earth kernel (SGP4 or SGP8) the
    /// caller is pairing this with; `xpidot` is that kernel's `xnodot +
    /// omgdot`.
    fn deep_space_init(&mut self, xnodp: f64, xpidot: f64) -> DeepSpaceConstants {
        let gc = self.gc();
        let mean = self.mean.clone();
        self.deep_space_cache.get_or_init(|| {
            debug!("initializing deep-space lunisolar extension");
            let ds_init = DeepSpaceInit {
                gc: &gc,
                epoch_ds50: mean.ds50,
                eo: mean.eccentricity,
                xincl: mean.inclination,
                omegao: mean.arg_perigee,
                xnodeo: mean.raan,
                xmo: mean.mean_anomaly,
                xnodp,
            };
            let mut dsc = deep_space::dscom(&ds_init);
            deep_space::dsinit(&mut dsc, &ds_init, xpidot);
            dsc
        })
    }

    fn propagate_sgp4r(&mut self, tsince: f64) -> PropagatorResult<([f64; 3], [f64; 3])> {
        let gc = self.gc();
        let mean = self.mean.clone();
        let ds50 = mean.ds50;
        let init_result = self.sgp4r_cache.get_or_init(|| {
            debug!("initializing sgp4-r kernel");
            sgp4r::init(&gc, ds50, mean.eccentricity, mean.inclination, mean.arg_perigee, mean.raan, mean.mean_anomaly, mean.mean_motion, mean.bstar)
        });
        let sc = init_result.map_err(|e| PropagatorError::InvalidElement { reason: e.to_string() })?;
        let state = sgp4r::propagate(&gc, &sc, tsince)
            .map_err(|e| PropagatorError::InvalidElement { reason: e.to_string() })?;
        Ok((state.position_km, state.velocity_km_s))
    }

    fn invalidate(&self) {
        self.kozai_cache.invalidate();
        self.sgp_cache.invalidate();
        self.near_earth_cache.invalidate();
        self.sgp8_cache.invalidate();
        self.sgp4r_cache.invalidate();
        self.deep_space_cache.invalidate();
    }

    /// Set the first derivative of mean motion (rad/min²); invalidates caches.
    pub fn set_first_derivative(&mut self, value: f64) {
        self.mean.first_derivative = value;
        self.invalidate();
    }

    /// Set the B* drag term; invalidates caches.
    pub fn set_bstar(&mut self, value: f64) {
        self.mean.bstar = value;
        self.invalidate();
    }

    /// Set inclination (radians); invalidates caches.
    pub fn set_inclination(&mut self, value: f64) {
        self.mean.inclination = value;
        self.invalidate();
    }

    /// Set right ascension of ascending node (radians); invalidates caches.
    pub fn set_raan(&mut self, value: f64) {
        self.mean.raan = value;
        self.invalidate();
    }

    /// Set eccentricity; invalidates caches.
    pub fn set_eccentricity(&mut self, value: f64) {
        self.mean.eccentricity = value;
        self.invalidate();
    }

    /// Set argument of perigee (radians); invalidates caches.
    pub fn set_arg_perigee(&mut self, value: f64) {
        self.mean.arg_perigee = value;
        self.invalidate();
    }

    /// Set mean anomaly (radians); invalidates caches.
    pub fn set_mean_anomaly(&mut self, value: f64) {
        self.mean.mean_anomaly = value;
        self.invalidate();
    }

    /// Set mean motion (rad/min); invalidates caches.
    pub fn set_mean_motion(&mut self, value: f64) {
        self.mean.mean_motion = value;
        self.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        let text = "1 25544U 98067A   20206.51782528  .00000836  00000-0  22359-4 0  9990\n2 25544  51.6442 208.9163 0001591  96.9066  36.0559 15.49285935238291";
        let mean = crate::tle::parse(text).unwrap().remove(0);
        Element::new(mean)
    }

    fn molniya_sample() -> Element {
        let text = "1 13631U 82100A   20206.51782528  .00000023  00000-0  12221-3 0  9992\n2 13631  64.3182 293.5302 7258492 281.9633  12.4902  2.00615071274536";
        let mean = crate::tle::parse(text).unwrap().remove(0);
        Element::new(mean)
    }

    #[test]
    fn default_model_is_sgp4() {
        let el = sample();
        assert_eq!(el.model(), ModelChoice::Sgp4);
    }

    #[test]
    fn iss_like_element_is_not_deep_space() {
        let mut el = sample();
        assert!(!el.is_deep());
    }

    #[test]
    fn propagate_returns_position_near_earth_radius() {
        let mut el = sample();
        let (pos, _vel) = el.propagate(0.0).unwrap();
        let r = (pos[0] * pos[0] + pos[1] * pos[1] + pos[2] * pos[2]).sqrt();
        assert!(r > 6000.0 && r < 8000.0);
    }

    #[test]
    fn setter_invalidates_cache() {
        let mut el = sample();
        let _ = el.propagate(0.0).unwrap();
        assert!(el.near_earth_cache.is_populated());
        el.set_bstar(0.001);
        assert!(!el.near_earth_cache.is_populated());
    }

    #[test]
    fn unknown_model_name_is_rejected() {
        let mut el = sample();
        assert!(el.set_model("not-a-model").is_err());
    }

    #[test]
    fn sgp_model_rejects_deep_space_record() {
        let mut el = sample();
        el.set_model("sgp").unwrap();
        el.set_mean_motion(2.0 * 2.0 * std::f64::consts::PI / 1440.0);
        let err = el.propagate(0.0).unwrap_err();
        assert!(matches!(err, PropagatorError::RegimeMismatch { is_deep: true, .. }));
    }

    #[test]
    fn sgp4_auto_resolves_to_sdp4_for_deep_space_record_and_populates_its_own_caches() {
        let mut el = molniya_sample();
        assert!(el.is_deep());
        let (pos, _vel) = el.propagate(30.0).unwrap();
        let r = (pos[0] * pos[0] + pos[1] * pos[1] + pos[2] * pos[2]).sqrt();
        assert!(r.is_finite() && r > 6000.0);
        assert!(el.near_earth_cache.is_populated());
        assert!(el.deep_space_cache.is_populated());
        assert!(!el.sgp4r_cache.is_populated());
    }

    #[test]
    fn sgp8_auto_resolves_to_sdp8_for_deep_space_record() {
        let mut el = molniya_sample();
        el.set_model("sgp8").unwrap();
        let (pos, _vel) = el.propagate(30.0).unwrap();
        let r = (pos[0] * pos[0] + pos[1] * pos[1] + pos[2] * pos[2]).sqrt();
        assert!(r.is_finite() && r > 6000.0);
        assert!(el.sgp8_cache.is_populated());
        assert!(el.deep_space_cache.is_populated());
    }
}
