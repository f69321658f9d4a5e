//! SGP4-R: "Revisiting Spacetrack Report #3" unified near-earth/deep-space
//! entry point (§4.6).
//!
//! Unlike the classical kernels, SGP4-R runs a single code path for both
//! regimes (switching internally on the deep-space flag) and reports
//! failures as a typed [`Sgp4RError`] attached to the record rather than
//! aborting, matching the reference revision's `model_error` field. Its
//! Kepler solve uses the tighter clamp/tolerance contract documented on
//! [`crate::kepler::solve_sgp4r`].

use super::deep_space::{self, DeepSpaceConstants, DeepSpaceInit};
use super::errors::{Sgp4RError, Sgp4RResult};
use super::gravity::GravityConstants;
use super::kepler;
use super::near_earth::{self, NearEarthConstants};

/// One-shot initialization constants for SGP4-R, wrapping the near-earth
/// kernel plus (when the element is deep-space) the lunisolar extension.
#[derive(Clone)]
pub struct Sgp4RConstants {
    pub near_earth: NearEarthConstants,
    pub deep_space: Option<DeepSpaceConstants>,
}

/// Build SGP4-R's one-shot constants, validating the mean elements per §4.6.
#[allow(clippy::too_many_arguments)]
pub fn init(
    gc: &GravityConstants,
    epoch_ds50: f64,
    eo: f64,
    xincl: f64,
    omegao: f64,
    xnodeo: f64,
    xmo: f64,
    no: f64,
    bstar: f64,
) -> Sgp4RResult<Sgp4RConstants> {
    if !(0.0..1.0).contains(&eo) {
        return Err(Sgp4RError::MeanEccenOutOfRange);
    }
    if no <= 0.0 {
        return Err(Sgp4RError::MeanMotionNegative);
    }

    let near_earth = near_earth::init(gc, eo, xincl, omegao, xnodeo, xmo, no, bstar);
    if near_earth.kozai.aodp < 0.95 {
        return Err(Sgp4RError::MeanEccenOutOfRange);
    }

    let is_deep = near_earth::is_deep_space(near_earth.kozai.xnodp);
    let deep_space = if is_deep {
        let ds_init = DeepSpaceInit {
            gc,
            epoch_ds50,
            eo,
            xincl,
            omegao,
            xnodeo,
            xmo,
            xnodp: near_earth.kozai.xnodp,
        };
        let mut dsc = deep_space::dscom(&ds_init);
        deep_space::dsinit(&mut dsc, &ds_init, near_earth.xnodot + near_earth.omgdot);
        Some(dsc)
    } else {
        None
    };

    Ok(Sgp4RConstants { near_earth, deep_space })
}

/// Osculating Cartesian state at `tsince` minutes from epoch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sgp4RState {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

/// Propagate SGP4-R to `tsince` minutes from epoch.
pub fn propagate(gc: &GravityConstants, sc: &Sgp4RConstants, tsince: f64) -> Sgp4RResult<Sgp4RState> {
    let nec = &sc.near_earth;
    let kozai = nec.kozai;

    let xmdf = nec.xmo + nec.xmdot * tsince;
    let mut omega = nec.omegao + nec.omgdot * tsince;
    let mut xnode = nec.xnodeo + nec.xnodot * tsince;
    let mut em = nec.eo;
    let mut xincl = kozai.cosio.acos();
    let mut xmp = xmdf;
    let mut xn = kozai.xnodp;

    if let Some(dsc) = &sc.deep_space {
        let (e2, i2, o2, n2, m2, xn2) =
            deep_space::perturb(dsc, kozai.cosio.acos(), tsince, kozai.xnodp, em, xincl, omega, xnode, xmp);
        em = e2;
        xincl = i2;
        omega = o2;
        xnode = n2;
        xmp = m2;
        xn = xn2;
    }

    if !(0.0..1.0).contains(&em) {
        return Err(Sgp4RError::InstantaneousEccenOutOfRange);
    }

    let a = (gc.xke / xn).powf(2.0 / 3.0);
    let tempa = 1.0 - nec.c1 * tsince;
    let a = a * tempa * tempa;
    let e = em - nec.bstar * nec.c4 * tsince;
    if !(0.0..1.0).contains(&e) {
        return Err(Sgp4RError::InstantaneousEccenOutOfRange);
    }

    let cosio = xincl.cos();
    let sinio = xincl.sin();
    let axn = e * omega.cos();
    let ayn = e * omega.sin();
    let xl = xmp + omega + xnode;
    let capu = super::constants::mod2pi(xl - xnode);

    let sol = kepler::solve_sgp4r(capu, axn, ayn);
    let (sinepw, cosepw) = (sol.sin_e, sol.cos_e);

    let ecose = axn * cosepw + ayn * sinepw;
    let esine = axn * sinepw - ayn * cosepw;
    let elsq = axn * axn + ayn * ayn;
    if elsq >= 1.0 {
        return Err(Sgp4RError::InstantaneousEccenOutOfRange);
    }

    let pl = a * (1.0 - elsq);
    if pl < 0.0 {
        return Err(Sgp4RError::NegativeSemiLatusRectum);
    }

    let r = a * (1.0 - ecose);
    if r * gc.xkmper / gc.ae < gc.xkmper {
        return Err(Sgp4RError::Decayed);
    }

    let rdot = gc.xke * a.sqrt() / r * esine;
    let rfdot = gc.xke * pl.sqrt() / r;
    let temp = esine / (1.0 + (1.0 - elsq).sqrt());
    let cosu = a / r * (cosepw - axn + ayn * temp);
    let sinu = a / r * (sinepw - ayn - axn * temp);
    let u = sinu.atan2(cosu);
    let sin2u = 2.0 * sinu * cosu;
    let cos2u = 1.0 - 2.0 * sinu * sinu;

    let x3thm1 = 3.0 * cosio * cosio - 1.0;
    let x1mth2 = 1.0 - cosio * cosio;
    let x7thm1 = 7.0 * cosio * cosio - 1.0;

    let temp1 = gc.ck2 / pl;
    let temp2 = temp1 / pl;

    let rk = r * (1.0 - 1.5 * temp2 * (1.0 - em * em).sqrt() * x3thm1) + 0.5 * temp1 * x1mth2 * cos2u;
    if rk * gc.xkmper / gc.ae < gc.xkmper {
        return Err(Sgp4RError::SubOrbital);
    }

    let uk = u - 0.25 * temp2 * x7thm1 * sin2u;
    let xnodek = xnode + 1.5 * temp2 * cosio * sin2u;
    let xinck = xincl + 1.5 * temp2 * cosio * sinio * cos2u;

    let sinuk = uk.sin();
    let cosuk = uk.cos();
    let sinik = xinck.sin();
    let cosik = xinck.cos();
    let sinnok = xnodek.sin();
    let cosnok = xnodek.cos();

    let xmx = -sinnok * cosik;
    let xmy = cosnok * cosik;
    let ux = xmx * sinuk + cosnok * cosuk;
    let uy = xmy * sinuk + sinnok * cosuk;
    let uz = sinik * sinuk;
    let vx = xmx * cosuk - cosnok * sinuk;
    let vy = xmy * cosuk - sinnok * sinuk;
    let vz = sinik * cosuk;

    let scale = gc.xkmper / gc.ae;
    let vscale = scale / 60.0;

    Ok(Sgp4RState {
        position_km: [rk * ux * scale, rk * uy * scale, rk * uz * scale],
        velocity_km_s: [
            (rdot * ux + rfdot * vx) * vscale,
            (rdot * uy + rfdot * vy) * vscale,
            (rdot * uz + rfdot * vz) * vscale,
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gravity::WGS72_LEGACY;

    #[test]
    fn rejects_negative_mean_motion() {
        let result = init(&WGS72_LEGACY, 25938.5, 0.01, 1.0, 0.5, 0.3, 0.2, -0.001, 0.0001);
        assert_eq!(result.unwrap_err(), Sgp4RError::MeanMotionNegative);
    }

    #[test]
    fn rejects_eccentricity_outside_unit_range() {
        let no = 15.0 * 2.0 * std::f64::consts::PI / 1440.0;
        let result = init(&WGS72_LEGACY, 25938.5, 1.2, 1.0, 0.5, 0.3, 0.2, no, 0.0001);
        assert_eq!(result.unwrap_err(), Sgp4RError::MeanEccenOutOfRange);
    }

    #[test]
    fn leo_element_initializes_and_propagates_without_deep_space() {
        let no = 15.5 * 2.0 * std::f64::consts::PI / 1440.0;
        let sc = init(&WGS72_LEGACY, 25938.5, 0.0006, 51.6_f64.to_radians(), 0.8, 1.2, 0.1, no, 0.00002).unwrap();
        assert!(sc.deep_space.is_none());
        let state = propagate(&WGS72_LEGACY, &sc, 30.0).unwrap();
        let r = (state.position_km[0].powi(2) + state.position_km[1].powi(2) + state.position_km[2].powi(2)).sqrt();
        assert!(r > 6000.0 && r < 8000.0);
    }

    #[test]
    fn molniya_like_element_selects_deep_space() {
        let no = 2.0 * 2.0 * std::f64::consts::PI / 1440.0;
        let sc = init(&WGS72_LEGACY, 25938.5, 0.7, 1.1, 0.3, 0.5, 0.2, no, 0.0).unwrap();
        assert!(sc.deep_space.is_some());
    }
}
