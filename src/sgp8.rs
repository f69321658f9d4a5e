//! SGP8 near-earth model (§4.3, SGP8 variant).
//!
//! SGP8 replaces SGP4's polynomial-in-time drag terms with a closed-form
//! exponential atmospheric density model, integrated analytically rather
//! than expanded as a Taylor series. Its own `isimp`-equivalent branch
//! ("very small drag") is keyed on the secular mean-motion rate rather than
//! perigee height. Sign conventions for the shared orientation-vector
//! assembly follow the classical near-earth kernel in [`crate::near_earth`]
//! (per the resolved open question on SGP8 sign conventions), since the two
//! kernels build the same perifocal basis from (`uk`, `xinck`, `xnodek`).

use super::gravity::GravityConstants;
use super::kepler;

/// Threshold (|tdot| in rad/min, scaled to rad/day) below which SGP8 treats
/// drag as negligible and skips the exponential density branch.
const SMALL_DRAG_THRESHOLD: f64 = 2.16e-3;

/// One-shot initialization constants for SGP8.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sgp8Constants {
    pub aodp: f64,
    pub xnodp: f64,
    pub cosio: f64,
    pub sinio: f64,
    pub theta2: f64,
    pub x3thm1: f64,
    pub x1mth2: f64,
    pub x7thm1: f64,
    pub xmdot: f64,
    pub omgdot: f64,
    pub xnodot: f64,
    pub eta: f64,
    pub edot: f64,
    pub d1: f64,
    pub d2: f64,
    pub d3: f64,
    pub d4: f64,
    pub d5: f64,
    pub c1: f64,
    pub c4: f64,
    pub c5: f64,
    pub xndt: f64,
    pub xndd6o: f64,
    pub very_small_drag: bool,
    pub eo: f64,
    pub omegao: f64,
    pub xmo: f64,
    pub xnodeo: f64,
}

/// Build SGP8's one-shot constants.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn init(
    gc: &GravityConstants,
    eo: f64,
    xincl: f64,
    omegao: f64,
    xnodeo: f64,
    xmo: f64,
    no: f64,
    bstar: f64,
) -> Sgp8Constants {
    let kozai = super::near_earth::recover(gc, eo, xincl, no);
    let theta2 = kozai.theta2;
    let x1mth2 = 1.0 - theta2;
    let x7thm1 = 7.0 * theta2 - 1.0;

    let perige = kozai.aodp * (1.0 - eo) - gc.ae;
    let po = kozai.aodp * (1.0 - eo * eo);
    let po2no = kozai.xnodp / po.powi(2);
    let s4 = if perige < 156.0 / gc.xkmper + gc.ae {
        if perige < 98.0 / gc.xkmper + gc.ae {
            20.0 / gc.xkmper + gc.ae
        } else {
            perige - 78.0 / gc.xkmper
        }
    } else {
        gc.ae + 78.0 / gc.xkmper
    };
    let qo = 120.0 / gc.xkmper + gc.ae;
    let qoms2t = (qo - s4).powi(4);

    let tsi = 1.0 / (kozai.aodp - s4);
    let eta = kozai.aodp * eo * tsi;
    let etasq = eta * eta;
    let eeta = eo * eta;
    let psisq = (1.0 - etasq).abs();
    let coef = qoms2t * tsi.powi(4);
    let coef1 = coef / psisq.powf(3.5);

    let c1 = bstar
        * coef1
        * kozai.xnodp
        * (kozai.aodp * (1.0 + 1.5 * etasq + eeta * (4.0 + etasq))
            + 0.75 * gc.ck2 * tsi / psisq * kozai.x3thm1 * (8.0 + 3.0 * etasq * (8.0 + etasq)));
    let c4 = 2.0
        * kozai.xnodp
        * coef1
        * kozai.aodp
        * (1.0 - eo * eo)
        * (eta * (2.0 + 0.5 * etasq) + eo * (0.5 + 2.0 * etasq));
    let c5 = 2.0 * coef1 * kozai.aodp * (1.0 - eo * eo) * (1.0 + 2.75 * (etasq + eeta) + eeta * etasq);

    let xmdot = kozai.xnodp
        + 0.75 * gc.ck2 * kozai.x3thm1 / (kozai.aodp * kozai.aodp * (1.0 - eo * eo).sqrt() * (1.0 - eo * eo));
    let omgdot = -0.75 * gc.ck2 * (1.0 - 5.0 * theta2) / (kozai.aodp * kozai.aodp * (1.0 - eo * eo));
    let xnodot = -1.5 * gc.ck2 * kozai.cosio / (kozai.aodp * kozai.aodp * (1.0 - eo * eo));

    let edot = -c4 * kozai.xnodp * bstar;
    let xndt = c1 * kozai.xnodp;

    let very_small_drag = (xndt * 1440.0).abs() < SMALL_DRAG_THRESHOLD;

    let (d1, d2, d3, d4, d5, xndd6o) = if very_small_drag {
        (0.0, 0.0, 0.0, 0.0, 0.0, 0.0)
    } else {
        let d1 = po2no * qoms2t.sqrt() * bstar;
        let d2 = 4.0 * d1 * d1;
        let d3 = 170.0 / 3.0 * d1 * d1 * d1;
        let d4 = 5.0 * d1 * d1 * d1 * d1;
        let d5 = d1 * d1 * d1 * d1 * d1;
        let xndd6o = c1 * c1;
        (d1, d2, d3, d4, d5, xndd6o)
    };

    Sgp8Constants {
        aodp: kozai.aodp,
        xnodp: kozai.xnodp,
        cosio: kozai.cosio,
        sinio: kozai.sinio,
        theta2,
        x3thm1: kozai.x3thm1,
        x1mth2,
        x7thm1,
        xmdot,
        omgdot,
        xnodot,
        eta,
        edot,
        d1,
        d2,
        d3,
        d4,
        d5,
        c1,
        c4,
        c5,
        xndt,
        xndd6o,
        very_small_drag,
        eo,
        omegao,
        xmo,
        xnodeo,
    }
}

/// Osculating Cartesian state at `tsince` minutes from epoch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sgp8State {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

/// Propagate SGP8 to `tsince` minutes from epoch.
#[must_use]
pub fn propagate(gc: &GravityConstants, sc: &Sgp8Constants, tsince: f64) -> Sgp8State {
    let z1 = 0.5 * sc.xndt * tsince * tsince;
    let z7 = if sc.very_small_drag {
        0.0
    } else {
        let t3 = tsince.powi(3);
        let t4 = tsince.powi(4);
        3.5 * sc.d1 * t3 / 3.0 + sc.d2 * t4 / 4.0 + sc.d3 * tsince.powi(5) / 5.0
            + sc.d4 * tsince.powi(6) / 6.0
            + sc.d5 * tsince.powi(7) / 7.0
    };

    let a = sc.aodp * (1.0 - sc.c1 * tsince - 0.5 * sc.xndd6o * tsince * tsince).max(1.0e-6);

    let e = (sc.eo + sc.edot * tsince).clamp(0.0, 0.999_999);
    let xmam = sc.xmo + sc.xmdot * tsince + z1 + z7;
    let omega = sc.omegao + sc.omgdot * tsince;
    let xnode = sc.xnodeo + sc.xnodot * tsince;

    let axn = e * omega.cos();
    let ayn = e * omega.sin();
    let capu = super::constants::mod2pi(xmam);
    let sol = kepler::solve_classical(capu, axn, ayn);
    let (sinepw, cosepw) = (sol.sin_e, sol.cos_e);

    let ecose = axn * cosepw + ayn * sinepw;
    let esine = axn * sinepw - ayn * cosepw;
    let elsq = axn * axn + ayn * ayn;
    let pl = a * (1.0 - elsq);
    let r = a * (1.0 - ecose);
    let rdot = gc.xke * a.sqrt() / r * esine;
    let rfdot = gc.xke * pl.sqrt() / r;

    let temp = esine / (1.0 + (1.0 - elsq).sqrt());
    let cosu = a / r * (cosepw - axn + ayn * temp);
    let sinu = a / r * (sinepw - ayn - axn * temp);
    let u = sinu.atan2(cosu);
    let sin2u = 2.0 * sinu * cosu;
    let cos2u = 1.0 - 2.0 * sinu * sinu;

    let temp1 = gc.ck2 / pl;
    let temp2 = temp1 / pl;

    let rk = r * (1.0 - 1.5 * temp2 * (1.0 - sc.eo * sc.eo).sqrt() * sc.x3thm1) + 0.5 * temp1 * sc.x1mth2 * cos2u;
    let uk = u - 0.25 * temp2 * sc.x7thm1 * sin2u;
    let xnodek = xnode + 1.5 * temp2 * sc.cosio * sin2u;
    let xinck = sc.cosio.acos() + 1.5 * temp2 * sc.cosio * sc.sinio * cos2u;

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

    Sgp8State {
        position_km: [rk * ux * scale, rk * uy * scale, rk * uz * scale],
        velocity_km_s: [
            (rdot * ux + rfdot * vx) * vscale,
            (rdot * uy + rfdot * vy) * vscale,
            (rdot * uz + rfdot * vz) * vscale,
        ],
    }
}

/// Propagate the classical SDP8 kernel — SGP8's closed-form drag model
/// extended with the deep-space lunisolar correction (§4.4) — to `tsince`
/// minutes from epoch.
///
/// Builds on [`init`] rather than [`crate::near_earth::init`], per §4.4's
/// requirement that the deep-space extension pair with the matching
/// near-earth initializer; keeps SGP8's own `kepler::solve_classical`
/// contract rather than SGP4-R's.
#[must_use]
pub fn propagate_deep(gc: &GravityConstants, sc: &Sgp8Constants, dsc: &super::deep_space::DeepSpaceConstants, tsince: f64) -> Sgp8State {
    let z1 = 0.5 * sc.xndt * tsince * tsince;
    let z7 = if sc.very_small_drag {
        0.0
    } else {
        let t3 = tsince.powi(3);
        let t4 = tsince.powi(4);
        3.5 * sc.d1 * t3 / 3.0 + sc.d2 * t4 / 4.0 + sc.d3 * tsince.powi(5) / 5.0
            + sc.d4 * tsince.powi(6) / 6.0
            + sc.d5 * tsince.powi(7) / 7.0
    };

    let tempa = (1.0 - sc.c1 * tsince - 0.5 * sc.xndd6o * tsince * tsince).max(1.0e-6);
    let e_drag = (sc.eo + sc.edot * tsince).clamp(0.0, 0.999_999);
    let xmam0 = sc.xmo + sc.xmdot * tsince + z1 + z7;
    let omega0 = sc.omegao + sc.omgdot * tsince;
    let xnode0 = sc.xnodeo + sc.xnodot * tsince;
    let xincl0 = sc.cosio.acos();

    let (em, xincl, omega, xnode, xmam, xn) =
        super::deep_space::perturb(dsc, xincl0, tsince, sc.xnodp, e_drag, xincl0, omega0, xnode0, xmam0);

    let a = (gc.xke / xn).powf(2.0 / 3.0) * tempa;
    let e = em;

    let cosio = xincl.cos();
    let sinio = xincl.sin();
    let theta2 = cosio * cosio;
    let x3thm1 = 3.0 * theta2 - 1.0;
    let x1mth2 = 1.0 - theta2;
    let x7thm1 = 7.0 * theta2 - 1.0;

    let axn = e * omega.cos();
    let ayn = e * omega.sin();
    let capu = super::constants::mod2pi(xmam);
    let sol = kepler::solve_classical(capu, axn, ayn);
    let (sinepw, cosepw) = (sol.sin_e, sol.cos_e);

    let ecose = axn * cosepw + ayn * sinepw;
    let esine = axn * sinepw - ayn * cosepw;
    let elsq = axn * axn + ayn * ayn;
    let pl = a * (1.0 - elsq);
    let r = a * (1.0 - ecose);
    let rdot = gc.xke * a.sqrt() / r * esine;
    let rfdot = gc.xke * pl.sqrt() / r;

    let temp = esine / (1.0 + (1.0 - elsq).sqrt());
    let cosu = a / r * (cosepw - axn + ayn * temp);
    let sinu = a / r * (sinepw - ayn - axn * temp);
    let u = sinu.atan2(cosu);
    let sin2u = 2.0 * sinu * cosu;
    let cos2u = 1.0 - 2.0 * sinu * sinu;

    let temp1 = gc.ck2 / pl;
    let temp2 = temp1 / pl;

    let beta = (1.0 - e * e).sqrt();
    let rk = r * (1.0 - 1.5 * temp2 * beta * x3thm1) + 0.5 * temp1 * x1mth2 * cos2u;
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

    Sgp8State {
        position_km: [rk * ux * scale, rk * uy * scale, rk * uz * scale],
        velocity_km_s: [
            (rdot * ux + rfdot * vx) * vscale,
            (rdot * uy + rfdot * vy) * vscale,
            (rdot * uz + rfdot * vz) * vscale,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gravity::WGS72_LEGACY;

    fn leo_params() -> (f64, f64, f64, f64, f64, f64, f64) {
        let eo = 0.000_6;
        let xincl = 51.6_f64.to_radians();
        let omegao = 0.8;
        let xnodeo = 1.2;
        let xmo = 0.1;
        let no = 15.5 * 2.0 * std::f64::consts::PI / 1440.0;
        let bstar = 0.000_02;
        (eo, xincl, omegao, xnodeo, xmo, no, bstar)
    }

    #[test]
    fn very_small_drag_flag_set_for_low_bstar() {
        let (eo, xincl, omegao, xnodeo, xmo, no, _) = leo_params();
        let sc = init(&WGS72_LEGACY, eo, xincl, omegao, xnodeo, xmo, no, 0.0);
        assert!(sc.very_small_drag);
    }

    #[test]
    fn propagate_returns_finite_state() {
        let (eo, xincl, omegao, xnodeo, xmo, no, bstar) = leo_params();
        let sc = init(&WGS72_LEGACY, eo, xincl, omegao, xnodeo, xmo, no, bstar);
        let state = propagate(&WGS72_LEGACY, &sc, 45.0);
        let r = (state.position_km[0].powi(2) + state.position_km[1].powi(2) + state.position_km[2].powi(2)).sqrt();
        assert!(r.is_finite() && r > 6000.0 && r < 8000.0);
    }

    #[test]
    fn propagate_deep_returns_finite_state_for_molniya_like_orbit() {
        use crate::deep_space::{self, DeepSpaceInit};

        let eo = 0.7;
        let xincl = 1.1;
        let omegao = 0.3;
        let xnodeo = 0.5;
        let xmo = 0.2;
        let no = 2.0 * 2.0 * std::f64::consts::PI / 1440.0;
        let bstar = 0.0;
        let sc = init(&WGS72_LEGACY, eo, xincl, omegao, xnodeo, xmo, no, bstar);

        let ds_init = DeepSpaceInit {
            gc: &WGS72_LEGACY,
            epoch_ds50: 25938.538,
            eo,
            xincl,
            omegao,
            xnodeo,
            xmo,
            xnodp: sc.xnodp,
        };
        let mut dsc = deep_space::dscom(&ds_init);
        deep_space::dsinit(&mut dsc, &ds_init, sc.xnodot + sc.omgdot);

        let state = propagate_deep(&WGS72_LEGACY, &sc, &dsc, 120.0);
        let r = (state.position_km[0].powi(2) + state.position_km[1].powi(2) + state.position_km[2].powi(2)).sqrt();
        assert!(r.is_finite() && r > 6000.0);
    }
}
