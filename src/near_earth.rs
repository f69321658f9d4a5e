//! Classical near-earth SGP4 initialization and propagation (§4.3).
//!
//! Ported in structure from the Hoots/Roehrich "Spacetrack Report No. 3"
//! near-earth kernel: recover the Kozai mean semimajor axis and mean motion,
//! compute the one-shot secular drag coefficients, then at each call advance
//! the secular terms, solve Kepler's equation, and assemble the orientation
//! vectors.

use super::gravity::GravityConstants;
use super::kepler;

/// Orbital radii below which the simplified-drag branch and (below that)
/// the "decayed" condition apply, in Earth radii.
const LOW_PERIGEE_KM: f64 = 220.0;

/// Kozai-recovered quantities shared by every near-earth/deep-space model
/// (§4.2). `aodp`/`xnodp` are the "recovered" (iterated) semimajor axis and
/// mean motion; `cosio`/`sinio`/`theta2`/`x3thm1` are inclination-derived
/// terms every kernel reuses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KozaiRecovery {
    pub aodp: f64,
    pub xnodp: f64,
    pub cosio: f64,
    pub sinio: f64,
    pub theta2: f64,
    pub x3thm1: f64,
}

/// Recover the Kozai mean motion and semimajor axis from the TLE's
/// (already-mean, Brouwer) elements (§4.2).
///
/// `a1 = (xke/no)^(2/3)`, then two rounds of the `δ1`/`a0`/`δ0` correction
/// recover the unKozai'd mean motion `xnodp` and semimajor axis `aodp`.
#[must_use]
pub fn recover(gc: &GravityConstants, eo: f64, xincl: f64, no: f64) -> KozaiRecovery {
    let cosio = xincl.cos();
    let theta2 = cosio * cosio;
    let x3thm1 = 3.0 * theta2 - 1.0;
    let eosq = eo * eo;
    let betao2 = 1.0 - eosq;
    let betao = betao2.sqrt();

    let a1 = (gc.xke / no).powf(2.0 / 3.0);
    let del1 = 1.5 * gc.ck2 * x3thm1 / (a1 * a1 * betao * betao2);
    let ao = a1 * (1.0 - del1 * (1.0 / 3.0 + del1 * (1.0 + 134.0 / 81.0 * del1)));
    let delo = 1.5 * gc.ck2 * x3thm1 / (ao * ao * betao * betao2);
    let xnodp = no / (1.0 + delo);
    let aodp = ao / (1.0 - delo);

    KozaiRecovery {
        aodp,
        xnodp,
        cosio,
        sinio: xincl.sin(),
        theta2,
        x3thm1,
    }
}

/// Orbital period implied by the recovered mean motion, in seconds.
#[must_use]
pub fn period_seconds(xnodp: f64) -> f64 {
    if xnodp <= 0.0 {
        return f64::INFINITY;
    }
    2.0 * std::f64::consts::PI / xnodp * 60.0
}

/// Deep-space threshold: period at or above 225 minutes (13500 s), per §3.
#[must_use]
pub fn is_deep_space(xnodp: f64) -> bool {
    period_seconds(xnodp) >= 13_500.0
}

/// One-shot initialization constants for the classical near-earth SGP4
/// kernel (§4.3). Computed once per element set and cached via
/// [`crate::cached::InitCache`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearEarthConstants {
    pub kozai: KozaiRecovery,
    pub eta: f64,
    pub c1: f64,
    pub c4: f64,
    pub c5: f64,
    pub x1mth2: f64,
    pub x7thm1: f64,
    pub xmdot: f64,
    pub omgdot: f64,
    pub xnodot: f64,
    pub omgcof: f64,
    pub xmcof: f64,
    pub xnodcf: f64,
    pub t2cof: f64,
    pub xlcof: f64,
    pub aycof: f64,
    pub delmo: f64,
    pub sinmo: f64,
    pub isimp: bool,
    pub d2: f64,
    pub d3: f64,
    pub d4: f64,
    pub t3cof: f64,
    pub t4cof: f64,
    pub t5cof: f64,
    pub bstar: f64,
    pub eo: f64,
    pub xincl: f64,
    pub omegao: f64,
    pub xmo: f64,
    pub xnodeo: f64,
}

/// Build the one-shot near-earth initialization constants.
#[must_use]
pub fn init(gc: &GravityConstants, eo: f64, xincl: f64, omegao: f64, xnodeo: f64, xmo: f64, no: f64, bstar: f64) -> NearEarthConstants {
    let kozai = recover(gc, eo, xincl, no);
    let KozaiRecovery {
        aodp,
        xnodp,
        cosio,
        sinio,
        theta2,
        x3thm1,
    } = kozai;

    let x1mth2 = 1.0 - theta2;
    let x7thm1 = 7.0 * theta2 - 1.0;

    let perige = (aodp * (1.0 - eo)) - gc.ae;
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

    let eosq = eo * eo;
    let betao2 = 1.0 - eosq;
    let betao = betao2.sqrt();

    let tsi = 1.0 / (aodp - s4);
    let eta = aodp * eo * tsi;
    let etasq = eta * eta;
    let eeta = eo * eta;
    let psisq = (1.0 - etasq).abs();
    let coef = qoms2t * tsi.powi(4);
    let coef1 = coef / psisq.powf(3.5);

    let c2 = coef1
        * xnodp
        * (aodp * (1.0 + 1.5 * etasq + eeta * (4.0 + etasq))
            + 0.75 * gc.ck2 * tsi / psisq * x3thm1 * (8.0 + 3.0 * etasq * (8.0 + etasq)));
    let c1 = bstar * c2;
    let c3 = coef * tsi * gc.j3oj2 * xnodp * gc.ae * sinio / eo;
    let c4 = 2.0
        * xnodp
        * coef1
        * aodp
        * betao2
        * (eta * (2.0 + 0.5 * etasq)
            + eo * (0.5 + 2.0 * etasq)
            - gc.ck2 * tsi / (aodp * psisq)
                * (-3.0 * x3thm1 * (1.0 - 2.0 * eeta + etasq * (1.5 - 0.5 * eeta))
                    + 0.75 * x1mth2 * (2.0 * etasq - eeta * (1.0 + etasq))));
    let c5 = 2.0 * coef1 * aodp * betao2 * (1.0 + 2.75 * (etasq + eeta) + eeta * etasq);

    let theta4 = theta2 * theta2;
    let temp1 = 3.0 * gc.ck2 * x3thm1 / (aodp * aodp * betao * betao2);
    let temp2 = temp1 * gc.ck2 * x3thm1 / (aodp * aodp * betao * betao2);
    let temp3 = 1.25 * gc.ck4 * (3.0 - 30.0 * theta2 + 35.0 * theta4) / (aodp.powi(4) * betao2 * betao2);
    let xmdot = xnodp
        + 0.5 * temp1 * betao * x3thm1
        + 0.0625 * temp2 * betao * (13.0 - 78.0 * theta2 + 137.0 * theta4);
    let omgdot = -0.5 * temp1 * (1.0 - 5.0 * theta2) + 0.0625 * temp2 * (7.0 - 114.0 * theta2 + 395.0 * theta4)
        + temp3 * (3.0 - 36.0 * theta2 + 49.0 * theta4);
    let xhdot1 = -temp1 * cosio;
    let xnodot = xhdot1
        + (0.5 * temp2 * (4.0 - 19.0 * theta2) + 2.0 * temp3 * (3.0 - 7.0 * theta2)) * cosio;
    let xnodcf = 3.5 * betao2 * xhdot1 * c1;
    let t2cof = 1.5 * c1;
    let xlcof = 0.125 * gc.j3oj2 * sinio * (3.0 + 5.0 * cosio) / (1.0 + cosio).max(1.0e-12);
    let aycof = 0.25 * gc.j3oj2 * sinio;
    let delmo = (1.0 + eta * xmo.cos()).powi(3);
    let sinmo = xmo.sin();

    let isimp = perige * gc.xkmper < LOW_PERIGEE_KM;

    let (d2, d3, d4, t3cof, t4cof, t5cof) = if isimp {
        (0.0, 0.0, 0.0, 0.0, 0.0, 0.0)
    } else {
        let c1sq = c1 * c1;
        let d2 = 4.0 * aodp * tsi * c1sq;
        let temp = d2 * tsi * c1 / 3.0;
        let d3 = (17.0 * aodp + s4) * temp;
        let d4 = 0.5 * temp * aodp * tsi * (221.0 * aodp + 31.0 * s4) * c1;
        let t3cof = d2 + 2.0 * c1sq;
        let t4cof = 0.25 * (3.0 * d3 + c1 * (12.0 * d2 + 10.0 * c1sq));
        let t5cof = 0.2
            * (3.0 * d4 + 12.0 * c1 * d3 + 6.0 * d2 * d2 + 15.0 * c1sq * (2.0 * d2 + c1sq));
        (d2, d3, d4, t3cof, t4cof, t5cof)
    };

    NearEarthConstants {
        kozai,
        eta,
        c1,
        c4,
        c5,
        x1mth2,
        x7thm1,
        xmdot,
        omgdot,
        xnodot,
        omgcof: bstar * c3 * omegao.cos(),
        xmcof: -2.0 / 3.0 * coef * bstar * gc.ae / eeta.max(1.0e-12),
        xnodcf,
        t2cof,
        xlcof,
        aycof,
        delmo,
        sinmo,
        isimp,
        d2,
        d3,
        d4,
        t3cof,
        t4cof,
        t5cof,
        bstar,
        eo,
        xincl,
        omegao,
        xmo,
        xnodeo,
    }
}

/// Propagated osculating elements and orientation vectors at `tsince`
/// minutes from epoch, before the final (U,V) perifocal-to-ECI rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearEarthState {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

/// Propagate the classical near-earth kernel to `tsince` minutes from epoch.
#[must_use]
pub fn propagate(gc: &GravityConstants, nec: &NearEarthConstants, tsince: f64) -> NearEarthState {
    let KozaiRecovery {
        aodp,
        xnodp,
        cosio,
        sinio,
        x3thm1,
        ..
    } = nec.kozai;

    let xmdf = nec.xmo + nec.xmdot * tsince;
    let omgadf = nec.omegao + nec.omgdot * tsince;
    let xnoddf = nec.xnodeo + nec.xnodot * tsince;
    let mut omega = omgadf;
    let mut xmp = xmdf;
    let tsq = tsince * tsince;
    let xnode = xnoddf + nec.xnodcf * tsq;
    let mut tempa = 1.0 - nec.c1 * tsince;
    let mut tempe = nec.bstar * nec.c4 * tsince;
    let mut templ = nec.t2cof * tsq;

    if !nec.isimp {
        let delomg = nec.omgcof * tsince;
        let delm = nec.xmcof * ((1.0 + nec.eta * xmdf.cos()).powi(3) - nec.delmo);
        let temp = delomg + delm;
        xmp = xmdf + temp;
        omega = omgadf - temp;
        let tcube = tsq * tsince;
        let tfour = tcube * tsince;
        tempa = tempa - nec.d2 * tsq - nec.d3 * tcube - nec.d4 * tfour;
        tempe += nec.bstar * nec.c5 * (xmp.sin() - nec.sinmo);
        templ += nec.t3cof * tcube + tfour * (nec.t4cof + tsince * nec.t5cof);
    }

    let a = aodp * tempa * tempa;
    let e = nec.eo - tempe;
    let xl = xmp + omega + xnode + xnodp * templ;
    let xn = gc.xke / a.powf(1.5);

    let beta = (1.0 - e * e).sqrt();
    let axn = e * omega.cos();
    let xll = nec.xlcof * axn / beta;
    let aynl = nec.aycof;
    let xlt = xl + xll;
    let ayn = e * omega.sin() + aynl;

    let capu = super::constants::mod2pi(xlt - xnode);
    let sol = kepler::solve_classical(capu, axn, ayn);
    let (epw, sinepw, cosepw) = (sol.e, sol.sin_e, sol.cos_e);

    let ecose = axn * cosepw + ayn * sinepw;
    let esine = axn * sinepw - ayn * cosepw;
    let elsq = axn * axn + ayn * ayn;
    let pl = a * (1.0 - elsq);
    let r = a * (1.0 - ecose);
    let rdot = gc.xke * a.sqrt() / r * esine;
    let rfdot = gc.xke * pl.sqrt() / r;
    let temp_val = esine / (1.0 + (1.0 - elsq).sqrt());
    let cosu = a / r * (cosepw - axn + ayn * temp_val);
    let sinu = a / r * (sinepw - ayn - axn * temp_val);
    let u = sinu.atan2(cosu);
    let sin2u = 2.0 * cosu * sinu;
    let cos2u = 1.0 - 2.0 * sinu * sinu;

    let temp = 1.0 / pl;
    let temp1 = gc.ck2 * temp;
    let temp2 = temp1 * temp;

    let rk = r * (1.0 - 1.5 * temp2 * beta * x3thm1) + 0.5 * temp1 * nec.x1mth2 * cos2u;
    let uk = u - 0.25 * temp2 * nec.x7thm1 * sin2u;
    let xnodek = xnode + 1.5 * temp2 * cosio * sin2u;
    let xinck = nec.xincl + 1.5 * temp2 * cosio * sinio * cos2u;

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

    let x = rk * ux;
    let y = rk * uy;
    let z = rk * uz;
    let xdot = rdot * ux + rfdot * vx;
    let ydot = rdot * uy + rfdot * vy;
    let zdot = rdot * uz + rfdot * vz;

    let scale = gc.xkmper / gc.ae;
    let vscale = scale / 60.0;

    NearEarthState {
        position_km: [x * scale, y * scale, z * scale],
        velocity_km_s: [xdot * vscale, ydot * vscale, zdot * vscale],
    }
}

/// Propagate the classical SDP4 kernel — the near-earth secular/drag model
/// of [`propagate`] extended with the deep-space lunisolar correction
/// (§4.4) — to `tsince` minutes from epoch.
///
/// Unlike [`crate::sgp4r::propagate`], this keeps the classical Kepler
/// contract (`kepler::solve_classical`'s 1 rad clamp and silent
/// non-convergence) and the near-earth kernel's long-period drag terms
/// (`xlcof`/`aycof`/`templ`), rather than SGP4-R's simplified, tighter
/// contract.
#[must_use]
pub fn propagate_deep(
    gc: &GravityConstants,
    nec: &NearEarthConstants,
    dsc: &super::deep_space::DeepSpaceConstants,
    tsince: f64,
) -> NearEarthState {
    let KozaiRecovery { xnodp, .. } = nec.kozai;

    let xmdf = nec.xmo + nec.xmdot * tsince;
    let omgadf = nec.omegao + nec.omgdot * tsince;
    let xnoddf = nec.xnodeo + nec.xnodot * tsince;
    let mut omega = omgadf;
    let mut xmp = xmdf;
    let tsq = tsince * tsince;
    let xnode = xnoddf + nec.xnodcf * tsq;
    let mut tempa = 1.0 - nec.c1 * tsince;
    let mut tempe = nec.bstar * nec.c4 * tsince;
    let mut templ = nec.t2cof * tsq;

    if !nec.isimp {
        let delomg = nec.omgcof * tsince;
        let delm = nec.xmcof * ((1.0 + nec.eta * xmdf.cos()).powi(3) - nec.delmo);
        let temp = delomg + delm;
        xmp = xmdf + temp;
        omega = omgadf - temp;
        let tcube = tsq * tsince;
        let tfour = tcube * tsince;
        tempa = tempa - nec.d2 * tsq - nec.d3 * tcube - nec.d4 * tfour;
        tempe += nec.bstar * nec.c5 * (xmp.sin() - nec.sinmo);
        templ += nec.t3cof * tcube + tfour * (nec.t4cof + tsince * nec.t5cof);
    }

    let e_drag = nec.eo - tempe;

    let (em, xincl, omega, xnode, xmam, xn) =
        super::deep_space::perturb(dsc, nec.xincl, tsince, xnodp, e_drag, nec.xincl, omega, xnode, xmp);

    let a = (gc.xke / xn).powf(2.0 / 3.0) * tempa * tempa;
    let e = em;

    let cosio = xincl.cos();
    let sinio = xincl.sin();
    let theta2 = cosio * cosio;
    let x3thm1 = 3.0 * theta2 - 1.0;
    let x1mth2 = 1.0 - theta2;
    let x7thm1 = 7.0 * theta2 - 1.0;

    let beta = (1.0 - e * e).sqrt();
    let axn = e * omega.cos();
    let xll = nec.xlcof * axn / beta;
    let aynl = nec.aycof;
    let xl = xmam + omega + xnode + xnodp * templ;
    let xlt = xl + xll;
    let ayn = e * omega.sin() + aynl;

    let capu = super::constants::mod2pi(xlt - xnode);
    let sol = kepler::solve_classical(capu, axn, ayn);
    let (sinepw, cosepw) = (sol.sin_e, sol.cos_e);

    let ecose = axn * cosepw + ayn * sinepw;
    let esine = axn * sinepw - ayn * cosepw;
    let elsq = axn * axn + ayn * ayn;
    let pl = a * (1.0 - elsq);
    let r = a * (1.0 - ecose);
    let rdot = gc.xke * a.sqrt() / r * esine;
    let rfdot = gc.xke * pl.sqrt() / r;
    let temp_val = esine / (1.0 + (1.0 - elsq).sqrt());
    let cosu = a / r * (cosepw - axn + ayn * temp_val);
    let sinu = a / r * (sinepw - ayn - axn * temp_val);
    let u = sinu.atan2(cosu);
    let sin2u = 2.0 * cosu * sinu;
    let cos2u = 1.0 - 2.0 * sinu * sinu;

    let temp = 1.0 / pl;
    let temp1 = gc.ck2 * temp;
    let temp2 = temp1 * temp;

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

    NearEarthState {
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
        // Roughly ISS-like: e=0.0006, i=51.6 deg, n ~ 15.5 rev/day.
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
    fn recover_produces_aodp_close_to_semi_major_axis_guess() {
        let (eo, xincl, _, _, _, no, _) = leo_params();
        let kozai = recover(&WGS72_LEGACY, eo, xincl, no);
        // At ~15.5 rev/day, semimajor axis should be a few hundred km above earth radius.
        assert!(kozai.aodp > 1.0 && kozai.aodp < 1.2);
    }

    #[test]
    fn leo_orbit_is_not_deep_space() {
        let (eo, xincl, _, _, _, no, _) = leo_params();
        let kozai = recover(&WGS72_LEGACY, eo, xincl, no);
        assert!(!is_deep_space(kozai.xnodp));
    }

    #[test]
    fn isimp_flag_set_for_low_perigee() {
        let (eo, xincl, omegao, xnodeo, xmo, no, bstar) = leo_params();
        let nec = init(&WGS72_LEGACY, eo, xincl, omegao, xnodeo, xmo, no, bstar);
        // Perigee altitude for this near-circular LEO orbit is well above 220 km.
        assert!(!nec.isimp);
    }

    #[test]
    fn propagate_at_zero_returns_finite_state() {
        let (eo, xincl, omegao, xnodeo, xmo, no, bstar) = leo_params();
        let nec = init(&WGS72_LEGACY, eo, xincl, omegao, xnodeo, xmo, no, bstar);
        let state = propagate(&WGS72_LEGACY, &nec, 0.0);
        let r = (state.position_km[0].powi(2) + state.position_km[1].powi(2) + state.position_km[2].powi(2)).sqrt();
        assert!(r > 6000.0 && r < 8000.0);
    }

    #[test]
    fn propagate_is_continuous_over_a_short_step() {
        let (eo, xincl, omegao, xnodeo, xmo, no, bstar) = leo_params();
        let nec = init(&WGS72_LEGACY, eo, xincl, omegao, xnodeo, xmo, no, bstar);
        let s0 = propagate(&WGS72_LEGACY, &nec, 0.0);
        let s1 = propagate(&WGS72_LEGACY, &nec, 1.0);
        let dx = s1.position_km[0] - s0.position_km[0];
        assert!(dx.abs() < 200.0);
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
        let nec = init(&WGS72_LEGACY, eo, xincl, omegao, xnodeo, xmo, no, bstar);
        assert!(is_deep_space(nec.kozai.xnodp));

        let ds_init = DeepSpaceInit {
            gc: &WGS72_LEGACY,
            epoch_ds50: 25938.538,
            eo,
            xincl,
            omegao,
            xnodeo,
            xmo,
            xnodp: nec.kozai.xnodp,
        };
        let mut dsc = deep_space::dscom(&ds_init);
        deep_space::dsinit(&mut dsc, &ds_init, nec.xnodot + nec.omgdot);

        let state = propagate_deep(&WGS72_LEGACY, &nec, &dsc, 120.0);
        let r = (state.position_km[0].powi(2) + state.position_km[1].powi(2) + state.position_km[2].powi(2)).sqrt();
        assert!(r.is_finite() && r > 6000.0);
    }
}
