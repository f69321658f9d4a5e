//! Original ("simple") SGP near-earth model (§4.3, SGP variant).
//!
//! Predates SGP4's drag-term refinements: mean anomaly, argument of perigee
//! and node are advanced with simple first-order secular rates plus a single
//! atmospheric-drag correction to mean motion and semimajor axis, with no
//! isimp branch and no Kepler-clamp subtlety. Velocity is returned as a
//! first-difference approximation rather than the analytic perifocal
//! derivative SGP4 computes, per the design note accompanying this model.

use super::gravity::GravityConstants;

/// One-shot initialization constants for SGP.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SgpConstants {
    pub aodp: f64,
    pub xnodp: f64,
    pub cosio: f64,
    pub sinio: f64,
    pub theta2: f64,
    pub x3thm1: f64,
    pub c1: f64,
    pub c2: f64,
    pub c4: f64,
    pub xmdot: f64,
    pub omgdot: f64,
    pub xnodot: f64,
    pub eo: f64,
    pub omegao: f64,
    pub xmo: f64,
    pub xnodeo: f64,
}

/// Build SGP's one-shot constants from the Kozai recovery shared with SGP4.
#[must_use]
pub fn init(gc: &GravityConstants, eo: f64, xincl: f64, omegao: f64, xnodeo: f64, xmo: f64, no: f64, bstar: f64) -> SgpConstants {
    let kozai = super::near_earth::recover(gc, eo, xincl, no);
    let po = kozai.aodp * (1.0 - eo * eo);
    let po2no = kozai.xnodp / po.powi(2);
    let qoms2t = (120.0 / gc.xkmper).powi(4);

    let c1 = 0.5 * gc.j3oj2 * gc.ae * po2no.sqrt() * gc.ae * gc.ae / po.powi(2) * kozai.sinio;
    let c2 = qoms2t * bstar * po2no * po.powi(4) / (1.0 - eo * eo).powf(3.5);
    let c4 = kozai.xnodp * c2;

    let theta2 = kozai.theta2;
    let xmdot = kozai.xnodp * (1.0 + 1.5 * gc.ck2 * (1.0 - 3.0 * theta2) / po.powi(2) * (1.0 - eo * eo).sqrt());
    let omgdot = -1.5 * gc.ck2 * kozai.xnodp * (1.0 - 5.0 * theta2) / po.powi(2);
    let xnodot = -1.5 * gc.ck2 * kozai.xnodp * kozai.cosio / po.powi(2);

    SgpConstants {
        aodp: kozai.aodp,
        xnodp: kozai.xnodp,
        cosio: kozai.cosio,
        sinio: kozai.sinio,
        theta2,
        x3thm1: kozai.x3thm1,
        c1,
        c2,
        c4,
        xmdot,
        omgdot,
        xnodot,
        eo,
        omegao,
        xmo,
        xnodeo,
    }
}

/// Osculating Cartesian state at `tsince` minutes from epoch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SgpState {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

/// Propagate SGP to `tsince` minutes from epoch.
///
/// Velocity is estimated with a central difference around `tsince` (step
/// 0.001 min) rather than the closed-form perifocal derivative, since SGP's
/// drag model does not carry the radial/transverse rate terms SGP4 does.
#[must_use]
pub fn propagate(gc: &GravityConstants, sc: &SgpConstants, tsince: f64) -> SgpState {
    let position = |t: f64| -> [f64; 3] { position_at(gc, sc, t) };

    let pos = position(tsince);
    let h = 0.001;
    let p1 = position(tsince - h);
    let p2 = position(tsince + h);
    let velocity = [
        (p2[0] - p1[0]) / (2.0 * h * 60.0),
        (p2[1] - p1[1]) / (2.0 * h * 60.0),
        (p2[2] - p1[2]) / (2.0 * h * 60.0),
    ];

    SgpState {
        position_km: pos,
        velocity_km_s: velocity,
    }
}

fn position_at(gc: &GravityConstants, sc: &SgpConstants, tsince: f64) -> [f64; 3] {
    let xmo_t = sc.xmo + sc.xmdot * tsince;
    let omega_t = sc.omegao + sc.omgdot * tsince;
    let xnode_t = sc.xnodeo + sc.xnodot * tsince;

    let tempe = sc.c4 * tsince;
    let a1 = sc.aodp * (1.0 - sc.c1 * tsince).powi(2);
    let e = (sc.eo - tempe).max(0.0);
    let xn = sc.xnodp;

    let xl = xmo_t + omega_t + xnode_t + xn * tsince;
    let capu = super::constants::mod2pi(xl - xnode_t - omega_t);
    let axn = e * omega_t.cos();
    let ayn = e * omega_t.sin();

    let sol = super::kepler::solve_classical(capu, axn, ayn);
    let (sinepw, cosepw) = (sol.sin_e, sol.cos_e);

    let ecose = axn * cosepw + ayn * sinepw;
    let elsq = axn * axn + ayn * ayn;
    let pl = a1 * (1.0 - elsq);
    let r = a1 * (1.0 - ecose);

    let temp = 1.0 / pl;
    let cosu = (cosepw - axn) / (1.0 - ecose);
    let sinu = (sinepw - ayn) / (1.0 - ecose);
    let u = sinu.atan2(cosu);
    let cos2u = 1.0 - 2.0 * sinu * sinu;
    let sin2u = 2.0 * sinu * cosu;

    let rk = r - 0.5 * gc.ck2 * temp * (1.0 - sc.theta2) * cos2u;
    let uk = u - 0.25 * gc.ck2 * temp * temp * (7.0 * sc.theta2 - 1.0) * sin2u;
    let xnodek = xnode_t + 1.5 * gc.ck2 * temp * temp * sc.cosio * sin2u;
    let xinck = sc.cosio.acos() + 1.5 * gc.ck2 * temp * temp * sc.cosio * sc.sinio * cos2u;

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

    let scale = gc.xkmper / gc.ae;
    [rk * ux * scale, rk * uy * scale, rk * uz * scale]
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
    fn sgp_propagates_to_a_finite_state() {
        let (eo, xincl, omegao, xnodeo, xmo, no, bstar) = leo_params();
        let sc = init(&WGS72_LEGACY, eo, xincl, omegao, xnodeo, xmo, no, bstar);
        let state = propagate(&WGS72_LEGACY, &sc, 30.0);
        let r = (state.position_km[0].powi(2) + state.position_km[1].powi(2) + state.position_km[2].powi(2)).sqrt();
        assert!(r > 6000.0 && r < 8000.0);
        assert!(state.velocity_km_s.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn sgp_velocity_is_roughly_orbital_speed() {
        let (eo, xincl, omegao, xnodeo, xmo, no, bstar) = leo_params();
        let sc = init(&WGS72_LEGACY, eo, xincl, omegao, xnodeo, xmo, no, bstar);
        let state = propagate(&WGS72_LEGACY, &sc, 10.0);
        let speed = (state.velocity_km_s[0].powi(2) + state.velocity_km_s[1].powi(2) + state.velocity_km_s[2].powi(2)).sqrt();
        // LEO orbital speed is roughly 7.5 km/s.
        assert!(speed > 5.0 && speed < 9.0);
    }
}
