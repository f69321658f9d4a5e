//! Bounded Newton solver for Kepler's equation, shared by SGP/SGP4/SGP8.
//!
//! The classical near-earth kernels solve
//! `E - axn*sin(E) + ayn*cos(E) = capu`
//! by fixed-point Newton iteration starting at `E = capu`, clamping each
//! step to at most 1 radian and stopping once `|dE| < 1e-6` or after 10
//! iterations. The clamp is required to reproduce the reference FORTRAN
//! bit-for-bit; an unbounded Newton step can overshoot and converge to a
//! different branch for high-eccentricity orbits (scenario 3 in the test
//! seed list).

/// Outcome of [`solve`]: the converged (or best-effort) eccentric anomaly,
/// plus its sine and cosine (computed alongside to avoid a second trig pass).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeplerSolution {
    /// Eccentric anomaly, radians.
    pub e: f64,
    pub sin_e: f64,
    pub cos_e: f64,
}

/// Solve Kepler's equation with the classical SGP/SGP4/SGP8 bound: clamp
/// `1.0` radian per step, tolerance `1e-6`, at most 10 iterations. Never
/// fails — non-convergence is silent per the error-handling taxonomy
/// (`KeplerNonConvergent` is not surfaced here; the loop cap simply returns
/// the last iterate).
#[must_use]
pub fn solve_classical(capu: f64, axn: f64, ayn: f64) -> KeplerSolution {
    solve(capu, axn, ayn, 1.0, 1e-6, 10)
}

/// Solve Kepler's equation with the tighter bound used by SGP4-R: clamp
/// `0.95` radians per step, tolerance `1e-12`, at most 10 iterations.
#[must_use]
pub fn solve_sgp4r(capu: f64, axn: f64, ayn: f64) -> KeplerSolution {
    solve(capu, axn, ayn, 0.95, 1e-12, 10)
}

fn solve(capu: f64, axn: f64, ayn: f64, clamp: f64, tol: f64, max_iter: u32) -> KeplerSolution {
    let mut e = capu;
    let mut sin_e = e.sin();
    let mut cos_e = e.cos();

    for _ in 0..max_iter {
        let f = e - axn * sin_e + ayn * cos_e - capu;
        let df = 1.0 - axn * cos_e - ayn * sin_e;
        let mut delta = f / df;
        delta = delta.clamp(-clamp, clamp);
        e -= delta;
        sin_e = e.sin();
        cos_e = e.cos();

        if delta.abs() < tol {
            break;
        }
    }

    KeplerSolution { e, sin_e, cos_e }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_orbit_solves_to_mean_anomaly() {
        let sol = solve_classical(1.0, 0.0, 0.0);
        assert!((sol.e - 1.0).abs() < 1e-6);
    }

    #[test]
    fn high_eccentricity_stays_within_clamp_and_converges() {
        // axn/ayn chosen so an unbounded Newton step would overshoot past pi.
        let sol = solve_classical(0.05, 0.85, 0.5);
        let residual = sol.e - 0.85 * sol.sin_e + 0.5 * sol.cos_e - 0.05;
        assert!(residual.abs() < 1e-5);
    }

    #[test]
    fn sgp4r_solver_meets_tighter_tolerance() {
        let sol = solve_sgp4r(0.3, 0.2, 0.1);
        let residual = sol.e - 0.2 * sol.sin_e + 0.1 * sol.cos_e - 0.3;
        assert!(residual.abs() < 1e-9);
    }

    #[test]
    fn sin_cos_match_returned_angle() {
        let sol = solve_classical(2.0, 0.1, -0.2);
        assert!((sol.sin_e - sol.e.sin()).abs() < 1e-12);
        assert!((sol.cos_e - sol.e.cos()).abs() < 1e-12);
    }
}
