//! Shared math and time primitives used across the propagator.

use chrono::{DateTime, Utc};

/// 2π, used pervasively for angle reduction.
pub const TWO_PI: f64 = std::f64::consts::PI * 2.0;

/// Seconds per day.
pub const SECONDS_PER_DAY: f64 = 86400.0;

/// Minutes per day.
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Julian Date of the TLE time origin, 1950-01-00 00:00 UT (i.e. 1949-12-31 00:00 UT).
pub const JD_1950: f64 = 2433281.5;

/// Reduce an angle (radians) to `[0, 2π)`.
#[must_use]
pub fn mod2pi(mut x: f64) -> f64 {
    x %= TWO_PI;
    if x < 0.0 {
        x += TWO_PI;
    }
    x
}

/// `atan2`-style four-quadrant arctangent, reduced to `[0, 2π)`.
#[must_use]
pub fn actan(sin_x: f64, cos_x: f64) -> f64 {
    mod2pi(sin_x.atan2(cos_x))
}

/// Convert a UTC instant to a Julian Date (treating UTC as UT1; sub-second
/// corrections from IERS Bulletin A are outside this crate's scope).
#[must_use]
pub fn utc_to_julian_date(time: DateTime<Utc>) -> f64 {
    time.timestamp() as f64 / SECONDS_PER_DAY
        + time.timestamp_subsec_nanos() as f64 / 1e9 / SECONDS_PER_DAY
        + 2440587.5
}

/// Days since 1950 January 0, 0h UT (`ds50`), the epoch reference used internally
/// by the Spacetrack Report No. 3 family of propagators.
#[must_use]
pub fn ds50(time: DateTime<Utc>) -> f64 {
    utc_to_julian_date(time) - JD_1950
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn mod2pi_wraps_negative_and_large_angles() {
        assert!((mod2pi(-0.5) - (TWO_PI - 0.5)).abs() < 1e-12);
        assert!((mod2pi(TWO_PI + 1.0) - 1.0).abs() < 1e-12);
        assert!((mod2pi(0.25) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn actan_is_always_nonnegative() {
        let a = actan(-1.0, -1.0);
        assert!(a >= 0.0 && a < TWO_PI);
    }

    #[test]
    fn ds50_at_1950_origin_is_zero() {
        let origin = Utc.with_ymd_and_hms(1949, 12, 31, 0, 0, 0).unwrap();
        assert!(ds50(origin).abs() < 1e-6);
    }

    #[test]
    fn utc_to_jd_conversion() {
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert!((utc_to_julian_date(j2000) - 2451545.0).abs() < 1e-6);
    }
}
