//! Two-Line Element (TLE) set parsing.
//!
//! Decodes the fixed-column NORAD TLE text format into a canonical mean-element
//! record in the propagators' native units (radians, radians/minute, etc.).

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::constants::{ds50, TWO_PI};
use super::errors::{PropagatorError, PropagatorResult};

/// Conversion factor from revolutions/day to radians/minute.
const REV_PER_DAY_TO_RAD_PER_MIN: f64 = TWO_PI / 1440.0;

/// A parsed TLE mean-element record, in the models' native units.
///
/// All angles are radians; mean motion and its derivatives are in
/// radians/minute (and powers thereof); eccentricity is dimensionless.
#[derive(Clone, Debug, PartialEq)]
pub struct MeanElements {
    /// Optional name line (24 characters, trimmed), passed through verbatim.
    pub name: Option<String>,
    /// Satellite catalog number.
    pub catalog_number: u32,
    /// Security classification (`U`nclassified, `C`lassified, etc.).
    pub classification: char,
    /// International designator (launch year, number, piece), as printed.
    pub international_designator: String,
    /// Epoch of the element set.
    pub epoch: DateTime<Utc>,
    /// Days since 1950 January 0, 0h UT — derived from `epoch`.
    pub ds50: f64,
    /// First time derivative of mean motion, radians/minute².
    pub first_derivative: f64,
    /// Second time derivative of mean motion, radians/minute³.
    pub second_derivative: f64,
    /// B* drag term (dimensionless, Earth radii⁻¹).
    pub bstar: f64,
    /// Ephemeris type (almost always 0).
    pub ephemeris_type: u8,
    /// Element set number.
    pub element_set_number: u32,
    /// Inclination, radians.
    pub inclination: f64,
    /// Right ascension of the ascending node, radians.
    pub raan: f64,
    /// Eccentricity, dimensionless, in `[0, 1)`.
    pub eccentricity: f64,
    /// Argument of perigee, radians.
    pub arg_perigee: f64,
    /// Mean anomaly, radians.
    pub mean_anomaly: f64,
    /// Mean motion, radians/minute.
    pub mean_motion: f64,
    /// Revolution number at epoch.
    pub revolutions_at_epoch: u32,
    /// The two 69+ column lines as originally supplied, for round-tripping
    /// via the `tle` accessor.
    pub lines: (String, String),
}

/// Parse a text buffer containing one or more TLE records (§4.1).
///
/// Blank lines and lines whose first non-blank character is `#` are ignored.
/// Each record is either two 69-column lines, or a name line followed by the
/// same two lines. A malformed record aborts only that record's parse and
/// returns an error to the caller; this function does not attempt to skip a
/// bad record and continue, since a caller working through a single buffer of
/// known-good records can split on record boundaries itself if partial
/// recovery is desired.
pub fn parse(text: &str) -> PropagatorResult<Vec<MeanElements>> {
    let mut records = Vec::new();
    let lines: Vec<&str> = text.lines().collect();
    let mut pending_name: Option<&str> = None;
    let mut i = 0;

    while i < lines.len() {
        let raw = lines[i];
        let trimmed = raw.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            pending_name = None;
            i += 1;
            continue;
        }

        if is_line_marker(trimmed, '1') {
            let line2_raw = lines.get(i + 1).copied().ok_or_else(|| PropagatorError::ParseError {
                reason: "line 1 marker with no following line 2".into(),
            })?;
            if !is_line_marker(line2_raw.trim(), '2') {
                return Err(PropagatorError::ParseError {
                    reason: "expected line 2 marker after line 1".into(),
                });
            }

            let line1 = pad80(raw);
            let line2 = pad80(line2_raw);
            let name = pending_name.map(|s| s.trim().to_string());
            records.push(MeanElements::from_lines(name, &line1, &line2)?);

            pending_name = None;
            i += 2;
        } else {
            pending_name = Some(raw);
            i += 1;
        }
    }

    Ok(records)
}

fn is_line_marker(trimmed: &str, marker: char) -> bool {
    let mut chars = trimmed.chars();
    matches!(chars.next(), Some(c) if c == marker)
        && matches!(chars.next(), Some(c) if c.is_whitespace() || c.is_ascii_digit())
}

fn pad80(line: &str) -> String {
    let mut s = line.trim_end_matches(['\r', '\n']).to_string();
    while s.len() < 80 {
        s.push(' ');
    }
    s
}

impl MeanElements {
    /// Parse a single record from its (name, line1, line2) triple.
    ///
    /// # Errors
    ///
    /// Returns [`PropagatorError::ParseError`] if either line is too short,
    /// the line markers are missing or mismatched, the catalog IDs disagree,
    /// the record uses the unsupported "G" classification, or any field
    /// fails to decode as its expected numeric type.
    pub fn from_lines(name: Option<String>, line1: &str, line2: &str) -> PropagatorResult<Self> {
        if line1.len() < 69 || line2.len() < 69 {
            return Err(PropagatorError::ParseError {
                reason: "TLE lines must be at least 69 characters".into(),
            });
        }

        let classification = field(line1, 8, 8)?.chars().next().unwrap_or('U');
        if classification == 'G' {
            return Err(PropagatorError::ParseError {
                reason: "the 'G' internal element format is not supported".into(),
            });
        }

        let catalog_1 = parse_u32(field(line1, 3, 7)?, "catalog number (line 1)")?;
        let catalog_2 = parse_u32(field(line2, 3, 7)?, "catalog number (line 2)")?;
        if catalog_1 != catalog_2 {
            return Err(PropagatorError::ParseError {
                reason: format!(
                    "catalog number mismatch: line 1 has {catalog_1}, line 2 has {catalog_2}"
                ),
            });
        }

        let international_designator = field(line1, 10, 17)?.to_string();

        let epoch_year = parse_i32(field(line1, 19, 20)?, "epoch year")?;
        let epoch_year = if epoch_year < 57 {
            2000 + epoch_year
        } else {
            1900 + epoch_year
        };
        let epoch_day = parse_f64(field(line1, 21, 32)?, "epoch day-of-year")?;
        let epoch = epoch_to_datetime(epoch_year, epoch_day)?;

        let first_derivative =
            parse_f64(field(line1, 34, 43)?, "first derivative of mean motion")?
                * REV_PER_DAY_TO_RAD_PER_MIN
                / 1440.0;
        let second_derivative =
            parse_assumed_decimal(field(line1, 45, 52)?, "second derivative of mean motion")?
                * REV_PER_DAY_TO_RAD_PER_MIN
                / (1440.0 * 1440.0);
        let bstar = parse_assumed_decimal(field(line1, 54, 61)?, "B* drag term")?;
        let ephemeris_type = parse_u32(field(line1, 63, 63)?, "ephemeris type")? as u8;
        let element_set_number = parse_u32(field(line1, 65, 68)?, "element set number")?;

        let inclination = parse_f64(field(line2, 9, 16)?, "inclination")?.to_radians();
        let raan = parse_f64(field(line2, 18, 25)?, "RAAN")?.to_radians();
        let eccentricity = {
            let raw = field(line2, 27, 33)?;
            let with_point = format!("0.{raw}");
            parse_f64(&with_point, "eccentricity")?
        };
        if !(0.0..1.0).contains(&eccentricity) {
            return Err(PropagatorError::ParseError {
                reason: format!("eccentricity {eccentricity} outside [0, 1)"),
            });
        }
        let arg_perigee = parse_f64(field(line2, 35, 42)?, "argument of perigee")?.to_radians();
        let mean_anomaly = parse_f64(field(line2, 44, 51)?, "mean anomaly")?.to_radians();
        let mean_motion =
            parse_f64(field(line2, 53, 63)?, "mean motion")? * REV_PER_DAY_TO_RAD_PER_MIN;
        let revolutions_at_epoch = parse_u32(field(line2, 64, 68)?, "revolutions at epoch")?;

        Ok(Self {
            name,
            catalog_number: catalog_1,
            classification,
            international_designator,
            ds50: ds50(epoch),
            epoch,
            first_derivative,
            second_derivative,
            bstar,
            ephemeris_type,
            element_set_number,
            inclination,
            raan,
            eccentricity,
            arg_perigee,
            mean_anomaly,
            mean_motion,
            revolutions_at_epoch,
            lines: (line1[..69].to_string(), line2[..69].to_string()),
        })
    }
}

/// Extract columns `start..=end` (1-based, inclusive), trimmed.
fn field(line: &str, start: usize, end: usize) -> PropagatorResult<&str> {
    line.get(start - 1..end)
        .map(str::trim)
        .ok_or_else(|| PropagatorError::ParseError {
            reason: format!("line too short for columns {start}-{end}"),
        })
}

fn parse_f64(raw: &str, what: &str) -> PropagatorResult<f64> {
    raw.parse::<f64>().map_err(|_| PropagatorError::ParseError {
        reason: format!("invalid {what}: {raw:?}"),
    })
}

fn parse_i32(raw: &str, what: &str) -> PropagatorResult<i32> {
    raw.parse::<i32>().map_err(|_| PropagatorError::ParseError {
        reason: format!("invalid {what}: {raw:?}"),
    })
}

fn parse_u32(raw: &str, what: &str) -> PropagatorResult<u32> {
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<u32>().map_err(|_| PropagatorError::ParseError {
        reason: format!("invalid {what}: {raw:?}"),
    })
}

/// Parse a field with an implied leading decimal point and a signed
/// single-digit exponent, e.g. `" 33518-4"` = `0.33518e-4`, `"-66816-4"` =
/// `-0.66816e-4`, used for the second derivative of mean motion and B*.
fn parse_assumed_decimal(raw: &str, what: &str) -> PropagatorResult<f64> {
    if raw.is_empty() || raw.chars().all(|c| c == '0') {
        return Ok(0.0);
    }
    if raw.len() < 2 {
        return Err(PropagatorError::ParseError {
            reason: format!("invalid {what}: {raw:?}"),
        });
    }
    let (mantissa, exponent) = raw.split_at(raw.len() - 2);
    let exp_value = parse_i32(exponent, what)?;

    let (sign, digits) = match mantissa.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };
    let fraction = parse_f64(&format!("0.{digits}"), what)?;
    Ok(sign * fraction * 10f64.powi(exp_value))
}

/// Convert a TLE epoch (two-digit year + fractional day-of-year) to `DateTime<Utc>`.
fn epoch_to_datetime(year: i32, day_of_year: f64) -> PropagatorResult<DateTime<Utc>> {
    let jan0 = Utc
        .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| PropagatorError::ParseError {
            reason: format!("invalid epoch year {year}"),
        })?
        - Duration::days(1);

    let whole_days = day_of_year.floor() as i64;
    let fractional_seconds = ((day_of_year - day_of_year.floor()) * 86400.0).round() as i64;

    Ok(jan0 + Duration::days(whole_days) + Duration::seconds(fractional_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    const ISS_LINE1: &str =
        "1 25544U 98067A   20206.18539600  .00001406  00000-0  33518-4 0  9992";
    const ISS_LINE2: &str =
        "2 25544  51.6461 339.8014 0001473  94.8340 265.2864 15.49309432236008";

    #[test]
    fn parse_single_record_without_name() {
        let records = parse(&format!("{ISS_LINE1}\n{ISS_LINE2}\n")).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].catalog_number, 25544);
        assert!((records[0].eccentricity - 0.0001473).abs() < 1e-7);
        assert!(records[0].name.is_none());
    }

    #[test]
    fn parse_three_line_record_keeps_name() {
        let text = format!("ISS (ZARYA)\n{ISS_LINE1}\n{ISS_LINE2}\n");
        let records = parse(&text).unwrap();
        assert_eq!(records[0].name.as_deref(), Some("ISS (ZARYA)"));
    }

    #[test]
    fn blank_lines_and_comments_are_ignored() {
        let text = format!("# a comment\n\nISS (ZARYA)\n\n{ISS_LINE1}\n{ISS_LINE2}\n");
        let records = parse(&text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("ISS (ZARYA)"));
    }

    #[test]
    fn mismatched_catalog_ids_are_rejected() {
        let bad_line2 = ISS_LINE2.replacen("25544", "99999", 1);
        let err = parse(&format!("{ISS_LINE1}\n{bad_line2}\n")).unwrap_err();
        assert!(matches!(err, PropagatorError::ParseError { .. }));
    }

    #[test]
    fn epoch_day_206_of_2020_is_july_24() {
        let dt = epoch_to_datetime(2020, 206.18539600).unwrap();
        assert_eq!(dt.year(), 2020);
        assert_eq!(dt.month(), 7);
        assert_eq!(dt.day(), 24);
    }

    #[test]
    fn assumed_decimal_handles_sign_and_exponent() {
        assert!((parse_assumed_decimal(" 33518-4", "x").unwrap() - 0.33518e-4).abs() < 1e-12);
        assert!((parse_assumed_decimal("-66816-4", "x").unwrap() + 0.66816e-4).abs() < 1e-12);
        assert!((parse_assumed_decimal(" 00000-0", "x").unwrap()).abs() < 1e-12);
    }

    #[test]
    fn mean_motion_converted_to_radians_per_minute() {
        let records = parse(&format!("{ISS_LINE1}\n{ISS_LINE2}\n")).unwrap();
        let expected = 15.49309432 * REV_PER_DAY_TO_RAD_PER_MIN;
        assert!((records[0].mean_motion - expected).abs() < 1e-9);
    }
}
