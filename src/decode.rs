// Numeric decoding of EXIF rationals and degree/minute/second coordinates.
use serde::Serialize;
use std::fmt;

/// A single numeric component of a tag value.
#[derive(Debug, Clone, PartialEq)]
pub enum RationalValue {
    Fraction { num: i64, denom: i64 },
    Scalar(f64),
    Text(String),
}

impl From<exif::Rational> for RationalValue {
    fn from(r: exif::Rational) -> Self {
        RationalValue::Fraction { num: r.num as i64, denom: r.denom as i64 }
    }
}

impl From<exif::SRational> for RationalValue {
    fn from(r: exif::SRational) -> Self {
        RationalValue::Fraction { num: r.num as i64, denom: r.denom as i64 }
    }
}

/// Best-effort conversion to `f64`; anything that cannot be read as a
/// finite number yields `0.0`.
pub fn decode_rational(value: &RationalValue) -> f64 {
    let decoded = match value {
        RationalValue::Fraction { num, denom } if *denom != 0 => Some(*num as f64 / *denom as f64),
        // A fraction with a zero denominator has no scalar reading.
        RationalValue::Fraction { .. } => None,
        RationalValue::Scalar(v) => Some(*v),
        RationalValue::Text(s) => s.trim().parse::<f64>().ok(),
    };
    decoded.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Signed decimal degrees, rounded to 6 places.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Coordinate(f64);

impl Coordinate {
    pub fn new(degrees: f64) -> Self {
        Coordinate(round_to(degrees, 6))
    }

    pub fn degrees(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Converts a degrees/minutes/seconds triplet and hemisphere reference into
/// a [`Coordinate`]. `None` means no usable coordinate, which is distinct
/// from a reading of 0.0.
pub fn decode_coordinate(dms: &[RationalValue], reference: &str) -> Option<Coordinate> {
    let [degrees, minutes, seconds] = dms else {
        log::trace!("Expected 3 DMS components, got {}", dms.len());
        return None;
    };
    let mut value =
        decode_rational(degrees) + decode_rational(minutes) / 60.0 + decode_rational(seconds) / 3600.0;
    if is_negative_hemisphere(reference) {
        value = -value;
    }
    Some(Coordinate::new(value)).filter(|c| c.0.is_finite())
}

fn is_negative_hemisphere(reference: &str) -> bool {
    matches!(reference.trim().chars().next(), Some('S' | 's' | 'W' | 'w'))
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
