//! # Units and Measurements
//!
//! Woodworkers write dimensions the way they read them off a tape: `3/4"`,
//! `5 1/2"`, `19 mm`. This module turns that text into a [`Measurement`],
//! formats measurements back for display, converts between units and
//! compares measurements within a per-unit tolerance.
//!
//! ## Supported Units
//!
//! - Inch (`"` or `in`), displayed as a reduced fraction: `1 1/2"`
//! - Millimetre (`mm`), displayed rounded to the whole millimetre: `19 mm`
//!
//! Conversions go through millimetres as the canonical unit, so adding a unit
//! only means giving its length in millimetres.
//!
//! ## Example
//!
//! ```rust
//! use thrift_core::units::{self, Measurement, Unit};
//!
//! let thickness = units::parse("3/4\"", Unit::Millimetre).unwrap();
//! assert_eq!(thickness, Measurement::inches(0.75));
//! assert_eq!(units::format(&thickness), "3/4\"");
//!
//! let metric = units::convert(&thickness, Unit::Millimetre);
//! assert_eq!(units::format(&metric), "19 mm");
//! assert!(units::equals(&thickness, &metric));
//! ```

use std::fmt;
use std::str::FromStr;

use num_rational::Ratio;
use num_traits::CheckedAdd;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{ThriftError, ThriftResult};

// ============================================================================
// Units
// ============================================================================

/// Measurement system a unit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitFamily {
    Imperial,
    Metric,
}

/// Length unit.
///
/// Serializes as `"inch"` or `"mm"`. Any other string fails to deserialize,
/// which is how a corrupted unit in persisted state gets caught.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    #[serde(rename = "inch")]
    Inch,
    #[serde(rename = "mm")]
    Millimetre,
}

impl Unit {
    /// All supported units, in preference-picker order
    pub const ALL: [Unit; 2] = [Unit::Inch, Unit::Millimetre];

    /// Length of one unit in millimetres (the canonical unit)
    pub fn mm_per_unit(&self) -> f64 {
        match self {
            Unit::Inch => 25.4,
            Unit::Millimetre => 1.0,
        }
    }

    /// Two values in this unit closer than this are considered equal
    pub fn tolerance(&self) -> f64 {
        match self {
            Unit::Inch => 1.0 / 32.0,
            Unit::Millimetre => 1.0,
        }
    }

    pub fn family(&self) -> UnitFamily {
        match self {
            Unit::Inch => UnitFamily::Imperial,
            Unit::Millimetre => UnitFamily::Metric,
        }
    }

    /// Suffix used when formatting and accepted when parsing
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Inch => "\"",
            Unit::Millimetre => "mm",
        }
    }

    /// Serialized identifier (e.g., "inch")
    pub fn id(&self) -> &'static str {
        match self {
            Unit::Inch => "inch",
            Unit::Millimetre => "mm",
        }
    }

    /// Human-readable label for preference pickers
    pub fn display_name(&self) -> &'static str {
        match self {
            Unit::Inch => "Inch (\")",
            Unit::Millimetre => "Millimetre (mm)",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Unit> {
        match suffix {
            "\"" | "in" => Some(Unit::Inch),
            "mm" => Some(Unit::Millimetre),
            _ => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Unit {
    type Err = ThriftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inch" | "inches" | "in" | "\"" => Ok(Unit::Inch),
            "mm" | "millimetre" | "millimeter" | "millimetres" | "millimeters" => Ok(Unit::Millimetre),
            other => Err(ThriftError::invalid_input("unit", other, "Expected 'inch' or 'mm'")),
        }
    }
}

/// Rounding applied when formatting inch measurements.
///
/// Inch values are shown as fractions with this denominator (before
/// reduction), so 0.748" shows as `3/4"` at 1/64 precision.
///
/// No step is coarser than 1/32": rounding moves a value by at most half a
/// step, which keeps a formatted value within the inch tolerance of the
/// original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImperialPrecision {
    ThirtySecond,
    #[default]
    SixtyFourth,
}

impl ImperialPrecision {
    pub const ALL: [ImperialPrecision; 2] = [ImperialPrecision::ThirtySecond, ImperialPrecision::SixtyFourth];

    pub fn denominator(&self) -> u64 {
        match self {
            ImperialPrecision::ThirtySecond => 32,
            ImperialPrecision::SixtyFourth => 64,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ImperialPrecision::ThirtySecond => "1/32\"",
            ImperialPrecision::SixtyFourth => "1/64\"",
        }
    }
}

impl FromStr for ImperialPrecision {
    type Err = ThriftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let denominator = s.trim().trim_start_matches("1/").trim_end_matches('"');
        ImperialPrecision::ALL
            .into_iter()
            .find(|p| p.denominator().to_string() == denominator)
            .ok_or_else(|| ThriftError::invalid_input("precision", s, "Expected 32 or 64"))
    }
}

// ============================================================================
// Measurement
// ============================================================================

/// A length with its unit. The value is never negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub unit: Unit,
    pub value: f64,
}

impl Measurement {
    pub fn new(value: f64, unit: Unit) -> Self {
        Measurement { unit, value }
    }

    pub fn inches(value: f64) -> Self {
        Measurement::new(value, Unit::Inch)
    }

    pub fn millimetres(value: f64) -> Self {
        Measurement::new(value, Unit::Millimetre)
    }

    /// Convert to another unit. See [`convert`].
    pub fn to_unit(&self, target: Unit) -> Measurement {
        convert(self, target)
    }

    /// Tolerance-based equality. See [`equals`].
    pub fn approx_eq(&self, other: &Measurement) -> bool {
        equals(self, other)
    }

    /// Check the value is finite and non-negative. `field` names the
    /// measurement in the error.
    pub fn validate(&self, field: &str) -> ThriftResult<()> {
        if self.value.is_finite() && self.value >= 0.0 {
            Ok(())
        } else {
            Err(ThriftError::invalid_input(
                field,
                format!("{} {}", self.value, self.unit),
                "Measurements must be finite and non-negative",
            ))
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format(self))
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Number token followed by an optional unit suffix
static MEASUREMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^([\d\s/]*?)\s*("|in|mm)?$"#).expect("measurement regex is valid"));

static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)$").expect("integer regex is valid"));

static FRACTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)/(\d+)$").expect("fraction regex is valid"));

static MIXED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s+(\d+)/(\d+)$").expect("mixed number regex is valid"));

/// Parse human input into a measurement.
///
/// Accepts an integer (`19`), a fraction (`3/4`) or a mixed number
/// (`1 1/2`), optionally followed by `"`, `in` or `mm`. Without a suffix the
/// `preferred` unit is used.
///
/// Returns `None` for anything else, including decimals, negative numbers,
/// malformed fractions and a zero denominator. `None` means "not a valid
/// measurement yet", which is the normal state while a user is typing.
///
/// # Example
///
/// ```rust
/// use thrift_core::units::{parse, Measurement, Unit};
///
/// assert_eq!(parse("1 1/2", Unit::Inch), Some(Measurement::inches(1.5)));
/// assert_eq!(parse("19", Unit::Millimetre), Some(Measurement::millimetres(19.0)));
/// assert_eq!(parse("1.5", Unit::Inch), None);
/// ```
pub fn parse(text: &str, preferred: Unit) -> Option<Measurement> {
    let caps = MEASUREMENT_RE.captures(text.trim())?;
    let number = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
    let unit = match caps.get(2) {
        Some(suffix) => Unit::from_suffix(suffix.as_str())?,
        None => preferred,
    };

    let value = parse_number(number)?;
    Some(Measurement::new(ratio_to_f64(&value), unit))
}

/// Evaluate an integer, fraction or mixed-number token exactly
fn parse_number(token: &str) -> Option<Ratio<u64>> {
    if let Some(caps) = INTEGER_RE.captures(token) {
        let whole: u64 = caps[1].parse().ok()?;
        return Some(Ratio::from_integer(whole));
    }

    if let Some(caps) = FRACTION_RE.captures(token) {
        return fraction(&caps[1], &caps[2]);
    }

    if let Some(caps) = MIXED_RE.captures(token) {
        let whole: u64 = caps[1].parse().ok()?;
        let fraction = fraction(&caps[2], &caps[3])?;
        return Ratio::from_integer(whole).checked_add(&fraction);
    }

    None
}

fn fraction(numerator: &str, denominator: &str) -> Option<Ratio<u64>> {
    let numerator: u64 = numerator.parse().ok()?;
    let denominator: u64 = denominator.parse().ok()?;
    if denominator == 0 {
        return None;
    }
    Some(Ratio::new(numerator, denominator))
}

fn ratio_to_f64(ratio: &Ratio<u64>) -> f64 {
    *ratio.numer() as f64 / *ratio.denom() as f64
}

// ============================================================================
// Formatting
// ============================================================================

/// Format a measurement for display at the default imperial precision.
///
/// - Millimetres: rounded to the whole millimetre, `"19 mm"`
/// - Inches: reduced fraction, mixed when at least one inch, `"1 1/2\""`
///
/// # Panics
///
/// Panics if the value is negative or not finite. Measurements come from
/// [`parse`] or from validated state, so this is an invariant violation.
pub fn format(m: &Measurement) -> String {
    format_with_precision(m, ImperialPrecision::default())
}

/// Format a measurement, rounding inch values to the given precision.
pub fn format_with_precision(m: &Measurement, precision: ImperialPrecision) -> String {
    assert!(
        m.value.is_finite() && m.value >= 0.0,
        "measurement value must be finite and non-negative, got {} {}",
        m.value,
        m.unit
    );

    match m.unit.family() {
        UnitFamily::Metric => format!("{} {}", m.value.round() as u64, m.unit.suffix()),
        UnitFamily::Imperial => format!("{}{}", format_fraction(m.value, precision), m.unit.suffix()),
    }
}

fn format_fraction(value: f64, precision: ImperialPrecision) -> String {
    let steps = (value * precision.denominator() as f64).round() as u64;
    let ratio = Ratio::new(steps, precision.denominator());
    let whole = ratio.to_integer();
    let fract = ratio.fract();

    match (whole, *fract.numer()) {
        (whole, 0) => whole.to_string(),
        (0, numer) => format!("{}/{}", numer, fract.denom()),
        (whole, numer) => format!("{} {}/{}", whole, numer, fract.denom()),
    }
}

// ============================================================================
// Conversion and comparison
// ============================================================================

/// Convert a measurement to another unit.
///
/// The rate for the ordered pair is derived from each unit's length in
/// millimetres (inch to mm is x25.4). Converting to the same unit returns the
/// value unchanged.
pub fn convert(m: &Measurement, target: Unit) -> Measurement {
    if m.unit == target {
        return *m;
    }
    let rate = m.unit.mm_per_unit() / target.mm_per_unit();
    Measurement::new(m.value * rate, target)
}

/// Compare two measurements within the tolerance of the second one's unit.
///
/// `a` is converted to `b`'s unit first. Values are equal when their absolute
/// difference is strictly less than 1/32" (inch) or 1 mm (millimetre).
pub fn equals(a: &Measurement, b: &Measurement) -> bool {
    let a = convert(a, b.unit);
    (a.value - b.value).abs() < b.unit.tolerance()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("3/4\"", Unit::Millimetre, Measurement::inches(0.75))]
    #[case("19", Unit::Millimetre, Measurement::millimetres(19.0))]
    #[case("1 1/2", Unit::Inch, Measurement::inches(1.5))]
    #[case("  5 1/2\"  ", Unit::Millimetre, Measurement::inches(5.5))]
    #[case("19 mm", Unit::Inch, Measurement::millimetres(19.0))]
    #[case("19mm", Unit::Inch, Measurement::millimetres(19.0))]
    #[case("36 in", Unit::Millimetre, Measurement::inches(36.0))]
    #[case("0", Unit::Inch, Measurement::inches(0.0))]
    #[case("6/4", Unit::Inch, Measurement::inches(1.5))]
    #[case("2   3/8", Unit::Inch, Measurement::inches(2.375))]
    fn test_parse_valid(#[case] text: &str, #[case] preferred: Unit, #[case] expected: Measurement) {
        assert_eq!(parse(text, preferred), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\"")]
    #[case("1.5")]
    #[case("-3")]
    #[case("3/")]
    #[case("/4")]
    #[case("1//2")]
    #[case("1/0")]
    #[case("1 2")]
    #[case("1 1/2 1/4")]
    #[case("3/4 1")]
    #[case("abc")]
    #[case("19 cm")]
    #[case("19 mm\"")]
    fn test_parse_rejects(#[case] text: &str) {
        assert_eq!(parse(text, Unit::Inch), None);
    }

    #[rstest]
    #[case(Measurement::millimetres(19.4), "19 mm")]
    #[case(Measurement::millimetres(19.5), "20 mm")]
    #[case(Measurement::millimetres(0.0), "0 mm")]
    #[case(Measurement::inches(0.75), "3/4\"")]
    #[case(Measurement::inches(1.5), "1 1/2\"")]
    #[case(Measurement::inches(2.0), "2\"")]
    #[case(Measurement::inches(0.0), "0\"")]
    #[case(Measurement::inches(5.0 / 64.0), "5/64\"")]
    #[case(Measurement::inches(0.748), "3/4\"")]
    fn test_format(#[case] m: Measurement, #[case] expected: &str) {
        assert_eq!(format(&m), expected);
    }

    #[test]
    fn test_format_with_precision() {
        let m = Measurement::inches(0.7);
        assert_eq!(format_with_precision(&m, ImperialPrecision::ThirtySecond), "11/16\"");
        assert_eq!(format_with_precision(&m, ImperialPrecision::SixtyFourth), "45/64\"");
        // 1.99 rounds up into the next whole inch
        assert_eq!(format_with_precision(&Measurement::inches(1.99), ImperialPrecision::ThirtySecond), "2\"");
    }

    #[test]
    fn test_measurement_validate() {
        assert!(Measurement::inches(0.0).validate("thickness").is_ok());
        assert!(Measurement::millimetres(2440.0).validate("length").is_ok());

        let err = Measurement::inches(-1.0).validate("thickness").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(err.to_string().contains("thickness"));
        assert!(Measurement::millimetres(f64::NAN).validate("width").is_err());
        assert!(Measurement::millimetres(f64::INFINITY).validate("width").is_err());
    }

    #[test]
    #[should_panic(expected = "finite and non-negative")]
    fn test_format_rejects_negative() {
        format(&Measurement::inches(-1.0));
    }

    #[test]
    fn test_convert() {
        let mm = convert(&Measurement::inches(0.75), Unit::Millimetre);
        assert_eq!(mm.unit, Unit::Millimetre);
        assert!((mm.value - 19.05).abs() < 1e-9);

        let inches = convert(&Measurement::millimetres(254.0), Unit::Inch);
        assert!((inches.value - 10.0).abs() < 1e-9);

        let same = Measurement::millimetres(19.0);
        assert_eq!(convert(&same, Unit::Millimetre), same);
    }

    #[test]
    fn test_equals_across_units() {
        assert!(equals(&Measurement::inches(0.75), &Measurement::millimetres(19.05)));
        assert!(!equals(&Measurement::inches(0.75), &Measurement::millimetres(21.0)));
        assert!(equals(&Measurement::millimetres(19.05), &Measurement::inches(0.75)));
    }

    #[test]
    fn test_equals_tolerance_boundary() {
        let base = Measurement::inches(0.5);
        // exactly 1/32" apart is not equal
        assert!(!equals(&base, &Measurement::inches(0.5 + 1.0 / 32.0)));
        // just inside the tolerance is equal
        assert!(equals(&base, &Measurement::inches(0.5 + 1.0 / 32.0 - 1e-6)));

        let mm = Measurement::millimetres(19.0);
        assert!(!equals(&mm, &Measurement::millimetres(20.0)));
        assert!(equals(&mm, &Measurement::millimetres(19.9)));
    }

    #[test]
    fn test_format_parse_roundtrip() {
        let inputs = ["3/4\"", "1 1/2\"", "17/64\"", "96\"", "19 mm", "2440 mm", "7", "5/8", "3 3/16"];
        for preferred in Unit::ALL {
            for input in inputs {
                let m = parse(input, preferred).unwrap();
                let formatted = format(&m);
                // the formatted string carries its unit, so the preferred unit is irrelevant
                for reparse_unit in Unit::ALL {
                    let reparsed = parse(&formatted, reparse_unit).unwrap();
                    assert_eq!(reparsed.unit, m.unit, "{input} -> {formatted}");
                    assert!(equals(&reparsed, &m), "{input} -> {formatted}");
                }
            }
        }
    }

    #[test]
    fn test_roundtrip_at_every_precision() {
        let inputs = ["1/32\"", "3 3/32\"", "1/64\"", "7/64\"", "11 63/64\"", "19 mm"];
        for precision in ImperialPrecision::ALL {
            for input in inputs {
                let m = parse(input, Unit::Inch).unwrap();
                let formatted = format_with_precision(&m, precision);
                let reparsed = parse(&formatted, Unit::Inch).unwrap();
                assert!(equals(&reparsed, &m), "{input} at {} -> {formatted}", precision.display_name());
            }
        }
        // worst case: an odd 1/64 rounds by half a 1/32 step
        let m = Measurement::inches(45.0 / 64.0);
        for precision in ImperialPrecision::ALL {
            let reparsed = parse(&format_with_precision(&m, precision), Unit::Inch).unwrap();
            assert!(equals(&reparsed, &m));
        }
    }

    #[test]
    fn test_conversion_roundtrip() {
        for m in [Measurement::inches(0.75), Measurement::inches(96.0), Measurement::millimetres(19.0)] {
            let other = match m.unit {
                Unit::Inch => Unit::Millimetre,
                Unit::Millimetre => Unit::Inch,
            };
            let back = convert(&convert(&m, other), m.unit);
            assert!(equals(&back, &m));
        }
    }

    #[test]
    fn test_unit_serialization() {
        assert_eq!(serde_json::to_string(&Unit::Inch).unwrap(), "\"inch\"");
        assert_eq!(serde_json::to_string(&Unit::Millimetre).unwrap(), "\"mm\"");
        assert!(serde_json::from_str::<Unit>("\"furlong\"").is_err());

        let m: Measurement = serde_json::from_str(r#"{"unit":"mm","value":19}"#).unwrap();
        assert_eq!(m, Measurement::millimetres(19.0));
    }

    #[test]
    fn test_unit_from_str() {
        assert_eq!("inch".parse::<Unit>().unwrap(), Unit::Inch);
        assert_eq!("MM".parse::<Unit>().unwrap(), Unit::Millimetre);
        assert!("cm".parse::<Unit>().is_err());
        assert_eq!("1/32".parse::<ImperialPrecision>().unwrap(), ImperialPrecision::ThirtySecond);
        assert_eq!("64".parse::<ImperialPrecision>().unwrap(), ImperialPrecision::SixtyFourth);
        assert!("16".parse::<ImperialPrecision>().is_err());
    }
}
