//! Numeric unit model per [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/).
//!
//! Every numeric value belongs to one quantity kind. Lengths, angles and
//! times each have a canonical unit that normalization converts to:
//!
//! | Kind | Tag | Canonical unit | Convertible units |
//! |------|-----|----------------|-------------------|
//! | `<number>` | `NUM` | - | - |
//! | `<percentage>` | `PRC` | - | resolved against a dimension |
//! | `<length>` | `LEN` | `px` | em, rem, vw, vh, vmin, vmax |
//! | `<angle>` | `ANG` | `rad` | deg, grad |
//! | `<time>` | `TME` | `ms` | s |
//!
//! Absolute length units (cm, mm, q, in, pc, pt) are recognized but cannot
//! be normalized.

use std::f64::consts::PI;

use serde::Serialize;
use strum_macros::{AsRefStr, Display};

/// User agent default font size.
///
/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
///
/// "Initial: medium" - we define medium as 16px per common browser convention.
pub const DEFAULT_FONT_SIZE_PX: f64 = 16.0;

/// [§ 7.1 Angle Units](https://www.w3.org/TR/css-values-4/#angles)
/// "There are 360 degrees in a full circle."
pub const DEG_TO_RAD: f64 = (2.0 * PI) / 360.0;

/// [§ 7.1 Angle Units](https://www.w3.org/TR/css-values-4/#angles)
/// "There are 400 gradians in a full circle."
pub const GRAD_TO_RAD: f64 = PI / 200.0;

/// [§ 7.2 Duration Units](https://www.w3.org/TR/css-values-4/#time)
pub const MILLIS_PER_SECOND: f64 = 1000.0;

/// Units parsed as `<length>`.
pub const LENGTH_UNITS: [&str; 13] = [
    "px", "em", "rem", "vw", "vh", "vmin", "vmax", "cm", "mm", "q", "in", "pc", "pt",
];

/// Units parsed as `<angle>`.
pub const ANGLE_UNITS: [&str; 3] = ["deg", "rad", "grad"];

/// Units parsed as `<time>`.
pub const TIME_UNITS: [&str; 2] = ["s", "ms"];

/// The quantity kind of a numeric value.
///
/// The kind is fixed for the lifetime of a value and selects the arithmetic
/// rules that apply to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
pub enum NumericKind {
    /// A bare `<number>`.
    #[strum(serialize = "NUM")]
    Number,
    /// A `<percentage>`.
    #[strum(serialize = "PRC")]
    Percent,
    /// A `<length>`.
    #[strum(serialize = "LEN")]
    Length,
    /// An `<angle>`.
    #[strum(serialize = "ANG")]
    Angle,
    /// A `<time>`.
    #[strum(serialize = "TME")]
    Time,
}

impl NumericKind {
    /// The unit normalization converts to, if the kind has one.
    #[must_use]
    pub const fn canonical_unit(self) -> Option<&'static str> {
        match self {
            Self::Length => Some("px"),
            Self::Angle => Some("rad"),
            Self::Time => Some("ms"),
            Self::Number | Self::Percent => None,
        }
    }

    /// Classify a dimension unit. Matching is ASCII case-insensitive.
    ///
    /// Returns `None` for units outside the supported kinds, which the
    /// parser keeps as opaque text.
    #[must_use]
    pub fn for_unit(unit: &str) -> Option<Self> {
        let matches = |units: &[&str]| units.iter().any(|u| u.eq_ignore_ascii_case(unit));
        if matches(&LENGTH_UNITS) {
            Some(Self::Length)
        } else if matches(&ANGLE_UNITS) {
            Some(Self::Angle)
        } else if matches(&TIME_UNITS) {
            Some(Self::Time)
        } else {
            None
        }
    }
}

/// Format a number the way CSS text expects it: integers without a
/// fractional part, no negative zero, and exponent notation only for very
/// large or very small magnitudes.
#[must_use]
pub fn format_number(num: f64) -> String {
    if num == 0.0 {
        return "0".to_string();
    }
    if num.is_nan() {
        return "NaN".to_string();
    }
    if num.is_infinite() {
        return if num > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let abs = num.abs();
    if !(1e-6..1e21).contains(&abs) {
        let exp = format!("{num:e}");
        return match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exp,
        };
    }
    num.to_string()
}
