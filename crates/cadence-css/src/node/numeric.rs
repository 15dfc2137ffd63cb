//! Numeric values and the unit normalizer.
//!
//! [§ 5 Distance Units](https://www.w3.org/TR/css-values-4/#lengths)
//! [§ 7 Other Quantities](https://www.w3.org/TR/css-values-4/#other-units)

use std::borrow::Cow;

use serde::Serialize;

use crate::context::CssContext;
use crate::error::CssError;
use crate::units::{DEG_TO_RAD, GRAD_TO_RAD, MILLIS_PER_SECOND, NumericKind, format_number};

/// A number with a quantity kind and a unit: `10`, `50%`, `2em`, `45deg`, `1s`.
///
/// Units are lower-cased at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Numeric {
    kind: NumericKind,
    num: f64,
    units: String,
}

impl Numeric {
    /// Create a value of an explicit kind.
    #[must_use]
    pub fn new(kind: NumericKind, num: f64, units: &str) -> Self {
        Self {
            kind,
            num,
            units: units.to_ascii_lowercase(),
        }
    }

    /// A bare `<number>`.
    #[must_use]
    pub fn number(num: f64) -> Self {
        Self::new(NumericKind::Number, num, "")
    }

    /// A `<percentage>`.
    #[must_use]
    pub fn percent(num: f64) -> Self {
        Self::new(NumericKind::Percent, num, "%")
    }

    /// A `<length>`.
    #[must_use]
    pub fn length(num: f64, units: &str) -> Self {
        Self::new(NumericKind::Length, num, units)
    }

    /// An `<angle>`.
    #[must_use]
    pub fn angle(num: f64, units: &str) -> Self {
        Self::new(NumericKind::Angle, num, units)
    }

    /// A `<time>`.
    #[must_use]
    pub fn time(num: f64, units: &str) -> Self {
        Self::new(NumericKind::Time, num, units)
    }

    /// The quantity kind.
    #[must_use]
    pub const fn kind(&self) -> NumericKind {
        self.kind
    }

    /// The bare numeric magnitude.
    #[must_use]
    pub const fn num(&self) -> f64 {
        self.num
    }

    /// The lower-cased unit (`""` for numbers, `"%"` for percentages).
    #[must_use]
    pub fn units(&self) -> &str {
        &self.units
    }

    /// CSS text: the number immediately followed by its unit.
    #[must_use]
    pub fn css(&self) -> String {
        format!("{}{}", format_number(self.num), self.units)
    }

    /// A sibling value of the same kind and unit.
    #[must_use]
    pub fn create_same_units(&self, num: f64) -> Self {
        Self {
            kind: self.kind,
            num,
            units: self.units.clone(),
        }
    }

    /// Whether the value is already in its canonical unit.
    ///
    /// Numbers always are. Percentages never are: they only become concrete
    /// once resolved against a dimension.
    #[must_use]
    pub fn is_norm(&self) -> bool {
        match self.kind {
            NumericKind::Number => true,
            NumericKind::Percent => false,
            kind => kind.canonical_unit() == Some(self.units.as_str()),
        }
    }

    /// Convert to the canonical unit of the kind.
    ///
    /// Returns the value itself when it is already canonical, and for a
    /// percentage when no dimension is pushed.
    ///
    /// # Errors
    ///
    /// Fails with [`CssError::UnknownUnits`] for absolute lengths and any
    /// other unit without a conversion, and when the context cannot supply a
    /// current font size.
    pub fn norm(&self, context: &dyn CssContext) -> Result<Cow<'_, Self>, CssError> {
        if self.is_norm() {
            return Ok(Cow::Borrowed(self));
        }
        let normalized = match self.kind {
            NumericKind::Percent => {
                if context.dimension().is_none() {
                    return Ok(Cow::Borrowed(self));
                }
                Self::length(0.0, "px").calc_percent(self.num, context)?
            }
            NumericKind::Length => Self::length(self.length_px(context)?, "px"),
            NumericKind::Angle => Self::angle(self.radians()?, "rad"),
            NumericKind::Time => Self::time(self.millis()?, "ms"),
            NumericKind::Number => return Ok(Cow::Borrowed(self)),
        };
        Ok(Cow::Owned(normalized))
    }

    /// [§ 5.1.1 Font-relative lengths](https://www.w3.org/TR/css-values-4/#font-relative-lengths)
    /// [§ 5.1.2 Viewport-percentage lengths](https://www.w3.org/TR/css-values-4/#viewport-relative-lengths)
    fn length_px(&self, context: &dyn CssContext) -> Result<f64, CssError> {
        let num = self.num;
        Ok(match self.units.as_str() {
            "px" => num,
            // "Equal to the computed value of the font-size property of the element"
            "em" => num * context.current_font_size()?,
            // "Equal to the computed value of font-size on the root element."
            "rem" => num * context.root_font_size(),
            "vw" | "vh" | "vmin" | "vmax" => {
                let viewport = context.viewport_size();
                let vw = viewport.width * num / 100.0;
                let vh = viewport.height * num / 100.0;
                match self.units.as_str() {
                    "vw" => vw,
                    "vh" => vh,
                    "vmin" => vw.min(vh),
                    _ => vw.max(vh),
                }
            }
            // Physical units (cm, in, ...) have no agreed px ratio here.
            units => return Err(CssError::UnknownUnits(units.to_string())),
        })
    }

    fn radians(&self) -> Result<f64, CssError> {
        match self.units.as_str() {
            "rad" => Ok(self.num),
            "deg" => Ok(self.num * DEG_TO_RAD),
            "grad" => Ok(self.num * GRAD_TO_RAD),
            units => Err(CssError::UnknownUnits(units.to_string())),
        }
    }

    /// The value of a `<time>` in milliseconds.
    ///
    /// # Errors
    ///
    /// Fails with [`CssError::UnknownUnits`] for anything but `s` and `ms`.
    pub fn millis(&self) -> Result<f64, CssError> {
        match self.units.as_str() {
            "ms" => Ok(self.num),
            "s" => Ok(self.num * MILLIS_PER_SECOND),
            units => Err(CssError::UnknownUnits(units.to_string())),
        }
    }

    /// Resolve `percent`% of this value's kind in the current context.
    ///
    /// Only lengths support this: the percentage is taken of the current
    /// element's side selected by the pushed dimension (zero when no
    /// dimension, or the depth dimension, is pushed).
    ///
    /// # Errors
    ///
    /// Fails with [`CssError::PercentUnsupported`] for other kinds, and when
    /// no target is current.
    pub fn calc_percent(&self, percent: f64, context: &dyn CssContext) -> Result<Self, CssError> {
        if self.kind != NumericKind::Length {
            return Err(CssError::PercentUnsupported(self.kind));
        }
        let dim = context.dimension();
        let rect = context.current_element_rect()?;
        Ok(Self::length(rect.side(dim) * percent / 100.0, "px"))
    }
}
