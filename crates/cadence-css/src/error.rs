//! Hard failures raised while building or resolving expressions.
//!
//! Resolution has two failure channels. A value that is merely unavailable
//! right now (missing variable, division by zero) resolves to `None` and is
//! not an error. Everything here indicates malformed input and aborts the
//! whole resolution.

use cadence_common::url::UrlError;
use thiserror::Error;

use crate::units::NumericKind;

/// A structural or type error in an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CssError {
    /// The unit cannot be converted to its canonical unit.
    #[error("unknown units: {0}")]
    UnknownUnits(String),

    /// The node depends on run-time context and has no literal CSS form.
    #[error("no css")]
    NoCss,

    /// An arithmetic operand resolved to something other than a numeric value.
    #[error("left and right must be both numerical")]
    NotNumeric,

    /// A `min()`, `max()` or `clamp()` argument resolved to a non-numeric value.
    #[error("{0}() arguments must be numerical")]
    ArgumentsNotNumeric(&'static str),

    /// Operands of different quantity kinds were combined.
    #[error("left and right must be the same type")]
    TypeMismatch,

    /// A percentage was combined with a kind it cannot be resolved against.
    #[error("cannot calculate percent for {0}")]
    PercentUnsupported(NumericKind),

    /// Neither side of `*` is a plain number.
    #[error("one of sides in multiplication must be a number")]
    MultiplicationNeedsNumber,

    /// The right side of `/` is not a plain number.
    #[error("denominator must be a number")]
    DenominatorNotNumber,

    /// A composite builder received an unsupported number of components.
    #[error("{builder} expects {expected} components, got {count}")]
    InvalidArity {
        /// The builder or function that rejected its input.
        builder: &'static str,
        /// The accepted component counts.
        expected: &'static str,
        /// The number of components received.
        count: usize,
    },

    /// A variable lookup re-entered a variable that is already being resolved.
    #[error("Recursive variable: \"{0}\"")]
    RecursiveVariable(String),

    /// A target-relative query was made while no target is current.
    #[error("Only allowed when target is specified")]
    NoTarget,

    /// An element query matched nothing.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// A `url()` failed the HTTPS-only policy.
    #[error(transparent)]
    Url(#[from] UrlError),

    /// The expression text is not well formed.
    #[error("syntax error at offset {position}: {message}")]
    Syntax {
        /// Character offset of the offending token.
        position: usize,
        /// What the parser expected.
        message: String,
    },
}

impl CssError {
    /// Whether this is the "no css" signal of a context-only node, as opposed
    /// to a genuine failure.
    #[must_use]
    pub const fn is_no_css(&self) -> bool {
        matches!(self, Self::NoCss)
    }
}
