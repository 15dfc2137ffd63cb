//! The capability surface the evaluator calls into.
//!
//! Resolution never touches a document directly. Geometry, font sizes,
//! variables and the current target all come from a [`CssContext`], which
//! the surrounding animation system implements. [`ScopedContext`] is the
//! in-crate implementation over a static document model.
//!
//! [`ScopedContext`]: crate::scope::ScopedContext

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::error::CssError;
use crate::node::Node;
use crate::random;

/// The axis a percentage or a dimension query resolves against.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum Dimension {
    /// Horizontal axis, resolved against the element width.
    #[strum(serialize = "w")]
    #[serde(rename = "w")]
    Width,
    /// Vertical axis, resolved against the element height.
    #[strum(serialize = "h")]
    #[serde(rename = "h")]
    Height,
    /// Depth axis. Elements have no depth, so percentages resolve to zero.
    #[strum(serialize = "z")]
    #[serde(rename = "z")]
    Depth,
}

/// How an element selector is matched.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum SelectionMethod {
    /// Match the closest ancestor of the current target.
    #[strum(serialize = "closest")]
    #[serde(rename = "closest")]
    Closest,
}

/// Viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in px.
    pub width: f64,
    /// Height in px.
    pub height: f64,
}

impl Size {
    /// Create a size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An element's border box in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl ElementRect {
    /// Create a rect at the origin with the given size.
    #[must_use]
    pub const fn sized(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    /// The side selected by a dimension: width for `w`, height for `h`, and
    /// zero for `z` or no dimension at all.
    #[must_use]
    pub const fn side(&self, dim: Option<Dimension>) -> f64 {
        match dim {
            Some(Dimension::Width) => self.width,
            Some(Dimension::Height) => self.height,
            Some(Dimension::Depth) | None => 0.0,
        }
    }
}

/// Run-time information an expression may depend on.
///
/// All methods take `&self`: the engine is single-threaded and the mutable
/// dimension slot is expected to live in a `Cell`. Implementations are
/// responsible for rejecting recursive variable lookups.
pub trait CssContext {
    /// Resolve a `url()` value to an absolute URL allowed for use.
    ///
    /// # Errors
    ///
    /// Fails when the resolved URL violates the HTTPS-only policy.
    fn resolve_url(&self, url: &str) -> Result<String, CssError>;

    /// The value of a custom property, or `None` if it is not defined.
    ///
    /// # Errors
    ///
    /// Fails with [`CssError::RecursiveVariable`] when `name` is already
    /// being resolved further up the stack.
    fn get_var(&self, name: &str) -> Result<Option<Node>, CssError>;

    /// Zero-based index of the current target among all selected targets.
    ///
    /// # Errors
    ///
    /// Fails when no target is current.
    fn current_index(&self) -> Result<usize, CssError>;

    /// Number of selected targets.
    ///
    /// # Errors
    ///
    /// Fails when no target is current.
    fn target_length(&self) -> Result<usize, CssError>;

    /// Font size of the current target, in px.
    ///
    /// # Errors
    ///
    /// Fails when no target is current.
    fn current_font_size(&self) -> Result<f64, CssError>;

    /// Font size of the root element, in px.
    fn root_font_size(&self) -> f64;

    /// Viewport size, in px.
    fn viewport_size(&self) -> Size;

    /// Border box of the current target.
    ///
    /// # Errors
    ///
    /// Fails when no target is current.
    fn current_element_rect(&self) -> Result<ElementRect, CssError>;

    /// Border box of the element matched by `selector`.
    ///
    /// # Errors
    ///
    /// Fails when nothing matches.
    fn element_rect(
        &self,
        selector: &str,
        method: Option<SelectionMethod>,
    ) -> Result<ElementRect, CssError>;

    /// The dimension currently pushed, if any.
    fn dimension(&self) -> Option<Dimension>;

    /// Replace the current dimension, returning the previous one.
    ///
    /// Callers go through [`with_dimension`], which restores the previous
    /// value on every exit path.
    fn replace_dimension(&self, dim: Option<Dimension>) -> Option<Dimension>;

    /// A uniform random number in `[0, 1)`.
    fn random(&self) -> f64 {
        random::uniform()
    }
}

/// Restores the previous dimension when dropped.
struct DimensionScope<'c> {
    context: &'c dyn CssContext,
    saved: Option<Dimension>,
}

impl Drop for DimensionScope<'_> {
    fn drop(&mut self) {
        let _ = self.context.replace_dimension(self.saved);
    }
}

/// Run `callback` with `dim` pushed as the current dimension.
///
/// The previous dimension is restored afterwards, including when the
/// callback returns early or unwinds.
pub fn with_dimension<T>(
    context: &dyn CssContext,
    dim: Option<Dimension>,
    callback: impl FnOnce() -> T,
) -> T {
    let _scope = DimensionScope {
        context,
        saved: context.replace_dimension(dim),
    };
    callback()
}
