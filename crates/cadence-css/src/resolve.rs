//! The resolution protocol: turning a variable tree into a constant one.
//!
//! [`Node::resolve`] is the single entry point. A constant node resolves to
//! itself, borrowed, so callers can detect "no change" with
//! [`std::ptr::eq`]. Anything else is recomputed bottom-up against a
//! [`CssContext`].
//!
//! `Ok(None)` means the value is unavailable right now. It is not an error
//! and it always propagates: a composite with one unavailable child is
//! unavailable as a whole.

use std::borrow::Cow;

use crate::calc;
use crate::context::{CssContext, Dimension, with_dimension};
use crate::error::CssError;
use crate::node::{Node, RectField};

/// The result of resolving a node: a constant node, or `None` when a
/// dependency is unavailable.
pub type Resolved<'a> = Option<Cow<'a, Node>>;

impl Node {
    /// Resolve the node against `context`.
    ///
    /// With `normalize`, numeric values are additionally converted to their
    /// canonical unit (`px`, `rad`, `ms`) and percentages are resolved against
    /// the current dimension.
    ///
    /// # Errors
    ///
    /// Structural problems abort resolution: mismatched operand types,
    /// unsupported units, recursive variables, missing targets.
    pub fn resolve<'a>(
        &'a self,
        context: &dyn CssContext,
        normalize: bool,
    ) -> Result<Resolved<'a>, CssError> {
        if self.is_const(normalize) {
            return Ok(Some(Cow::Borrowed(self)));
        }
        self.compute(context, normalize)
    }

    /// Compute the value of a non-constant node.
    fn compute<'a>(
        &'a self,
        context: &dyn CssContext,
        normalize: bool,
    ) -> Result<Resolved<'a>, CssError> {
        let node = match self {
            Self::Passthrough(_) => return Ok(Some(Cow::Borrowed(self))),
            Self::Url(url) => {
                let resolved = context.resolve_url(url)?;
                // A passthrough, so the result is not resolved again as a url.
                Self::Passthrough(format!("url(\"{resolved}\")"))
            }
            Self::Numeric(numeric) => {
                if !normalize {
                    return Ok(Some(Cow::Borrowed(self)));
                }
                match numeric.norm(context)? {
                    Cow::Borrowed(_) => return Ok(Some(Cow::Borrowed(self))),
                    Cow::Owned(normalized) => Self::Numeric(normalized),
                }
            }
            Self::Concat(concat) => {
                let Some(nodes) = resolve_array(&concat.nodes, &concat.dimensions, context, normalize)?
                else {
                    return Ok(None);
                };
                Self::concat_of(nodes)
            }
            Self::Func(func) => {
                let Some(args) = resolve_array(&func.args, &func.dimensions, context, normalize)?
                else {
                    return Ok(None);
                };
                Self::func(&func.name, args)
            }
            Self::Rect(rect) => {
                let bounds = match &rect.selector {
                    Some(selector) => context.element_rect(selector, rect.method)?,
                    None => context.current_element_rect()?,
                };
                let side = match rect.field {
                    RectField::Width => bounds.width,
                    RectField::Height => bounds.height,
                    RectField::X => bounds.x,
                    RectField::Y => bounds.y,
                };
                Self::length(side, "px")
            }
            Self::NumConvert(value) => {
                let Some(value) = value.resolve(context, normalize)? else {
                    return Ok(None);
                };
                let num = match value.as_numeric() {
                    Some(numeric) => Some(numeric.num()),
                    None => parse_leading_float(&value.css()?),
                };
                match num {
                    Some(num) if !num.is_nan() => Self::number(num),
                    _ => return Ok(None),
                }
            }
            Self::Rand(rand) => match calc::rand(rand, context, normalize)? {
                Some(numeric) => Self::Numeric(numeric),
                None => return Ok(None),
            },
            #[allow(clippy::cast_precision_loss)]
            Self::Index => Self::number(context.current_index()? as f64),
            #[allow(clippy::cast_precision_loss)]
            Self::TargetLength => Self::number(context.target_length()? as f64),
            Self::Var(var) => {
                if let Some(value) = context.get_var(&var.name)? {
                    return Ok(value
                        .resolve(context, normalize)?
                        .map(|resolved| Cow::Owned(resolved.into_owned())));
                }
                return match &var.default {
                    Some(default) => default.resolve(context, normalize),
                    None => Ok(None),
                };
            }
            Self::Calc(expr) => return expr.resolve(context, normalize),
            Self::CalcSum(sum) => match calc::sum(sum, context, normalize)? {
                Some(numeric) => Self::Numeric(numeric),
                None => return Ok(None),
            },
            Self::CalcProduct(product) => match calc::product(product, context, normalize)? {
                Some(numeric) => Self::Numeric(numeric),
                None => return Ok(None),
            },
            Self::MinMax(min_max) => match calc::min_max(min_max, context, normalize)? {
                Some(numeric) => Self::Numeric(numeric),
                None => return Ok(None),
            },
        };
        Ok(Some(Cow::Owned(node)))
    }
}

/// Resolve children in order, pushing the tagged dimension around each of
/// the first `dimensions.len()` of them.
///
/// Returns `None` as soon as one child is unavailable.
fn resolve_array(
    nodes: &[Node],
    dimensions: &[Option<Dimension>],
    context: &dyn CssContext,
    normalize: bool,
) -> Result<Option<Vec<Node>>, CssError> {
    let mut resolved = Vec::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        let value = match dimensions.get(i) {
            Some(&dim) => with_dimension(context, dim, || node.resolve(context, normalize))?,
            None => node.resolve(context, normalize)?,
        };
        match value {
            Some(value) => resolved.push(value.into_owned()),
            None => return Ok(None),
        }
    }
    Ok(Some(resolved))
}

/// The numeric prefix of a CSS value: `"11px"` is 11, `" -2.5e1s"` is -25.
fn parse_leading_float(css: &str) -> Option<f64> {
    let text = css.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if text[end..].starts_with("Infinity") {
        return text[..end + "Infinity".len()].parse().ok();
    }
    let digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };
    let int_digits = digits(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }
    text[..end].parse().ok()
}
