//! Arithmetic over resolved numeric operands.
//!
//! [§ 10.9 Type Checking](https://www.w3.org/TR/css-values-4/#calc-type-checking)
//!
//! Every function here first resolves its operands. An unavailable operand
//! makes the result unavailable; a non-numeric one is a hard error.

use std::borrow::Cow;

use crate::context::CssContext;
use crate::error::CssError;
use crate::node::{MinMaxKind, MinMaxNode, Node, Numeric, ProductNode, ProductOp, RandNode, SumNode};
use crate::units::NumericKind;

/// `left + right` and `left - right`.
///
/// STEP 1: Operands of different kinds are only allowed when one of them is
///         a percentage, which is then resolved against the other's kind.
/// STEP 2: Operands in different units are both normalized.
/// STEP 3: The result keeps the left operand's unit.
pub(crate) fn sum(
    node: &SumNode,
    context: &dyn CssContext,
    normalize: bool,
) -> Result<Option<Numeric>, CssError> {
    let Some((mut left, mut right)) = resolve_pair(&node.left, &node.right, context, normalize)?
    else {
        return Ok(None);
    };

    // STEP 1
    if left.kind() != right.kind() {
        if left.kind() == NumericKind::Percent {
            left = right.calc_percent(left.num(), context)?;
        } else if right.kind() == NumericKind::Percent {
            right = left.calc_percent(right.num(), context)?;
        } else {
            return Err(CssError::TypeMismatch);
        }
    }

    // STEP 2
    let (left, right) = unify_units(left, right, context)?;

    // STEP 3
    Ok(Some(
        left.create_same_units(left.num() + node.op.sign() * right.num()),
    ))
}

/// `left * right` and `left / right`.
///
/// For `*` one side must be a plain number and the other supplies the unit.
/// For `/` the right side must be a plain number. A non-finite result, as
/// from dividing by zero, is unavailable rather than an error.
pub(crate) fn product(
    node: &ProductNode,
    context: &dyn CssContext,
    normalize: bool,
) -> Result<Option<Numeric>, CssError> {
    let Some((left, right)) = resolve_pair(&node.left, &node.right, context, normalize)? else {
        return Ok(None);
    };
    let (base, multiplier) = match node.op {
        ProductOp::Mul if left.kind() == NumericKind::Number => (right, left.num()),
        ProductOp::Mul if right.kind() == NumericKind::Number => (left, right.num()),
        ProductOp::Mul => return Err(CssError::MultiplicationNeedsNumber),
        ProductOp::Div if right.kind() == NumericKind::Number => (left, 1.0 / right.num()),
        ProductOp::Div => return Err(CssError::DenominatorNotNumber),
    };
    let num = base.num() * multiplier;
    if !num.is_finite() {
        return Ok(None);
    }
    Ok(Some(base.create_same_units(num)))
}

/// `min()`, `max()` and `clamp()` through one reduction.
///
/// STEP 1: Resolve every argument.
/// STEP 2: Resolve percentages against the first non-percentage argument,
///         which anchors the result's kind and unit.
/// STEP 3: Require one kind, and normalize when units differ.
/// STEP 4: Reduce.
pub(crate) fn min_max(
    node: &MinMaxNode,
    context: &dyn CssContext,
    normalize: bool,
) -> Result<Option<Numeric>, CssError> {
    // The fields are public, so a node may not have gone through `Node::min_max`.
    node.kind.check_arity(node.args.len())?;

    // STEP 1
    let mut values = Vec::with_capacity(node.args.len());
    for arg in &node.args {
        let Some(value) = arg.resolve(context, normalize)? else {
            return Ok(None);
        };
        let Some(numeric) = into_numeric(value) else {
            return Err(CssError::ArgumentsNotNumeric(node.kind.into()));
        };
        values.push(numeric);
    }

    // STEP 2
    let anchor = values
        .iter()
        .position(|value| value.kind() != NumericKind::Percent)
        .unwrap_or(0);
    if values[anchor].kind() != NumericKind::Percent {
        let base = values[anchor].clone();
        for value in &mut values {
            if value.kind() == NumericKind::Percent {
                *value = base.calc_percent(value.num(), context)?;
            }
        }

        // STEP 3
        if values.iter().any(|value| value.kind() != base.kind()) {
            return Err(CssError::TypeMismatch);
        }
        if values.iter().any(|value| value.units() != base.units()) {
            for value in &mut values {
                *value = value.norm(context)?.into_owned();
            }
        }
    }

    // STEP 4
    let nums = values.iter().map(Numeric::num);
    let num = match node.kind {
        MinMaxKind::Min => nums.fold(f64::INFINITY, f64::min),
        MinMaxKind::Max => nums.fold(f64::NEG_INFINITY, f64::max),
        MinMaxKind::Clamp => {
            let (lower, preferred, upper) = (values[0].num(), values[1].num(), values[2].num());
            lower.max(upper.min(preferred))
        }
    };
    Ok(Some(values[anchor].create_same_units(num)))
}

/// `rand()` and `rand(left, right)`.
///
/// The bounded form interpolates `min * (1 - r) + max * r` and keeps the
/// left bound's unit.
pub(crate) fn rand(
    node: &RandNode,
    context: &dyn CssContext,
    normalize: bool,
) -> Result<Option<Numeric>, CssError> {
    let Some(bounds) = &node.bounds else {
        return Ok(Some(Numeric::number(context.random())));
    };
    let (left, right) = bounds.as_ref();
    let Some((left, right)) = resolve_pair(left, right, context, normalize)? else {
        return Ok(None);
    };
    if left.kind() != right.kind() {
        return Err(CssError::TypeMismatch);
    }
    let (left, right) = unify_units(left, right, context)?;
    let min = left.num().min(right.num());
    let max = left.num().max(right.num());
    let r = context.random();
    Ok(Some(left.create_same_units(min * (1.0 - r) + max * r)))
}

/// Resolve both operands of a binary operation.
///
/// Both are resolved before either is checked, so an error on the right is
/// raised even when the left is unavailable.
fn resolve_pair(
    left: &Node,
    right: &Node,
    context: &dyn CssContext,
    normalize: bool,
) -> Result<Option<(Numeric, Numeric)>, CssError> {
    let left = left.resolve(context, normalize)?;
    let right = right.resolve(context, normalize)?;
    let (Some(left), Some(right)) = (left, right) else {
        return Ok(None);
    };
    match (into_numeric(left), into_numeric(right)) {
        (Some(left), Some(right)) => Ok(Some((left, right))),
        _ => Err(CssError::NotNumeric),
    }
}

/// Normalize both values when their units differ.
fn unify_units(
    left: Numeric,
    right: Numeric,
    context: &dyn CssContext,
) -> Result<(Numeric, Numeric), CssError> {
    if left.units() == right.units() {
        return Ok((left, right));
    }
    let left = left.norm(context)?.into_owned();
    let right = right.norm(context)?.into_owned();
    Ok((left, right))
}

fn into_numeric(node: Cow<'_, Node>) -> Option<Numeric> {
    match node.into_owned() {
        Node::Numeric(numeric) => Some(numeric),
        _ => None,
    }
}
