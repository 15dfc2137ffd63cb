//! The expression tree.
//!
//! A [`Node`] is one, possibly still variable, CSS sub-expression. Nodes are
//! immutable once built and own their children exclusively. Literal nodes
//! serialize through [`Node::css`]; nodes that depend on run-time context
//! are turned into literal ones by [`Node::resolve`].
//!
//! [§ 10 Mathematical Expressions](https://www.w3.org/TR/css-values-4/#math)

mod numeric;

pub use numeric::Numeric;

use cadence_common::url::is_final_url;
use serde::Serialize;
use strum_macros::{AsRefStr, Display, IntoStaticStr};

use crate::context::{Dimension, SelectionMethod};
use crate::error::CssError;
use crate::units::NumericKind;

/// Function names whose presence makes a CSS value context-dependent.
const VAR_FUNCTIONS: [&str; 14] = [
    "calc", "var", "url", "rand", "index", "width", "height", "num", "length", "min", "max",
    "clamp", "x", "y",
];

/// Units that only become canonical after normalization.
const NORM_UNITS: [&str; 10] = [
    "%", "em", "rem", "vw", "vh", "vmin", "vmax", "s", "deg", "grad",
];

/// A CSS expression node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    /// Raw CSS text kept verbatim: keywords, colors, strings.
    Passthrough(String),
    /// A `url()` value. An empty URL serializes to nothing.
    Url(String),
    /// A number, percentage, length, angle or time.
    Numeric(Numeric),
    /// Space-separated values: `1s ease-in`, `10px 20px`.
    Concat(ConcatNode),
    /// A function call with comma-separated arguments: `rgb(1,2,3)`.
    Func(FuncNode),
    /// `width()`, `height()`, `x()` or `y()` of an element.
    Rect(RectNode),
    /// `num(value)`: the bare magnitude of a value.
    NumConvert(Box<Node>),
    /// `rand()` or `rand(min, max)`.
    Rand(RandNode),
    /// `index()`: the zero-based index of the current target.
    Index,
    /// `length()`: the number of targets.
    TargetLength,
    /// `var(--name[, default])`.
    Var(VarNode),
    /// `calc(expr)`.
    Calc(Box<Node>),
    /// `left + right` or `left - right` inside `calc()`.
    CalcSum(SumNode),
    /// `left * right` or `left / right` inside `calc()`.
    CalcProduct(ProductNode),
    /// `min()`, `max()` or `clamp()`.
    MinMax(MinMaxNode),
}

/// Children of a [`Node::Concat`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcatNode {
    /// The values, in order.
    pub nodes: Vec<Node>,
    /// Per-index dimension tags. Only the first `dimensions.len()` nodes are
    /// resolved with a dimension pushed; a `None` tag pushes "no dimension".
    pub dimensions: Vec<Option<Dimension>>,
}

/// A generic function call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncNode {
    /// Lower-cased function name.
    pub name: String,
    /// Arguments, in order.
    pub args: Vec<Node>,
    /// Per-argument dimension tags, as for [`ConcatNode::dimensions`].
    pub dimensions: Vec<Option<Dimension>>,
}

/// The element box field read by a [`RectNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
pub enum RectField {
    /// `width()`
    #[strum(serialize = "width")]
    Width,
    /// `height()`
    #[strum(serialize = "height")]
    Height,
    /// `x()`
    #[strum(serialize = "x")]
    X,
    /// `y()`
    #[strum(serialize = "y")]
    Y,
}

/// An element geometry query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RectNode {
    /// The field to extract.
    pub field: RectField,
    /// Element selector. `None` queries the current target.
    pub selector: Option<String>,
    /// How the selector is matched.
    pub method: Option<SelectionMethod>,
}

/// A random value, optionally between two bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RandNode {
    /// Both bounds or neither.
    pub bounds: Option<Box<(Node, Node)>>,
}

/// A custom property reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarNode {
    /// Property name, including the leading `--`.
    pub name: String,
    /// Fallback used when the property is not defined.
    pub default: Option<Box<Node>>,
}

/// Additive operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
pub enum SumOp {
    /// `+`
    #[strum(serialize = "+")]
    Add,
    /// `-`
    #[strum(serialize = "-")]
    Sub,
}

impl SumOp {
    /// The multiplier applied to the right operand.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Add => 1.0,
            Self::Sub => -1.0,
        }
    }
}

/// Multiplicative operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
pub enum ProductOp {
    /// `*`
    #[strum(serialize = "*")]
    Mul,
    /// `/`
    #[strum(serialize = "/")]
    Div,
}

/// A `calc()` sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SumNode {
    /// Left operand.
    pub left: Box<Node>,
    /// Right operand.
    pub right: Box<Node>,
    /// Operator.
    pub op: SumOp,
}

/// A `calc()` product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductNode {
    /// Left operand.
    pub left: Box<Node>,
    /// Right operand.
    pub right: Box<Node>,
    /// Operator.
    pub op: ProductOp,
}

/// The comparison function of a [`MinMaxNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr, IntoStaticStr)]
pub enum MinMaxKind {
    /// `min(a, b, ...)`
    #[strum(serialize = "min")]
    Min,
    /// `max(a, b, ...)`
    #[strum(serialize = "max")]
    Max,
    /// `clamp(min, preferred, max)`
    #[strum(serialize = "clamp")]
    Clamp,
}

impl MinMaxKind {
    /// Validate an argument count: at least one for `min` and `max`, exactly
    /// three for `clamp`.
    ///
    /// # Errors
    ///
    /// Fails with [`CssError::InvalidArity`] for any other count.
    pub fn check_arity(self, count: usize) -> Result<(), CssError> {
        let (valid, expected) = match self {
            Self::Min | Self::Max => (count > 0, "1 or more"),
            Self::Clamp => (count == 3, "3"),
        };
        if valid {
            Ok(())
        } else {
            Err(CssError::InvalidArity {
                builder: self.into(),
                expected,
                count,
            })
        }
    }
}

/// [§ 10.2 Comparison Functions](https://www.w3.org/TR/css-values-4/#comp-func)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinMaxNode {
    /// Which comparison.
    pub kind: MinMaxKind,
    /// Arguments, in order. Exactly three for `clamp`.
    pub args: Vec<Node>,
}

impl Node {
    /// A passthrough of raw CSS text.
    #[must_use]
    pub fn passthrough(css: impl Into<String>) -> Self {
        Self::Passthrough(css.into())
    }

    /// A `url()` value.
    #[must_use]
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    /// A bare number.
    #[must_use]
    pub fn number(num: f64) -> Self {
        Self::Numeric(Numeric::number(num))
    }

    /// A percentage.
    #[must_use]
    pub fn percent(num: f64) -> Self {
        Self::Numeric(Numeric::percent(num))
    }

    /// A length.
    #[must_use]
    pub fn length(num: f64, units: &str) -> Self {
        Self::Numeric(Numeric::length(num, units))
    }

    /// An angle.
    #[must_use]
    pub fn angle(num: f64, units: &str) -> Self {
        Self::Numeric(Numeric::angle(num, units))
    }

    /// A time.
    #[must_use]
    pub fn time(num: f64, units: &str) -> Self {
        Self::Numeric(Numeric::time(num, units))
    }

    /// Space-separated values without dimension tags.
    #[must_use]
    pub const fn concat_of(nodes: Vec<Self>) -> Self {
        Self::Concat(ConcatNode {
            nodes,
            dimensions: Vec::new(),
        })
    }

    /// Space-separated values with per-index dimension tags.
    #[must_use]
    pub const fn concat_with_dimensions(
        nodes: Vec<Self>,
        dimensions: Vec<Option<Dimension>>,
    ) -> Self {
        Self::Concat(ConcatNode { nodes, dimensions })
    }

    /// Join two values into one concatenation, flattening either side that
    /// already is one.
    #[must_use]
    pub fn concat(first: Self, second: Self) -> Self {
        let mut set = match first {
            Self::Concat(set) => set,
            node => ConcatNode {
                nodes: vec![node],
                dimensions: Vec::new(),
            },
        };
        match second {
            Self::Concat(other) => set.nodes.extend(other.nodes),
            node => set.nodes.push(node),
        }
        Self::Concat(set)
    }

    /// A function call. The name is lower-cased.
    #[must_use]
    pub fn func(name: &str, args: Vec<Self>) -> Self {
        Self::func_with_dimensions(name, args, Vec::new())
    }

    /// A function call with per-argument dimension tags.
    #[must_use]
    pub fn func_with_dimensions(
        name: &str,
        args: Vec<Self>,
        dimensions: Vec<Option<Dimension>>,
    ) -> Self {
        Self::Func(FuncNode {
            name: name.to_ascii_lowercase(),
            args,
            dimensions,
        })
    }

    /// An element geometry query.
    #[must_use]
    pub fn rect(field: RectField, selector: Option<String>, method: Option<SelectionMethod>) -> Self {
        Self::Rect(RectNode {
            field,
            selector,
            method,
        })
    }

    /// `num(value)`.
    #[must_use]
    pub fn num_convert(value: Self) -> Self {
        Self::NumConvert(Box::new(value))
    }

    /// `rand()`.
    #[must_use]
    pub const fn rand() -> Self {
        Self::Rand(RandNode { bounds: None })
    }

    /// `rand(left, right)`.
    #[must_use]
    pub fn rand_between(left: Self, right: Self) -> Self {
        Self::Rand(RandNode {
            bounds: Some(Box::new((left, right))),
        })
    }

    /// `var(name[, default])`.
    #[must_use]
    pub fn var(name: impl Into<String>, default: Option<Self>) -> Self {
        Self::Var(VarNode {
            name: name.into(),
            default: default.map(Box::new),
        })
    }

    /// `calc(expr)`.
    #[must_use]
    pub fn calc(expr: Self) -> Self {
        Self::Calc(Box::new(expr))
    }

    /// `left op right` for `+` and `-`.
    #[must_use]
    pub fn sum(left: Self, right: Self, op: SumOp) -> Self {
        Self::CalcSum(SumNode {
            left: Box::new(left),
            right: Box::new(right),
            op,
        })
    }

    /// `left op right` for `*` and `/`.
    #[must_use]
    pub fn product(left: Self, right: Self, op: ProductOp) -> Self {
        Self::CalcProduct(ProductNode {
            left: Box::new(left),
            right: Box::new(right),
            op,
        })
    }

    /// `min()`, `max()` or `clamp()`.
    ///
    /// # Errors
    ///
    /// Fails with [`CssError::InvalidArity`] when `min`/`max` get no
    /// arguments or `clamp` gets anything but three.
    pub fn min_max(kind: MinMaxKind, args: Vec<Self>) -> Result<Self, CssError> {
        kind.check_arity(args.len())?;
        Ok(Self::MinMax(MinMaxNode { kind, args }))
    }

    /// The numeric payload, if this is a numeric node.
    #[must_use]
    pub const fn as_numeric(&self) -> Option<&Numeric> {
        match self {
            Self::Numeric(numeric) => Some(numeric),
            _ => None,
        }
    }

    /// Canonical CSS text.
    ///
    /// `calc()` operands are wrapped in parentheses where a flat `a op b`
    /// rendering would re-parse with different grouping, so `a - (b + c)`
    /// keeps its parentheses instead of serializing as `a - b + c`.
    ///
    /// # Errors
    ///
    /// Fails with [`CssError::NoCss`] for nodes that only exist in terms of
    /// run-time context (`width()`, `num()`, `rand()`, `index()`, `length()`),
    /// including when nested inside another node.
    pub fn css(&self) -> Result<String, CssError> {
        Ok(match self {
            Self::Passthrough(css) => css.clone(),
            Self::Url(url) if url.is_empty() => String::new(),
            Self::Url(url) => format!("url(\"{url}\")"),
            Self::Numeric(numeric) => numeric.css(),
            Self::Concat(concat) => join_css(&concat.nodes, " ")?,
            Self::Func(func) => format!("{}({})", func.name, join_css(&func.args, ",")?),
            Self::Rect(_) | Self::NumConvert(_) | Self::Rand(_) | Self::Index | Self::TargetLength => {
                return Err(CssError::NoCss);
            }
            Self::Var(var) => match &var.default {
                Some(default) => format!("var({},{})", var.name, default.css()?),
                None => format!("var({})", var.name),
            },
            Self::Calc(expr) => format!("calc({})", expr.css()?),
            Self::CalcSum(sum) => format!(
                "{} {} {}",
                sum.left.css()?,
                sum.op,
                operand_css(&sum.right, |node| matches!(node, Self::CalcSum(_)))?
            ),
            Self::CalcProduct(product) => format!(
                "{} {} {}",
                operand_css(&product.left, |node| matches!(node, Self::CalcSum(_)))?,
                product.op,
                operand_css(&product.right, |node| {
                    matches!(node, Self::CalcSum(_) | Self::CalcProduct(_))
                })?
            ),
            Self::MinMax(min_max) => format!("{}({})", min_max.kind, join_css(&min_max.args, ",")?),
        })
    }

    /// Whether the node is already fully resolved.
    ///
    /// With `normalize`, numeric values must also be in their canonical
    /// unit, and percentages are never constant.
    #[must_use]
    pub fn is_const(&self, normalize: bool) -> bool {
        match self {
            Self::Passthrough(_) => true,
            Self::Url(url) => url.is_empty() || is_final_url(url),
            Self::Numeric(numeric) => !normalize || numeric.is_norm(),
            Self::Concat(concat) => concat.nodes.iter().all(|node| node.is_const(normalize)),
            Self::Func(func) => func.args.iter().all(|node| node.is_const(normalize)),
            Self::Rect(_)
            | Self::NumConvert(_)
            | Self::Rand(_)
            | Self::Index
            | Self::TargetLength
            | Self::Var(_)
            | Self::Calc(_)
            | Self::CalcSum(_)
            | Self::CalcProduct(_)
            | Self::MinMax(_) => false,
        }
    }

    /// The value as a plain number: the number itself, or infinity for the
    /// `infinity` and `infinite` keywords.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Numeric(numeric) if numeric.kind() == NumericKind::Number => Some(numeric.num()),
            Self::Passthrough(css)
                if css.eq_ignore_ascii_case("infinity") || css.eq_ignore_ascii_case("infinite") =>
            {
                Some(f64::INFINITY)
            }
            _ => None,
        }
    }

    /// The value as milliseconds: a time converted to `ms`, or a plain
    /// number taken as-is.
    ///
    /// # Errors
    ///
    /// Fails with [`CssError::UnknownUnits`] for a time in an unknown unit.
    pub fn as_millis(&self) -> Result<Option<f64>, CssError> {
        match self {
            Self::Numeric(numeric) => match numeric.kind() {
                NumericKind::Time => numeric.millis().map(Some),
                NumericKind::Number => Ok(Some(numeric.num())),
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }
}

impl From<Numeric> for Node {
    fn from(numeric: Numeric) -> Self {
        Self::Numeric(numeric)
    }
}

fn join_css(nodes: &[Node], separator: &str) -> Result<String, CssError> {
    let parts = nodes.iter().map(Node::css).collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join(separator))
}

/// An operand of a `calc()` operator, parenthesized where the text would
/// otherwise re-parse with a different grouping.
fn operand_css(node: &Node, needs_parens: impl Fn(&Node) -> bool) -> Result<String, CssError> {
    if needs_parens(node) {
        Ok(format!("({})", node.css()?))
    } else {
        node.css()
    }
}

/// Whether a CSS value needs to go through parsing and resolution at all.
///
/// True when the text calls a context-dependent function, or, when
/// `normalize` is requested, contains a number in a non-canonical unit.
#[must_use]
pub fn is_var_css(css: &str, normalize: bool) -> bool {
    let lower = css.to_ascii_lowercase();
    if calls_var_function(&lower) {
        return true;
    }
    normalize
        && lower.char_indices().any(|(i, c)| {
            c.is_ascii_digit() && NORM_UNITS.iter().any(|unit| lower[i + 1..].starts_with(unit))
        })
}

/// Scan every `name(` in the text, comparing the identifier that ends at the
/// parenthesis against [`VAR_FUNCTIONS`].
fn calls_var_function(lower: &str) -> bool {
    let bytes = lower.as_bytes();
    lower.match_indices('(').any(|(open, _)| {
        let start = bytes[..open]
            .iter()
            .rposition(|&b| !(b.is_ascii_alphanumeric() || b == b'-' || b == b'_'))
            .map_or(0, |i| i + 1);
        VAR_FUNCTIONS.contains(&&lower[start..open])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_func_name_lowercased() {
        let node = Node::func("RGB", vec![Node::number(1.0), Node::number(2.0), Node::number(3.0)]);
        assert_eq!(node.css().unwrap(), "rgb(1,2,3)");
    }

    #[test]
    fn test_concat_css_space_joined() {
        let node = Node::concat_of(vec![Node::time(1.0, "s"), Node::passthrough("ease-in")]);
        assert_eq!(node.css().unwrap(), "1s ease-in");
    }

    #[test]
    fn test_concat_flattens() {
        let left = Node::concat_of(vec![Node::number(1.0), Node::number(2.0)]);
        let right = Node::concat_of(vec![Node::number(3.0)]);
        let joined = Node::concat(Node::concat(left, right), Node::number(4.0));
        assert_eq!(joined.css().unwrap(), "1 2 3 4");
    }

    #[test]
    fn test_url_css() {
        assert_eq!(Node::url("").css().unwrap(), "");
        assert_eq!(
            Node::url("https://acme.org/a.png").css().unwrap(),
            "url(\"https://acme.org/a.png\")"
        );
    }

    #[test]
    fn test_url_const_only_when_final() {
        assert!(Node::url("").is_const(false));
        assert!(Node::url("HTTPS://acme.org/").is_const(false));
        assert!(Node::url("data:abc").is_const(true));
        assert!(!Node::url("/img.png").is_const(false));
        assert!(!Node::url("http://acme.org/").is_const(false));
    }

    #[test]
    fn test_context_nodes_have_no_css() {
        let nodes = [
            Node::rect(RectField::Width, None, None),
            Node::num_convert(Node::number(1.0)),
            Node::rand(),
            Node::Index,
            Node::TargetLength,
        ];
        for node in nodes {
            assert!(node.css().unwrap_err().is_no_css());
        }
        let nested = Node::func("translatex", vec![Node::Index]);
        assert!(nested.css().unwrap_err().is_no_css());
    }

    #[test]
    fn test_var_css() {
        assert_eq!(Node::var("--x", None).css().unwrap(), "var(--x)");
        assert_eq!(
            Node::var("--x", Some(Node::length(10.0, "px"))).css().unwrap(),
            "var(--x,10px)"
        );
    }

    #[test]
    fn test_calc_css() {
        let sum = Node::sum(Node::length(80.0, "vw"), Node::length(30.0, "em"), SumOp::Sub);
        assert_eq!(Node::calc(sum.clone()).css().unwrap(), "calc(80vw - 30em)");
        let product = Node::product(sum, Node::number(2.0), ProductOp::Mul);
        assert_eq!(product.css().unwrap(), "(80vw - 30em) * 2");
        let nested = Node::sum(
            Node::length(1.0, "px"),
            Node::sum(Node::length(2.0, "px"), Node::length(3.0, "px"), SumOp::Add),
            SumOp::Sub,
        );
        assert_eq!(nested.css().unwrap(), "1px - (2px + 3px)");
        let divided = Node::product(
            Node::length(8.0, "px"),
            Node::product(Node::number(2.0), Node::number(2.0), ProductOp::Mul),
            ProductOp::Div,
        );
        assert_eq!(divided.css().unwrap(), "8px / (2 * 2)");
    }

    #[test]
    fn test_min_max_css_and_arity() {
        let clamp = Node::min_max(
            MinMaxKind::Clamp,
            vec![
                Node::length(100.0, "px"),
                Node::length(200.0, "px"),
                Node::length(300.0, "px"),
            ],
        )
        .unwrap();
        assert_eq!(clamp.css().unwrap(), "clamp(100px,200px,300px)");
        assert!(matches!(
            Node::min_max(MinMaxKind::Clamp, vec![Node::number(1.0)]),
            Err(CssError::InvalidArity { count: 1, .. })
        ));
        assert!(Node::min_max(MinMaxKind::Min, vec![]).is_err());
    }

    #[test]
    fn test_numeric_const_rules() {
        assert!(Node::number(1.0).is_const(true));
        assert!(Node::percent(10.0).is_const(false));
        assert!(!Node::percent(10.0).is_const(true));
        assert!(Node::length(1.0, "EM").is_const(false));
        assert!(!Node::length(1.0, "em").is_const(true));
        assert!(Node::length(1.0, "px").is_const(true));
        assert!(Node::angle(1.0, "rad").is_const(true));
        assert!(!Node::time(1.0, "s").is_const(true));
    }

    #[test]
    fn test_units_lowercased() {
        assert_eq!(Node::length(2.0, "EM").css().unwrap(), "2em");
    }

    #[test]
    fn test_as_number() {
        assert_eq!(Node::number(5.0).as_number(), Some(5.0));
        assert_eq!(Node::passthrough("Infinite").as_number(), Some(f64::INFINITY));
        assert_eq!(Node::length(5.0, "px").as_number(), None);
        assert_eq!(Node::Index.as_number(), None);
    }

    #[test]
    fn test_as_millis() {
        assert_eq!(Node::time(2.0, "s").as_millis().unwrap(), Some(2000.0));
        assert_eq!(Node::number(15.0).as_millis().unwrap(), Some(15.0));
        assert_eq!(Node::length(1.0, "px").as_millis().unwrap(), None);
        assert!(Node::time(1.0, "h").as_millis().is_err());
    }

    #[test]
    fn test_is_var_css() {
        assert!(is_var_css("calc(10px)", false));
        assert!(is_var_css("translateX(VAR(--x))", false));
        assert!(is_var_css("rand(1, 2)", false));
        assert!(!is_var_css("translateX(10px)", false));
        assert!(!is_var_css("rgb(1,2,3)", false));
        assert!(!is_var_css("10%", false));
        assert!(is_var_css("10%", true));
        assert!(is_var_css("2EM", true));
        assert!(is_var_css("1s", true));
        assert!(!is_var_css("10px", true));
        assert!(!is_var_css("matrix(1,0,0,1,0,0)", true));
    }
}
