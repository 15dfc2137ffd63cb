//! Constructors for box, position, shape and translate values.
//!
//! These grammars are flat lists of values whose percentages resolve against
//! different axes. Each builder attaches a parallel list of dimension tags,
//! which resolution pushes around the matching child.
//!
//! [CSS Shapes § 3.1 Basic Shapes](https://www.w3.org/TR/css-shapes-1/#basic-shape-functions)

use strum_macros::{AsRefStr, Display, EnumString};

use crate::context::Dimension;
use crate::error::CssError;
use crate::node::{ConcatNode, Node};

const W: Option<Dimension> = Some(Dimension::Width);
const H: Option<Dimension> = Some(Dimension::Height);
const Z: Option<Dimension> = Some(Dimension::Depth);

/// Top, right, bottom, left.
const BOX_DIMENSIONS: [Option<Dimension>; 4] = [H, W, H, W];

/// An `x y` coordinate pair.
const TUPLE_DIMENSIONS: [Option<Dimension>; 2] = [W, H];

/// The axis suffix of a `translate*()` function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum TranslateAxis {
    /// `translate(x, y)`
    #[strum(serialize = "")]
    Both,
    /// `translateX(x)`
    #[strum(serialize = "x")]
    X,
    /// `translateY(y)`
    #[strum(serialize = "y")]
    Y,
    /// `translateZ(z)`
    #[strum(serialize = "z")]
    Z,
    /// `translate3d(x, y, z)`
    #[strum(serialize = "3d")]
    ThreeD,
}

impl TranslateAxis {
    /// The dimension each argument resolves against.
    #[must_use]
    pub fn dimensions(self) -> Vec<Option<Dimension>> {
        match self {
            Self::Both => vec![W, H],
            Self::X => vec![W],
            Self::Y => vec![H],
            Self::Z => vec![Z],
            Self::ThreeD => vec![W, H, Z],
        }
    }
}

/// `translate*(args)` with each argument tagged by its axis.
#[must_use]
pub fn translate(axis: TranslateAxis, args: Vec<Node>) -> Node {
    Node::func_with_dimensions(&format!("translate{axis}"), args, axis.dimensions())
}

/// A margin-like shorthand of 1 to 4 components: `10%`,
/// `10% 20px`, `1px 2px 3px`, `1px 2px 3px 4px`.
///
/// Components are tagged top, right, bottom, left. A single component is
/// expanded to the two-component form so both axes get a tag.
///
/// # Errors
///
/// Fails with [`CssError::InvalidArity`] for fewer than 1 or more than 4
/// components.
pub fn box_shorthand(value: Node) -> Result<Node, CssError> {
    box_with("box", value, &BOX_DIMENSIONS)
}

fn box_with(
    builder: &'static str,
    value: Node,
    dimensions: &[Option<Dimension>],
) -> Result<Node, CssError> {
    let mut nodes = components(value);
    if nodes.is_empty() || nodes.len() > 4 {
        return Err(CssError::InvalidArity {
            builder,
            expected: "1 to 4",
            count: nodes.len(),
        });
    }
    if dimensions.is_empty() {
        return Ok(Node::concat_of(nodes));
    }
    if nodes.len() == 1 {
        nodes.push(nodes[0].clone());
    }
    let tags = dimensions[..nodes.len().min(dimensions.len())].to_vec();
    Ok(Node::concat_with_dimensions(nodes, tags))
}

/// `border-radius` syntax: `box` or `box / box`. Radii are not tagged.
///
/// # Errors
///
/// Fails when either box has an invalid number of components.
pub fn border_radius(first: Node, second: Option<Node>) -> Result<Node, CssError> {
    let first = box_with("border-radius", first, &[])?;
    match second {
        Some(second) => Ok(Node::concat_of(vec![
            first,
            Node::passthrough("/"),
            box_with("border-radius", second, &[])?,
        ])),
        None => Ok(first),
    }
}

/// A `<position>`: `10%`, `10% 20%`, or `left 10% top 20%`.
///
/// One component is horizontal, two are horizontal then vertical. In the
/// four-component form each keyword tags itself and its offset: `left` and
/// `right` horizontal, `top` and `bottom` vertical. Any other slot, such as
/// `center` or a `var()`, leaves the pair untagged.
///
/// # Errors
///
/// Fails with [`CssError::InvalidArity`] for anything but 1, 2 or 4
/// components.
pub fn position(value: Node) -> Result<Node, CssError> {
    let nodes = components(value);
    let tags = match nodes.len() {
        1 => vec![W],
        2 => vec![W, H],
        4 => nodes
            .iter()
            .step_by(2)
            .flat_map(|keyword| {
                let tag = keyword_dimension(keyword);
                [tag, tag]
            })
            .collect(),
        count => {
            return Err(CssError::InvalidArity {
                builder: "position",
                expected: "1, 2 or 4",
                count,
            });
        }
    };
    Ok(Node::concat_with_dimensions(nodes, tags))
}

fn keyword_dimension(node: &Node) -> Option<Dimension> {
    let Node::Passthrough(keyword) = node else {
        return None;
    };
    match keyword.to_ascii_lowercase().as_str() {
        "left" | "right" => W,
        "top" | "bottom" => H,
        _ => None,
    }
}

/// `inset(<box> [round <border-radius>])`.
///
/// # Errors
///
/// Fails when the box has an invalid number of components.
pub fn inset(box_value: Node, round: Option<Node>) -> Result<Node, CssError> {
    let box_node = box_shorthand(box_value)?;
    let arg = match round {
        Some(radius) => Node::concat_of(vec![box_node, Node::passthrough("round"), radius]),
        None => box_node,
    };
    Ok(Node::func("inset", vec![arg]))
}

/// `circle([<radius>] [at <position>])`.
///
/// # Errors
///
/// Fails when the position has an invalid number of components.
pub fn circle(radius: Option<Node>, at: Option<Node>) -> Result<Node, CssError> {
    shape("circle", radius, at)
}

/// `ellipse([<rx> <ry>] [at <position>])`. The radii resolve against width
/// and height respectively.
///
/// # Errors
///
/// Fails when the position has an invalid number of components.
pub fn ellipse(radii: Option<Node>, at: Option<Node>) -> Result<Node, CssError> {
    let radii = radii.map(|radii| Node::concat_with_dimensions(components(radii), TUPLE_DIMENSIONS.to_vec()));
    shape("ellipse", radii, at)
}

fn shape(name: &str, size: Option<Node>, at: Option<Node>) -> Result<Node, CssError> {
    let position = at.map(position).transpose()?;
    let args = match (size, position) {
        (None, None) => vec![],
        (Some(size), None) => vec![size],
        (None, Some(position)) => vec![Node::concat_of(vec![Node::passthrough("at"), position])],
        (Some(size), Some(position)) => vec![Node::concat_of(vec![
            size,
            Node::passthrough("at"),
            position,
        ])],
    };
    Ok(Node::func(name, args))
}

/// `polygon([<fill-rule>,] x y, ...)`. Each point is tagged horizontal then
/// vertical.
#[must_use]
pub fn polygon(fill_rule: Option<Node>, points: Vec<Node>) -> Node {
    let args = fill_rule
        .into_iter()
        .chain(points.into_iter().map(|point| {
            Node::concat_with_dimensions(components(point), TUPLE_DIMENSIONS.to_vec())
        }))
        .collect();
    Node::func("polygon", args)
}

/// The children of a concatenation, or the value itself.
fn components(value: Node) -> Vec<Node> {
    match value {
        Node::Concat(ConcatNode { nodes, .. }) => nodes,
        node => vec![node],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(num: f64) -> Node {
        Node::length(num, "px")
    }

    fn tags(node: &Node) -> Vec<Option<Dimension>> {
        match node {
            Node::Concat(concat) => concat.dimensions.clone(),
            Node::Func(func) => func.dimensions.clone(),
            _ => panic!("not a tagged node: {node:?}"),
        }
    }

    #[test]
    fn test_box_single_component_expands() {
        let node = box_shorthand(px(1.0)).unwrap();
        assert_eq!(node.css().unwrap(), "1px 1px");
        assert_eq!(tags(&node), vec![H, W]);
    }

    #[test]
    fn test_box_tags_follow_sides() {
        let three = box_shorthand(Node::concat_of(vec![px(1.0), px(2.0), px(3.0)])).unwrap();
        assert_eq!(tags(&three), vec![H, W, H]);
        let four =
            box_shorthand(Node::concat_of(vec![px(1.0), px(2.0), px(3.0), px(4.0)])).unwrap();
        assert_eq!(tags(&four), vec![H, W, H, W]);
        assert_eq!(four.css().unwrap(), "1px 2px 3px 4px");
    }

    #[test]
    fn test_box_rejects_five_components() {
        let five = Node::concat_of((1..=5).map(|i| px(f64::from(i))).collect());
        assert_eq!(
            box_shorthand(five),
            Err(CssError::InvalidArity {
                builder: "box",
                expected: "1 to 4",
                count: 5
            })
        );
        assert!(box_shorthand(Node::concat_of(vec![])).is_err());
    }

    #[test]
    fn test_border_radius_untagged() {
        let node = border_radius(px(1.0), Some(Node::concat_of(vec![px(2.0), px(3.0)]))).unwrap();
        assert_eq!(node.css().unwrap(), "1px / 2px 3px");
    }

    #[test]
    fn test_position_tags() {
        assert_eq!(tags(&position(px(1.0)).unwrap()), vec![W]);
        let two = position(Node::concat_of(vec![px(1.0), px(2.0)])).unwrap();
        assert_eq!(tags(&two), vec![W, H]);
    }

    #[test]
    fn test_position_keyword_form() {
        let node = position(Node::concat_of(vec![
            Node::passthrough("bottom"),
            Node::percent(10.0),
            Node::passthrough("RIGHT"),
            Node::percent(20.0),
        ]))
        .unwrap();
        assert_eq!(tags(&node), vec![H, H, W, W]);

        let center = position(Node::concat_of(vec![
            Node::passthrough("center"),
            Node::percent(0.0),
            Node::passthrough("top"),
            Node::percent(5.0),
        ]))
        .unwrap();
        assert_eq!(tags(&center), vec![None, None, H, H]);
    }

    #[test]
    fn test_position_non_keyword_slots_are_untagged() {
        let node = position(Node::concat_of(vec![px(1.0), px(2.0), px(3.0), px(4.0)])).unwrap();
        assert_eq!(node.css().unwrap(), "1px 2px 3px 4px");
        assert_eq!(tags(&node), vec![None; 4]);

        let var = position(Node::concat_of(vec![
            Node::var("--side", None),
            Node::percent(10.0),
            Node::passthrough("top"),
            Node::percent(20.0),
        ]))
        .unwrap();
        assert_eq!(tags(&var), vec![None, None, H, H]);
    }

    #[test]
    fn test_position_arity() {
        let three = Node::concat_of(vec![px(1.0), px(2.0), px(3.0)]);
        assert!(matches!(
            position(three),
            Err(CssError::InvalidArity { count: 3, .. })
        ));
    }

    #[test]
    fn test_inset() {
        let node = inset(
            Node::concat_of(vec![px(1.0), px(2.0)]),
            Some(px(5.0)),
        )
        .unwrap();
        assert_eq!(node.css().unwrap(), "inset(1px 2px round 5px)");
    }

    #[test]
    fn test_circle_and_ellipse() {
        assert_eq!(circle(None, None).unwrap().css().unwrap(), "circle()");
        let node = circle(Some(px(10.0)), Some(Node::concat_of(vec![px(1.0), px(2.0)]))).unwrap();
        assert_eq!(node.css().unwrap(), "circle(10px at 1px 2px)");
        let node = ellipse(None, Some(px(3.0))).unwrap();
        assert_eq!(node.css().unwrap(), "ellipse(at 3px)");
        let node = ellipse(Some(Node::concat_of(vec![px(1.0), px(2.0)])), None).unwrap();
        assert_eq!(node.css().unwrap(), "ellipse(1px 2px)");
    }

    #[test]
    fn test_polygon_tags_points() {
        let node = polygon(
            Some(Node::passthrough("evenodd")),
            vec![Node::concat_of(vec![px(0.0), px(1.0)])],
        );
        assert_eq!(node.css().unwrap(), "polygon(evenodd,0px 1px)");
        let Node::Func(func) = &node else {
            panic!("polygon is a function")
        };
        assert_eq!(tags(&func.args[1]), vec![W, H]);
    }

    #[test]
    fn test_translate_tags_by_axis() {
        let node = translate(TranslateAxis::X, vec![px(1.0)]);
        assert_eq!(node.css().unwrap(), "translatex(1px)");
        assert_eq!(tags(&node), vec![W]);
        let node = translate(TranslateAxis::ThreeD, vec![px(1.0), px(2.0), px(3.0)]);
        assert_eq!(node.css().unwrap(), "translate3d(1px,2px,3px)");
        assert_eq!(tags(&node), vec![W, H, Z]);
        assert_eq!(tags(&translate(TranslateAxis::Both, vec![])), vec![W, H]);
    }
}
