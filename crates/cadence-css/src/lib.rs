//! CSS animation value expressions.
//!
//! Animation values may depend on run-time context: element geometry,
//! viewport and font sizes, custom properties, and the index of the target
//! being animated. This crate parses such values into an expression tree
//! and resolves the tree against a [`CssContext`].
//!
//! # Example
//!
//! ```
//! use cadence_css::{DocumentModel, ScopedContext, parse};
//!
//! let context = ScopedContext::new(DocumentModel::default());
//! let node = parse("calc(10vw + 2rem)").unwrap().unwrap();
//! let resolved = node.resolve(&context, true).unwrap().unwrap();
//! assert_eq!(resolved.css().unwrap(), "160px");
//! ```
//!
//! # Failure channels
//!
//! Resolution distinguishes an *unavailable* value (`Ok(None)`: a missing
//! variable, a division by zero) from a malformed one (`Err`: mismatched
//! operand types, unsupported units, recursive variables). The first is
//! expected at run time and means "nothing to animate"; the second is a
//! configuration error.

/// Box, position, shape and translate builders with dimension tags.
pub mod builders;
/// The context capability surface.
pub mod context;
/// Hard resolution errors.
pub mod error;
/// The expression tree.
pub mod node;
/// Text to expression tree.
pub mod parser;
/// Uniform random numbers for `rand()`.
pub mod random;
/// The resolution protocol.
pub mod resolve;
/// The reference context over a static document model.
pub mod scope;
/// Expression tokenizer.
pub mod tokenizer;
/// Quantity kinds, units and conversion constants.
pub mod units;

mod calc;

pub use context::{CssContext, Dimension, ElementRect, SelectionMethod, Size, with_dimension};
pub use error::CssError;
pub use node::{Node, Numeric, is_var_css};
pub use parser::parse;
pub use resolve::Resolved;
pub use scope::{ContextConfig, DocumentModel, ScopedContext, TargetModel};
pub use units::NumericKind;
