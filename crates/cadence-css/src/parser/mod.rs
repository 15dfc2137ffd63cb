//! Expression parser.

/// Recursive-descent parser over the token stream.
pub mod expr_parser;

pub use expr_parser::ExprParser;

use crate::error::CssError;
use crate::node::Node;
use crate::tokenizer::CssTokenizer;

/// Parse an animation value into an expression tree.
///
/// Returns `Ok(None)` for empty input.
///
/// # Errors
///
/// Fails with [`CssError::Syntax`] for malformed text, and with
/// [`CssError::InvalidArity`] when a function gets an unsupported number of
/// components.
pub fn parse(text: &str) -> Result<Option<Node>, CssError> {
    let mut tokenizer = CssTokenizer::new(text);
    tokenizer.run();
    ExprParser::new(tokenizer.into_tokens()).parse_value()
}
