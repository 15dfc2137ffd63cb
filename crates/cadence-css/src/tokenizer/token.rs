//! Token types per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
//!
//! Only the tokens an animation value can contain are distinguished. Block
//! punctuation, at-keywords and the like surface as `<delim-token>`s and are
//! rejected by the parser.

use core::fmt;

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// "`<ident-token>`"
    Ident(String),

    /// "`<function-token>`": the name, without the parenthesis.
    Function(String),

    /// "`<hash-token>`": the value, without the `#`.
    Hash(String),

    /// "`<string-token>`"
    String {
        /// The unescaped contents.
        value: String,
        /// The quote the string was written with.
        quote: char,
    },

    /// "`<url-token>`": an unquoted `url(...)`.
    Url(String),

    /// "`<bad-url-token>`"
    BadUrl,

    /// "`<delim-token>`"
    Delim(char),

    /// "`<number-token>`"
    Number(f64),

    /// "`<percentage-token>`"
    Percentage(f64),

    /// "`<dimension-token>`"
    Dimension {
        /// "a numeric value"
        value: f64,
        /// "a unit"
        unit: String,
    },

    /// "`<whitespace-token>`"
    Whitespace,

    /// "`<comma-token>`"
    Comma,

    /// `<(-token>`
    LeftParen,

    /// `<)-token>`
    RightParen,

    /// End of input.
    EOF,
}

/// A token and the character offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was read.
    pub kind: TokenKind,
    /// Offset of the first character, in chars.
    pub start: usize,
}

impl TokenKind {
    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EOF)
    }

    /// Returns true if this is a whitespace token.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Self::Whitespace)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(v) => write!(f, "<ident:{v}>"),
            Self::Function(v) => write!(f, "<function:{v}(>"),
            Self::Hash(v) => write!(f, "<hash:#{v}>"),
            Self::String { value, quote } => write!(f, "<string:{quote}{value}{quote}>"),
            Self::Url(v) => write!(f, "<url:{v}>"),
            Self::BadUrl => write!(f, "<bad-url>"),
            Self::Delim(c) => write!(f, "<delim:{c}>"),
            Self::Number(value) => write!(f, "<number:{value}>"),
            Self::Percentage(value) => write!(f, "<percentage:{value}%>"),
            Self::Dimension { value, unit } => write!(f, "<dimension:{value}{unit}>"),
            Self::Whitespace => write!(f, "<whitespace>"),
            Self::Comma => write!(f, "<comma>"),
            Self::LeftParen => write!(f, "<(>"),
            Self::RightParen => write!(f, "<)>"),
            Self::EOF => write!(f, "<EOF>"),
        }
    }
}
