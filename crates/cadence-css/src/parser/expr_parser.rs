use crate::builders::{self, TranslateAxis};
use crate::context::SelectionMethod;
use crate::error::CssError;
use crate::node::{MinMaxKind, Node, ProductOp, RectField, SumOp};
use crate::tokenizer::{Token, TokenKind};
use crate::units::{NumericKind, format_number};

type ParseResult<T> = Result<T, CssError>;

/// Fill rules accepted as the optional first `polygon()` argument.
const FILL_RULES: [&str; 2] = ["nonzero", "evenodd"];

/// Parser for animation value expressions.
///
/// ```text
/// value    = term (ws term)*
/// term     = ident | hash | string | number | percentage | dimension
///          | url | function "(" args ")"
/// calc-sum = calc-product (ws ("+" | "-") ws calc-product)*
/// calc-product = calc-value (("*" | "/") calc-value)*
/// calc-value   = "(" calc-sum ")" | term
/// ```
pub struct ExprParser {
    tokens: Vec<Token>,
    position: usize,
}

impl ExprParser {
    /// Create a new parser from a list of tokens ending in EOF.
    #[must_use]
    pub const fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parse the whole token stream as one value.
    ///
    /// # Errors
    ///
    /// See [`parse`](super::parse).
    pub fn parse_value(&mut self) -> Result<Option<Node>, CssError> {
        self.skip_whitespace();
        if self.peek().is_eof() {
            return Ok(None);
        }
        let node = self.parse_list()?;
        self.skip_whitespace();
        if self.peek().is_eof() {
            Ok(Some(node))
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    /// Space-separated terms up to a comma, a closing parenthesis or the end.
    fn parse_list(&mut self) -> ParseResult<Node> {
        let mut nodes = self.parse_terms()?;
        match nodes.len() {
            0 => Err(self.unexpected("a value")),
            1 => Ok(nodes.remove(0)),
            _ => Ok(Node::concat_of(nodes)),
        }
    }

    /// Zero or more space-separated terms.
    fn parse_terms(&mut self) -> ParseResult<Vec<Node>> {
        let mut nodes = Vec::new();
        loop {
            self.skip_whitespace();
            if matches!(
                self.peek(),
                TokenKind::Comma | TokenKind::RightParen | TokenKind::EOF
            ) {
                return Ok(nodes);
            }
            nodes.push(self.parse_term()?);
        }
    }

    /// Comma-separated lists up to the closing parenthesis, which is consumed.
    fn parse_args(&mut self) -> ParseResult<Vec<Node>> {
        self.skip_whitespace();
        if self.eat(&TokenKind::RightParen) {
            return Ok(Vec::new());
        }
        let mut args = vec![self.parse_list()?];
        while self.eat(&TokenKind::Comma) {
            args.push(self.parse_list()?);
        }
        self.expect_close()?;
        Ok(args)
    }

    fn parse_term(&mut self) -> ParseResult<Node> {
        let token = self.next();
        let node = match token.kind {
            TokenKind::Ident(ident) => Node::passthrough(ident),
            TokenKind::Hash(hash) => Node::passthrough(format!("#{hash}")),
            TokenKind::String { value, quote } => Node::passthrough(format!("{quote}{value}{quote}")),
            TokenKind::Number(value) => Node::number(value),
            TokenKind::Percentage(value) => Node::percent(value),
            TokenKind::Dimension { value, unit } => match NumericKind::for_unit(&unit) {
                Some(NumericKind::Length) => Node::length(value, &unit),
                Some(NumericKind::Angle) => Node::angle(value, &unit),
                Some(NumericKind::Time) => Node::time(value, &unit),
                _ => Node::passthrough(format!("{}{unit}", format_number(value))),
            },
            TokenKind::Url(url) => Node::url(url),
            TokenKind::Function(name) => self.parse_function(&name.to_ascii_lowercase())?,
            _ => return Err(syntax_error(&token, "a value")),
        };
        Ok(node)
    }

    /// The arguments of `name(`, through the closing parenthesis.
    fn parse_function(&mut self, name: &str) -> ParseResult<Node> {
        match name {
            "url" => {
                self.skip_whitespace();
                let token = self.next();
                let TokenKind::String { value, .. } = token.kind else {
                    return Err(syntax_error(&token, "a string"));
                };
                self.expect_close()?;
                Ok(Node::url(value))
            }
            "calc" => {
                let expr = self.parse_calc_sum()?;
                self.expect_close()?;
                Ok(Node::calc(expr))
            }
            "var" => self.parse_var(),
            "min" | "max" | "clamp" => {
                let kind = match name {
                    "min" => MinMaxKind::Min,
                    "max" => MinMaxKind::Max,
                    _ => MinMaxKind::Clamp,
                };
                let mut args = vec![self.parse_calc_sum()?];
                while self.eat(&TokenKind::Comma) {
                    args.push(self.parse_calc_sum()?);
                }
                self.expect_close()?;
                Node::min_max(kind, args)
            }
            "rand" => {
                let mut args = self.parse_args()?;
                match args.len() {
                    0 => Ok(Node::rand()),
                    2 => {
                        let right = args.remove(1);
                        Ok(Node::rand_between(args.remove(0), right))
                    }
                    count => Err(arity("rand", "0 or 2", count)),
                }
            }
            "index" | "length" => {
                self.skip_whitespace();
                self.expect_close()?;
                Ok(if name == "index" {
                    Node::Index
                } else {
                    Node::TargetLength
                })
            }
            "width" => self.parse_rect(RectField::Width),
            "height" => self.parse_rect(RectField::Height),
            "x" => self.parse_rect(RectField::X),
            "y" => self.parse_rect(RectField::Y),
            "num" => {
                let mut args = self.parse_args()?;
                if args.len() != 1 {
                    return Err(arity("num", "1", args.len()));
                }
                Ok(Node::num_convert(args.remove(0)))
            }
            "inset" => self.parse_inset(),
            "circle" | "ellipse" => self.parse_shape(name),
            "polygon" => {
                let mut args = self.parse_args()?;
                let has_fill_rule = matches!(
                    args.first(),
                    Some(Node::Passthrough(rule)) if FILL_RULES.iter().any(|r| rule.eq_ignore_ascii_case(r))
                );
                let fill_rule = has_fill_rule.then(|| args.remove(0));
                Ok(builders::polygon(fill_rule, args))
            }
            _ => {
                let args = self.parse_args()?;
                match name.strip_prefix("translate").map(str::parse::<TranslateAxis>) {
                    Some(Ok(axis)) => Ok(builders::translate(axis, args)),
                    _ => Ok(Node::func(name, args)),
                }
            }
        }
    }

    /// `var(--name[, default])`
    fn parse_var(&mut self) -> ParseResult<Node> {
        self.skip_whitespace();
        let token = self.next();
        let name = match token.kind {
            TokenKind::Ident(name) if name.starts_with("--") => name,
            _ => return Err(syntax_error(&token, "a custom property name")),
        };
        self.skip_whitespace();
        let default = if self.eat(&TokenKind::Comma) {
            Some(self.parse_list()?)
        } else {
            None
        };
        self.expect_close()?;
        Ok(Node::var(name, default))
    }

    /// `width()`, `width('.sel')` or `width(closest('.sel'))`.
    fn parse_rect(&mut self, field: RectField) -> ParseResult<Node> {
        self.skip_whitespace();
        if self.eat(&TokenKind::RightParen) {
            return Ok(Node::rect(field, None, None));
        }
        let token = self.next();
        let (selector, method) = match token.kind {
            TokenKind::String { value, .. } => (value, None),
            TokenKind::Function(ref name) => {
                let Ok(method) = name.parse::<SelectionMethod>() else {
                    return Err(syntax_error(&token, "a selection method"));
                };
                self.skip_whitespace();
                let inner = self.next();
                let TokenKind::String { value, .. } = inner.kind else {
                    return Err(syntax_error(&inner, "a selector string"));
                };
                self.skip_whitespace();
                self.expect_close()?;
                (value, Some(method))
            }
            _ => return Err(syntax_error(&token, "a selector string")),
        };
        self.skip_whitespace();
        self.expect_close()?;
        Ok(Node::rect(field, Some(selector), method))
    }

    /// `inset(<box> [round <box> [/ <box>]])`
    fn parse_inset(&mut self) -> ParseResult<Node> {
        let box_terms = self.parse_terms_until_keyword("round")?;
        let round = if self.eat_keyword("round") {
            let first = self.parse_terms_until_delim('/')?;
            let second = if self.eat(&TokenKind::Delim('/')) {
                Some(Node::concat_of(self.parse_terms()?))
            } else {
                None
            };
            Some(builders::border_radius(Node::concat_of(first), second)?)
        } else {
            None
        };
        self.expect_close()?;
        builders::inset(Node::concat_of(box_terms), round)
    }

    /// `circle([<radius>] [at <position>])` and `ellipse(...)`.
    fn parse_shape(&mut self, name: &str) -> ParseResult<Node> {
        let size = self.parse_terms_until_keyword("at")?;
        let at = if self.eat_keyword("at") {
            Some(Node::concat_of(self.parse_terms()?))
        } else {
            None
        };
        self.expect_close()?;
        let size = match size.len() {
            0 => None,
            1 if name == "circle" => size.into_iter().next(),
            _ => Some(Node::concat_of(size)),
        };
        if name == "circle" {
            builders::circle(size, at)
        } else {
            builders::ellipse(size, at)
        }
    }

    /// [§ 10.1 Syntax](https://www.w3.org/TR/css-values-4/#calc-syntax)
    ///
    /// "White space is required on both sides of the + and - operators."
    fn parse_calc_sum(&mut self) -> ParseResult<Node> {
        let mut left = self.parse_calc_product()?;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                TokenKind::Delim('+') => SumOp::Add,
                TokenKind::Delim('-') => SumOp::Sub,
                _ => return Ok(left),
            };
            let _ = self.next();
            let right = self.parse_calc_product()?;
            left = Node::sum(left, right, op);
        }
    }

    fn parse_calc_product(&mut self) -> ParseResult<Node> {
        let mut left = self.parse_calc_value()?;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                TokenKind::Delim('*') => ProductOp::Mul,
                TokenKind::Delim('/') => ProductOp::Div,
                _ => return Ok(left),
            };
            let _ = self.next();
            let right = self.parse_calc_value()?;
            left = Node::product(left, right, op);
        }
    }

    fn parse_calc_value(&mut self) -> ParseResult<Node> {
        self.skip_whitespace();
        if self.eat(&TokenKind::LeftParen) {
            let inner = self.parse_calc_sum()?;
            self.skip_whitespace();
            self.expect_close()?;
            return Ok(inner);
        }
        self.parse_term()
    }

    fn parse_terms_until_keyword(&mut self, keyword: &str) -> ParseResult<Vec<Node>> {
        let mut nodes = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                TokenKind::Comma | TokenKind::RightParen | TokenKind::EOF => return Ok(nodes),
                TokenKind::Ident(ident) if ident.eq_ignore_ascii_case(keyword) => return Ok(nodes),
                _ => nodes.push(self.parse_term()?),
            }
        }
    }

    fn parse_terms_until_delim(&mut self, delim: char) -> ParseResult<Vec<Node>> {
        let mut nodes = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                TokenKind::Comma | TokenKind::RightParen | TokenKind::EOF => return Ok(nodes),
                TokenKind::Delim(c) if *c == delim => return Ok(nodes),
                _ => nodes.push(self.parse_term()?),
            }
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        match self.peek() {
            TokenKind::Ident(ident) if ident.eq_ignore_ascii_case(keyword) => {
                let _ = self.next();
                true
            }
            _ => false,
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        self.skip_whitespace();
        if self.peek() == kind {
            let _ = self.next();
            true
        } else {
            false
        }
    }

    fn expect_close(&mut self) -> ParseResult<()> {
        self.skip_whitespace();
        if self.eat(&TokenKind::RightParen) {
            Ok(())
        } else {
            Err(self.unexpected("')'"))
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_whitespace() {
            self.position += 1;
        }
    }

    fn peek(&self) -> &TokenKind {
        self.tokens
            .get(self.position)
            .map_or(&TokenKind::EOF, |token| &token.kind)
    }

    /// Consume the next token. Past the end, keeps returning EOF.
    fn next(&mut self) -> Token {
        match self.tokens.get(self.position) {
            Some(token) => {
                self.position += 1;
                token.clone()
            }
            None => Token {
                kind: TokenKind::EOF,
                start: self.tokens.last().map_or(0, |token| token.start),
            },
        }
    }

    fn unexpected(&self, expected: &str) -> CssError {
        let start = self.tokens.get(self.position).map_or(0, |token| token.start);
        CssError::Syntax {
            position: start,
            message: format!("expected {expected}, found {}", self.peek()),
        }
    }
}

fn syntax_error(token: &Token, expected: &str) -> CssError {
    CssError::Syntax {
        position: token.start,
        message: format!("expected {expected}, found {}", token.kind),
    }
}

const fn arity(builder: &'static str, expected: &'static str, count: usize) -> CssError {
    CssError::InvalidArity {
        builder,
        expected,
        count,
    }
}
