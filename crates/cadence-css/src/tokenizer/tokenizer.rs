use super::token::{Token, TokenKind};

/// [§ 4.3 Tokenizer Algorithms](https://www.w3.org/TR/css-syntax-3/#tokenizer-algorithms)
///
/// Tokenizer for animation value expressions.
pub struct CssTokenizer {
    /// The input being tokenized
    input: Vec<char>,
    /// Current position in the input
    position: usize,
    /// Collected tokens
    tokens: Vec<Token>,
}

impl CssTokenizer {
    /// Create a new tokenizer with the given input.
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into().chars().collect(),
            position: 0,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the whole input. The last token is always [`TokenKind::EOF`].
    pub fn run(&mut self) {
        loop {
            self.consume_comments();
            let start = self.position;
            let kind = self.consume_token();
            let is_eof = kind.is_eof();
            self.tokens.push(Token { kind, start });
            if is_eof {
                break;
            }
        }
    }

    /// Return the collected tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Return a reference to the collected tokens.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// [§ 4.3.1 Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    fn consume_token(&mut self) -> TokenKind {
        // "Consume the next input code point."
        let Some(c) = self.consume() else {
            return TokenKind::EOF;
        };

        match c {
            // "whitespace"
            // "Consume as much whitespace as possible. Return a <whitespace-token>."
            c if is_whitespace(c) => {
                self.consume_whitespace();
                TokenKind::Whitespace
            }

            // "U+0022 QUOTATION MARK (")" and "U+0027 APOSTROPHE (')"
            // "Consume a string token and return it."
            '"' | '\'' => self.consume_string_token(c),

            // "U+0023 NUMBER SIGN (#)"
            '#' => {
                if self.peek().is_some_and(is_ident_code_point)
                    || is_valid_escape(self.peek(), self.peek_at(1))
                {
                    TokenKind::Hash(self.consume_ident_sequence())
                } else {
                    TokenKind::Delim('#')
                }
            }

            // "U+0028 LEFT PARENTHESIS (()"
            '(' => TokenKind::LeftParen,

            // "U+0029 RIGHT PARENTHESIS ())"
            ')' => TokenKind::RightParen,

            // "U+002C COMMA (,)"
            ',' => TokenKind::Comma,

            // "U+002B PLUS SIGN (+)" and "U+002E FULL STOP (.)"
            // "If the input stream starts with a number, reconsume the current
            // input code point, consume a numeric token, and return it."
            '+' | '.' => {
                self.reconsume();
                if self.would_start_number() {
                    self.consume_numeric_token()
                } else {
                    let _ = self.consume();
                    TokenKind::Delim(c)
                }
            }

            // "U+002D HYPHEN-MINUS (-)"
            '-' => {
                self.reconsume();
                if self.would_start_number() {
                    self.consume_numeric_token()
                } else if self.would_start_ident_sequence() {
                    self.consume_ident_like_token()
                } else {
                    let _ = self.consume();
                    TokenKind::Delim('-')
                }
            }

            // "U+005C REVERSE SOLIDUS (\)"
            '\\' if is_valid_escape(Some('\\'), self.peek()) => {
                self.reconsume();
                self.consume_ident_like_token()
            }

            // "digit"
            c if c.is_ascii_digit() => {
                self.reconsume();
                self.consume_numeric_token()
            }

            // "ident-start code point"
            c if is_ident_start_code_point(c) => {
                self.reconsume();
                self.consume_ident_like_token()
            }

            // "anything else"
            c => TokenKind::Delim(c),
        }
    }

    /// [§ 4.3.2 Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
    fn consume_comments(&mut self) {
        while self.peek() == Some('/') && self.peek_at(1) == Some('*') {
            self.position += 2;
            loop {
                match self.consume() {
                    Some('*') if self.peek() == Some('/') => {
                        let _ = self.consume();
                        break;
                    }
                    Some(_) => {}
                    None => break,
                }
            }
        }
    }

    fn consume_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            let _ = self.consume();
        }
    }

    /// [§ 4.3.4 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    ///
    /// Unterminated strings end at EOF.
    fn consume_string_token(&mut self, quote: char) -> TokenKind {
        let mut value = String::new();
        loop {
            match self.consume() {
                Some(c) if c == quote => break,
                None => break,
                Some('\\') => match self.peek() {
                    None => {}
                    Some('\n') => {
                        let _ = self.consume();
                    }
                    Some(_) => value.push(self.consume_escaped_code_point()),
                },
                Some(c) => value.push(c),
            }
        }
        TokenKind::String { value, quote }
    }

    /// [§ 4.3.5 Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    fn consume_numeric_token(&mut self) -> TokenKind {
        let value = self.consume_number();

        // "If the next 3 input code points would start an ident sequence..."
        if self.would_start_ident_sequence() {
            let unit = self.consume_ident_sequence();
            TokenKind::Dimension { value, unit }
        }
        // "Otherwise, if the next input code point is U+0025 PERCENTAGE SIGN (%)..."
        else if self.peek() == Some('%') {
            let _ = self.consume();
            TokenKind::Percentage(value)
        } else {
            TokenKind::Number(value)
        }
    }

    /// [§ 4.3.6 Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    fn consume_ident_like_token(&mut self) -> TokenKind {
        let string = self.consume_ident_sequence();

        if self.peek() != Some('(') {
            return TokenKind::Ident(string);
        }
        let _ = self.consume();

        // "If string's value is an ASCII case-insensitive match for 'url'..."
        if string.eq_ignore_ascii_case("url") {
            let mark = self.position;
            self.consume_whitespace();
            // A quoted url is parsed as a function with a string argument.
            if matches!(self.peek(), Some('"' | '\'')) {
                self.position = mark;
                return TokenKind::Function(string);
            }
            return self.consume_url_token();
        }
        TokenKind::Function(string)
    }

    /// [§ 4.3.7 Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-url-token)
    fn consume_url_token(&mut self) -> TokenKind {
        let mut value = String::new();
        loop {
            match self.consume() {
                Some(')') | None => return TokenKind::Url(value),
                Some(c) if is_whitespace(c) => {
                    self.consume_whitespace();
                    return match self.consume() {
                        Some(')') | None => TokenKind::Url(value),
                        Some(_) => {
                            self.consume_bad_url_remnants();
                            TokenKind::BadUrl
                        }
                    };
                }
                Some('"' | '\'' | '(') => {
                    self.consume_bad_url_remnants();
                    return TokenKind::BadUrl;
                }
                Some('\\') if is_valid_escape(Some('\\'), self.peek()) => {
                    value.push(self.consume_escaped_code_point());
                }
                Some('\\') => {
                    self.consume_bad_url_remnants();
                    return TokenKind::BadUrl;
                }
                Some(c) => value.push(c),
            }
        }
    }

    /// [§ 4.3.14 Consume the remnants of a bad url](https://www.w3.org/TR/css-syntax-3/#consume-remnants-of-bad-url)
    fn consume_bad_url_remnants(&mut self) {
        loop {
            match self.consume() {
                Some(')') | None => return,
                Some('\\') if is_valid_escape(Some('\\'), self.peek()) => {
                    let _ = self.consume_escaped_code_point();
                }
                Some(_) => {}
            }
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    fn consume_ident_sequence(&mut self) -> String {
        let mut result = String::new();
        loop {
            match self.consume() {
                Some(c) if is_ident_code_point(c) => result.push(c),
                Some('\\') if is_valid_escape(Some('\\'), self.peek()) => {
                    result.push(self.consume_escaped_code_point());
                }
                Some(_) => {
                    self.reconsume();
                    return result;
                }
                None => return result,
            }
        }
    }

    /// [§ 4.3.12 Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    fn consume_number(&mut self) -> f64 {
        let mut repr = String::new();

        // STEP 1: Optional sign.
        if matches!(self.peek(), Some('+' | '-')) {
            self.push_next(&mut repr);
        }

        // STEP 2: Integer part.
        self.push_digits(&mut repr);

        // STEP 3: Fraction, only when a digit follows the full stop.
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.push_next(&mut repr);
            self.push_digits(&mut repr);
        }

        // STEP 4: Exponent, only when a digit follows the optional sign.
        if matches!(self.peek(), Some('e' | 'E')) {
            let has_sign = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if has_sign { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                self.push_next(&mut repr);
                if has_sign {
                    self.push_next(&mut repr);
                }
                self.push_digits(&mut repr);
            }
        }

        repr.parse().unwrap_or(0.0)
    }

    fn push_next(&mut self, repr: &mut String) {
        if let Some(c) = self.consume() {
            repr.push(c);
        }
    }

    fn push_digits(&mut self, repr: &mut String) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.push_next(repr);
        }
    }

    /// [§ 4.3.13 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    fn consume_escaped_code_point(&mut self) -> char {
        match self.consume() {
            Some(c) if c.is_ascii_hexdigit() => {
                let mut hex = c.to_string();
                // "Consume as many hex digits as possible, but no more than 5."
                while hex.len() < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                    self.push_next(&mut hex);
                }
                if self.peek().is_some_and(is_whitespace) {
                    let _ = self.consume();
                }
                // char::from_u32 rejects surrogates and values past U+10FFFF.
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|&code_point| code_point != 0)
                    .and_then(char::from_u32)
                    .unwrap_or('\u{FFFD}')
            }
            None => '\u{FFFD}',
            Some(c) => c,
        }
    }

    /// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    fn would_start_ident_sequence(&self) -> bool {
        match self.peek() {
            Some('-') => {
                let second = self.peek_at(1);
                second.is_some_and(|c| is_ident_start_code_point(c) || c == '-')
                    || is_valid_escape(second, self.peek_at(2))
            }
            Some(c) if is_ident_start_code_point(c) => true,
            Some('\\') => is_valid_escape(Some('\\'), self.peek_at(1)),
            _ => false,
        }
    }

    /// [§ 4.3.10 Check if three code points would start a number](https://www.w3.org/TR/css-syntax-3/#starts-with-a-number)
    fn would_start_number(&self) -> bool {
        let is_digit = |c: Option<char>| c.is_some_and(|c| c.is_ascii_digit());
        match self.peek() {
            Some('+' | '-') => {
                let second = self.peek_at(1);
                is_digit(second) || (second == Some('.') && is_digit(self.peek_at(2)))
            }
            Some('.') => is_digit(self.peek_at(1)),
            c => is_digit(c),
        }
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.input.get(self.position).copied()?;
        self.position += 1;
        Some(c)
    }

    fn reconsume(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }
}

/// [§ 4.3.8 Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
fn is_valid_escape(first: Option<char>, second: Option<char>) -> bool {
    first == Some('\\') && second != Some('\n')
}

/// [§ 4.2 Definitions - whitespace](https://www.w3.org/TR/css-syntax-3/#whitespace)
const fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ' | '\r' | '\x0C')
}

/// [§ 4.2 Definitions - ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_code_point(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// [§ 4.2 Definitions - ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_code_point(c: char) -> bool {
    is_ident_start_code_point(c) || c.is_ascii_digit() || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut tokenizer = CssTokenizer::new(input);
        tokenizer.run();
        tokenizer.into_tokens().into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn test_numeric_tokens() {
        assert_eq!(
            kinds("10px .5 +1.5% -2e1s"),
            vec![
                TokenKind::Dimension {
                    value: 10.0,
                    unit: "px".into()
                },
                TokenKind::Whitespace,
                TokenKind::Number(0.5),
                TokenKind::Whitespace,
                TokenKind::Percentage(1.5),
                TokenKind::Whitespace,
                TokenKind::Dimension {
                    value: -20.0,
                    unit: "s".into()
                },
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn test_functions_and_custom_properties() {
        assert_eq!(
            kinds("var(--x,1)"),
            vec![
                TokenKind::Function("var".into()),
                TokenKind::Ident("--x".into()),
                TokenKind::Comma,
                TokenKind::Number(1.0),
                TokenKind::RightParen,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn test_calc_operators() {
        assert_eq!(
            kinds("1px - 2px*3/4"),
            vec![
                TokenKind::Dimension {
                    value: 1.0,
                    unit: "px".into()
                },
                TokenKind::Whitespace,
                TokenKind::Delim('-'),
                TokenKind::Whitespace,
                TokenKind::Dimension {
                    value: 2.0,
                    unit: "px".into()
                },
                TokenKind::Delim('*'),
                TokenKind::Number(3.0),
                TokenKind::Delim('/'),
                TokenKind::Number(4.0),
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn test_urls() {
        assert_eq!(
            kinds("url(a.png)"),
            vec![TokenKind::Url("a.png".into()), TokenKind::EOF]
        );
        assert_eq!(
            kinds("url( 'a.png')"),
            vec![
                TokenKind::Function("url".into()),
                TokenKind::Whitespace,
                TokenKind::String {
                    value: "a.png".into(),
                    quote: '\''
                },
                TokenKind::RightParen,
                TokenKind::EOF,
            ]
        );
        assert_eq!(kinds("url(a b)"), vec![TokenKind::BadUrl, TokenKind::EOF]);
    }

    #[test]
    fn test_hash_and_comments() {
        assert_eq!(
            kinds("/* c */#FF0000"),
            vec![TokenKind::Hash("FF0000".into()), TokenKind::EOF]
        );
    }

    #[test]
    fn test_token_offsets() {
        let mut tokenizer = CssTokenizer::new("a  b");
        tokenizer.run();
        let starts: Vec<usize> = tokenizer.tokens().iter().map(|token| token.start).collect();
        assert_eq!(starts, vec![0, 1, 3, 4]);
    }
}
