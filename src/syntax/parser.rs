//! text parser for boolean and fileclass set expressions
//!
//! boolean grammar (keywords are case-insensitive, AND binds tighter than OR):
//! - `expr := term (or term)*`
//! - `term := factor (and factor)*`
//! - `factor := not factor | '(' expr ')' | criterion op value`
//! - op: `== != <> =~ !~ > >= < <=`
//! - value: `"quoted"` (with `\"` and `\\` escapes, other `\x` pairs kept as
//!   written) or a bare word such as `1MB`, `*.log`
//!
//! set grammar: `union`, `inter`, `not`, parentheses and fileclass names.

use std::fmt;

use super::{BoolSyntax, KeyValue, Operator, SetOp, SetSyntax, SyntaxBoolOp};

/// error type for parsing expressions
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub offset: Option<usize>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset: Some(offset),
        }
    }

    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offset: None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{} (at offset {})", self.message, offset),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}

/// parse a boolean expression; conditions are tagged with `line`
pub fn parse_bool_expr(text: &str, line: u32) -> Result<BoolSyntax, ParseError> {
    let mut parser = Parser::new(text, line);
    let expr = parser.parse_or()?;
    parser.expect_end()?;
    Ok(expr)
}

/// parse a union/intersection/negation of fileclass names
pub fn parse_set_expr(text: &str) -> Result<SetSyntax, ParseError> {
    let mut parser = Parser::new(text, 0);
    let expr = parser.parse_union()?;
    parser.expect_end()?;
    Ok(expr)
}

const OPERATORS: [(&str, Operator); 9] = [
    ("==", Operator::Equal),
    ("!=", Operator::Diff),
    ("<>", Operator::Diff),
    ("=~", Operator::Equal),
    ("!~", Operator::Diff),
    (">=", Operator::GtEq),
    ("<=", Operator::LtEq),
    (">", Operator::Gt),
    ("<", Operator::Lt),
];

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-'
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, line: u32) -> Self {
        Self { src, pos: 0, line }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.rest().chars().next()
    }

    fn eat_char(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// consume a keyword if it is the next whole word
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.skip_ws();
        let rest = self.rest();
        match rest.get(..keyword.len()) {
            Some(head) if head.eq_ignore_ascii_case(keyword) => {}
            _ => return false,
        }
        match rest[keyword.len()..].chars().next() {
            Some(c) if is_word_char(c) => false,
            _ => {
                self.pos += keyword.len();
                true
            }
        }
    }

    fn word(&mut self, what: &str) -> Result<&'a str, ParseError> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|&(_, c)| !is_word_char(c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(ParseError::new(format!("{} expected", what), self.pos));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn operator(&mut self) -> Result<Operator, ParseError> {
        self.skip_ws();
        let rest = self.rest();
        for (text, op) in OPERATORS {
            if rest.starts_with(text) {
                self.pos += text.len();
                return Ok(op);
            }
        }
        Err(ParseError::new("comparison operator expected", self.pos))
    }

    fn value(&mut self) -> Result<String, ParseError> {
        self.skip_ws();
        let start = self.pos;
        let rest = self.rest();

        if let Some(quoted) = rest.strip_prefix('"') {
            let mut value = String::new();
            let mut chars = quoted.char_indices();
            while let Some((i, c)) = chars.next() {
                match c {
                    '"' => {
                        self.pos += 1 + i + 1;
                        return Ok(value);
                    }
                    '\\' => match chars.next() {
                        Some((_, '"')) => value.push('"'),
                        Some((_, '\\')) => value.push('\\'),
                        Some((_, other)) => {
                            value.push('\\');
                            value.push(other);
                        }
                        None => break,
                    },
                    _ => value.push(c),
                }
            }
            return Err(ParseError::new("unterminated string", start));
        }

        let len = rest
            .char_indices()
            .find(|&(_, c)| c.is_whitespace() || c == '(' || c == ')')
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(ParseError::new("value expected", start));
        }
        self.pos += len;
        Ok(rest[..len].to_string())
    }

    fn expect_close(&mut self, open_at: usize) -> Result<(), ParseError> {
        if self.eat_char(')') {
            Ok(())
        } else {
            Err(ParseError::new(
                format!("missing ')' for '(' at offset {}", open_at),
                self.pos,
            ))
        }
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        if self.peek().is_some() {
            return Err(ParseError::new(
                format!("unexpected trailing input '{}'", self.rest().trim_end()),
                self.pos,
            ));
        }
        Ok(())
    }

    fn parse_or(&mut self) -> Result<BoolSyntax, ParseError> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("or") {
            let right = self.parse_and()?;
            left = BoolSyntax::binary(SyntaxBoolOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<BoolSyntax, ParseError> {
        let mut left = self.parse_not()?;
        while self.eat_keyword("and") {
            let right = self.parse_not()?;
            left = BoolSyntax::binary(SyntaxBoolOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<BoolSyntax, ParseError> {
        if self.eat_keyword("not") {
            let inner = self.parse_not()?;
            return Ok(BoolSyntax::unary(SyntaxBoolOp::Not, inner));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<BoolSyntax, ParseError> {
        let open_at = self.pos;
        if self.eat_char('(') {
            let inner = self.parse_or()?;
            self.expect_close(open_at)?;
            return Ok(BoolSyntax::unary(SyntaxBoolOp::Identity, inner));
        }

        let name = self.word("criterion name")?.to_string();
        let op = self.operator()?;
        let value = self.value()?;
        Ok(BoolSyntax::condition(KeyValue::condition(
            name, op, value, self.line,
        )))
    }

    fn parse_union(&mut self) -> Result<SetSyntax, ParseError> {
        let mut left = self.parse_inter()?;
        while self.eat_keyword("union") {
            let right = self.parse_inter()?;
            left = SetSyntax::binary(SetOp::Union, left, right);
        }
        Ok(left)
    }

    fn parse_inter(&mut self) -> Result<SetSyntax, ParseError> {
        let mut left = self.parse_set_not()?;
        while self.eat_keyword("inter") {
            let right = self.parse_set_not()?;
            left = SetSyntax::binary(SetOp::Inter, left, right);
        }
        Ok(left)
    }

    fn parse_set_not(&mut self) -> Result<SetSyntax, ParseError> {
        if self.eat_keyword("not") {
            return Ok(SetSyntax::negation(self.parse_set_not()?));
        }
        let open_at = self.pos;
        if self.eat_char('(') {
            let inner = self.parse_union()?;
            self.expect_close(open_at)?;
            return Ok(inner);
        }
        Ok(SetSyntax::singleton(self.word("fileclass name")?))
    }
}
