//! Step condition parsing and evaluation
//!
//! Conditions are a small boolean grammar evaluated against the execution
//! context, which is bound to the name `input`:
//!
//! ```text
//! expr      := or
//! or        := and (("or" | "||") and)*
//! and       := unary (("and" | "&&") unary)*
//! unary     := ("not" | "!") unary | "(" expr ")" | predicate
//! predicate := operand ( cmp operand
//!                      | "is" ["not"] ("present" | "absent" | "null" | "None" | "empty")
//!                      | ["not"] "in" operand
//!                      | "contains" operand )?
//! operand   := literal | path
//! path      := ("input" | ident) ("." ident | "[" (string | integer) "]")*
//! ```
//!
//! A bare identifier `x` is shorthand for `input.x`. A bare operand is a
//! truthiness test. Presence and null checks tolerate undefined keys; every
//! other reference to an undefined key is an error.

use std::borrow::Cow;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

use super::context::ExecutionContext;

/// Name the execution context is bound to inside conditions
pub const CONTEXT_BINDING: &str = "input";

/// Longest accepted condition source, in characters
pub const MAX_CONDITION_LENGTH: usize = 255;

/// Deepest accepted nesting of `not`, `!` and parentheses
pub const MAX_NESTING_DEPTH: usize = 64;

/// Condition parse or evaluation failure
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConditionError {
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Undefined key '{path}'")]
    UndefinedKey { path: String },
}

impl ConditionError {
    fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }
}

/// A parsed step condition
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    source: String,
    expr: Expr,
}

impl Condition {
    pub fn parse(source: &str) -> Result<Self, ConditionError> {
        let length = source.chars().count();
        if length > MAX_CONDITION_LENGTH {
            return Err(ConditionError::parse(
                0,
                format!(
                    "condition is {} characters long, the limit is {}",
                    length, MAX_CONDITION_LENGTH
                ),
            ));
        }

        let tokens = tokenize(source)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            end: source.len(),
            depth: 0,
        };

        if parser.is_at_end() {
            return Err(ConditionError::parse(0, "condition is empty"));
        }

        let expr = parser.parse_or()?;
        if let Some(token) = parser.peek() {
            return Err(ConditionError::parse(
                token.position,
                format!("unexpected {}", token.kind),
            ));
        }

        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn evaluate(&self, context: &ExecutionContext) -> Result<bool, ConditionError> {
        self.expr.evaluate(context)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Evaluate an optional condition; a step without one always runs
pub fn evaluate(
    condition: Option<&Condition>,
    context: &ExecutionContext,
) -> Result<bool, ConditionError> {
    match condition {
        Some(condition) => condition.evaluate(context),
        None => Ok(true),
    }
}

// Expression tree

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    Check {
        operand: Operand,
        check: Check,
        negated: bool,
    },
    Truthy(Operand),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Contains,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Check {
    Present,
    Null,
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Literal(Value),
    Path(Vec<Segment>),
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Key(String),
    Index(usize),
}

fn display_path(segments: &[Segment]) -> String {
    let mut path = CONTEXT_BINDING.to_string();
    for segment in segments {
        match segment {
            Segment::Key(key) => {
                path.push('.');
                path.push_str(key);
            }
            Segment::Index(index) => path.push_str(&format!("[{}]", index)),
        }
    }
    path
}

impl Expr {
    fn evaluate(&self, context: &ExecutionContext) -> Result<bool, ConditionError> {
        match self {
            Self::Or(left, right) => Ok(left.evaluate(context)? || right.evaluate(context)?),
            Self::And(left, right) => Ok(left.evaluate(context)? && right.evaluate(context)?),
            Self::Not(inner) => Ok(!inner.evaluate(context)?),
            Self::Compare { left, op, right } => {
                let left = left.resolve(context)?;
                let right = right.resolve(context)?;
                Ok(op.apply(&left, &right))
            }
            Self::Check {
                operand,
                check,
                negated,
            } => {
                let result = match check {
                    Check::Present => operand.lookup(context).is_some_and(|v| !v.is_null()),
                    Check::Null => operand.lookup(context).is_none_or(|v| v.is_null()),
                    Check::Empty => is_empty(&*operand.resolve(context)?),
                };
                Ok(result != *negated)
            }
            Self::Truthy(operand) => Ok(is_truthy(&*operand.resolve(context)?)),
        }
    }
}

impl Operand {
    /// Resolve the operand, treating an undefined key as absent
    fn lookup<'a>(&'a self, context: &'a ExecutionContext) -> Option<Cow<'a, Value>> {
        match self {
            Self::Literal(value) => Some(Cow::Borrowed(value)),
            Self::Path(segments) => {
                let (first, rest) = match segments.split_first() {
                    Some(split) => split,
                    None => return Some(Cow::Owned(Value::Object(context.as_map().clone()))),
                };

                let mut current = match first {
                    Segment::Key(key) => context.get(key)?,
                    Segment::Index(_) => return None,
                };
                for segment in rest {
                    current = match (segment, current) {
                        (Segment::Key(key), Value::Object(map)) => map.get(key)?,
                        (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
                        _ => return None,
                    };
                }
                Some(Cow::Borrowed(current))
            }
        }
    }

    /// Resolve the operand, failing on an undefined key
    fn resolve<'a>(&'a self, context: &'a ExecutionContext) -> Result<Cow<'a, Value>, ConditionError> {
        self.lookup(context).ok_or_else(|| match self {
            Self::Path(segments) => ConditionError::UndefinedKey {
                path: display_path(segments),
            },
            Self::Literal(_) => ConditionError::UndefinedKey {
                path: CONTEXT_BINDING.to_string(),
            },
        })
    }
}

impl CompareOp {
    fn apply(&self, left: &Value, right: &Value) -> bool {
        match self {
            Self::Eq => values_equal(left, right),
            Self::Ne => !values_equal(left, right),
            Self::Lt => compare_ordered(left, right, |o| o.is_lt()),
            Self::Le => compare_ordered(left, right, |o| o.is_le()),
            Self::Gt => compare_ordered(left, right, |o| o.is_gt()),
            Self::Ge => compare_ordered(left, right, |o| o.is_ge()),
            Self::In => contains(right, left),
            Self::NotIn => !contains(right, left),
            Self::Contains => contains(left, right),
        }
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare_ordered<F>(a: &Value, b: &Value, f: F) -> bool
where
    F: Fn(std::cmp::Ordering) -> bool,
{
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).is_some_and(f),
            _ => false,
        },
        (Value::String(x), Value::String(y)) => f(x.cmp(y)),
        _ => false,
    }
}

fn contains(container: &Value, item: &Value) -> bool {
    match container {
        Value::String(s) => item.as_str().is_some_and(|needle| s.contains(needle)),
        Value::Array(items) => items.iter().any(|v| values_equal(v, item)),
        Value::Object(map) => item.as_str().is_some_and(|key| map.contains_key(key)),
        _ => false,
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        other => !is_empty(other),
    }
}

// Tokenizer

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Ident(String),
    Str(String),
    Number(f64),
    Compare(CompareOp),
    AndAnd,
    OrOr,
    Bang,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "'{}'", name),
            Self::Str(s) => write!(f, "string \"{}\"", s),
            Self::Number(n) => write!(f, "number {}", n),
            Self::Compare(op) => {
                let symbol = match op {
                    CompareOp::Eq => "==",
                    CompareOp::Ne => "!=",
                    CompareOp::Lt => "<",
                    CompareOp::Le => "<=",
                    CompareOp::Gt => ">",
                    CompareOp::Ge => ">=",
                    CompareOp::In => "in",
                    CompareOp::NotIn => "not in",
                    CompareOp::Contains => "contains",
                };
                write!(f, "'{}'", symbol)
            }
            Self::AndAnd => f.write_str("'&&'"),
            Self::OrOr => f.write_str("'||'"),
            Self::Bang => f.write_str("'!'"),
            Self::LParen => f.write_str("'('"),
            Self::RParen => f.write_str("')'"),
            Self::LBracket => f.write_str("'['"),
            Self::RBracket => f.write_str("']'"),
            Self::Dot => f.write_str("'.'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    position: usize,
}

fn tokenize(source: &str) -> Result<Vec<Token>, ConditionError> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    let next_is = |i: usize, expected: char| chars.get(i + 1).is_some_and(|(_, c)| *c == expected);

    while i < chars.len() {
        let (position, c) = chars[i];

        let (kind, width) = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '(' => (TokenKind::LParen, 1),
            ')' => (TokenKind::RParen, 1),
            '[' => (TokenKind::LBracket, 1),
            ']' => (TokenKind::RBracket, 1),
            '.' => (TokenKind::Dot, 1),
            '=' if next_is(i, '=') => (TokenKind::Compare(CompareOp::Eq), 2),
            '=' => return Err(ConditionError::parse(position, "expected '==' for equality")),
            '!' if next_is(i, '=') => (TokenKind::Compare(CompareOp::Ne), 2),
            '!' => (TokenKind::Bang, 1),
            '<' if next_is(i, '=') => (TokenKind::Compare(CompareOp::Le), 2),
            '<' => (TokenKind::Compare(CompareOp::Lt), 1),
            '>' if next_is(i, '=') => (TokenKind::Compare(CompareOp::Ge), 2),
            '>' => (TokenKind::Compare(CompareOp::Gt), 1),
            '&' if next_is(i, '&') => (TokenKind::AndAnd, 2),
            '|' if next_is(i, '|') => (TokenKind::OrOr, 2),
            '"' | '\'' => {
                let (value, consumed) = read_string(&chars, i)?;
                tokens.push(Token {
                    kind: TokenKind::Str(value),
                    position,
                });
                i += consumed;
                continue;
            }
            c if c.is_ascii_digit()
                || (c == '-' && chars.get(i + 1).is_some_and(|(_, d)| d.is_ascii_digit())) =>
            {
                let start = i;
                i += 1;
                let mut seen_dot = false;
                while let Some((_, d)) = chars.get(i) {
                    if d.is_ascii_digit() {
                        i += 1;
                    } else if *d == '.'
                        && !seen_dot
                        && chars.get(i + 1).is_some_and(|(_, n)| n.is_ascii_digit())
                    {
                        seen_dot = true;
                        i += 1;
                    } else {
                        break;
                    }
                }
                let text: String = chars[start..i].iter().map(|(_, ch)| ch).collect();
                let number = text
                    .parse::<f64>()
                    .map_err(|_| ConditionError::parse(position, format!("invalid number '{}'", text)))?;
                tokens.push(Token {
                    kind: TokenKind::Number(number),
                    position,
                });
                continue;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while chars
                    .get(i)
                    .is_some_and(|(_, ch)| ch.is_alphanumeric() || *ch == '_')
                {
                    i += 1;
                }
                let name: String = chars[start..i].iter().map(|(_, ch)| ch).collect();
                tokens.push(Token {
                    kind: TokenKind::Ident(name),
                    position,
                });
                continue;
            }
            other => {
                return Err(ConditionError::parse(
                    position,
                    format!("unexpected character '{}'", other),
                ));
            }
        };

        tokens.push(Token { kind, position });
        i += width;
    }

    Ok(tokens)
}

/// Read a quoted string starting at `start`; returns the value and the
/// number of chars consumed including both quotes
fn read_string(chars: &[(usize, char)], start: usize) -> Result<(String, usize), ConditionError> {
    let (position, quote) = chars[start];
    let mut value = String::new();
    let mut i = start + 1;

    while let Some(&(at, c)) = chars.get(i) {
        match c {
            c if c == quote => return Ok((value, i - start + 1)),
            '\\' => {
                let (_, escaped) = chars
                    .get(i + 1)
                    .copied()
                    .ok_or_else(|| ConditionError::parse(at, "unterminated escape sequence"))?;
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
                i += 2;
            }
            c => {
                value.push(c);
                i += 1;
            }
        }
    }

    Err(ConditionError::parse(position, "unterminated string literal"))
}

// Parser

const RESERVED: &[&str] = &[
    "and", "or", "not", "is", "in", "contains", "true", "True", "false", "False", "null", "None",
];

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn position(&self) -> usize {
        self.peek().map(|t| t.position).unwrap_or(self.end)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token { kind: TokenKind::Ident(name), .. }) if name == keyword)
    }

    fn peek_keyword_at(&self, offset: usize, keyword: &str) -> bool {
        matches!(
            self.tokens.get(self.pos + offset),
            Some(Token { kind: TokenKind::Ident(name), .. }) if name == keyword
        )
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().is_some_and(|t| &t.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> ConditionError {
        match self.peek() {
            Some(token) => ConditionError::parse(
                token.position,
                format!("expected {}, found {}", expected, token.kind),
            ),
            None => ConditionError::parse(self.end, format!("expected {}, found end of input", expected)),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ConditionError> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("or") || self.eat(&TokenKind::OrOr) {
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ConditionError> {
        let mut left = self.parse_unary()?;
        while self.eat_keyword("and") || self.eat(&TokenKind::AndAnd) {
            let right = self.parse_unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ConditionError> {
        let position = self.position();

        if self.eat_keyword("not") || self.eat(&TokenKind::Bang) {
            self.descend(position)?;
            let inner = self.parse_unary();
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(inner?)));
        }

        if self.eat(&TokenKind::LParen) {
            self.descend(position)?;
            let inner = self.parse_or();
            self.depth -= 1;
            let inner = inner?;
            if !self.eat(&TokenKind::RParen) {
                return Err(self.unexpected("')'"));
            }
            return Ok(inner);
        }

        self.parse_predicate()
    }

    fn descend(&mut self, position: usize) -> Result<(), ConditionError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ConditionError::parse(
                position,
                format!("condition nests deeper than {} levels", MAX_NESTING_DEPTH),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_predicate(&mut self) -> Result<Expr, ConditionError> {
        let left = self.parse_operand()?;

        if let Some(Token {
            kind: TokenKind::Compare(op),
            ..
        }) = self.peek().cloned()
        {
            self.pos += 1;
            let right = self.parse_operand()?;
            return Ok(Expr::Compare { left, op, right });
        }

        if self.eat_keyword("is") {
            let negated = self.eat_keyword("not");
            let (check, flip) = match self.advance() {
                Some(Token {
                    kind: TokenKind::Ident(word),
                    position,
                }) => match word.as_str() {
                    "present" => (Check::Present, false),
                    "absent" if !negated => (Check::Present, true),
                    "null" | "None" => (Check::Null, false),
                    "empty" => (Check::Empty, false),
                    _ => {
                        return Err(ConditionError::parse(
                            position,
                            format!("unknown check '{}' after 'is'", word),
                        ));
                    }
                },
                Some(token) => {
                    return Err(ConditionError::parse(
                        token.position,
                        format!("expected present, absent, null or empty, found {}", token.kind),
                    ));
                }
                None => {
                    return Err(ConditionError::parse(
                        self.end,
                        "expected present, absent, null or empty, found end of input",
                    ));
                }
            };
            return Ok(Expr::Check {
                operand: left,
                check,
                negated: negated != flip,
            });
        }

        if self.peek_keyword("not") && self.peek_keyword_at(1, "in") {
            self.pos += 2;
            let right = self.parse_operand()?;
            return Ok(Expr::Compare {
                left,
                op: CompareOp::NotIn,
                right,
            });
        }

        if self.eat_keyword("in") {
            let right = self.parse_operand()?;
            return Ok(Expr::Compare {
                left,
                op: CompareOp::In,
                right,
            });
        }

        if self.eat_keyword("contains") {
            let right = self.parse_operand()?;
            return Ok(Expr::Compare {
                left,
                op: CompareOp::Contains,
                right,
            });
        }

        Ok(Expr::Truthy(left))
    }

    fn parse_operand(&mut self) -> Result<Operand, ConditionError> {
        let position = self.position();
        let token = self.advance().ok_or_else(|| {
            ConditionError::parse(self.end, "expected a value or key, found end of input")
        })?;

        match token.kind {
            TokenKind::Str(s) => Ok(Operand::Literal(Value::String(s))),
            TokenKind::Number(n) => Ok(Operand::Literal(number_value(n))),
            TokenKind::Ident(name) => match name.as_str() {
                "true" | "True" => Ok(Operand::Literal(Value::Bool(true))),
                "false" | "False" => Ok(Operand::Literal(Value::Bool(false))),
                "null" | "None" => Ok(Operand::Literal(Value::Null)),
                CONTEXT_BINDING => self.parse_segments(Vec::new()),
                name if RESERVED.contains(&name) => Err(ConditionError::parse(
                    position,
                    format!("unexpected keyword '{}'", name),
                )),
                _ => self.parse_segments(vec![Segment::Key(name)]),
            },
            other => Err(ConditionError::parse(
                position,
                format!("expected a value or key, found {}", other),
            )),
        }
    }

    fn parse_segments(&mut self, mut segments: Vec<Segment>) -> Result<Operand, ConditionError> {
        loop {
            if self.eat(&TokenKind::Dot) {
                match self.peek().map(|t| t.kind.clone()) {
                    Some(TokenKind::Ident(name)) => {
                        self.pos += 1;
                        segments.push(Segment::Key(name));
                    }
                    _ => return Err(self.unexpected("a key name after '.'")),
                }
            } else if self.eat(&TokenKind::LBracket) {
                let segment = match self.peek().cloned() {
                    Some(Token {
                        kind: TokenKind::Str(key),
                        ..
                    }) => Segment::Key(key),
                    Some(Token {
                        kind: TokenKind::Number(n),
                        position,
                    }) => {
                        if n < 0.0 || n.fract() != 0.0 {
                            return Err(ConditionError::parse(
                                position,
                                "array index must be a non-negative integer",
                            ));
                        }
                        Segment::Index(n as usize)
                    }
                    _ => return Err(self.unexpected("a string key or index inside '[]'")),
                };
                self.pos += 1;
                if !self.eat(&TokenKind::RBracket) {
                    return Err(self.unexpected("']'"));
                }
                segments.push(segment);
            } else {
                return Ok(Operand::Path(segments));
            }
        }
    }
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(value: Value) -> ExecutionContext {
        ExecutionContext::from_value(value).unwrap()
    }

    fn eval(source: &str, context: &ExecutionContext) -> Result<bool, ConditionError> {
        Condition::parse(source)?.evaluate(context)
    }

    #[test]
    fn test_absent_condition_is_true() {
        assert_eq!(evaluate(None, &ctx(json!({}))), Ok(true));
    }

    #[test]
    fn test_presence_checks() {
        let context = ctx(json!({"summary": "S", "nothing": null}));

        assert_eq!(eval("summary is present", &context), Ok(true));
        assert_eq!(eval("input.summary is present", &context), Ok(true));
        assert_eq!(eval("missing is present", &context), Ok(false));
        assert_eq!(eval("missing is absent", &context), Ok(true));
        assert_eq!(eval("missing is not present", &context), Ok(true));
        assert_eq!(eval("nothing is present", &context), Ok(false));
        assert_eq!(eval("nothing is null", &context), Ok(true));
        assert_eq!(eval("missing is null", &context), Ok(true));
        assert_eq!(eval("summary is not null", &context), Ok(true));
        assert_eq!(eval("input.a.b.c is present", &context), Ok(false));
    }

    #[test]
    fn test_comparisons() {
        let context = ctx(json!({
            "score": 7,
            "ratio": 0.5,
            "tier": "gold",
            "lead_data": {"Company": "Acme"}
        }));

        assert_eq!(eval("score > 5", &context), Ok(true));
        assert_eq!(eval("score >= 7.0", &context), Ok(true));
        assert_eq!(eval("score == 7", &context), Ok(true));
        assert_eq!(eval("ratio < 1", &context), Ok(true));
        assert_eq!(eval("tier == 'gold'", &context), Ok(true));
        assert_eq!(eval("tier != \"silver\"", &context), Ok(true));
        assert_eq!(eval("input.lead_data.Company == 'Acme'", &context), Ok(true));
        assert_eq!(eval("input[\"lead_data\"][\"Company\"] == 'Acme'", &context), Ok(true));
        assert_eq!(eval("tier > 5", &context), Ok(false));
    }

    #[test]
    fn test_membership() {
        let context = ctx(json!({
            "tags": ["vip", "new"],
            "body": "hello world",
            "lead_data": {"Email": "a@b.c"}
        }));

        assert_eq!(eval("'vip' in tags", &context), Ok(true));
        assert_eq!(eval("'old' not in tags", &context), Ok(true));
        assert_eq!(eval("tags contains 'new'", &context), Ok(true));
        assert_eq!(eval("body contains 'world'", &context), Ok(true));
        assert_eq!(eval("'Email' in lead_data", &context), Ok(true));
        assert_eq!(eval("'summary' in input", &context), Ok(false));
        assert_eq!(eval("tags[0] == 'vip'", &context), Ok(true));
    }

    #[test]
    fn test_connectives_and_precedence() {
        let context = ctx(json!({"a": true, "b": false, "n": 0}));

        assert_eq!(eval("a and not b", &context), Ok(true));
        assert_eq!(eval("a && !b", &context), Ok(true));
        assert_eq!(eval("b or a and b", &context), Ok(false));
        assert_eq!(eval("(b or a) and a", &context), Ok(true));
        assert_eq!(eval("b || n", &context), Ok(false));
        assert_eq!(eval("not (a and b)", &context), Ok(true));
    }

    #[test]
    fn test_truthiness() {
        let context = ctx(json!({
            "empty_text": "",
            "text": "x",
            "zero": 0,
            "list": [],
            "obj": {"k": 1}
        }));

        assert_eq!(eval("text", &context), Ok(true));
        assert_eq!(eval("empty_text", &context), Ok(false));
        assert_eq!(eval("zero", &context), Ok(false));
        assert_eq!(eval("list", &context), Ok(false));
        assert_eq!(eval("obj", &context), Ok(true));
        assert_eq!(eval("True", &context), Ok(true));
        assert_eq!(eval("list is empty", &context), Ok(true));
        assert_eq!(eval("obj is not empty", &context), Ok(true));
    }

    #[test]
    fn test_undefined_key_is_an_error() {
        let context = ctx(json!({"a": 1}));

        assert_eq!(
            eval("missing == 1", &context),
            Err(ConditionError::UndefinedKey {
                path: "input.missing".to_string()
            })
        );
        assert!(matches!(
            eval("input.a.b", &context),
            Err(ConditionError::UndefinedKey { .. })
        ));
        assert!(matches!(
            eval("missing is empty", &context),
            Err(ConditionError::UndefinedKey { .. })
        ));
    }

    #[test]
    fn test_parse_errors() {
        for source in [
            "",
            "   ",
            "a ==",
            "a = 1",
            "(a",
            "a is maybe",
            "summary is",
            "'unterminated",
            "a b",
            "and",
            "input.",
            "x[1.5]",
            "__import__('os') @ 1",
        ] {
            assert!(
                matches!(Condition::parse(source), Err(ConditionError::Parse { .. })),
                "expected parse error for {:?}",
                source
            );
        }
    }

    #[test]
    fn test_nesting_is_limited() {
        let context = ctx(json!({"a": true}));

        let deepest = format!(
            "{}a{}",
            "(".repeat(MAX_NESTING_DEPTH),
            ")".repeat(MAX_NESTING_DEPTH)
        );
        assert_eq!(eval(&deepest, &context), Ok(true));

        let too_deep = format!(
            "{}a{}",
            "(".repeat(MAX_NESTING_DEPTH + 1),
            ")".repeat(MAX_NESTING_DEPTH + 1)
        );
        assert!(matches!(
            Condition::parse(&too_deep),
            Err(ConditionError::Parse { message, .. }) if message.contains("nests deeper")
        ));

        let negations = format!("{}a", "!".repeat(MAX_NESTING_DEPTH + 1));
        assert!(matches!(
            Condition::parse(&negations),
            Err(ConditionError::Parse { .. })
        ));

        let mixed = format!("{}a{}", "not (".repeat(40), ")".repeat(40));
        assert!(matches!(
            Condition::parse(&mixed),
            Err(ConditionError::Parse { .. })
        ));
    }

    #[test]
    fn test_long_conditions_are_rejected() {
        let at_limit = format!("a == '{}'", "x".repeat(MAX_CONDITION_LENGTH - 7));
        assert_eq!(at_limit.len(), MAX_CONDITION_LENGTH);
        assert!(Condition::parse(&at_limit).is_ok());

        let nested = format!("{}a{}", "(".repeat(20_000), ")".repeat(20_000));
        assert!(matches!(
            Condition::parse(&nested),
            Err(ConditionError::Parse { position: 0, .. })
        ));

        let negated = format!("{}a", "not ".repeat(20_000));
        assert!(matches!(
            Condition::parse(&negated),
            Err(ConditionError::Parse { position: 0, .. })
        ));
    }

    #[test]
    fn test_parse_error_position() {
        let err = Condition::parse("a == 1 )").unwrap_err();
        assert_eq!(
            err,
            ConditionError::Parse {
                position: 7,
                message: "unexpected ')'".to_string()
            }
        );
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let condition = Condition::parse("summary is present and score > 2").unwrap();
        let context = ctx(json!({"summary": "S", "score": 3}));

        let first = condition.evaluate(&context);
        let second = condition.evaluate(&context);
        assert_eq!(first, Ok(true));
        assert_eq!(first, second);
        assert_eq!(condition.source(), "summary is present and score > 2");
    }
}
