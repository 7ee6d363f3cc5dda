// src/filter/columnfilter.rs

//! Column filter expressions: grammar, [`Expression`] tree, and evaluation.
//!
//! ```text
//! expr      := and_expr ( OR and_expr )*
//! and_expr  := relation ( AND relation )*
//! relation  := operand rel_op operand
//! operand   := '$' digits | '"' chars '"'
//! rel_op    := '==' | '!=' | '<>' | '~='
//! AND       := 'and' | 'AND' | '&&'
//! OR        := 'or' | 'OR' | '||'
//! ```
//!
//! `AND` binds tighter than `OR`. Whitespace around tokens is optional.
//! Inside a string literal `\"` is a quote and `\\` a backslash.
//!
//! `$N` is the 1-based column `N`; a missing column is `""`. `~=` treats the
//! right operand as a regular expression and searches the left operand.

use crate::common::ColumnIndex;
use crate::data::logline::LogLine;
use crate::filter::Filter;

use std::fmt;

use ::regex::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};
use ::thiserror::Error;

/// Failure to parse a filter expression. `position` is the character offset
/// where parsing stopped.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("invalid filter expression at position {position}: {message}")]
pub struct FilterParseError {
    pub position: usize,
    pub message: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RelationOp {
    Equals,
    NotEquals,
    MatchesRegexp,
}

impl fmt::Display for RelationOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            RelationOp::Equals => "==",
            RelationOp::NotEquals => "!=",
            RelationOp::MatchesRegexp => "~=",
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogicalOp {
    And,
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        })
    }
}

/// A node of a parsed filter expression.
///
/// The parser only puts `Literal` and `ColumnRef` under a `Relation`, and only
/// `Relation` and `Logical` under a `Logical`.
#[derive(Clone, Debug)]
pub enum Expression {
    Literal(String),
    ColumnRef(ColumnIndex),
    Relation {
        op: RelationOp,
        left: Box<Expression>,
        right: Box<Expression>,
        /// `right` compiled once when `op` is `MatchesRegexp` and `right` is a
        /// `Literal`
        regex: Option<Regex>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Expression {
    /// The string value of an operand.
    pub fn evaluate_string<'a>(&'a self, logline: &'a LogLine) -> &'a str {
        match self {
            Expression::Literal(value) => value.as_str(),
            Expression::ColumnRef(index) => logline.column(*index),
            Expression::Relation { .. } | Expression::Logical { .. } => "",
        }
    }

    /// The truth value of a `Relation` or `Logical`.
    pub fn evaluate_bool(&self, logline: &LogLine) -> bool {
        match self {
            Expression::Relation { op, left, right, regex } => {
                let left: &str = left.evaluate_string(logline);
                match op {
                    RelationOp::Equals => left == right.evaluate_string(logline),
                    RelationOp::NotEquals => left != right.evaluate_string(logline),
                    RelationOp::MatchesRegexp => match regex {
                        Some(regex) => regex.is_match(left),
                        // pattern from a column; an invalid pattern matches nothing
                        None => match Regex::new(right.evaluate_string(logline)) {
                            Ok(regex) => regex.is_match(left),
                            Err(_) => false,
                        },
                    },
                }
            }
            Expression::Logical { op: LogicalOp::And, left, right } => {
                left.evaluate_bool(logline) && right.evaluate_bool(logline)
            }
            Expression::Logical { op: LogicalOp::Or, left, right } => {
                left.evaluate_bool(logline) || right.evaluate_bool(logline)
            }
            Expression::Literal(_) | Expression::ColumnRef(_) => false,
        }
    }
}

/// Fully parenthesized form, e.g. `(($1 == "a") OR ($2 ~= "b"))`.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Literal(value) => {
                write!(f, "\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
            }
            Expression::ColumnRef(index) => write!(f, "${}", index),
            Expression::Relation { op, left, right, .. } => {
                write!(f, "({} {} {})", left, op, right)
            }
            Expression::Logical { op, left, right } => write!(f, "({} {} {})", left, op, right),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// parser
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const AND_TOKENS: [&str; 3] = ["&&", "and", "AND"];
const OR_TOKENS: [&str; 3] = ["||", "or", "OR"];
const RELATION_TOKENS: [(&str, RelationOp); 4] = [
    ("==", RelationOp::Equals),
    ("!=", RelationOp::NotEquals),
    ("<>", RelationOp::NotEquals),
    ("~=", RelationOp::MatchesRegexp),
];

/// Recursive descent parser over the characters of one expression.
struct FilterParser {
    chars: Vec<char>,
    pos: usize,
}

type ParseResult = Result<Expression, FilterParseError>;

impl FilterParser {
    fn new(input: &str) -> FilterParser {
        FilterParser {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, message: String) -> FilterParseError {
        FilterParseError {
            position: self.pos,
            message,
        }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.chars.len() && self.chars[self.pos].is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    /// Consume the first of `tokens` found at the current position.
    fn consume_any(&mut self, tokens: &[&str]) -> bool {
        for token in tokens.iter() {
            if self.starts_with(token) {
                self.pos += token.chars().count();
                return true;
            }
        }

        false
    }

    fn parse(&mut self) -> ParseResult {
        let expr = self.parse_or()?;
        self.skip_ws();
        if let Some(c) = self.peek() {
            return Err(self.error(format!("unexpected {:?}, expected AND, OR or end", c)));
        }

        Ok(expr)
    }

    fn parse_or(&mut self) -> ParseResult {
        let mut left = self.parse_and()?;
        loop {
            self.skip_ws();
            if !self.consume_any(&OR_TOKENS) {
                break;
            }
            let right = self.parse_and()?;
            left = Expression::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult {
        let mut left = self.parse_relation()?;
        loop {
            self.skip_ws();
            if !self.consume_any(&AND_TOKENS) {
                break;
            }
            let right = self.parse_relation()?;
            left = Expression::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_relation(&mut self) -> ParseResult {
        let left = self.parse_operand()?;
        self.skip_ws();
        let op: RelationOp = match RELATION_TOKENS.iter().find(|(token, _)| self.starts_with(token)) {
            Some((token, op)) => {
                self.pos += token.len();
                *op
            }
            None => return Err(self.error("expected ==, !=, <> or ~=".to_string())),
        };
        let right_pos: usize = {
            self.skip_ws();
            self.pos
        };
        let right = self.parse_operand()?;
        let regex: Option<Regex> = match (&op, &right) {
            (RelationOp::MatchesRegexp, Expression::Literal(pattern)) => match Regex::new(pattern) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    return Err(FilterParseError {
                        position: right_pos,
                        message: format!("invalid regular expression: {}", err),
                    });
                }
            },
            _ => None,
        };

        Ok(Expression::Relation {
            op,
            left: Box::new(left),
            right: Box::new(right),
            regex,
        })
    }

    fn parse_operand(&mut self) -> ParseResult {
        self.skip_ws();
        match self.peek() {
            Some('$') => self.parse_column(),
            Some('"') => self.parse_string(),
            Some(c) => Err(self.error(format!("unexpected {:?}, expected $N or \"string\"", c))),
            None => Err(self.error("unexpected end, expected $N or \"string\"".to_string())),
        }
    }

    fn parse_column(&mut self) -> ParseResult {
        self.advance();
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected column number after $".to_string()));
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        match digits.parse::<ColumnIndex>() {
            Ok(index) => Ok(Expression::ColumnRef(index)),
            Err(err) => Err(FilterParseError {
                position: start,
                message: format!("bad column number {:?}: {}", digits, err),
            }),
        }
    }

    fn parse_string(&mut self) -> ParseResult {
        let start = self.pos;
        self.advance();
        let mut value = String::new();
        loop {
            match self.advance() {
                Some('"') => return Ok(Expression::Literal(value)),
                Some('\\') => match self.advance() {
                    Some(c) => value.push(c),
                    None => break,
                },
                Some(c) => value.push(c),
                None => break,
            }
        }

        Err(FilterParseError {
            position: start,
            message: "unterminated string".to_string(),
        })
    }
}

/// Parse `text` into an [`Expression`].
pub fn parse_expression(text: &str) -> Result<Expression, FilterParseError> {
    defn!("({:?})", text);
    let result = FilterParser::new(text).parse();
    defx!("return {:?}", result.as_ref().map(|expr| expr.to_string()));

    result
}

/// A [`Filter`] built from one filter expression.
#[derive(Clone, Debug)]
pub struct ColumnFilter {
    expr: Expression,
}

impl ColumnFilter {
    pub fn new(text: &str) -> Result<ColumnFilter, FilterParseError> {
        Ok(ColumnFilter {
            expr: parse_expression(text)?,
        })
    }

    pub const fn expression(&self) -> &Expression {
        &self.expr
    }
}

impl Filter for ColumnFilter {
    fn match_line(&self, logline: &LogLine) -> bool {
        self.expr.evaluate_bool(logline)
    }
}

impl fmt::Display for ColumnFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}
