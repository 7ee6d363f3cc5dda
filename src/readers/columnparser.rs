// src/readers/columnparser.rs

//! Split a log line into [`Columns`].
//!
//! A line that looks like a JSON object (see [`is_json_line`]) becomes one
//! column per top-level value, in key order. Any other line, or a JSON-looking
//! line that fails to parse as an object, is split on whitespace with these
//! groupings:
//!
//! * `"..."` anywhere, and `'...'` at the start of a column, group text into
//!   one column; the quotes are removed and `\` escapes the next character
//! * `[...]`, `(...)` and `{...}` group text into one column; the brackets
//!   are kept and nested brackets are tracked
//!
//! [`Columns`]: crate::data::logline::Columns

use crate::data::logline::Columns;

use ::serde_json::Value;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Column separators.
#[inline(always)]
pub const fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

const fn closing_bracket(c: char) -> Option<char> {
    match c {
        '[' => Some(']'),
        '(' => Some(')'),
        '{' => Some('}'),
        _ => None,
    }
}

/// Does the trimmed `line` start with `{` and end with `}`?
pub fn is_json_line(line: &str) -> bool {
    let trimmed = line.trim();

    trimmed.len() >= 2 && trimmed.starts_with('{') && trimmed.ends_with('}')
}

/// Columns of a JSON object line; `None` if `line` is not a JSON object.
pub fn parse_json_columns(line: &str) -> Option<Columns> {
    let value: Value = serde_json::from_str(line.trim()).ok()?;
    let object = match value {
        Value::Object(object) => object,
        _ => return None,
    };
    let columns: Columns = object
        .into_iter()
        .map(|(_key, value)| match value {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect();

    Some(columns)
}

/// Whitespace tokenizer with quote and bracket grouping.
pub fn parse_plain_columns(line: &str) -> Columns {
    let mut columns = Columns::new();
    let mut column = String::new();
    // true while between columns
    let mut between: bool = true;
    // the open quote character, if within quotes
    let mut quote: Option<char> = None;
    // the expected closing brackets, innermost last
    let mut brackets: Vec<char> = Vec::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        column.push(escaped);
                    }
                }
                _ if c == q => quote = None,
                _ => column.push(c),
            }
            continue;
        }
        if !brackets.is_empty() {
            column.push(c);
            if let Some(closer) = closing_bracket(c) {
                brackets.push(closer);
            } else if brackets.last() == Some(&c) {
                brackets.pop();
            }
            continue;
        }
        if is_whitespace(c) {
            if !between {
                columns.push(std::mem::take(&mut column));
                between = true;
            }
            continue;
        }
        let column_start: bool = between;
        between = false;
        match c {
            '"' => quote = Some(c),
            '\'' if column_start => quote = Some(c),
            _ => {
                column.push(c);
                if let Some(closer) = closing_bracket(c) {
                    brackets.push(closer);
                }
            }
        }
    }
    if !between {
        columns.push(column);
    }

    columns
}

/// Split `line` into columns, as JSON if it looks like JSON.
pub fn parse_columns(line: &str) -> Columns {
    if is_json_line(line) {
        if let Some(columns) = parse_json_columns(line) {
            return columns;
        }
        defo!("JSON-like line is not a JSON object, falling back");
    }

    parse_plain_columns(line)
}
