//! Field values: literals, numbers, `@string` references and `#` concatenation

use super::{lexer, utils, PResult};
use crate::{Error, Result};
use ahash::AHashMap;
use std::borrow::Cow;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;

/// A field value as written in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value<'a> {
    /// Quoted or braced text
    Literal(Cow<'a, str>),
    /// Bare integer
    Number(i64),
    /// Reference to an `@string` definition
    Variable(&'a str),
    /// Parts joined with `#`
    Concat(Vec<Value<'a>>),
}

/// `@string` definitions, looked up case-insensitively
#[derive(Debug, Clone)]
pub struct Macros {
    defs: AHashMap<String, String>,
}

const MONTHS: [(&str, &str); 12] = [
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

impl Default for Macros {
    /// The predefined month abbreviations
    fn default() -> Self {
        Self {
            defs: MONTHS
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }
}

impl Macros {
    /// Define or redefine a macro
    pub fn define(&mut self, name: &str, value: String) {
        self.defs.insert(name.to_ascii_lowercase(), value);
    }

    /// Look up a macro
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.defs.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

impl Value<'_> {
    /// Resolve references and concatenation into plain text
    pub fn expand(&self, macros: &Macros) -> Result<String> {
        match self {
            Self::Literal(s) => Ok(s.to_string()),
            Self::Number(n) => Ok(n.to_string()),
            Self::Variable(name) => macros
                .get(name)
                .map(str::to_string)
                .ok_or_else(|| Error::UndefinedVariable((*name).to_string())),
            Self::Concat(parts) => parts.iter().map(|p| p.expand(macros)).collect(),
        }
    }
}

/// Parse a value, including `a # b` concatenation
pub fn parse_value<'a>(input: &mut &'a str) -> PResult<Value<'a>> {
    let mut parts = vec![parse_single_value(input)?];

    loop {
        let checkpoint = *input;
        if utils::ws('#').parse_next(input).is_err() {
            *input = checkpoint;
            break;
        }
        parts.push(parse_single_value(input)?);
    }

    Ok(if parts.len() == 1 {
        parts.remove(0)
    } else {
        Value::Concat(parts)
    })
}

fn parse_single_value<'a>(input: &mut &'a str) -> PResult<Value<'a>> {
    match input.chars().next() {
        Some('"') => lexer::quoted_string(input).map(|s| Value::Literal(Cow::Borrowed(s))),
        Some('{') => {
            *input = &input[1..];
            let content = lexer::balanced_braces(input)?;
            // balanced_braces stops right before the closing brace
            *input = &input[1..];
            Ok(Value::Literal(Cow::Borrowed(content)))
        }
        Some(c) if c.is_ascii_digit() || c == '-' || c == '+' => {
            lexer::number(input).map(Value::Number)
        }
        Some(c) if c.is_alphabetic() => lexer::identifier(input).map(Value::Variable),
        _ => Err(ErrMode::Backtrack(ContextError::default())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literals() {
        let mut input = r#""hello world" xxx"#;
        assert_eq!(
            parse_value(&mut input).unwrap(),
            Value::Literal(Cow::Borrowed("hello world"))
        );
        assert_eq!(input, " xxx");

        let mut input = "{hello {world}} xxx";
        assert_eq!(
            parse_value(&mut input).unwrap(),
            Value::Literal(Cow::Borrowed("hello {world}"))
        );
        assert_eq!(input, " xxx");
    }

    #[test]
    fn test_parse_number_and_variable() {
        let mut input = "2023,";
        assert_eq!(parse_value(&mut input).unwrap(), Value::Number(2023));
        assert_eq!(input, ",");

        let mut input = "jan,";
        assert_eq!(parse_value(&mut input).unwrap(), Value::Variable("jan"));
    }

    #[test]
    fn test_parse_concatenation() {
        let mut input = r#""hello" # myvar # {world} ,"#;
        let value = parse_value(&mut input).unwrap();
        assert_eq!(
            value,
            Value::Concat(vec![
                Value::Literal(Cow::Borrowed("hello")),
                Value::Variable("myvar"),
                Value::Literal(Cow::Borrowed("world")),
            ])
        );
        assert_eq!(input, " ,");
    }

    #[test]
    fn test_expand() {
        let mut macros = Macros::default();
        macros.define("IEEE", "IEEE Press".to_string());

        let value = Value::Concat(vec![
            Value::Variable("ieee"),
            Value::Literal(Cow::Borrowed(", ")),
            Value::Variable("Jun"),
            Value::Number(5),
        ]);
        assert_eq!(value.expand(&macros).unwrap(), "IEEE Press, June5");

        assert!(matches!(
            Value::Variable("nope").expand(&macros),
            Err(Error::UndefinedVariable(name)) if name == "nope"
        ));
    }
}
