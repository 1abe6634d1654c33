//! Entry parsing for BibTeX

use super::value::{parse_value, Value};
use super::{lexer, utils, PResult};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;

/// A bibliography entry exactly as written: type, key and unexpanded fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry<'a> {
    /// Entry type as written (`article`, `InProceedings`, ...)
    pub ty: &'a str,
    /// Citation key, possibly empty
    pub key: &'a str,
    /// Fields in source order
    pub fields: Vec<(&'a str, Value<'a>)>,
}

/// Parse a bibliography entry starting at `@`
pub fn parse_entry<'a>(input: &mut &'a str) -> PResult<RawEntry<'a>> {
    utils::ws('@').parse_next(input)?;
    let ty = lexer::identifier.parse_next(input)?;
    lexer::skip_whitespace(input);

    let close = match input.chars().next() {
        Some('{') => '}',
        Some('(') => ')',
        _ => return Err(ErrMode::Backtrack(ContextError::default())),
    };
    *input = &input[1..];

    let entry = parse_entry_body(input, ty)?;
    utils::ws(close).parse_next(input)?;
    Ok(entry)
}

/// Key and fields
fn parse_entry_body<'a>(input: &mut &'a str, ty: &'a str) -> PResult<RawEntry<'a>> {
    lexer::skip_whitespace(input);

    // A key is optional when the first thing is already a field
    let checkpoint = *input;
    let key = match utils::ws(lexer::citation_key).parse_next(input) {
        Ok(key) if input.starts_with(',') => {
            *input = &input[1..];
            key
        }
        Ok(key) if input.starts_with('}') || input.starts_with(')') => key,
        _ => {
            *input = checkpoint;
            // `@misc{, title = ...}`
            if let Some(rest) = input.strip_prefix(',') {
                *input = rest;
            }
            ""
        }
    };

    let fields = parse_fields(input)?;
    Ok(RawEntry { ty, key, fields })
}

/// Parse `name = value` pairs separated by commas, trailing comma allowed
fn parse_fields<'a>(input: &mut &'a str) -> PResult<Vec<(&'a str, Value<'a>)>> {
    let mut fields = Vec::new();

    loop {
        lexer::skip_whitespace(input);
        if input.is_empty() || input.starts_with('}') || input.starts_with(')') {
            break;
        }

        let name = utils::ws(lexer::identifier).parse_next(input)?;
        utils::ws('=').parse_next(input)?;
        let value = utils::ws(parse_value).parse_next(input)?;
        fields.push((name, value));

        if input.starts_with(',') {
            *input = &input[1..];
        } else if !input.starts_with('}') && !input.starts_with(')') {
            return Err(ErrMode::Backtrack(ContextError::default()));
        }
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn test_parse_simple_entry() {
        let mut input = r#"@article{einstein1905,
            author = "Albert Einstein",
            title = {Zur Elektrodynamik bewegter Körper},
            year = 1905
        }"#;

        let entry = parse_entry(&mut input).unwrap();
        assert_eq!(entry.ty, "article");
        assert_eq!(entry.key, "einstein1905");
        assert_eq!(entry.fields.len(), 3);
        assert_eq!(
            entry.fields[1],
            ("title", Value::Literal(Cow::Borrowed("Zur Elektrodynamik bewegter Körper")))
        );
        assert_eq!(entry.fields[2], ("year", Value::Number(1905)));
        assert!(input.is_empty());
    }

    #[test]
    fn test_parse_entry_with_parens_and_trailing_comma() {
        let mut input = r#"@Book(knuth1984,
            title = "The TeXbook",
            year = 1984,
        )"#;

        let entry = parse_entry(&mut input).unwrap();
        assert_eq!(entry.ty, "Book");
        assert_eq!(entry.fields.len(), 2);
    }

    #[test]
    fn test_parse_entry_without_key() {
        let mut input = r#"@misc{title = "Anonymous"}"#;
        let entry = parse_entry(&mut input).unwrap();
        assert_eq!(entry.key, "");
        assert_eq!(entry.fields.len(), 1);

        let mut input = r#"@misc{, note = "Empty key"}"#;
        let entry = parse_entry(&mut input).unwrap();
        assert_eq!(entry.key, "");
        assert_eq!(entry.fields[0].0, "note");
    }

    #[test]
    fn test_missing_comma_is_an_error() {
        let mut input = r#"@misc{k, title = "A" note = "B"}"#;
        assert!(parse_entry(&mut input).is_err());
    }
}
