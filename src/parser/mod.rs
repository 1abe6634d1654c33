//! BibTeX reader built on winnow
//!
//! Produces [`ParsedItem`]s with unexpanded values; [`crate::import`] turns
//! them into tagged-field records.

pub mod entry;
pub mod lexer;
pub mod utils;
pub mod value;

use crate::error::Location;
use crate::{Error, Result};
use winnow::ascii::multispace0;
use winnow::error::ContextError;
use winnow::prelude::*;

pub use entry::{parse_entry, RawEntry};
pub use value::{Macros, Value};

/// Internal parser result type
pub type PResult<O> = winnow::PResult<O, ContextError>;

/// A parsed item from a BibTeX file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedItem<'a> {
    /// A bibliography entry
    Entry(RawEntry<'a>),
    /// A `@string` definition
    String(&'a str, Value<'a>),
    /// A `@preamble`
    Preamble(Value<'a>),
    /// A `@comment`, `%` line or stray text between entries
    Comment(&'a str),
}

/// Parse every item of a BibTeX file
pub fn parse_bibtex(input: &str) -> Result<Vec<ParsedItem<'_>>> {
    let mut items = Vec::new();
    let mut remaining = input;

    loop {
        lexer::skip_whitespace(&mut remaining);
        if remaining.is_empty() {
            break;
        }

        if !remaining.starts_with('@') {
            items.push(parse_stray_text(&mut remaining));
            continue;
        }

        let start = remaining;
        match parse_item(&mut remaining) {
            Ok(item) => items.push(item),
            Err(e) => {
                let location = Location::of_offset(input, input.len() - start.len());
                return Err(Error::ParseError {
                    line: location.line,
                    column: location.column,
                    message: format!("Failed to parse entry: {e}"),
                    snippet: Some(get_snippet(start, 40)),
                });
            }
        }
    }

    Ok(items)
}

/// `%` comment lines and free text outside entries
fn parse_stray_text<'a>(input: &mut &'a str) -> ParsedItem<'a> {
    if let Some(line) = input.strip_prefix('%') {
        let end = memchr::memchr(b'\n', line.as_bytes()).unwrap_or(line.len());
        *input = &line[end..];
        return ParsedItem::Comment(line[..end].trim_end());
    }
    ParsedItem::Comment(lexer::until_entry(input).trim_end())
}

/// Parse a single `@` item
fn parse_item<'a>(input: &mut &'a str) -> PResult<ParsedItem<'a>> {
    winnow::combinator::alt((
        parse_comment.map(ParsedItem::Comment),
        parse_string.map(|(k, v)| ParsedItem::String(k, v)),
        parse_preamble.map(ParsedItem::Preamble),
        parse_entry.map(ParsedItem::Entry),
    ))
    .parse_next(input)
}

/// Parse a `@string` definition
fn parse_string<'a>(input: &mut &'a str) -> PResult<(&'a str, Value<'a>)> {
    use winnow::combinator::{alt, delimited, preceded, separated_pair};

    let content = |input: &mut &'a str| -> PResult<(&'a str, Value<'a>)> {
        separated_pair(
            utils::ws(lexer::identifier),
            utils::ws('='),
            utils::ws(value::parse_value),
        )
        .parse_next(input)
    };

    preceded(
        ('@', utils::tag_no_case("string"), multispace0),
        alt((delimited('{', content, '}'), delimited('(', content, ')'))),
    )
    .parse_next(input)
}

/// Parse a `@preamble`
fn parse_preamble<'a>(input: &mut &'a str) -> PResult<Value<'a>> {
    use winnow::combinator::{alt, delimited, preceded};

    preceded(
        ('@', utils::tag_no_case("preamble"), multispace0),
        alt((
            delimited('{', utils::ws(value::parse_value), '}'),
            delimited('(', utils::ws(value::parse_value), ')'),
        )),
    )
    .parse_next(input)
}

/// Parse a `@comment{...}`
fn parse_comment<'a>(input: &mut &'a str) -> PResult<&'a str> {
    use winnow::combinator::{delimited, preceded};

    preceded(
        ('@', utils::tag_no_case("comment"), multispace0),
        delimited('{', lexer::balanced_braces, '}'),
    )
    .parse_next(input)
}

/// Get a snippet of input for error messages
fn get_snippet(input: &str, max_len: usize) -> String {
    let snippet: String = input.chars().take(max_len).collect();
    if input.chars().count() > max_len {
        format!("{snippet}...")
    } else {
        snippet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_items() {
        let input = r#"
            % a line comment
            @string{me = "John Doe"}
            @preamble{"\newcommand{\noop}[1]{}"}
            @comment{ignored {nested} text}
            Some stray text
            @article{test2023, author = me, title = "Test"}
        "#;

        let items = parse_bibtex(input).unwrap();
        assert_eq!(items.len(), 6);
        assert_eq!(items[0], ParsedItem::Comment(" a line comment"));
        assert!(matches!(items[1], ParsedItem::String("me", _)));
        assert!(matches!(items[2], ParsedItem::Preamble(_)));
        assert_eq!(items[3], ParsedItem::Comment("ignored {nested} text"));
        assert_eq!(items[4], ParsedItem::Comment("Some stray text"));
        match &items[5] {
            ParsedItem::Entry(entry) => assert_eq!(entry.key, "test2023"),
            other => panic!("expected entry, got {other:?}"),
        }
    }

    #[test]
    fn test_error_location() {
        let input = "@article{ok, title = \"A\"}\n\n@article{broken, title = \"B\" year = 1}";
        match parse_bibtex(input) {
            Err(Error::ParseError { line, column, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(column, 1);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_snippet_truncation() {
        assert_eq!(get_snippet("abcdef", 3), "abc...");
        assert_eq!(get_snippet("abc", 3), "abc");
    }
}
