//! Parser utilities

use super::PResult;
use winnow::ascii::multispace0;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;

/// Make a parser whitespace-insensitive
pub fn ws<'a, F, O>(mut parser: F) -> impl Parser<&'a str, O, ContextError>
where
    F: Parser<&'a str, O, ContextError>,
{
    move |input: &mut &'a str| -> PResult<O> {
        let _ = multispace0.parse_next(input)?;
        let output = parser.parse_next(input)?;
        let _ = multispace0.parse_next(input)?;
        Ok(output)
    }
}

/// Case-insensitive keyword parser
#[must_use]
pub fn tag_no_case<'a>(tag: &'static str) -> impl Parser<&'a str, &'a str, ContextError> {
    move |input: &mut &'a str| -> PResult<&'a str> {
        match input.get(..tag.len()) {
            Some(head) if head.eq_ignore_ascii_case(tag) => {
                *input = &input[tag.len()..];
                Ok(head)
            }
            _ => Err(ErrMode::Backtrack(ContextError::default())),
        }
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends
#[must_use]
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws() {
        let mut input = "  hello  world  ";
        let mut parser = ws("hello");
        let result = parser.parse_next(&mut input).unwrap();
        assert_eq!(result, "hello");
        assert_eq!(input, "world  ");
    }

    #[test]
    fn test_tag_no_case() {
        let mut input = "STRING{...}";
        let result = tag_no_case("string").parse_next(&mut input).unwrap();
        assert_eq!(result, "STRING");
        assert_eq!(input, "{...}");

        let mut short = "st";
        assert!(tag_no_case("string").parse_next(&mut short).is_err());
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a\n\t b  c "), "a b c");
    }
}
