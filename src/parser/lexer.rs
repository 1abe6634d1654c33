//! Lexical analysis for BibTeX

use super::PResult;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::{
    ascii::digit1,
    combinator::{alt, opt},
    token::take_while,
};

fn backtrack<T>() -> PResult<T> {
    Err(ErrMode::Backtrack(ContextError::default()))
}

/// Parse an identifier (letters, numbers, underscores, hyphens, colons, dots)
pub fn identifier<'a>(input: &mut &'a str) -> PResult<&'a str> {
    take_while(1.., |c: char| {
        c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '.' | '+' | '\'')
    })
    .parse_next(input)
}

/// Parse a citation key: anything up to a comma, closing delimiter or whitespace
pub fn citation_key<'a>(input: &mut &'a str) -> PResult<&'a str> {
    take_while(1.., |c: char| {
        !c.is_whitespace() && !matches!(c, ',' | '}' | ')' | '{' | '(' | '"' | '#' | '=')
    })
    .parse_next(input)
}

/// Parse the inside of `{ ... }`, stopping before the matching `}`
pub fn balanced_braces<'a>(input: &mut &'a str) -> PResult<&'a str> {
    let original = *input;
    let bytes = original.as_bytes();
    let mut depth = 0usize;
    let mut pos = 0;

    while let Some(offset) = memchr::memchr3(b'{', b'}', b'\\', &bytes[pos..]) {
        pos += offset;
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' if depth == 0 => {
                *input = &original[pos..];
                return Ok(&original[..pos]);
            }
            b'}' => depth -= 1,
            // Skip the escaped character, unless it is multi-byte
            _ if pos + 1 < bytes.len() && bytes[pos + 1].is_ascii() => {
                pos += 2;
                continue;
            }
            _ => {}
        }
        pos += 1;
    }

    backtrack()
}

/// Parse a quoted string `"..."`, returning the text between the quotes
///
/// Quotes nested inside braces do not terminate the string.
pub fn quoted_string<'a>(input: &mut &'a str) -> PResult<&'a str> {
    let start = *input;
    let bytes = start.as_bytes();

    if bytes.first() != Some(&b'"') {
        return backtrack();
    }

    let mut pos = 1;
    let mut brace_depth = 0usize;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if pos + 1 < bytes.len() && bytes[pos + 1].is_ascii() => pos += 2,
            b'"' if brace_depth == 0 => {
                *input = &start[pos + 1..];
                return Ok(&start[1..pos]);
            }
            b'{' => {
                brace_depth += 1;
                pos += 1;
            }
            b'}' if brace_depth > 0 => {
                brace_depth -= 1;
                pos += 1;
            }
            _ => pos += 1,
        }
    }

    backtrack()
}

/// Parse an integer
pub fn number(input: &mut &str) -> PResult<i64> {
    let sign = opt(alt(('+', '-'))).parse_next(input)?;
    let digits = digit1.parse_next(input)?;

    let num = digits
        .parse::<i64>()
        .map_err(|_| ErrMode::Backtrack(ContextError::default()))?;

    Ok(if sign == Some('-') { -num } else { num })
}

/// Skip ASCII whitespace
pub fn skip_whitespace(input: &mut &str) {
    *input = input.trim_start_matches([' ', '\t', '\n', '\r']);
}

/// Text up to the next `@`, or everything when there is none
pub fn until_entry<'a>(input: &mut &'a str) -> &'a str {
    let end = memchr::memchr(b'@', input.as_bytes()).unwrap_or(input.len());
    let (text, rest) = input.split_at(end);
    *input = rest;
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier() {
        let mut input = "hello-world_123:test.com xxx";
        let result = identifier(&mut input).unwrap();
        assert_eq!(result, "hello-world_123:test.com");
        assert_eq!(input, " xxx");
    }

    #[test]
    fn test_citation_key() {
        let mut input = "doe/2020+x, title";
        assert_eq!(citation_key(&mut input).unwrap(), "doe/2020+x");
        assert_eq!(input, ", title");
    }

    #[test]
    fn test_balanced_braces() {
        let mut input = "hello {nested {braces}} world} xxx";
        let result = balanced_braces(&mut input).unwrap();
        assert_eq!(result, "hello {nested {braces}} world");
        assert_eq!(input, "} xxx");

        let mut input = r"escaped \} brace} xxx";
        assert_eq!(balanced_braces(&mut input).unwrap(), r"escaped \} brace");

        let mut unterminated = "no end {here}";
        assert!(balanced_braces(&mut unterminated).is_err());
    }

    #[test]
    fn test_quoted_string() {
        let mut input = r#""hello \"world\"" xxx"#;
        let result = quoted_string(&mut input).unwrap();
        assert_eq!(result, r#"hello \"world\""#);
        assert_eq!(input, " xxx");

        let mut input = r#""say {"hi"}" xxx"#;
        assert_eq!(quoted_string(&mut input).unwrap(), r#"say {"hi"}"#);
    }

    #[test]
    fn test_number() {
        let mut input = "42 xxx";
        assert_eq!(number(&mut input).unwrap(), 42);

        let mut input = "-42 xxx";
        assert_eq!(number(&mut input).unwrap(), -42);
    }

    #[test]
    fn test_until_entry() {
        let mut input = "stray text @article{a,}";
        assert_eq!(until_entry(&mut input), "stray text ");
        assert_eq!(input, "@article{a,}");

        let mut input = "no entries";
        assert_eq!(until_entry(&mut input), "no entries");
        assert_eq!(input, "");
    }
}
