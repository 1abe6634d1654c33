//! Conversion between Unicode text and LaTeX accent escapes

use lazy_static::lazy_static;
use std::borrow::Cow;
use std::collections::HashMap;
use unicode_normalization::char::{compose, decompose_canonical};

/// Letters with no decomposition and their LaTeX commands
const SPECIAL_LETTERS: &[(char, &str)] = &[
    ('ß', "ss"),
    ('æ', "ae"),
    ('Æ', "AE"),
    ('ø', "o"),
    ('Ø', "O"),
    ('œ', "oe"),
    ('Œ', "OE"),
    ('ł', "l"),
    ('Ł', "L"),
    ('ı', "i"),
    ('ȷ', "j"),
];

/// Other characters with a plain-text LaTeX form
const SPECIAL_SYMBOLS: &[(char, &str)] = &[
    ('–', "--"),
    ('—', "---"),
    ('¡', "!`"),
    ('¿', "?`"),
    ('§', "{\\S}"),
    ('¶', "{\\P}"),
    ('£', "{\\pounds}"),
    ('©', "{\\copyright}"),
];

/// Combining marks written as a symbol: `{\'e}`
const SYMBOL_ACCENTS: &[(char, char)] = &[
    ('\u{0300}', '`'),
    ('\u{0301}', '\''),
    ('\u{0302}', '^'),
    ('\u{0303}', '~'),
    ('\u{0304}', '='),
    ('\u{0307}', '.'),
    ('\u{0308}', '"'),
];

/// Combining marks written as a letter command: `{\v{c}}`
const LETTER_ACCENTS: &[(char, char)] = &[
    ('\u{0306}', 'u'),
    ('\u{030A}', 'r'),
    ('\u{030B}', 'H'),
    ('\u{030C}', 'v'),
    ('\u{0323}', 'd'),
    ('\u{0327}', 'c'),
    ('\u{0328}', 'k'),
    ('\u{0331}', 'b'),
];

lazy_static! {
    static ref ACCENT_BY_COMMAND: HashMap<char, char> = SYMBOL_ACCENTS
        .iter()
        .chain(LETTER_ACCENTS)
        .map(|&(mark, cmd)| (cmd, mark))
        .collect();
    static ref LETTER_BY_COMMAND: HashMap<&'static str, char> = SPECIAL_LETTERS
        .iter()
        .map(|&(c, cmd)| (cmd, c))
        .chain([("aa", 'å'), ("AA", 'Å')])
        .collect();
}

fn escape_char(c: char, out: &mut String) {
    if let Some((_, cmd)) = SPECIAL_LETTERS.iter().find(|(l, _)| *l == c) {
        out.push_str("{\\");
        out.push_str(cmd);
        out.push('}');
        return;
    }
    if let Some((_, text)) = SPECIAL_SYMBOLS.iter().find(|(s, _)| *s == c) {
        out.push_str(text);
        return;
    }
    if c == 'å' || c == 'Å' {
        out.push_str(if c == 'å' { "{\\aa}" } else { "{\\AA}" });
        return;
    }

    let mut parts = Vec::with_capacity(2);
    decompose_canonical(c, |d| parts.push(d));
    if let [base, mark] = parts[..] {
        if base.is_ascii_alphabetic() {
            if let Some((_, cmd)) = SYMBOL_ACCENTS.iter().find(|(m, _)| *m == mark) {
                out.push_str(&format!("{{\\{cmd}{base}}}"));
                return;
            }
            if let Some((_, cmd)) = LETTER_ACCENTS.iter().find(|(m, _)| *m == mark) {
                out.push_str(&format!("{{\\{cmd}{{{base}}}}}"));
                return;
            }
        }
    }

    out.push(c);
}

/// Replace accented and special characters with LaTeX escapes
///
/// `é` becomes `{\'e}`, `č` becomes `{\v{c}}`, `ß` becomes `{\ss}`. Characters
/// without a known escape are left as they are.
#[must_use]
pub fn escape_accents(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            escape_char(c, &mut out);
        }
    }
    Cow::Owned(out)
}

/// Read the argument of an accent command: `e`, `{e}` or ` e`
fn accent_argument(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<char> {
    match chars.peek().copied() {
        Some('{') => {
            chars.next();
            let c = chars.next()?;
            let c = if c == '\\' { dotless(chars)? } else { c };
            if chars.peek() == Some(&'}') {
                chars.next();
            }
            Some(c)
        }
        Some(' ') => {
            chars.next();
            chars.next()
        }
        Some('\\') => {
            chars.next();
            dotless(chars)
        }
        Some(_) => chars.next(),
        None => None,
    }
}

/// `\i` and `\j` inside accent arguments
fn dotless(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<char> {
    match chars.next()? {
        'i' => Some('i'),
        'j' => Some('j'),
        _ => None,
    }
}

/// Text up to the `}` matching an already consumed `{`
fn braced_group(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut inner = String::new();
    let mut depth = 0usize;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                inner.push(c);
                if let Some(escaped) = chars.next() {
                    inner.push(escaped);
                }
                continue;
            }
            '{' => depth += 1,
            '}' if depth == 0 => break,
            '}' => depth -= 1,
            _ => {}
        }
        inner.push(c);
    }
    inner
}

/// Decode LaTeX accent commands into composed Unicode and drop grouping braces
///
/// Escaped braces (`\{`, `\}`) and unknown commands are kept, the latter
/// together with the braces of their argument.
#[must_use]
pub fn unescape_latex(text: &str) -> String {
    if !text.contains(['\\', '{', '}']) {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' | '}' => {}
            '\\' => {
                let Some(&next) = chars.peek() else {
                    out.push('\\');
                    break;
                };

                if let Some(&mark) = ACCENT_BY_COMMAND.get(&next) {
                    // Letter commands need a non-letter after them: `\c c` or `\c{c}`
                    let is_letter_cmd = next.is_ascii_alphabetic();
                    let mut lookahead = chars.clone();
                    lookahead.next();
                    let boundary = lookahead.peek().map_or(false, |n| !n.is_ascii_alphabetic());
                    if !is_letter_cmd || boundary {
                        chars.next();
                        if let Some(base) = accent_argument(&mut chars) {
                            out.push(compose(base, mark).unwrap_or(base));
                            continue;
                        }
                        out.push('\\');
                        out.push(next);
                        continue;
                    }
                }

                if next.is_ascii_alphabetic() {
                    let mut name = String::new();
                    while let Some(&n) = chars.peek() {
                        if !n.is_ascii_alphabetic() {
                            break;
                        }
                        name.push(n);
                        chars.next();
                    }
                    if let Some(&letter) = LETTER_BY_COMMAND.get(name.as_str()) {
                        out.push(letter);
                        if chars.peek() == Some(&' ') {
                            chars.next();
                        }
                    } else {
                        out.push('\\');
                        out.push_str(&name);
                        // Unknown commands keep their argument group
                        if chars.peek() == Some(&'{') {
                            chars.next();
                            let inner = braced_group(&mut chars);
                            out.push('{');
                            out.push_str(&unescape_latex(&inner));
                            out.push('}');
                        }
                    }
                } else {
                    // \{ \} \& \% and friends
                    chars.next();
                    if !matches!(next, '{' | '}') {
                        out.push('\\');
                    }
                    out.push(next);
                }
            }
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_is_borrowed() {
        assert!(matches!(escape_accents("plain text"), Cow::Borrowed("plain text")));
    }

    #[test]
    fn test_escape_accents() {
        assert_eq!(escape_accents("Körper"), "K{\\\"o}rper");
        assert_eq!(escape_accents("Erdős"), "Erd{\\H{o}}s");
        assert_eq!(escape_accents("José"), "Jos{\\'e}");
        assert_eq!(escape_accents("Čech"), "{\\v{C}}ech");
        assert_eq!(escape_accents("Straße"), "Stra{\\ss}e");
        assert_eq!(escape_accents("Ångström"), "{\\AA}ngstr{\\\"o}m");
        assert_eq!(escape_accents("1990–1995"), "1990--1995");
    }

    #[test]
    fn test_unmapped_pass_through() {
        assert_eq!(escape_accents("λ-calculus"), "λ-calculus");
        assert_eq!(escape_accents("東京"), "東京");
    }

    #[test]
    fn test_unescape_latex() {
        assert_eq!(unescape_latex("K{\\\"o}rper"), "Körper");
        assert_eq!(unescape_latex("K\\\"{o}rper"), "Körper");
        assert_eq!(unescape_latex("Jos\\'e"), "José");
        assert_eq!(unescape_latex("{\\v{C}}ech"), "Čech");
        assert_eq!(unescape_latex("\\c c"), "ç");
        assert_eq!(unescape_latex("Stra{\\ss}e"), "Straße");
        assert_eq!(unescape_latex("{The} {TeX}book"), "The TeXbook");
        assert_eq!(unescape_latex("R\\&D"), "R\\&D");
    }

    #[test]
    fn test_unknown_command_keeps_argument() {
        assert_eq!(unescape_latex("\\emph{x}"), "\\emph{x}");
        assert_eq!(
            unescape_latex("Binding \\textit{in vivo} of {E. coli}"),
            "Binding \\textit{in vivo} of E. coli"
        );
        assert_eq!(unescape_latex("\\url{http://a.org/~x}"), "\\url{http://a.org/~x}");
        assert_eq!(unescape_latex("\\textbf{K\\\"{o}rper}"), "\\textbf{Körper}");
        assert_eq!(unescape_latex("\\mbox{a {b} c}"), "\\mbox{a b c}");
    }

    #[test]
    fn test_escape_then_unescape() {
        for text in ["Gödel", "Erdős", "Dvořák", "Façade", "Łódź", "naïve"] {
            assert_eq!(unescape_latex(&escape_accents(text)), text);
        }
    }
}
