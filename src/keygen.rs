//! Citation keys from metadata
//!
//! A [`KeyFormat`] is a template with `%` markers:
//!
//! | Marker | Expands to |
//! |---|---|
//! | `%a` | first author's surname |
//! | `%y` | two-digit year |
//! | `%Y` | year as written |
//! | `%t` | title without spaces |
//! | `%T` | title in CamelCase |
//! | `%w` | first title word that is not an article |
//!
//! Unknown markers are copied verbatim.

use crate::model::BibData;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters removed from titles before they go into a key
const TITLE_PUNCTUATION: &[char] = &[
    ':', '-', '[', ']', '{', '}', ',', '+', '/', '*', '.', '?',
];

const ARTICLES: &[&str] = &["a", "an", "the"];

/// A key template such as `%a%y`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyFormat(String);

impl Default for KeyFormat {
    fn default() -> Self {
        Self("%a%y".to_string())
    }
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyFormat {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl KeyFormat {
    /// Create a format from a template
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// The template text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Expand the template for one entity
    #[must_use]
    pub fn apply(&self, bib: &BibData) -> String {
        let mut key = String::with_capacity(self.0.len() + 16);
        let mut chars = self.0.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                key.push(c);
                continue;
            }
            match chars.next() {
                Some('a') => key.push_str(first_surname(bib.authors())),
                Some('y') => key.push_str(short_year(bib.year())),
                Some('Y') => key.push_str(bib.year()),
                Some('t') => {
                    for word in title_words(bib.title()) {
                        key.push_str(&word);
                    }
                }
                Some('T') => {
                    for word in title_words(bib.title()) {
                        let mut letters = word.chars();
                        if let Some(first) = letters.next() {
                            key.extend(first.to_uppercase());
                            key.extend(letters);
                        }
                    }
                }
                Some('w') => {
                    if let Some(word) = title_words(bib.title())
                        .find(|w| !ARTICLES.iter().any(|a| w.eq_ignore_ascii_case(a)))
                    {
                        key.push_str(&word);
                    }
                }
                Some(other) => {
                    key.push('%');
                    key.push(other);
                }
                None => key.push('%'),
            }
        }

        key
    }
}

/// `Smith, J. and Doe, R.` gives `Smith`
fn first_surname(authors: &str) -> &str {
    let first = authors.split(" and ").next().unwrap_or("");
    let surname = first.split(',').next().unwrap_or("");
    surname.split_whitespace().next().unwrap_or("")
}

/// Last two digits of a four-digit year, anything else as is
pub(crate) fn short_year(year: &str) -> &str {
    if year.len() == 4 && year.is_ascii() {
        &year[2..]
    } else {
        year
    }
}

fn title_words(title: &str) -> impl Iterator<Item = String> + '_ {
    title
        .split_whitespace()
        .map(|w| w.chars().filter(|c| !TITLE_PUNCTUATION.contains(c)).collect::<String>())
        .filter(|w| !w.is_empty())
}

/// Assigns keys from a format, keeping them unique across one batch
///
/// The second `Smith20` becomes `Smith20b`, the third `Smith20c`.
#[derive(Debug, Clone, Default)]
pub struct KeyGenerator {
    format: KeyFormat,
    assigned: AHashSet<String>,
}

impl KeyGenerator {
    /// Create a generator for `format`
    #[must_use]
    pub fn new(format: KeyFormat) -> Self {
        Self {
            format,
            assigned: AHashSet::new(),
        }
    }

    /// Treat `key` as already taken
    pub fn reserve(&mut self, key: impl Into<String>) {
        self.assigned.insert(key.into());
    }

    /// Next unique key for `bib`
    pub fn generate(&mut self, bib: &BibData) -> String {
        let base = self.format.apply(bib);
        let key = if self.assigned.contains(&base) {
            // Past 'z' the suffix becomes a number
            ('b'..='z')
                .map(|c| format!("{base}{c}"))
                .chain((27u32..).map(|n| format!("{base}{n}")))
                .find(|k| !self.assigned.contains(k))
                .unwrap_or_else(|| base.clone())
        } else {
            base
        };

        self.assigned.insert(key.clone());
        key
    }
}
