//! Metadata guesses from free text, such as the text layer of a PDF

use crate::model::BibData;
use chrono::Datelike;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

/// Earliest year accepted as a publication year
const EARLIEST_YEAR: i32 = 1700;

lazy_static! {
    static ref YEAR: Regex = Regex::new(r"\b(1[7-9]\d\d|2\d\d\d)\b").unwrap();
    static ref DOI: Regex = Regex::new(r#"\b(10\.\d{4,9}/[^\s"<>]+)"#).unwrap();
    static ref ARXIV: Regex = Regex::new(
        r"(?i)\barxiv:\s*(\d{4}\.\d{4,5}(?:v\d+)?|[a-z][a-z.\-]*/\d{7}(?:v\d+)?)"
    )
    .unwrap();
}

/// First plausible publication year: between 1700 and the current year
#[must_use]
pub fn guess_year(text: &str) -> Option<String> {
    let current = chrono::Local::now().year();
    YEAR.find_iter(text)
        .map(|m| m.as_str())
        .find(|y| {
            y.parse::<i32>()
                .map_or(false, |y| (EARLIEST_YEAR..=current).contains(&y))
        })
        .map(str::to_string)
}

/// First DOI, without trailing sentence punctuation
#[must_use]
pub fn guess_doi(text: &str) -> Option<String> {
    DOI.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ')', ']']).to_string())
}

/// First arXiv identifier written as `arXiv:<id>`
#[must_use]
pub fn guess_arxiv(text: &str) -> Option<String> {
    ARXIV
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

impl BibData {
    /// Fill empty year, DOI and `Eprint` from free text
    ///
    /// Returns true when anything was set.
    pub fn guess_from_text(&mut self, text: &str) -> bool {
        let mut changed = false;

        if self.year().is_empty() {
            if let Some(year) = guess_year(text) {
                debug!(%year, "guessed year");
                self.set_year(year);
                changed = true;
            }
        }

        if self.doi().is_empty() {
            if let Some(doi) = guess_doi(text) {
                debug!(%doi, "guessed doi");
                self.set_doi(doi);
                changed = true;
            }
        }

        if !self.extras().contains_key("eprint") {
            if let Some(id) = guess_arxiv(text) {
                debug!(%id, "guessed arxiv id");
                self.add_extra("Eprint", id);
                changed = true;
            }
        }

        changed
    }
}
