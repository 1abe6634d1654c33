//! BibTeX to tagged-field records
//!
//! Entry types become genre and issuance tags that the classifier
//! understands; titles of containing works are pushed to level 1 so the
//! normalizer routes them through the placement table.

use crate::error::Result;
use crate::escape::unescape_latex;
use crate::model::PublicationType;
use crate::normalize::normalize_record;
use crate::parser::utils::collapse_whitespace;
use crate::parser::{self, Macros, ParsedItem, RawEntry};
use crate::pipe::read_through_pipe;
use crate::record::TaggedRecord;
use std::collections::BTreeMap;
use std::io::Read;
use std::str::FromStr;
use tracing::debug;

/// Genre value and the level it describes
const fn type_genre(ty: PublicationType) -> Option<(&'static str, u32)> {
    use PublicationType as T;

    match ty {
        T::Article => Some(("periodical", 1)),
        T::Book => Some(("book", 0)),
        T::InBook => Some(("book", 1)),
        T::Collection => Some(("collection", 0)),
        T::InCollection => Some(("collection", 1)),
        T::Proceedings => Some(("conference publication", 0)),
        T::InProceedings => Some(("conference publication", 1)),
        T::PhdThesis => Some(("Ph.D. thesis", 0)),
        T::MastersThesis => Some(("Masters thesis", 0)),
        T::Report => Some(("report", 0)),
        T::Manual => Some(("instruction", 0)),
        T::Unpublished => Some(("unpublished", 0)),
        T::Misc => None,
    }
}

/// Fields renamed on the way in; everything else is upper-cased
const FIELD_TAGS: &[(&str, &str)] = &[
    ("year", "PARTDATE:YEAR"),
    ("month", "PARTDATE:MONTH"),
    ("day", "PARTDATE:DAY"),
    ("school", "DEGREEGRANTOR"),
    ("organization", "ORGANIZER:CORP"),
    ("note", "NOTES"),
    ("keywords", "KEYWORD"),
    ("eid", "ARTICLENUMBER"),
    ("articleno", "ARTICLENUMBER"),
];

/// Read every entry of a BibTeX file into tagged-field records
///
/// `@string` definitions are collected first, so entries may use macros
/// defined further down. `@preamble` and comments are skipped.
pub fn read_bibtex(text: &str) -> Result<Vec<TaggedRecord>> {
    let items = parser::parse_bibtex(text)?;

    let mut macros = Macros::default();
    for item in &items {
        if let ParsedItem::String(name, value) = item {
            let expanded = value.expand(&macros)?;
            macros.define(name, expanded);
        }
    }

    let mut records = Vec::new();
    for item in &items {
        if let ParsedItem::Entry(entry) = item {
            records.push(entry_to_record(entry, &macros)?);
        }
    }

    debug!(records = records.len(), "read bibtex");
    Ok(records)
}

/// [`read_bibtex`] over any reader
pub fn read_bibtex_stream<R: Read>(mut reader: R) -> Result<Vec<TaggedRecord>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    read_bibtex(&text)
}

/// Parse owned text through the input pipe
pub fn parse_records(text: String) -> Result<Vec<TaggedRecord>> {
    read_through_pipe(text, |reader| read_bibtex_stream(reader))
}

/// Fields of the normalized record(s) in `text` as a sorted map
///
/// Attribute names are the lower-case BibTeX names (`author`, `number`, ...);
/// extras keep their display spelling. When the text holds several records
/// the first value of each field wins.
pub fn bibtex_to_fields(text: &str) -> Result<BTreeMap<String, String>> {
    let mut fields = BTreeMap::new();

    for mut record in read_bibtex(text)? {
        let bib = normalize_record(&mut record);
        let attributes = [
            ("key", bib.key()),
            ("title", bib.title()),
            ("author", bib.authors()),
            ("journal", bib.journal()),
            ("volume", bib.volume()),
            ("number", bib.issue()),
            ("pages", bib.pages()),
            ("year", bib.year()),
            ("doi", bib.doi()),
        ];

        let extras = bib.extras().iter();
        for (name, value) in attributes.into_iter().chain(extras) {
            if !value.is_empty() {
                fields
                    .entry(name.to_string())
                    .or_insert_with(|| value.to_string());
            }
        }
    }

    Ok(fields)
}

fn entry_to_record(entry: &RawEntry<'_>, macros: &Macros) -> Result<TaggedRecord> {
    let ty = PublicationType::from_str(entry.ty).unwrap_or_else(|_| {
        debug!(ty = entry.ty, "unknown entry type, treating as misc");
        PublicationType::Misc
    });

    let mut record = TaggedRecord::new();
    record.push("INTERNAL_TYPE", entry.ty, 0);
    if !entry.key.is_empty() {
        record.push("REFNUM", entry.key, 0);
    }
    if let Some((genre, level)) = type_genre(ty) {
        record.push("GENRE:MARC", genre, level);
    }
    match ty {
        PublicationType::Book => record.push("ISSUANCE", "monographic", 0),
        PublicationType::InBook => record.push("ISSUANCE", "monographic", 1),
        _ => {}
    }

    for (name, value) in &entry.fields {
        let raw = value.expand(macros)?;
        let name = name.to_ascii_lowercase();

        match name.as_str() {
            "author" => push_people(&mut record, &raw, "AUTHOR", "CORPAUTHOR"),
            "editor" => push_people(&mut record, &raw, "EDITOR", "CORPEDITOR"),
            "translator" => push_people(&mut record, &raw, "TRANSLATOR", "CORPTRANSLATOR"),
            "pages" => push_pages(&mut record, &clean(&raw)),
            _ => {
                let (tag, level) = title_tag(ty, &name).unwrap_or_else(|| (field_tag(&name), 0));
                let value = clean(&raw);
                if !value.is_empty() {
                    record.push(tag, value, level);
                }
            }
        }
    }

    Ok(record)
}

/// Titles that describe the record or its container
fn title_tag(ty: PublicationType, name: &str) -> Option<(String, u32)> {
    use PublicationType as T;

    let level = match (name, ty) {
        ("title", T::InBook) => 1,
        ("title", _) | ("chapter", T::InBook) => 0,
        ("journal", T::Article) => 1,
        ("booktitle", T::InProceedings | T::InCollection) => 1,
        ("series", T::Book | T::Collection | T::Proceedings) => 1,
        ("subtitle", _) => return Some(("SUBTITLE".to_string(), 0)),
        _ => return None,
    };
    Some(("TITLE".to_string(), level))
}

fn field_tag(name: &str) -> String {
    FIELD_TAGS
        .iter()
        .find(|(field, _)| *field == name)
        .map_or_else(|| name.to_ascii_uppercase(), |(_, tag)| (*tag).to_string())
}

fn clean(raw: &str) -> String {
    collapse_whitespace(&unescape_latex(raw))
}

/// `12--34` becomes a start and a stop page; a single page is only a start
fn push_pages(record: &mut TaggedRecord, pages: &str) {
    let mut parts = pages
        .split(['-', '\u{2013}', '\u{2014}'])
        .map(str::trim)
        .filter(|p| !p.is_empty());

    if let Some(start) = parts.next() {
        record.push("PAGES:START", start, 0);
    }
    if let Some(stop) = parts.last() {
        record.push("PAGES:STOP", stop, 0);
    }
}

fn push_people(record: &mut TaggedRecord, raw: &str, tag: &str, corp_tag: &str) {
    for name in split_names(raw) {
        if name.eq_ignore_ascii_case("others") {
            continue;
        }
        if is_fully_braced(name) {
            let corporate = clean(&name[1..name.len() - 1]);
            if !corporate.is_empty() {
                record.push(corp_tag, corporate, 0);
            }
        } else {
            let munged = munge_name(name);
            if !munged.is_empty() {
                record.push(tag, munged, 0);
            }
        }
    }
}

/// Split on `pred` outside braces, dropping empty pieces
fn split_top_level(text: &str, pred: impl Fn(char) -> bool) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            c if depth == 0 && pred(c) => {
                pieces.push(text[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(text[start..].trim());

    pieces.retain(|p| !p.is_empty());
    pieces
}

/// Person names of an `author`-style field, separated by `and`
fn split_names(raw: &str) -> Vec<&str> {
    let words = split_top_level(raw, char::is_whitespace);
    let mut names = Vec::new();
    let mut first: Option<usize> = None;
    let mut last = 0;

    for word in words {
        if word.eq_ignore_ascii_case("and") {
            if let Some(start) = first.take() {
                names.push(&raw[start..last]);
            }
            continue;
        }
        let offset = word.as_ptr() as usize - raw.as_ptr() as usize;
        first.get_or_insert(offset);
        last = offset + word.len();
    }
    if let Some(start) = first {
        names.push(&raw[start..last]);
    }

    names
}

/// `{Barnes and Noble}`: a single group spanning the whole name
fn is_fully_braced(name: &str) -> bool {
    if !name.starts_with('{') || !name.ends_with('}') {
        return false;
    }
    let mut depth = 0usize;
    for (i, c) in name.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i == name.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

/// `John A. Smith` or `Smith, John A.` becomes `Smith|John|A|`
///
/// Lower-case particles (`van`, `de la`) stay with the family name. A
/// `Smith, Jr., John` form appends the suffix to the family name.
pub fn munge_name(name: &str) -> String {
    let parts = split_top_level(name, |c| c == ',');

    let (family, given): (String, Vec<&str>) = match parts.as_slice() {
        [] => return String::new(),
        [whole] => {
            let words = split_top_level(whole, char::is_whitespace);
            let Some((&last, rest)) = words.split_last() else {
                return String::new();
            };
            let particle = rest
                .iter()
                .position(|w| w.chars().next().is_some_and(char::is_lowercase))
                .unwrap_or(rest.len());
            let mut family = rest[particle..].to_vec();
            family.push(last);
            (family.join(" "), rest[..particle].to_vec())
        }
        [family, given] => (
            (*family).to_string(),
            split_top_level(given, char::is_whitespace),
        ),
        [family, suffix, given @ ..] => (
            format!("{family} {suffix}"),
            given
                .iter()
                .flat_map(|g| split_top_level(g, char::is_whitespace))
                .collect(),
        ),
    };

    let mut munged = clean(&family);
    if munged.is_empty() {
        return munged;
    }
    munged.push('|');
    for word in given {
        for initial in clean(word).split('.').filter(|s| !s.is_empty()) {
            munged.push_str(initial);
            munged.push('|');
        }
    }
    munged
}
