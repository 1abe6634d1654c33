//! A library document: bibliographic data plus what the user attaches to it

use crate::error::{Error, Result};
use crate::import::read_bibtex;
use crate::keygen::short_year;
use crate::model::{BibData, MergePolicy};
use crate::normalize::normalize_record;
use crate::tags::{TagId, TagResolver};
use crate::writer::{self, WriterConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use tracing::debug;

/// Key used when there is nothing to build one from
pub const DEFAULT_KEY: &str = "Unnamed";

const MAX_KEY_LEN: usize = 14;

/// Characters LaTeX chokes on in a citation key
const KEY_UNSAFE: &[char] = &[' ', '&', '$', '%', '#', '_', '{', '}', ',', '@'];

/// Attribute names understood by [`Document::get_field`] and friends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attribute {
    Doi,
    Title,
    Volume,
    Number,
    Journal,
    Author,
    Year,
    Pages,
    Key,
}

impl Attribute {
    fn parse(name: &str) -> Option<Self> {
        const NAMES: [(&str, Attribute); 9] = [
            ("doi", Attribute::Doi),
            ("title", Attribute::Title),
            ("volume", Attribute::Volume),
            ("number", Attribute::Number),
            ("journal", Attribute::Journal),
            ("author", Attribute::Author),
            ("year", Attribute::Year),
            ("pages", Attribute::Pages),
            ("key", Attribute::Key),
        ];
        NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, a)| *a)
    }

    fn get(self, bib: &BibData) -> &str {
        match self {
            Self::Doi => bib.doi(),
            Self::Title => bib.title(),
            Self::Volume => bib.volume(),
            Self::Number => bib.issue(),
            Self::Journal => bib.journal(),
            Self::Author => bib.authors(),
            Self::Year => bib.year(),
            Self::Pages => bib.pages(),
            Self::Key => bib.key(),
        }
    }

    fn set(self, bib: &mut BibData, value: String) {
        match self {
            Self::Doi => bib.set_doi(value),
            Self::Title => bib.set_title(value),
            Self::Volume => bib.set_volume(value),
            Self::Number => bib.set_issue(value),
            Self::Journal => bib.set_journal(value),
            Self::Author => bib.set_authors(value),
            Self::Year => bib.set_year(value),
            Self::Pages => bib.set_pages(value),
            Self::Key => bib.set_key(value),
        }
    }
}

/// Metadata attributes exported by [`Document::fields`], in output order
const EXPORTED: [(&str, Attribute); 8] = [
    ("doi", Attribute::Doi),
    ("title", Attribute::Title),
    ("volume", Attribute::Volume),
    ("number", Attribute::Number),
    ("journal", Attribute::Journal),
    ("author", Attribute::Author),
    ("year", Attribute::Year),
    ("pages", Attribute::Pages),
];

/// One entry of the library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    filename: String,
    relative_filename: String,
    notes: String,
    tags: Vec<TagId>,
    bib: BibData,
}

impl Document {
    /// Create an empty document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document around existing data
    #[must_use]
    pub fn from_bib(bib: BibData) -> Self {
        Self {
            bib,
            ..Self::default()
        }
    }

    /// Bibliographic data
    #[must_use]
    pub const fn bib(&self) -> &BibData {
        &self.bib
    }

    /// Mutable bibliographic data
    pub fn bib_mut(&mut self) -> &mut BibData {
        &mut self.bib
    }

    /// Citation key
    #[must_use]
    pub fn key(&self) -> &str {
        self.bib.key()
    }

    /// Set the citation key
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.bib.set_key(key);
    }

    /// Location of the attached file
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Set the location of the attached file
    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = filename.into();
    }

    /// Attached file relative to the library
    #[must_use]
    pub fn relative_filename(&self) -> &str {
        &self.relative_filename
    }

    /// Set the relative location of the attached file
    pub fn set_relative_filename(&mut self, filename: impl Into<String>) {
        self.relative_filename = filename.into();
    }

    /// Free-form notes
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Replace the notes
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Tag uids, in the order they were attached
    #[must_use]
    pub fn tags(&self) -> &[TagId] {
        &self.tags
    }

    /// Attach a tag; attaching twice is a no-op
    pub fn set_tag(&mut self, uid: TagId) {
        if !self.has_tag(uid) {
            self.tags.push(uid);
        }
    }

    /// Detach a tag
    pub fn clear_tag(&mut self, uid: TagId) {
        self.tags.retain(|t| *t != uid);
    }

    /// Whether a tag is attached
    #[must_use]
    pub fn has_tag(&self, uid: TagId) -> bool {
        self.tags.contains(&uid)
    }

    /// Detach every tag
    pub fn clear_tags(&mut self) {
        self.tags.clear();
    }

    /// Read a field by name
    ///
    /// Attribute names are matched case-insensitively, then extras. A field
    /// that exists but is empty reads as `""`; a name that is neither is
    /// [`Error::UnknownField`].
    pub fn get_field(&self, name: &str) -> Result<&str> {
        if let Some(attribute) = Attribute::parse(name) {
            return Ok(attribute.get(&self.bib));
        }
        self.bib.extras().get(name).ok_or_else(|| {
            debug!(field = name, "unknown field");
            Error::UnknownField(name.to_string())
        })
    }

    /// Write a field by name; unknown names become extras
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match Attribute::parse(name) {
            Some(attribute) => attribute.set(&mut self.bib, value),
            None => self.bib.add_extra(name, value),
        }
    }

    /// Whether an attribute is non-empty or an extra exists
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        match Attribute::parse(name) {
            Some(attribute) => !attribute.get(&self.bib).is_empty(),
            None => self.bib.extras().contains_key(name),
        }
    }

    /// Non-empty metadata attributes and every extra
    ///
    /// Neither the key nor the type is included.
    #[must_use]
    pub fn fields(&self) -> BTreeMap<String, String> {
        let mut fields: BTreeMap<String, String> = EXPORTED
            .iter()
            .map(|(name, attribute)| (*name, attribute.get(&self.bib)))
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        for (name, value) in self.bib.extras().iter() {
            fields.insert(name.to_string(), value.to_string());
        }
        fields
    }

    /// Empty every metadata attribute and drop the extras
    ///
    /// The key and the type survive.
    pub fn clear_fields(&mut self) {
        self.bib.extras_mut().clear();
        for (_, attribute) in EXPORTED {
            attribute.set(&mut self.bib, String::new());
        }
    }

    /// Merge a single BibTeX entry into this document with the default policy
    pub fn parse_bibtex(&mut self, text: &str) -> Result<()> {
        self.parse_bibtex_with(text, MergePolicy::default())
    }

    /// Merge a single BibTeX entry into this document
    ///
    /// Fails with [`Error::UnexpectedRecordCount`] unless `text` holds
    /// exactly one entry. A key is generated when the document has none.
    pub fn parse_bibtex_with(&mut self, text: &str, policy: MergePolicy) -> Result<()> {
        let mut records = read_bibtex(text)?;
        if records.len() != 1 {
            return Err(Error::UnexpectedRecordCount(records.len()));
        }

        let mut record = records.remove(0);
        let parsed = normalize_record(&mut record);
        self.bib.merge_in_with(parsed, policy);

        if self.key().is_empty() {
            let key = self.generate_key();
            debug!(%key, "generated key for parsed entry");
            self.set_key(key);
        }
        Ok(())
    }

    /// BibTeX text for this document without tags
    #[must_use]
    pub fn print_bibtex(&self, config: &WriterConfig) -> String {
        writer::to_string(&self.bib, config)
    }

    /// Write this document as BibTeX, including its tag names
    pub fn write_bibtex<W: io::Write>(
        &self,
        out: W,
        resolver: &dyn TagResolver,
        config: &WriterConfig,
    ) -> io::Result<()> {
        writer::Writer::with_config(out, config.clone()).write_document(self, resolver)
    }

    /// Whether every space-separated term of `query` occurs in some field,
    /// the notes or the key, ignoring case
    #[must_use]
    pub fn matches_search(&self, query: &str) -> bool {
        let fields = self.fields();
        let notes = self.notes.to_lowercase();
        let key = self.key().to_lowercase();

        query.split(' ').filter(|t| !t.is_empty()).all(|term| {
            let term = term.to_lowercase();
            fields.values().any(|v| v.to_lowercase().contains(&term))
                || notes.contains(&term)
                || key.contains(&term)
        })
    }

    /// A key like `Chambers06`
    ///
    /// Built from the first author's surname and the two-digit year, else
    /// from the attached file's name, else [`DEFAULT_KEY`].
    #[must_use]
    pub fn generate_key(&self) -> String {
        let authors = self.bib.authors();

        let name = if !authors.is_empty() {
            let snip = authors.find([',', ' ']).unwrap_or(authors.len());
            let surname: String = authors[..snip].chars().take(MAX_KEY_LEN - 2).collect();
            format!("{surname}{}", short_year(self.bib.year()))
        } else if !self.filename.is_empty() {
            let base = self
                .filename
                .rsplit(['/', '\\'])
                .next()
                .unwrap_or(&self.filename);
            let stem = base.rfind('.').map_or(base, |dot| &base[..dot]);
            stem.chars().take(MAX_KEY_LEN).collect()
        } else {
            DEFAULT_KEY.to_string()
        };

        name.chars().filter(|c| !KEY_UNSAFE.contains(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PublicationType;
    use crate::tags::TagRegistry;

    #[test]
    fn test_field_access() {
        let mut doc = Document::new();
        doc.set_field("Title", "On Things");
        doc.set_field("number", "7");
        doc.set_field("Publisher", "ACME");

        assert_eq!(doc.get_field("title").unwrap(), "On Things");
        assert_eq!(doc.bib().issue(), "7");
        assert_eq!(doc.get_field("publisher").unwrap(), "ACME");
        assert_eq!(doc.get_field("doi").unwrap(), "");
        assert!(!doc.has_field("doi"));
        assert!(doc.has_field("PUBLISHER"));
        assert!(matches!(
            doc.get_field("colour"),
            Err(Error::UnknownField(name)) if name == "colour"
        ));
    }

    #[test]
    fn test_fields_and_clear() {
        let mut doc = Document::new();
        doc.set_key("k");
        doc.set_field("year", "2001");
        doc.set_field("Url", "http://example.org");

        let fields = doc.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["year"], "2001");
        assert_eq!(fields["Url"], "http://example.org");

        doc.clear_fields();
        assert!(doc.fields().is_empty());
        assert_eq!(doc.key(), "k");
    }

    #[test]
    fn test_tags() {
        let mut doc = Document::new();
        doc.set_tag(3);
        doc.set_tag(1);
        doc.set_tag(3);
        assert_eq!(doc.tags(), &[3, 1]);
        doc.clear_tag(3);
        assert!(!doc.has_tag(3));
        doc.clear_tags();
        assert!(doc.tags().is_empty());
    }

    #[test]
    fn test_generate_key() {
        let mut doc = Document::new();
        assert_eq!(doc.generate_key(), "Unnamed");

        doc.set_filename("file:///home/me/papers/my_paper.v2.pdf");
        assert_eq!(doc.generate_key(), "mypaper.v2");

        doc.set_field("author", "Chambers, R. and Doe, J.");
        doc.set_field("year", "2006");
        assert_eq!(doc.generate_key(), "Chambers06");

        doc.set_field("author", "Abcdefghijklmnopqrstuvwxyz");
        doc.set_field("year", "");
        assert_eq!(doc.generate_key(), "Abcdefghijkl");
    }

    #[test]
    fn test_parse_bibtex_merges() {
        let mut doc = Document::new();
        doc.set_field("title", "Kept Title");

        doc.parse_bibtex(
            r#"@article{, title = "Other Title", author = "Jane Doe", journal = "J", year = 2010}"#,
        )
        .unwrap();

        assert_eq!(doc.bib().ty(), PublicationType::Article);
        assert_eq!(doc.bib().title(), "Kept Title");
        assert_eq!(doc.bib().authors(), "Doe, Jane");
        assert_eq!(doc.key(), "Doe10");
    }

    #[test]
    fn test_parse_bibtex_needs_one_entry() {
        let mut doc = Document::new();
        assert!(matches!(
            doc.parse_bibtex("@misc{a,}\n@misc{b,}"),
            Err(Error::UnexpectedRecordCount(2))
        ));
        assert!(matches!(
            doc.parse_bibtex("no entries here"),
            Err(Error::UnexpectedRecordCount(0))
        ));
    }

    #[test]
    fn test_matches_search() {
        let mut doc = Document::new();
        doc.set_key("Einstein05");
        doc.set_field("title", "Zur Elektrodynamik bewegter Körper");
        doc.set_notes("classic relativity");

        assert!(doc.matches_search("einstein"));
        assert!(doc.matches_search("KÖRPER  relativity"));
        assert!(!doc.matches_search("elektro quantum"));
        assert!(doc.matches_search(""));
    }

    #[test]
    fn test_write_bibtex_with_tags() {
        let mut tags = TagRegistry::new();
        let physics = tags.add("physics");

        let mut doc = Document::new();
        doc.set_key("k");
        doc.set_tag(physics);

        let mut out = Vec::new();
        doc.write_bibtex(&mut out, &tags, &WriterConfig::default())
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "@Misc{k,\n\ttags = \"physics\",\n}\n\n");
    }
}
