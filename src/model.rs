//! Canonical bibliographic data

use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Publication type of a bibliographic record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PublicationType {
    /// Article from a journal or magazine
    Article,
    /// Chapter or other part of a book
    InBook,
    /// Paper in conference proceedings
    InProceedings,
    /// Conference proceedings
    Proceedings,
    /// Part of a collection with its own title
    InCollection,
    /// Edited collection
    Collection,
    /// Book with publisher
    Book,
    /// `PhD` thesis
    PhdThesis,
    /// Master's thesis
    MastersThesis,
    /// Technical report
    Report,
    /// Technical documentation
    Manual,
    /// Unpublished work
    Unpublished,
    /// Miscellaneous
    #[default]
    Misc,
}

impl PublicationType {
    /// Every type, in declaration order
    pub const ALL: [Self; 13] = [
        Self::Article,
        Self::InBook,
        Self::InProceedings,
        Self::Proceedings,
        Self::InCollection,
        Self::Collection,
        Self::Book,
        Self::PhdThesis,
        Self::MastersThesis,
        Self::Report,
        Self::Manual,
        Self::Unpublished,
        Self::Misc,
    ];

    /// Name written after `@` in BibTeX output
    #[must_use]
    pub const fn bibtex_name(self) -> &'static str {
        match self {
            Self::Article => "Article",
            Self::InBook => "InBook",
            Self::InProceedings => "InProceedings",
            Self::Proceedings => "Proceedings",
            Self::InCollection => "InCollection",
            Self::Collection => "Collection",
            Self::Book => "Book",
            Self::PhdThesis => "PhdThesis",
            Self::MastersThesis => "MastersThesis",
            Self::Report => "TechReport",
            Self::Manual => "Manual",
            Self::Unpublished => "Unpublished",
            Self::Misc => "Misc",
        }
    }
}

impl fmt::Display for PublicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.bibtex_name())
    }
}

impl FromStr for PublicationType {
    type Err = Error;

    /// Parse a BibTeX entry type (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "article" => Ok(Self::Article),
            "inbook" => Ok(Self::InBook),
            "inproceedings" | "conference" => Ok(Self::InProceedings),
            "proceedings" => Ok(Self::Proceedings),
            "incollection" => Ok(Self::InCollection),
            "collection" => Ok(Self::Collection),
            "book" => Ok(Self::Book),
            "phdthesis" => Ok(Self::PhdThesis),
            "mastersthesis" => Ok(Self::MastersThesis),
            "techreport" | "report" => Ok(Self::Report),
            "manual" => Ok(Self::Manual),
            "unpublished" => Ok(Self::Unpublished),
            "misc" => Ok(Self::Misc),
            _ => Err(Error::InvalidEntryType(s.to_string())),
        }
    }
}

/// Case-insensitive string map for fields without a dedicated attribute
///
/// Keys are compared by their Unicode lowercase form; the spelling used on
/// first insertion is the one reported back. Iteration follows the folded
/// key order, so output built from it is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct Extras {
    entries: BTreeMap<String, (String, String)>,
}

fn fold(key: &str) -> String {
    key.to_lowercase()
}

impl Extras {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, keeping the stored spelling of an existing key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        self.entries
            .entry(fold(&key))
            .and_modify(|(_, v)| v.clone_from(&value))
            .or_insert((key, value));
    }

    /// Look up a value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&fold(key)).map(|(_, v)| v.as_str())
    }

    /// Whether `key` is present
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&fold(key))
    }

    /// Remove a key, returning its value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(&fold(key)).map(|(_, v)| v)
    }

    /// Iterate `(key, value)` pairs in folded-key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl From<BTreeMap<String, String>> for Extras {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Extras> for BTreeMap<String, String> {
    fn from(extras: Extras) -> Self {
        extras.entries.into_values().collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Extras {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut extras = Self::new();
        for (k, v) in iter {
            extras.insert(k, v);
        }
        extras
    }
}

/// How [`BibData::merge_in_with`] resolves a field present on both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Keep existing non-empty values, fill only the empty ones
    #[default]
    FirstNonEmpty,
    /// Every non-empty incoming value replaces the existing one
    Overwrite,
}

/// The canonical bibliographic entity of a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BibData {
    /// Publication type
    pub ty: PublicationType,
    /// Citation key
    pub key: String,
    /// Title
    pub title: String,
    /// Authors, already formatted as `Family, I. and Other, J.`
    pub authors: String,
    /// Journal or venue
    pub journal: String,
    /// Volume
    pub volume: String,
    /// Issue number
    pub issue: String,
    /// Page range, `start-stop`
    pub pages: String,
    /// Year
    pub year: String,
    /// Digital object identifier
    pub doi: String,
    /// Everything else
    pub extras: Extras,
}

impl BibData {
    /// Create an empty entity
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publication type
    #[must_use]
    pub const fn ty(&self) -> PublicationType {
        self.ty
    }

    /// Set the publication type
    pub fn set_ty(&mut self, ty: PublicationType) {
        self.ty = ty;
    }

    /// Citation key
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Set the citation key
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    /// Title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Set the title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Authors
    #[must_use]
    pub fn authors(&self) -> &str {
        &self.authors
    }

    /// Set the authors
    pub fn set_authors(&mut self, authors: impl Into<String>) {
        self.authors = authors.into();
    }

    /// Journal
    #[must_use]
    pub fn journal(&self) -> &str {
        &self.journal
    }

    /// Set the journal
    pub fn set_journal(&mut self, journal: impl Into<String>) {
        self.journal = journal.into();
    }

    /// Volume
    #[must_use]
    pub fn volume(&self) -> &str {
        &self.volume
    }

    /// Set the volume
    pub fn set_volume(&mut self, volume: impl Into<String>) {
        self.volume = volume.into();
    }

    /// Issue
    #[must_use]
    pub fn issue(&self) -> &str {
        &self.issue
    }

    /// Set the issue
    pub fn set_issue(&mut self, issue: impl Into<String>) {
        self.issue = issue.into();
    }

    /// Pages
    #[must_use]
    pub fn pages(&self) -> &str {
        &self.pages
    }

    /// Set the pages
    pub fn set_pages(&mut self, pages: impl Into<String>) {
        self.pages = pages.into();
    }

    /// Year
    #[must_use]
    pub fn year(&self) -> &str {
        &self.year
    }

    /// Set the year
    pub fn set_year(&mut self, year: impl Into<String>) {
        self.year = year.into();
    }

    /// DOI
    #[must_use]
    pub fn doi(&self) -> &str {
        &self.doi
    }

    /// Set the DOI
    pub fn set_doi(&mut self, doi: impl Into<String>) {
        self.doi = doi.into();
    }

    /// Extra fields
    #[must_use]
    pub const fn extras(&self) -> &Extras {
        &self.extras
    }

    /// Mutable access to the extra fields
    pub fn extras_mut(&mut self) -> &mut Extras {
        &mut self.extras
    }

    /// Add an extra field
    pub fn add_extra(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extras.insert(key, value);
    }

    /// Merge freshly parsed data into this entity with the default policy
    pub fn merge_in(&mut self, other: Self) {
        self.merge_in_with(other, MergePolicy::default());
    }

    /// Merge freshly parsed data into this entity
    ///
    /// Empty incoming values never replace anything. The type counts as empty
    /// while it is [`PublicationType::Misc`].
    pub fn merge_in_with(&mut self, other: Self, policy: MergePolicy) {
        let take = |current: &mut String, incoming: String| {
            if incoming.is_empty() {
                return;
            }
            if policy == MergePolicy::Overwrite || current.is_empty() {
                *current = incoming;
            }
        };

        if other.ty != PublicationType::Misc
            && (policy == MergePolicy::Overwrite || self.ty == PublicationType::Misc)
        {
            self.ty = other.ty;
        }

        take(&mut self.key, other.key);
        take(&mut self.title, other.title);
        take(&mut self.authors, other.authors);
        take(&mut self.journal, other.journal);
        take(&mut self.volume, other.volume);
        take(&mut self.issue, other.issue);
        take(&mut self.pages, other.pages);
        take(&mut self.year, other.year);
        take(&mut self.doi, other.doi);

        for (k, v) in other.extras.iter() {
            if v.is_empty() {
                continue;
            }
            let keep = policy == MergePolicy::FirstNonEmpty
                && self.extras.get(k).is_some_and(|existing| !existing.is_empty());
            if !keep {
                self.extras.insert(k, v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publication_type_parse() {
        assert_eq!("ARTICLE".parse::<PublicationType>().unwrap(), PublicationType::Article);
        assert_eq!("conference".parse::<PublicationType>().unwrap(), PublicationType::InProceedings);
        assert_eq!("techreport".parse::<PublicationType>().unwrap(), PublicationType::Report);
        assert!(matches!(
            "webpage".parse::<PublicationType>(),
            Err(Error::InvalidEntryType(t)) if t == "webpage"
        ));
    }

    #[test]
    fn test_publication_type_names_parse_back() {
        for ty in PublicationType::ALL {
            assert_eq!(ty.bibtex_name().parse::<PublicationType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_extras_case_insensitive() {
        let mut extras = Extras::new();
        extras.insert("BookTitle", "Proceedings of Things");
        extras.insert("booktitle", "Replaced");

        assert_eq!(extras.len(), 1);
        assert_eq!(extras.get("BOOKTITLE"), Some("Replaced"));
        assert_eq!(extras.iter().next(), Some(("BookTitle", "Replaced")));
        assert!(extras.contains_key("bookTitle"));
        assert_eq!(extras.remove("BOOKTITLE"), Some("Replaced".to_string()));
        assert!(extras.is_empty());
    }

    #[test]
    fn test_extras_ordering_is_folded() {
        let extras: Extras = [("note", "n"), ("Address", "a"), ("Month", "m")]
            .into_iter()
            .collect();
        let keys: Vec<_> = extras.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Address", "Month", "note"]);
    }

    #[test]
    fn test_extras_serde_as_object() {
        let extras: Extras = [("Note", "n")].into_iter().collect();
        let json = serde_json::to_string(&extras).unwrap();
        assert_eq!(json, r#"{"Note":"n"}"#);
        let back: Extras = serde_json::from_str(&json).unwrap();
        assert_eq!(back, extras);
    }

    #[test]
    fn test_merge_first_non_empty() {
        let mut existing = BibData::new();
        existing.set_title("Guessed From PDF");
        existing.set_year("2019");
        existing.add_extra("Note", "");

        let mut parsed = BibData::new();
        parsed.set_ty(PublicationType::Article);
        parsed.set_title("Real Title");
        parsed.set_authors("Smith, J.");
        parsed.set_year("");
        parsed.add_extra("note", "from bibtex");

        existing.merge_in(parsed);

        assert_eq!(existing.ty(), PublicationType::Article);
        assert_eq!(existing.title(), "Guessed From PDF");
        assert_eq!(existing.authors(), "Smith, J.");
        assert_eq!(existing.year(), "2019");
        assert_eq!(existing.extras().get("Note"), Some("from bibtex"));
    }

    #[test]
    fn test_merge_overwrite() {
        let mut existing = BibData::new();
        existing.set_ty(PublicationType::Book);
        existing.set_title("Old");
        existing.set_pages("1-2");

        let mut parsed = BibData::new();
        parsed.set_ty(PublicationType::InBook);
        parsed.set_title("New");

        existing.merge_in_with(parsed, MergePolicy::Overwrite);
        assert_eq!(existing.ty(), PublicationType::InBook);
        assert_eq!(existing.title(), "New");
        assert_eq!(existing.pages(), "1-2");
    }
}
