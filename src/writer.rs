//! BibTeX writer for canonical entities and documents

use crate::document::Document;
use crate::escape::escape_accents;
use crate::model::BibData;
use crate::tags::TagResolver;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::{self, Write};

/// Configuration for writing BibTeX
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Wrap values in braces rather than straight quotes (default: true)
    pub use_braces: bool,
    /// Replace accented characters with LaTeX escapes (default: false)
    pub transliterate: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            use_braces: true,
            transliterate: false,
        }
    }
}

impl WriterConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set brace wrapping
    #[must_use]
    pub const fn use_braces(mut self, yes: bool) -> Self {
        self.use_braces = yes;
        self
    }

    /// Set accent transliteration
    #[must_use]
    pub const fn transliterate(mut self, yes: bool) -> Self {
        self.transliterate = yes;
        self
    }
}

/// BibTeX writer
#[derive(Debug)]
pub struct Writer<W: Write> {
    writer: W,
    config: WriterConfig,
}

impl<W: Write> Writer<W> {
    /// Create a new writer with default configuration
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            config: WriterConfig::default(),
        }
    }

    /// Create a new writer with custom configuration
    pub const fn with_config(writer: W, config: WriterConfig) -> Self {
        Self { writer, config }
    }

    /// Write a single entity
    pub fn write_entry(&mut self, bib: &BibData) -> io::Result<()> {
        self.writer
            .write_all(format_entry(bib, None, &self.config).as_bytes())
    }

    /// Write a document, resolving its tag uids to names
    pub fn write_document(&mut self, doc: &Document, resolver: &dyn TagResolver) -> io::Result<()> {
        let tags = tag_names(doc, resolver);
        self.writer
            .write_all(format_entry(doc.bib(), Some(&tags), &self.config).as_bytes())
    }

    /// Write several documents in order
    pub fn write_documents<'d>(
        &mut self,
        docs: impl IntoIterator<Item = &'d Document>,
        resolver: &dyn TagResolver,
    ) -> io::Result<()> {
        for doc in docs {
            self.write_document(doc, resolver)?;
        }
        self.writer.flush()
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// `name1, name2` for the tags the resolver knows
fn tag_names(doc: &Document, resolver: &dyn TagResolver) -> String {
    doc.tags()
        .iter()
        .filter_map(|uid| resolver.tag_name(*uid))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_entry(bib: &BibData, tags: Option<&str>, config: &WriterConfig) -> String {
    let mut out = String::with_capacity(256);
    out.push('@');
    out.push_str(bib.ty().bibtex_name());
    out.push('{');
    out.push_str(bib.key());
    out.push_str(",\n");

    for (name, value) in bib.extras().iter() {
        let braces = config.use_braces && !name.eq_ignore_ascii_case("editor");
        write_field(&mut out, name, value, braces, config);
    }

    let attributes = [
        ("author", bib.authors()),
        ("title", bib.title()),
        ("journal", bib.journal()),
        ("volume", bib.volume()),
        ("number", bib.issue()),
        ("pages", bib.pages()),
        ("year", bib.year()),
        ("doi", bib.doi()),
    ];
    for (name, value) in attributes {
        if !value.is_empty() {
            write_field(&mut out, name, value, config.use_braces, config);
        }
    }

    if let Some(tags) = tags.filter(|t| !t.is_empty()) {
        write_field(&mut out, "tags", tags, false, config);
    }

    out.push_str("}\n\n");
    out
}

fn write_field(out: &mut String, name: &str, value: &str, braces: bool, config: &WriterConfig) {
    let value = if config.transliterate {
        escape_accents(value)
    } else {
        Cow::Borrowed(value)
    };
    let (open, close) = if braces { ('{', '}') } else { ('"', '"') };

    out.push('\t');
    out.push_str(name);
    out.push_str(" = ");
    out.push(open);
    out.push_str(&value);
    out.push(close);
    out.push_str(",\n");
}

/// Render an entity as BibTeX text
#[must_use]
pub fn to_string(bib: &BibData, config: &WriterConfig) -> String {
    format_entry(bib, None, config)
}

/// Render a document as BibTeX text, with a `tags` line when it has tags
#[must_use]
pub fn document_to_string(doc: &Document, resolver: &dyn TagResolver, config: &WriterConfig) -> String {
    let tags = tag_names(doc, resolver);
    format_entry(doc.bib(), Some(&tags), config)
}

/// Write documents to a file
pub fn to_file<'d>(
    docs: impl IntoIterator<Item = &'d Document>,
    resolver: &dyn TagResolver,
    config: &WriterConfig,
    path: impl AsRef<std::path::Path>,
) -> crate::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = Writer::with_config(io::BufWriter::new(file), config.clone());
    writer.write_documents(docs, resolver)?;
    Ok(())
}
