//! # bibnorm
//!
//! Classification, normalization and BibTeX serialization of bibliographic
//! records.
//!
//! Input of any dialect is first turned into a [`TaggedRecord`], a flat
//! list of `(tag, value, level)` triples. The classifier infers a
//! [`PublicationType`] from genre tags, the normalizer maps the triples onto
//! a canonical [`BibData`], and the writer renders that back as BibTeX.
//!
//! ## Features
//!
//! - BibTeX reader with `@string` macros, concatenation and error locations
//! - Genre-based type inference with logged fallbacks
//! - Title placement by type, person-name formatting, case-insensitive extras
//! - Brace or quote output, optional LaTeX accent escapes
//! - Documents with tags, notes, search and key generation
//!
//! ## Example
//!
//! ```
//! use bibnorm::{normalize_record, read_bibtex, to_string, WriterConfig};
//!
//! let input = r#"
//!     @article{einstein1905,
//!         author = "Albert Einstein",
//!         title = "Zur Elektrodynamik bewegter K{\"o}rper",
//!         journal = "Annalen der Physik",
//!         year = 1905
//!     }
//! "#;
//!
//! let mut records = read_bibtex(input)?;
//! let bib = normalize_record(&mut records[0]);
//! assert_eq!(bib.authors(), "Einstein, Albert");
//! assert_eq!(bib.title(), "Zur Elektrodynamik bewegter Körper");
//!
//! let text = to_string(&bib, &WriterConfig::default());
//! assert!(text.starts_with("@Article{einstein1905,\n"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    missing_docs,
    missing_debug_implementations
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod classify;
pub mod config;
pub mod document;
pub mod error;
pub mod escape;
pub mod guess;
pub mod import;
pub mod keygen;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod pipe;
pub mod record;
pub mod tags;
pub mod writer;

pub use classify::{classify, classify_detailed, Classification};
pub use config::Config;
pub use document::Document;
pub use error::{Error, Result};
pub use escape::{escape_accents, unescape_latex};
pub use import::{bibtex_to_fields, parse_records, read_bibtex, read_bibtex_stream};
pub use keygen::{KeyFormat, KeyGenerator};
pub use model::{BibData, Extras, MergePolicy, PublicationType};
pub use normalize::{format_people, format_person, normalize, normalize_record};
pub use pipe::read_through_pipe;
pub use record::{TaggedField, TaggedRecord};
pub use tags::{TagId, TagRegistry, TagResolver};
pub use writer::{document_to_string, to_file, to_string, Writer, WriterConfig};

/// Re-export of the common types
pub mod prelude {
    pub use crate::{
        BibData, Document, Error, PublicationType, Result, TagRegistry, TaggedRecord,
        WriterConfig,
    };
}

/// Read a BibTeX file into normalized entities
pub fn parse_file(path: impl AsRef<std::path::Path>) -> Result<Vec<BibData>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_records(content)?
        .iter_mut()
        .map(normalize_record)
        .collect())
}
