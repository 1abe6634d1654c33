//! Publication type inference from genre and issuance tags

use crate::model::PublicationType;
use crate::record::TaggedRecord;
use tracing::{debug, warn};

/// What a genre value implies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GenreRule {
    /// Always this type
    Is(PublicationType),
    /// `top` at level 0, `nested` anywhere deeper
    ByLevel {
        top: PublicationType,
        nested: PublicationType,
    },
    /// This type unless something was already decided
    Unless(PublicationType),
}

/// Genre values, matched case-insensitively
const GENRE_RULES: &[(&str, GenreRule)] = &[
    ("periodical", GenreRule::Is(PublicationType::Article)),
    ("academic journal", GenreRule::Is(PublicationType::Article)),
    ("magazine", GenreRule::Is(PublicationType::Article)),
    ("instruction", GenreRule::Is(PublicationType::Manual)),
    ("unpublished", GenreRule::Is(PublicationType::Unpublished)),
    (
        "conference publication",
        GenreRule::ByLevel {
            top: PublicationType::Proceedings,
            nested: PublicationType::InProceedings,
        },
    ),
    (
        "collection",
        GenreRule::ByLevel {
            top: PublicationType::Collection,
            nested: PublicationType::InCollection,
        },
    ),
    ("report", GenreRule::Is(PublicationType::Report)),
    (
        "book",
        GenreRule::ByLevel {
            top: PublicationType::Book,
            nested: PublicationType::InBook,
        },
    ),
    ("theses", GenreRule::Unless(PublicationType::PhdThesis)),
    ("ph.d. thesis", GenreRule::Is(PublicationType::PhdThesis)),
    ("masters thesis", GenreRule::Is(PublicationType::MastersThesis)),
];

const GENRE_TAGS: &[&str] = &["GENRE:MARC", "GENRE:BIBUTILS"];

/// Outcome of classifying a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// The inferred type
    pub ty: PublicationType,
    /// True when nothing in the record identified the type and
    /// [`PublicationType::Misc`] was assumed
    pub fallback: bool,
}

fn genre_rule(value: &str) -> Option<GenreRule> {
    let value = value.to_lowercase();
    GENRE_RULES
        .iter()
        .find(|(genre, _)| *genre == value)
        .map(|(_, rule)| *rule)
}

/// Infer the publication type of a record
///
/// Never fails; see [`classify_detailed`] to learn whether the result is a
/// fallback.
#[must_use]
pub fn classify(record: &TaggedRecord) -> PublicationType {
    classify_detailed(record).ty
}

/// Infer the publication type of a record, reporting fallbacks
#[must_use]
pub fn classify_detailed(record: &TaggedRecord) -> Classification {
    let mut ty: Option<PublicationType> = None;

    for field in record.fields() {
        if !GENRE_TAGS.iter().any(|t| field.has_tag(t)) {
            continue;
        }
        let Some(rule) = genre_rule(&field.value) else {
            continue;
        };
        ty = match rule {
            GenreRule::Is(t) => Some(t),
            GenreRule::ByLevel { top, nested } => Some(if field.level == 0 { top } else { nested }),
            GenreRule::Unless(t) => ty.or(Some(t)),
        };
    }

    if ty.is_none() {
        for field in record.fields() {
            if !field.has_tag("ISSUANCE") || !field.value.eq_ignore_ascii_case("monographic") {
                continue;
            }
            match field.level {
                0 => ty = Some(PublicationType::Book),
                1 => ty = Some(PublicationType::InBook),
                _ => {}
            }
        }
    }

    if let Some(ty) = ty {
        debug!(%ty, "classified record");
        return Classification {
            ty,
            fallback: false,
        };
    }

    if record.max_level() > 0 {
        debug!("no genre found, nested fields imply InBook");
        Classification {
            ty: PublicationType::InBook,
            fallback: false,
        }
    } else {
        warn!(fields = record.len(), "cannot identify publication type, using Misc");
        Classification {
            ty: PublicationType::Misc,
            fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genre(value: &str, level: u32) -> TaggedRecord {
        TaggedRecord::new().with("GENRE:MARC", value, level)
    }

    #[test]
    fn test_article_genres() {
        for value in ["periodical", "Academic Journal", "MAGAZINE"] {
            assert_eq!(classify(&genre(value, 1)), PublicationType::Article);
        }
    }

    #[test]
    fn test_level_dependent_genres() {
        assert_eq!(classify(&genre("book", 0)), PublicationType::Book);
        assert_eq!(classify(&genre("book", 1)), PublicationType::InBook);
        assert_eq!(classify(&genre("conference publication", 0)), PublicationType::Proceedings);
        assert_eq!(classify(&genre("conference publication", 1)), PublicationType::InProceedings);
        assert_eq!(classify(&genre("collection", 0)), PublicationType::Collection);
        assert_eq!(classify(&genre("collection", 2)), PublicationType::InCollection);
    }

    #[test]
    fn test_bibutils_genre_tag() {
        let record = TaggedRecord::new().with("genre:bibutils", "Masters thesis", 0);
        assert_eq!(classify(&record), PublicationType::MastersThesis);
    }

    #[test]
    fn test_later_genre_overrides() {
        let record = TaggedRecord::new()
            .with("GENRE:MARC", "book", 0)
            .with("GENRE:MARC", "report", 0);
        assert_eq!(classify(&record), PublicationType::Report);
    }

    #[test]
    fn test_theses_does_not_override() {
        let record = TaggedRecord::new()
            .with("GENRE:MARC", "report", 0)
            .with("GENRE:MARC", "theses", 0);
        assert_eq!(classify(&record), PublicationType::Report);

        assert_eq!(classify(&genre("theses", 0)), PublicationType::PhdThesis);

        let record = TaggedRecord::new()
            .with("GENRE:MARC", "theses", 0)
            .with("GENRE:MARC", "Masters thesis", 0);
        assert_eq!(classify(&record), PublicationType::MastersThesis);
    }

    #[test]
    fn test_issuance_fallback() {
        let record = TaggedRecord::new().with("ISSUANCE", "monographic", 0);
        assert_eq!(classify(&record), PublicationType::Book);

        let record = TaggedRecord::new()
            .with("TITLE", "t", 0)
            .with("ISSUANCE", "monographic", 1);
        assert_eq!(classify(&record), PublicationType::InBook);

        // Genre wins over issuance
        let record = TaggedRecord::new()
            .with("ISSUANCE", "monographic", 0)
            .with("GENRE:MARC", "periodical", 1);
        assert_eq!(classify(&record), PublicationType::Article);
    }

    #[test]
    fn test_defaults() {
        let nested = TaggedRecord::new()
            .with("TITLE", "t", 0)
            .with("TITLE", "outer", 1);
        let result = classify_detailed(&nested);
        assert_eq!(result.ty, PublicationType::InBook);
        assert!(!result.fallback);

        let flat = TaggedRecord::new().with("TITLE", "t", 0);
        let result = classify_detailed(&flat);
        assert_eq!(result.ty, PublicationType::Misc);
        assert!(result.fallback);
    }

    #[test]
    fn test_unknown_genre_is_ignored() {
        let record = TaggedRecord::new().with("GENRE:MARC", "poetry", 0);
        assert!(classify_detailed(&record).fallback);
    }

    #[test]
    fn test_classification_does_not_consume() {
        let record = genre("book", 0);
        let _ = classify(&record);
        assert_eq!(record.unconsumed(), vec![0]);
    }
}
