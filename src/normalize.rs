//! Mapping of tagged-field records onto [`BibData`]

use crate::classify::classify;
use crate::model::{BibData, PublicationType};
use crate::record::TaggedRecord;
use tracing::{debug, warn};

/// Where a title ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The title attribute
    Title,
    /// The journal attribute
    Journal,
    /// An extra field with this name
    Extra(&'static str),
}

/// Title routing for one publication type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitlePlacement {
    /// Destination of the level-0 title
    pub primary: Placement,
    /// Destination of the level-1 title; `None` leaves it for extras collection
    pub secondary: Option<Placement>,
    /// Name given to a leftover `TITLE` during extras collection
    pub leftover: Option<&'static str>,
}

/// Title routing table
#[must_use]
pub const fn title_placement(ty: PublicationType) -> TitlePlacement {
    use PublicationType as T;

    match ty {
        T::Article => TitlePlacement {
            primary: Placement::Title,
            secondary: Some(Placement::Journal),
            leftover: None,
        },
        T::InBook => TitlePlacement {
            primary: Placement::Extra("Chapter"),
            secondary: Some(Placement::Title),
            leftover: None,
        },
        T::InProceedings => TitlePlacement {
            primary: Placement::Title,
            secondary: Some(Placement::Extra("BookTitle")),
            leftover: Some("Series"),
        },
        T::InCollection => TitlePlacement {
            primary: Placement::Title,
            secondary: Some(Placement::Extra("BookTitle")),
            leftover: Some("Chapter"),
        },
        T::Book | T::Collection | T::Proceedings => TitlePlacement {
            primary: Placement::Title,
            secondary: Some(Placement::Extra("Series")),
            leftover: None,
        },
        T::PhdThesis | T::MastersThesis | T::Report | T::Manual | T::Unpublished | T::Misc => {
            TitlePlacement {
                primary: Placement::Title,
                secondary: None,
                leftover: None,
            }
        }
    }
}

/// Tags consumed without producing anything
const DISCARDED_TAGS: &[&str] = &[
    "RESOURCE",
    "ISSUANCE",
    "GENRE:MARC",
    "AUTHOR",
    "EDITOR",
    "CORPAUTHOR",
    "CORPEDITOR",
    "TYPE",
    "INTERNAL_TYPE",
];

/// Extra names for tags that do not read well capitalized
const EXTRA_RENAMES: &[(&str, &str)] = &[
    ("PARTDATE:DAY", "Day"),
    ("PARTDATE:MONTH", "Month"),
    ("KEYWORD", "Keywords"),
    ("DEGREEGRANTOR", "School"),
    ("DEGREEGRANTOR:ASIS", "School"),
    ("DEGREEGRANTOR:CORP", "School"),
    ("NOTES", "Note"),
];

/// Classify a record and normalize it
#[must_use]
pub fn normalize_record(record: &mut TaggedRecord) -> BibData {
    let ty = classify(record);
    normalize(record, ty)
}

/// Map a record of known type onto a fresh [`BibData`]
///
/// Fields mapped to an attribute or an extra are marked consumed; running
/// [`collect_extras`] again afterwards adds nothing.
#[must_use]
pub fn normalize(record: &mut TaggedRecord, ty: PublicationType) -> BibData {
    let mut bib = BibData::new();
    bib.set_ty(ty);

    let placement = title_placement(ty);

    let title = take_title(record, 0);
    place(&mut bib, placement.primary, title);
    if let Some(secondary) = placement.secondary {
        let title = take_title(record, 1);
        place(&mut bib, secondary, title);
    }

    bib.set_authors(take_people(record, "AUTHOR", "CORPAUTHOR", Some(0)));
    let editors = take_people(record, "EDITOR", "CORPEDITOR", None);
    if !editors.is_empty() {
        bib.add_extra("Editor", editors);
    }
    let translators = take_people(record, "TRANSLATOR", "CORPTRANSLATOR", None);
    if !translators.is_empty() {
        bib.add_extra("Translator", translators);
    }

    remap_fields(record, &mut bib);
    collect_extras(record, &mut bib);

    bib
}

fn place(bib: &mut BibData, placement: Placement, title: String) {
    match placement {
        Placement::Title => bib.set_title(title),
        Placement::Journal => bib.set_journal(title),
        Placement::Extra(name) => {
            if !title.is_empty() {
                bib.add_extra(name, title);
            }
        }
    }
}

/// `TITLE` at `level`, with `SUBTITLE` appended after a colon
fn take_title(record: &mut TaggedRecord, level: u32) -> String {
    let Some(main) = record.find("TITLE", level) else {
        return String::new();
    };
    record.mark_consumed(main);
    let mut title = record.fields()[main].value.clone();

    if let Some(sub) = record.find("SUBTITLE", level) {
        record.mark_consumed(sub);
        title.push_str(": ");
        title.push_str(&record.fields()[sub].value);
    }

    title
}

/// Format one `|`-separated name: `Smith|J|A|` becomes `Smith, J. A.`
///
/// The first component is the family name; single-letter components are
/// initials.
#[must_use]
pub fn format_person(munged: &str) -> String {
    let munged = munged.strip_suffix('|').unwrap_or(munged);
    if munged.is_empty() {
        return String::new();
    }

    let mut output = String::with_capacity(munged.len() + 4);
    for (i, part) in munged.split('|').enumerate() {
        if i > 0 {
            output.push(' ');
        }
        output.push_str(part);
        if i == 0 {
            output.push(',');
        } else if part.chars().count() == 1 {
            output.push('.');
        }
    }
    output
}

/// Join every person tagged `tag` or `corp_tag` with ` and `
///
/// `level` restricts the search to one nesting level; `None` accepts all.
/// Corporate names are used verbatim.
#[must_use]
pub fn format_people(record: &TaggedRecord, tag: &str, corp_tag: &str, level: Option<u32>) -> String {
    people_indices(record, tag, corp_tag, level)
        .into_iter()
        .map(|(i, corporate)| {
            let value = &record.fields()[i].value;
            if corporate {
                value.clone()
            } else {
                format_person(value)
            }
        })
        .collect::<Vec<_>>()
        .join(" and ")
}

fn people_indices(
    record: &TaggedRecord,
    tag: &str,
    corp_tag: &str,
    level: Option<u32>,
) -> Vec<(usize, bool)> {
    record
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| level.map_or(true, |l| f.level == l))
        .filter_map(|(i, f)| {
            if f.has_tag(corp_tag) {
                Some((i, true))
            } else if f.has_tag(tag) {
                Some((i, false))
            } else {
                None
            }
        })
        .collect()
}

fn take_people(record: &mut TaggedRecord, tag: &str, corp_tag: &str, level: Option<u32>) -> String {
    let people = format_people(record, tag, corp_tag, level);
    for (i, _) in people_indices(record, tag, corp_tag, level) {
        record.mark_consumed(i);
    }
    people
}

/// Fixed tag to attribute mapping over every field, in input order
fn remap_fields(record: &mut TaggedRecord, bib: &mut BibData) {
    for i in 0..record.len() {
        let field = &record.fields()[i];
        let value = field.value.clone();

        let used = match field.tag.as_str() {
            "REFNUM" => {
                bib.set_key(value);
                true
            }
            "VOLUME" => {
                bib.set_volume(value);
                true
            }
            "NUMBER" | "ISSUE" => {
                bib.set_issue(value);
                true
            }
            "YEAR" | "PARTDATE:YEAR" => {
                bib.set_year(value);
                true
            }
            "PAGES:START" => {
                let pages = format!("{value}{}", bib.pages());
                bib.set_pages(pages);
                true
            }
            "PAGES:STOP" => {
                let pages = format!("{}-{value}", bib.pages());
                bib.set_pages(pages);
                true
            }
            // BibTeX has no article number, it goes out as the page
            "ARTICLENUMBER" => {
                bib.set_pages(value);
                true
            }
            "DOI" => {
                bib.set_doi(value);
                true
            }
            "ORGANIZER:CORP" => {
                if !value.is_empty() {
                    bib.add_extra("organization", value);
                }
                true
            }
            tag => DISCARDED_TAGS.contains(&tag),
        };

        if used {
            record.mark_consumed(i);
        }
    }
}

/// Capitalize the first letter and lower-case the rest: `CUSTOM_TAG` -> `Custom_tag`
#[must_use]
pub fn first_cap(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

fn extra_name(tag: &str) -> String {
    EXTRA_RENAMES
        .iter()
        .find(|(from, _)| *from == tag)
        .map_or_else(|| first_cap(tag), |(_, to)| (*to).to_string())
}

/// Turn every field not yet consumed into an extra, consuming it
pub fn collect_extras(record: &mut TaggedRecord, bib: &mut BibData) {
    let leftover_title = title_placement(bib.ty()).leftover;

    for i in record.unconsumed() {
        record.mark_consumed(i);
        let field = &record.fields()[i];
        let value = field.value.as_str();

        let name = if field.tag == "TITLE" {
            if let Some(name) = leftover_title {
                name.to_string()
            } else if !bib.title().is_empty() {
                debug!(level = field.level, value, "dropping extra title");
                continue;
            } else {
                warn!(level = field.level, value, "unexpected title element, using it as the title");
                bib.set_title(value);
                continue;
            }
        } else {
            extra_name(&field.tag)
        };

        if !value.is_empty() {
            bib.add_extra(name, value);
        }
    }
}
