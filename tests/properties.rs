use bibnorm::escape::{escape_accents, unescape_latex};
use bibnorm::normalize::collect_extras;
use bibnorm::{
    classify, format_people, normalize, normalize_record, Extras, PublicationType, TaggedRecord,
};
use proptest::prelude::*;

fn tag() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("TITLE".to_string()),
        Just("SUBTITLE".to_string()),
        Just("AUTHOR".to_string()),
        Just("EDITOR".to_string()),
        Just("PARTDATE:YEAR".to_string()),
        Just("PAGES:START".to_string()),
        Just("PAGES:STOP".to_string()),
        Just("VOLUME".to_string()),
        Just("KEYWORD".to_string()),
        "[A-Z]{1,8}(:[A-Z]{1,5})?",
    ]
}

fn record() -> impl Strategy<Value = TaggedRecord> {
    prop::collection::vec((tag(), "[a-zA-Z0-9 ]{0,12}", 0u32..3), 0..12)
        .prop_map(|fields| {
            fields
                .into_iter()
                .fold(TaggedRecord::new(), |r, (t, v, l)| r.with(t, v, l))
        })
}

fn publication_type() -> impl Strategy<Value = PublicationType> {
    prop::sample::select(PublicationType::ALL.to_vec())
}

proptest! {
    #[test]
    fn academic_journal_is_article(mut base in record(), level in 0u32..3) {
        base.push("GENRE:MARC", "academic journal", level);
        prop_assert_eq!(classify(&base), PublicationType::Article);
    }

    #[test]
    fn book_genre_depends_on_level(level in 0u32..4) {
        let record = TaggedRecord::new().with("GENRE:MARC", "Book", level);
        let expected = if level == 0 { PublicationType::Book } else { PublicationType::InBook };
        prop_assert_eq!(classify(&record), expected);
    }

    #[test]
    fn extras_collection_is_idempotent(mut rec in record(), ty in publication_type()) {
        let mut bib = normalize(&mut rec, ty);
        let before = bib.clone();
        collect_extras(&mut rec, &mut bib);
        prop_assert_eq!(bib, before);
        prop_assert!(rec.unconsumed().is_empty());
    }

    #[test]
    fn normalize_never_panics(mut rec in record()) {
        let bib = normalize_record(&mut rec);
        prop_assert!(PublicationType::ALL.contains(&bib.ty()));
    }

    #[test]
    fn people_are_joined_with_and(names in prop::collection::vec("[A-Z][a-z]{1,8}", 1..5)) {
        let record = names
            .iter()
            .fold(TaggedRecord::new(), |r, n| r.with("AUTHOR", format!("{n}|X|"), 0));
        let joined = format_people(&record, "AUTHOR", "CORPAUTHOR", Some(0));
        prop_assert_eq!(joined.matches(" and ").count(), names.len() - 1);
    }

    #[test]
    fn extras_keys_fold_case(key in "[a-zA-Z]{1,10}", a in ".{0,8}", b in ".{0,8}") {
        let mut extras = Extras::new();
        extras.insert(key.clone(), a);
        extras.insert(key.to_uppercase(), b.clone());
        prop_assert_eq!(extras.len(), 1);
        prop_assert_eq!(extras.get(&key.to_lowercase()), Some(b.as_str()));
    }

    #[test]
    fn escape_then_unescape_restores_latin(text in "[a-zA-Z ,.éèêëáàâäóòôöúùûüçñÉÖÜ]{0,30}") {
        prop_assert_eq!(unescape_latex(&escape_accents(&text)), text);
    }
}
