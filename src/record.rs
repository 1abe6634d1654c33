//! Tagged-field records, the intermediate form every input dialect is
//! converted into before classification and normalization

/// One `(tag, value, level)` triple of a record
///
/// Tags are colon-delimited names such as `GENRE:MARC` or `PARTDATE:YEAR`.
/// Level 0 describes the record itself, level 1 the work containing it
/// (the journal of an article, the book of a chapter), and so on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedField {
    /// Field tag
    pub tag: String,
    /// Field value
    pub value: String,
    /// Nesting level
    pub level: u32,
    consumed: bool,
}

impl TaggedField {
    /// Create an unconsumed field
    pub fn new(tag: impl Into<String>, value: impl Into<String>, level: u32) -> Self {
        Self {
            tag: tag.into(),
            value: value.into(),
            level,
            consumed: false,
        }
    }

    /// Whether the normalizer has already mapped this field somewhere
    #[must_use]
    pub const fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Case-insensitive tag comparison
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }
}

/// An ordered sequence of tagged fields describing one bibliographic item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedRecord {
    fields: Vec<TaggedField>,
}

impl TaggedRecord {
    /// Create an empty record
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field
    pub fn push(&mut self, tag: impl Into<String>, value: impl Into<String>, level: u32) {
        self.fields.push(TaggedField::new(tag, value, level));
    }

    /// Builder-style [`push`](Self::push)
    #[must_use]
    pub fn with(mut self, tag: impl Into<String>, value: impl Into<String>, level: u32) -> Self {
        self.push(tag, value, level);
        self
    }

    /// All fields in input order
    #[must_use]
    pub fn fields(&self) -> &[TaggedField] {
        &self.fields
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Index of the first field with `tag` (case-insensitive) at `level`
    #[must_use]
    pub fn find(&self, tag: &str, level: u32) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.level == level && f.has_tag(tag))
    }

    /// Highest nesting level present, 0 for an empty record
    #[must_use]
    pub fn max_level(&self) -> u32 {
        self.fields.iter().map(|f| f.level).max().unwrap_or(0)
    }

    /// Mark the field at `index` as mapped
    pub fn mark_consumed(&mut self, index: usize) {
        if let Some(field) = self.fields.get_mut(index) {
            field.consumed = true;
        }
    }

    /// Whether the field at `index` has been mapped
    #[must_use]
    pub fn is_consumed(&self, index: usize) -> bool {
        self.fields.get(index).is_some_and(TaggedField::is_consumed)
    }

    /// Indices of fields not yet mapped, in input order
    #[must_use]
    pub fn unconsumed(&self) -> Vec<usize> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.consumed)
            .map(|(i, _)| i)
            .collect()
    }

    /// Clear every consumed flag so the record can be normalized afresh
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.consumed = false;
        }
    }
}

impl FromIterator<TaggedField> for TaggedRecord {
    fn from_iter<T: IntoIterator<Item = TaggedField>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_is_case_insensitive_and_level_bound() {
        let record = TaggedRecord::new()
            .with("TITLE", "Inner", 0)
            .with("title", "Outer", 1);

        assert_eq!(record.find("title", 0), Some(0));
        assert_eq!(record.find("TITLE", 1), Some(1));
        assert_eq!(record.find("TITLE", 2), None);
        assert_eq!(record.max_level(), 1);
    }

    #[test]
    fn test_consumed_tracking() {
        let mut record = TaggedRecord::new()
            .with("VOLUME", "3", 0)
            .with("NUMBER", "4", 0)
            .with("NOTES", "n", 0);

        record.mark_consumed(1);
        assert!(record.is_consumed(1));
        assert!(!record.is_consumed(0));
        assert_eq!(record.unconsumed(), vec![0, 2]);

        // Out of range indices are ignored
        record.mark_consumed(10);
        assert!(!record.is_consumed(10));

        record.reset();
        assert_eq!(record.unconsumed(), vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_record() {
        let record = TaggedRecord::new();
        assert!(record.is_empty());
        assert_eq!(record.max_level(), 0);
    }
}
