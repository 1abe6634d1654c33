//! Tag uids and their display names

use ahash::AHashMap;

/// Identifier of a user-defined tag
pub type TagId = u32;

/// Resolves tag uids to display names
pub trait TagResolver {
    /// Name of `uid`, or `None` when it is unknown
    fn tag_name(&self, uid: TagId) -> Option<&str>;
}

/// In-memory tag table
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    names: AHashMap<TagId, String>,
    next: TagId,
}

impl TagRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tag and return its uid
    ///
    /// Uids already in the table are never handed out again.
    pub fn add(&mut self, name: impl Into<String>) -> TagId {
        let mut uid = self.next;
        while self.names.contains_key(&uid) {
            uid = uid.wrapping_add(1);
        }
        self.names.insert(uid, name.into());
        self.next = uid.wrapping_add(1);
        uid
    }

    /// Register a tag under a uid chosen by the caller
    pub fn insert(&mut self, uid: TagId, name: impl Into<String>) {
        self.names.insert(uid, name.into());
        self.next = self.next.max(uid.saturating_add(1));
    }

    /// Rename an existing tag; returns false when `uid` is unknown
    pub fn rename(&mut self, uid: TagId, name: impl Into<String>) -> bool {
        self.names.get_mut(&uid).map_or(false, |current| {
            *current = name.into();
            true
        })
    }

    /// Forget a tag
    pub fn remove(&mut self, uid: TagId) -> Option<String> {
        self.names.remove(&uid)
    }

    /// Uid of the first tag with this name
    #[must_use]
    pub fn find(&self, name: &str) -> Option<TagId> {
        let mut matches: Vec<_> = self
            .names
            .iter()
            .filter(|(_, n)| n.as_str() == name)
            .map(|(uid, _)| *uid)
            .collect();
        matches.sort_unstable();
        matches.first().copied()
    }

    /// Number of tags
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl TagResolver for TagRegistry {
    fn tag_name(&self, uid: TagId) -> Option<&str> {
        self.names.get(&uid).map(String::as_str)
    }
}
