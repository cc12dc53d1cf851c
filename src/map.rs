//! Ordered, key-unique map for BSO Map tags.
//!
//! [`TagMap`] wraps an [`IndexMap`] so entries keep their insertion order, which
//! is the order both the binary encoder and the text renderer emit them in.
//!
//! Keys are unique. [`TagMap::try_insert`] rejects a key that is already
//! present and is what the decoder, the parser and [`Tag::map`](crate::Tag::map)
//! use. [`TagMap::insert`] is the one explicit replace path: it overwrites the
//! value in place and keeps the key's original position.
//!
//! ## Examples
//!
//! ```rust
//! use bso::{Tag, TagMap};
//!
//! let mut map = TagMap::new();
//! map.try_insert("name".to_string(), Tag::String("Alex".into())).unwrap();
//! map.try_insert("hp".to_string(), Tag::Short(20)).unwrap();
//! assert!(map.try_insert("hp".to_string(), Tag::Short(19)).is_err());
//!
//! map.insert("hp".to_string(), Tag::Short(19));
//! let keys: Vec<_> = map.keys().cloned().collect();
//! assert_eq!(keys, vec!["name", "hp"]);
//! ```

use crate::value::check_string_len;
use crate::{Error, Result, Tag};
use indexmap::IndexMap;

/// An ordered map of string keys to tags.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TagMap(IndexMap<String, Tag>);

impl TagMap {
    /// Creates an empty `TagMap`.
    #[must_use]
    pub fn new() -> Self {
        TagMap(IndexMap::new())
    }

    /// Creates an empty `TagMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        TagMap(IndexMap::with_capacity(capacity))
    }

    /// Builds a map from pairs, failing on the first duplicate key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] or [`Error::StringTooLong`] for an over-long key.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Tag)>,
    {
        let entries = entries.into_iter();
        let mut map = TagMap::with_capacity(entries.size_hint().0);
        for (key, value) in entries {
            map.try_insert(key, value)?;
        }
        Ok(map)
    }

    /// Inserts a new entry, rejecting keys that are already present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if `key` exists, or
    /// [`Error::StringTooLong`] if it cannot be stored with a 2-byte length.
    pub fn try_insert(&mut self, key: String, value: Tag) -> Result<()> {
        check_string_len(&key)?;
        match self.0.entry(key) {
            indexmap::map::Entry::Occupied(entry) => Err(Error::DuplicateKey(entry.key().clone())),
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(())
            }
        }
    }

    /// Inserts or replaces the value for `key`.
    ///
    /// A replaced entry keeps its position; the old value is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bso::{Tag, TagMap};
    ///
    /// let mut map = TagMap::new();
    /// assert!(map.insert("key".to_string(), Tag::Int(42)).is_none());
    /// assert_eq!(map.insert("key".to_string(), Tag::Int(43)), Some(Tag::Int(42)));
    /// ```
    pub fn insert(&mut self, key: String, value: Tag) -> Option<Tag> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Tag> {
        self.0.get_mut(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Tag> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Tag> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Tag> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Tag> {
        self.0.iter()
    }
}

impl IntoIterator for TagMap {
    type Item = (String, Tag);
    type IntoIter = indexmap::map::IntoIter<String, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TagMap {
    type Item = (&'a String, &'a Tag);
    type IntoIter = indexmap::map::Iter<'a, String, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
