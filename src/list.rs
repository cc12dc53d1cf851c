//! Homogeneous list for BSO List tags.
//!
//! Every element of a [`TagList`] shares one [`TagType`]. The first element
//! fixes the type; an empty list has none. Signed, unsigned and boolean
//! sub-variants of the same type code may be mixed, since each list element
//! carries its own descriptor in the binary form.
//!
//! ```rust
//! use bso::{Error, Tag, TagList};
//!
//! let mut list = TagList::empty();
//! list.push(Tag::Int(1)).unwrap();
//! list.push(Tag::UInt(2)).unwrap();
//! assert!(matches!(list.push(Tag::Long(3)), Err(Error::TypeMismatch { index: 2, .. })));
//! ```

use crate::{Error, Result, Tag, TagType};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TagList(Vec<Tag>);

impl TagList {
    /// Creates an empty list with no element type.
    #[must_use]
    pub fn empty() -> Self {
        TagList(Vec::new())
    }

    /// Builds a list, checking every element against the first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] for the first element whose type differs.
    pub fn new(values: Vec<Tag>) -> Result<Self> {
        if let Some(first) = values.first() {
            let expected = first.tag_type();
            if let Some((index, found)) = values
                .iter()
                .enumerate()
                .find(|(_, v)| v.tag_type() != expected)
            {
                return Err(Error::type_mismatch(
                    index,
                    expected.name(),
                    found.tag_type().name(),
                ));
            }
        }
        Ok(TagList(values))
    }

    /// Appends an element, which must match the list's element type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] when `value` has a different type.
    pub fn push(&mut self, value: Tag) -> Result<()> {
        if let Some(expected) = self.element_type() {
            let found = value.tag_type();
            if found != expected {
                return Err(Error::type_mismatch(
                    self.0.len(),
                    expected.name(),
                    found.name(),
                ));
            }
        }
        self.0.push(value);
        Ok(())
    }

    /// The shared element type, `None` while the list is empty.
    #[must_use]
    pub fn element_type(&self) -> Option<TagType> {
        self.0.first().map(Tag::tag_type)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Tag> {
        self.0.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Tag] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Tag> {
        self.0
    }
}

impl TryFrom<Vec<Tag>> for TagList {
    type Error = Error;

    fn try_from(values: Vec<Tag>) -> Result<Self> {
        TagList::new(values)
    }
}

impl IntoIterator for TagList {
    type Item = Tag;
    type IntoIter = std::vec::IntoIter<Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TagList {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_has_no_type() {
        let list = TagList::new(vec![]).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.element_type(), None);
    }

    #[test]
    fn test_mixed_list_rejected() {
        let err = TagList::new(vec![Tag::Int(1), Tag::String("s".into())]).unwrap_err();
        match err {
            Error::TypeMismatch {
                index,
                expected,
                found,
            } => {
                assert_eq!(index, 1);
                assert_eq!(expected, "Int");
                assert_eq!(found, "String");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_sub_variants_share_type() {
        let list = TagList::new(vec![Tag::Byte(1), Tag::Bool(true), Tag::UByte(200)]).unwrap();
        assert_eq!(list.element_type(), Some(TagType::Byte));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_nested_lists_any_inner_type() {
        let inner_a = Tag::List(TagList::new(vec![Tag::Int(1)]).unwrap());
        let inner_b = Tag::List(TagList::new(vec![Tag::Double(1.0)]).unwrap());
        assert!(TagList::new(vec![inner_a, inner_b]).is_ok());
    }

    #[test]
    fn test_push_after_empty_sets_type() {
        let mut list = TagList::empty();
        list.push(Tag::Float(1.0)).unwrap();
        assert_eq!(list.element_type(), Some(TagType::Float));
        assert!(list.push(Tag::Double(1.0)).is_err());
        assert_eq!(list.len(), 1);
    }
}
