/// Builds a [`Tag`](crate::Tag) from a JSON-like literal.
///
/// Returns `Result<Tag>` because the same invariants as the constructors
/// apply: list elements must share a type and map keys must be unique.
/// Scalars follow [`IntoTag`](crate::IntoTag), so integer literals become
/// `Int` and float literals `Double`; pass a `Tag` expression for any other
/// variant. Negative numbers inside `[...]` or `{...}` need parentheses.
///
/// ```rust
/// use bso::{tag, Tag};
///
/// let tag = tag!({
///     "name": "Alex",
///     "hp": (Tag::Short(20)),
///     "pos": [1, 64, (-3)],
///     "flags": { "creative": false }
/// })?;
/// assert_eq!(bso::to_string(&tag), "{name:\"Alex\",hp:20s,pos:[1,64,-3],flags:{creative:false}}");
///
/// assert!(tag!([1, "two"]).is_err());
/// # Ok::<(), bso::Error>(())
/// ```
#[macro_export]
macro_rules! tag {
    (null) => {
        ::core::result::Result::<$crate::Tag, $crate::Error>::Ok($crate::Tag::Null)
    };

    (true) => {
        ::core::result::Result::<$crate::Tag, $crate::Error>::Ok($crate::Tag::Bool(true))
    };

    (false) => {
        ::core::result::Result::<$crate::Tag, $crate::Error>::Ok($crate::Tag::Bool(false))
    };

    ([]) => {
        ::core::result::Result::<$crate::Tag, $crate::Error>::Ok($crate::Tag::List(
            $crate::TagList::empty(),
        ))
    };

    ([ $($elem:tt),+ $(,)? ]) => {
        $crate::macros::build_list(::std::vec![$($crate::tag!($elem)),+])
    };

    ({}) => {
        ::core::result::Result::<$crate::Tag, $crate::Error>::Ok($crate::Tag::Map(
            $crate::TagMap::new(),
        ))
    };

    ({ $($key:literal : $value:tt),+ $(,)? }) => {
        $crate::macros::build_map(::std::vec![$(($key, $crate::tag!($value))),+])
    };

    ($other:expr) => {
        $crate::IntoTag::into_tag($other)
    };
}

use crate::{Result, Tag, TagList, TagMap};

#[doc(hidden)]
pub fn build_list(elements: Vec<Result<Tag>>) -> Result<Tag> {
    let elements = elements.into_iter().collect::<Result<Vec<_>>>()?;
    TagList::new(elements).map(Tag::List)
}

#[doc(hidden)]
pub fn build_map(entries: Vec<(&str, Result<Tag>)>) -> Result<Tag> {
    let mut map = TagMap::with_capacity(entries.len());
    for (key, value) in entries {
        map.try_insert(key.to_string(), value?)?;
    }
    Ok(Tag::Map(map))
}
