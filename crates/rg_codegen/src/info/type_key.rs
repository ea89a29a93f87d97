use alloc::boxed::Box;
use alloc::format;
use core::fmt;

// -----------------------------------------------------------------------------
// TypeKey

/// The normalized lookup name of a type.
///
/// Closed generic instantiations collapse onto their open definition: the
/// trailing generic argument list is replaced by a backtick and the number
/// of top-level arguments. Two types with the same path and arity therefore
/// share one registry slot.
///
/// Tuples, arrays and references are left untouched.
///
/// # Examples
///
/// ```
/// use rg_codegen::info::TypeKey;
///
/// assert_eq!(TypeKey::new("alloc::vec::Vec<u8>").as_str(), "alloc::vec::Vec`1");
/// assert_eq!(
///     TypeKey::new("std::collections::HashMap<u8, alloc::vec::Vec<i32>>").as_str(),
///     "std::collections::HashMap`2",
/// );
/// assert_eq!(TypeKey::new("i32").as_str(), "i32");
/// assert_eq!(TypeKey::of::<Vec<String>>(), TypeKey::of::<Vec<bool>>());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(Box<str>);

impl TypeKey {
    /// Normalizes a full type path.
    pub fn new(full_name: &str) -> Self {
        let trimmed = full_name.trim();
        let trimmed = trimmed.strip_prefix("::").unwrap_or(trimmed);

        match split_arguments(trimmed) {
            Some((definition, arity)) => Self(format!("{definition}`{arity}").into_boxed_str()),
            None => Self(Box::from(trimmed)),
        }
    }

    /// The key of `T`, derived from [`core::any::type_name`].
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(core::any::type_name::<T>())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The number of generic arguments folded into this key.
    pub fn arity(&self) -> usize {
        self.0
            .rsplit_once('`')
            .and_then(|(_, arity)| arity.parse().ok())
            .unwrap_or(0)
    }

    #[inline]
    pub fn is_generic(&self) -> bool {
        self.arity() > 0
    }
}

/// Splits `path::Name<A, B>` into `("path::Name", 2)`.
fn split_arguments(path: &str) -> Option<(&str, usize)> {
    let first = path.chars().next()?;
    if !(first.is_alphabetic() || first == '_') || !path.ends_with('>') {
        return None;
    }

    // Walk back from the final '>' to its matching '<'.
    let mut depth = 0_usize;
    let mut open = None;
    for (index, c) in path.char_indices().rev() {
        match c {
            '>' if is_arrow(path, index) => {}
            '>' => depth += 1,
            '<' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    open = Some(index);
                    break;
                }
            }
            _ => {}
        }
    }
    let open = open?;
    let arguments = &path[open + 1..path.len() - 1];
    if arguments.trim().is_empty() {
        return Some((&path[..open], 0));
    }

    let mut nesting = 0_usize;
    let mut arity = 1;
    for (index, c) in arguments.char_indices() {
        match c {
            '>' if is_arrow(arguments, index) => {}
            '<' | '(' | '[' => nesting += 1,
            '>' | ')' | ']' => nesting = nesting.saturating_sub(1),
            ',' if nesting == 0 => arity += 1,
            _ => {}
        }
    }
    Some((&path[..open], arity))
}

/// Whether the `>` at `index` belongs to a `->`.
fn is_arrow(path: &str, index: usize) -> bool {
    index > 0 && path.as_bytes()[index - 1] == b'-'
}

impl fmt::Display for TypeKey {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TypeKey {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl From<&str> for TypeKey {
    #[inline]
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TypeKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let path = <alloc::string::String as serde::Deserialize>::deserialize(deserializer)?;
        Ok(Self::new(&path))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypeKey;

    #[test]
    fn plain_paths_are_kept() {
        assert_eq!(TypeKey::new("my_game::Player").as_str(), "my_game::Player");
        assert_eq!(TypeKey::new("  ::my_game::Player ").as_str(), "my_game::Player");
        assert!(!TypeKey::new("u64").is_generic());
    }

    #[test]
    fn generic_arguments_collapse() {
        let key = TypeKey::new("core::option::Option<alloc::vec::Vec<(u8, u16)>>");
        assert_eq!(key.as_str(), "core::option::Option`1");
        assert_eq!(key.arity(), 1);

        let key = TypeKey::new("a::Map<b::Key<u8, u8>, [u8; 4], (i32, i32)>");
        assert_eq!(key.as_str(), "a::Map`3");
        assert_eq!(key.arity(), 3);
    }

    #[test]
    fn only_the_trailing_list_collapses() {
        let key = TypeKey::new("a::Outer<u8>::Inner<i32, i64>");
        assert_eq!(key.as_str(), "a::Outer<u8>::Inner`2");
    }

    #[test]
    fn compound_types_are_kept() {
        assert_eq!(TypeKey::new("(u8, alloc::vec::Vec<u8>)").as_str(), "(u8, alloc::vec::Vec<u8>)");
        assert_eq!(TypeKey::new("[a::B<u8>; 3]").as_str(), "[a::B<u8>; 3]");
        assert_eq!(TypeKey::new("&a::B<u8>").as_str(), "&a::B<u8>");
    }

    #[test]
    fn return_arrows_are_not_brackets() {
        let key = TypeKey::new("a::W<fn() -> u8>");
        assert_eq!(key.as_str(), "a::W`1");

        let key = TypeKey::new("a::W<fn(u8) -> a::B<u8>, alloc::boxed::Box<dyn Fn() -> i32>>");
        assert_eq!(key.as_str(), "a::W`2");

        assert_eq!(TypeKey::of::<Vec<fn() -> u8>>(), TypeKey::of::<Vec<u8>>());
    }

    #[test]
    fn instantiations_share_a_key() {
        assert_eq!(TypeKey::of::<Vec<u8>>(), TypeKey::of::<Vec<Vec<i32>>>());
        assert_ne!(TypeKey::of::<Vec<u8>>(), TypeKey::of::<Option<u8>>());
    }
}
