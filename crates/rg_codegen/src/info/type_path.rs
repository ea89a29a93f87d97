use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};

// -----------------------------------------------------------------------------
// Type

/// The identity of a Rust type together with its display path.
///
/// Equality and hashing only consider the [`TypeId`]; the path is
/// informational and can be overridden (see [`Type::with_path`]).
///
/// # Examples
///
/// ```
/// use rg_codegen::info::Type;
///
/// let ty = Type::of::<Vec<u8>>();
/// assert!(ty.is::<Vec<u8>>());
/// assert_eq!(ty.path(), "alloc::vec::Vec<u8>");
/// assert_eq!(ty.name(), "Vec<u8>");
/// assert_eq!(ty.crate_name(), Some("alloc"));
/// ```
#[derive(Clone, Copy)]
pub struct Type {
    id: TypeId,
    path: &'static str,
}

impl Type {
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: core::any::type_name::<T>(),
        }
    }

    /// Replaces the display path, keeping the identity.
    #[inline]
    pub const fn with_path(self, path: &'static str) -> Self {
        Self { id: self.id, path }
    }

    #[inline]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// The path without its module prefix.
    pub fn name(&self) -> &'static str {
        let definition_end = self.path.find('<').unwrap_or(self.path.len());
        match self.path[..definition_end].rfind("::") {
            Some(index) => &self.path[index + 2..],
            None => self.path,
        }
    }

    /// The first path segment, when the path has more than one.
    pub fn crate_name(&self) -> Option<&'static str> {
        let definition_end = self.path.find('<').unwrap_or(self.path.len());
        self.path[..definition_end]
            .split_once("::")
            .map(|(name, _)| name)
    }

    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Type {}

impl Hash for Type {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Type {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path)
    }
}

impl fmt::Display for Type {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path)
    }
}
