use rg_utils::hash::{HashMap, HashSet};

use crate::info::TypeKey;
use crate::reader::AutoPackType;

// -----------------------------------------------------------------------------
// AutoPackSet

/// Types whose decoder takes a trailing pack mode.
#[derive(Clone, Debug, Default)]
pub struct AutoPackSet(HashSet<TypeKey>);

impl AutoPackSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key`, returning `false` when it was already present.
    #[inline]
    pub fn insert(&mut self, key: TypeKey) -> bool {
        self.0.insert(key)
    }

    #[inline]
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.0.contains(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeKey> {
        self.0.iter()
    }
}

impl Extend<TypeKey> for AutoPackSet {
    fn extend<I: IntoIterator<Item = TypeKey>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

// -----------------------------------------------------------------------------
// AutoPackPolicy

/// The default pack mode per type.
///
/// # Examples
///
/// ```
/// use rg_codegen::catalog::{AutoPackPolicy, AutoPackSet};
/// use rg_codegen::info::TypeKey;
/// use rg_codegen::reader::AutoPackType;
///
/// let mut set = AutoPackSet::new();
/// set.insert(TypeKey::of::<u32>());
///
/// let policy = AutoPackPolicy::new(AutoPackType::Packed)
///     .with_override(TypeKey::of::<u32>(), AutoPackType::Unpacked);
///
/// assert_eq!(policy.pack_for(&set, &TypeKey::of::<u32>(), None), Some(AutoPackType::Unpacked));
/// assert_eq!(policy.pack_for(&set, &TypeKey::of::<bool>(), None), None);
/// ```
#[derive(Clone, Debug, Default)]
pub struct AutoPackPolicy {
    fallback: AutoPackType,
    overrides: HashMap<TypeKey, AutoPackType>,
}

impl AutoPackPolicy {
    pub fn new(fallback: AutoPackType) -> Self {
        Self {
            fallback,
            overrides: HashMap::default(),
        }
    }

    pub fn with_override(mut self, key: TypeKey, pack: AutoPackType) -> Self {
        self.overrides.insert(key, pack);
        self
    }

    /// The default mode of `key`, ignoring whether it is auto-packed.
    #[inline]
    pub fn default_for(&self, key: &TypeKey) -> AutoPackType {
        self.overrides.get(key).copied().unwrap_or(self.fallback)
    }

    /// The mode a call site passes: the member override if any, else the
    /// type default. `None` when the type is not in `set`.
    pub fn pack_for(
        &self,
        set: &AutoPackSet,
        key: &TypeKey,
        member: Option<AutoPackType>,
    ) -> Option<AutoPackType> {
        set.contains(key)
            .then(|| member.unwrap_or_else(|| self.default_for(key)))
    }
}
