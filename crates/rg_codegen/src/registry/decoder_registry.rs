use core::fmt;

use rg_utils::hash::HashMap;
use rg_utils::hash::hash_map::Entry;

use crate::CodegenError;
use crate::info::TypeKey;
use crate::registry::Decoder;

// -----------------------------------------------------------------------------
// Tier

/// Which of the two registry maps an entry lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Methods invoked on the reader instance.
    Instanced,
    /// Free functions taking the reader as a parameter.
    Static,
}

impl Tier {
    #[inline]
    pub const fn of(instanced: bool) -> Self {
        if instanced { Self::Instanced } else { Self::Static }
    }

    #[inline]
    pub const fn is_instanced(self) -> bool {
        matches!(self, Self::Instanced)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instanced => f.pad("instanced"),
            Self::Static => f.pad("static"),
        }
    }
}

// -----------------------------------------------------------------------------
// DecoderRegistry

/// Two independent maps from [`TypeKey`] to [`Decoder`].
///
/// Each key maps to at most one decoder per tier. Lookups take an explicit
/// tier, or a favored tier with fallback to the other one.
///
/// # Examples
///
/// ```
/// use rg_codegen::info::TypeKey;
/// use rg_codegen::registry::{Decoder, DecoderRegistry};
///
/// let mut registry = DecoderRegistry::new();
/// registry.add(Decoder::from_fn("read_flag", |r| Ok(r.read_bool()?)), false, true).unwrap();
///
/// let key = TypeKey::of::<bool>();
/// assert!(registry.lookup(&key, true).is_none());
/// assert_eq!(registry.lookup_favored(&key, true).unwrap().name(), "read_flag");
/// ```
#[derive(Clone, Default)]
pub struct DecoderRegistry {
    instanced: HashMap<TypeKey, Decoder>,
    statics: HashMap<TypeKey, Decoder>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn tier(&self, instanced: bool) -> &HashMap<TypeKey, Decoder> {
        if instanced { &self.instanced } else { &self.statics }
    }

    #[inline]
    fn tier_mut(&mut self, instanced: bool) -> &mut HashMap<TypeKey, Decoder> {
        if instanced { &mut self.instanced } else { &mut self.statics }
    }

    /// Adds `decoder` under its key.
    ///
    /// With `error_on_duplicate`, an occupied slot is a
    /// [`DuplicateRegistration`](CodegenError::DuplicateRegistration) and the
    /// existing entry is kept. Otherwise the entry is replaced and the
    /// previous decoder returned.
    pub fn add(
        &mut self,
        decoder: Decoder,
        instanced: bool,
        error_on_duplicate: bool,
    ) -> Result<Option<Decoder>, CodegenError> {
        let tier = self.tier_mut(instanced);
        if !error_on_duplicate {
            return Ok(tier.insert(decoder.key().clone(), decoder));
        }

        match tier.entry(decoder.key().clone()) {
            Entry::Occupied(entry) => Err(CodegenError::DuplicateRegistration {
                key: entry.key().clone(),
                tier: Tier::of(instanced),
            }),
            Entry::Vacant(entry) => {
                entry.insert(decoder);
                Ok(None)
            }
        }
    }

    pub fn remove(&mut self, key: &TypeKey, instanced: bool) -> Option<Decoder> {
        self.tier_mut(instanced).remove(key)
    }

    #[inline]
    pub fn lookup(&self, key: &TypeKey, instanced: bool) -> Option<&Decoder> {
        self.tier(instanced).get(key)
    }

    /// Looks in the favored tier first, then the other one.
    pub fn lookup_favored(&self, key: &TypeKey, favor_instanced: bool) -> Option<&Decoder> {
        self.lookup(key, favor_instanced)
            .or_else(|| self.lookup(key, !favor_instanced))
    }

    /// Whether either tier holds `key`.
    #[inline]
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.instanced.contains_key(key) || self.statics.contains_key(key)
    }

    pub fn iter(&self, instanced: bool) -> impl Iterator<Item = &Decoder> {
        self.tier(instanced).values()
    }

    /// The number of entries across both tiers.
    pub fn len(&self) -> usize {
        self.instanced.len() + self.statics.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("instanced", &self.instanced.keys())
            .field("statics", &self.statics.keys())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
