use alloc::borrow::Cow;
use alloc::boxed::Box;
use core::any::{Any, TypeId, type_name};
use core::fmt;

use rg_utils::TypeIdMap;

use crate::DecodeError;
use crate::dispatch::GenericRead;
use crate::info::TypeKey;
use crate::reader::{AutoPackType, Reader};

// -----------------------------------------------------------------------------
// DispatchEntry

/// One materialized [`GenericRead<T>`], erased.
pub struct DispatchEntry {
    key: TypeKey,
    type_path: &'static str,
    decoder: Cow<'static, str>,
    auto_packed: bool,
    adapter: Box<dyn Any + Send + Sync>,
}

impl DispatchEntry {
    pub(crate) fn new(
        key: TypeKey,
        type_path: &'static str,
        decoder: Cow<'static, str>,
        auto_packed: bool,
        adapter: Box<dyn Any + Send + Sync>,
    ) -> Self {
        Self {
            key,
            type_path,
            decoder,
            auto_packed,
            adapter,
        }
    }

    #[inline]
    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    /// Name of the decoder the entry delegates to.
    #[inline]
    pub fn decoder(&self) -> &str {
        &self.decoder
    }

    #[inline]
    pub fn is_auto_packed(&self) -> bool {
        self.auto_packed
    }

    #[inline]
    pub fn downcast<T: 'static>(&self) -> Option<&GenericRead<T>> {
        self.adapter.downcast_ref()
    }
}

impl fmt::Debug for DispatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchEntry")
            .field("type_path", &self.type_path)
            .field("decoder", &self.decoder)
            .field("auto_packed", &self.auto_packed)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// DispatchTable

/// Typed generic dispatch: one [`GenericRead<T>`] per decoded type.
///
/// Populated once by dispatch materialization; read-only afterwards.
#[derive(Default)]
pub struct DispatchTable {
    entries: TypeIdMap<DispatchEntry>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs an entry unless `id` already has one.
    pub(crate) fn try_insert(&mut self, id: TypeId, entry: DispatchEntry) -> bool {
        self.entries.try_insert(id, || entry)
    }

    #[inline]
    pub fn get<T: 'static>(&self) -> Option<&GenericRead<T>> {
        self.entries.get_type::<T>().and_then(DispatchEntry::downcast::<T>)
    }

    #[inline]
    pub fn entry(&self, id: TypeId) -> Option<&DispatchEntry> {
        self.entries.get(&id)
    }

    #[inline]
    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_type::<T>()
    }

    /// Decodes a `T` with its default pack mode.
    pub fn decode<T: 'static>(&self, reader: &mut Reader<'_>) -> Result<T, DecodeError> {
        self.get::<T>()
            .ok_or(DecodeError::NotMaterialized {
                type_path: type_name::<T>(),
            })?
            .read(reader)
    }

    /// Decodes a `T` with an explicit pack mode.
    pub fn decode_packed<T: 'static>(
        &self,
        reader: &mut Reader<'_>,
        pack: AutoPackType,
    ) -> Result<T, DecodeError> {
        self.get::<T>()
            .ok_or(DecodeError::NotMaterialized {
                type_path: type_name::<T>(),
            })?
            .read_packed(reader, pack)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DispatchEntry> {
        self.entries.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.values()).finish()
    }
}
