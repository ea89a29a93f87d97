use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use rg_utils::TypeIdMap;

use crate::DecodeError;
use crate::catalog::AutoPackSet;
use crate::dispatch::{DispatchTable, GeneratedModule, GenericRead};
use crate::info::{TypeKey, Typed};
use crate::reader::{AutoPackType, Reader};
use crate::registry::{Decoder, DecoderRegistry};
use crate::synth::SynthesizedRoutine;

// -----------------------------------------------------------------------------
// Artifact

/// The sealed output of a successful pass.
///
/// Read-only: it can be shared freely between threads.
pub struct Artifact {
    module_name: String,
    registry: DecoderRegistry,
    auto_pack: AutoPackSet,
    instances: TypeIdMap<Decoder>,
    routines: Vec<SynthesizedRoutine>,
    dispatch: DispatchTable,
}

impl Artifact {
    pub(crate) fn new(module: GeneratedModule, registry: DecoderRegistry, auto_pack: AutoPackSet) -> Self {
        let mut instances = TypeIdMap::new();
        for decoder in module.instances() {
            if let Some(returns) = decoder.returns() {
                instances.insert(returns.id(), decoder.clone());
            }
        }
        let (module_name, routines, dispatch) = module.into_parts();
        Self {
            module_name,
            registry,
            auto_pack,
            instances,
            routines,
            dispatch,
        }
    }

    #[inline]
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    #[inline]
    pub fn lookup(&self, key: &TypeKey, instanced: bool) -> Option<&Decoder> {
        self.registry.lookup(key, instanced)
    }

    #[inline]
    pub fn lookup_favored(&self, key: &TypeKey, favor_instanced: bool) -> Option<&Decoder> {
        self.registry.lookup_favored(key, favor_instanced)
    }

    /// The decoder of `T`, closed generic instances included.
    ///
    /// Nullable composites are found both as `T` and as `Option<T>`, the
    /// decoder producing `Option<T>` in either case.
    pub fn decoder_for<T: Typed>(&self, favor_instanced: bool) -> Option<&Decoder> {
        let info = T::type_info();
        let decoded = info.decoded().id();
        let produces = |decoder: &&Decoder| decoder.returns().is_some_and(|returns| returns.id() == decoded);
        self.instances
            .get(&decoded)
            .or_else(|| self.lookup(info.key(), favor_instanced).filter(produces))
            .or_else(|| self.lookup(info.key(), !favor_instanced).filter(produces))
    }

    #[inline]
    pub fn is_auto_packed(&self, key: &TypeKey) -> bool {
        self.auto_pack.contains(key)
    }

    #[inline]
    pub fn generic_read<T: 'static>(&self) -> Option<&GenericRead<T>> {
        self.dispatch.get::<T>()
    }

    /// Decodes a `T` through the dispatch table.
    #[inline]
    pub fn decode<T: 'static>(&self, reader: &mut Reader<'_>) -> Result<T, DecodeError> {
        self.dispatch.decode(reader)
    }

    #[inline]
    pub fn decode_packed<T: 'static>(
        &self,
        reader: &mut Reader<'_>,
        pack: AutoPackType,
    ) -> Result<T, DecodeError> {
        self.dispatch.decode_packed(reader, pack)
    }

    #[inline]
    pub fn dispatch(&self) -> &DispatchTable {
        &self.dispatch
    }

    #[inline]
    pub fn routines(&self) -> &[SynthesizedRoutine] {
        &self.routines
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("module_name", &self.module_name)
            .field("registry", &self.registry)
            .field("routines", &self.routines.len())
            .field("dispatch", &self.dispatch.len())
            .finish()
    }
}
