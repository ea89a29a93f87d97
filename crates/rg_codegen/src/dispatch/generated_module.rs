use alloc::string::String;
use alloc::vec::Vec;
use core::any::TypeId;

use rg_utils::TypeIdMap;

use crate::dispatch::DispatchTable;
use crate::registry::Decoder;
use crate::synth::SynthesizedRoutine;

/// The output unit of a pass.
///
/// Holds the plans of every synthesized routine, the decoders instantiated
/// for closed generic types, and the dispatch table filled once by
/// materialization. Created lazily on first need.
#[derive(Debug, Default)]
pub struct GeneratedModule {
    name: String,
    routines: Vec<SynthesizedRoutine>,
    instances: TypeIdMap<Decoder>,
    dispatch: DispatchTable,
}

impl GeneratedModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn routines(&self) -> &[SynthesizedRoutine] {
        &self.routines
    }

    /// The decoder instantiated or synthesized for the closed type `id`.
    #[inline]
    pub fn instance(&self, id: TypeId) -> Option<&Decoder> {
        self.instances.get(&id)
    }

    pub fn instances(&self) -> impl Iterator<Item = &Decoder> {
        self.instances.values()
    }

    #[inline]
    pub fn dispatch(&self) -> &DispatchTable {
        &self.dispatch
    }

    pub(crate) fn push_routine(&mut self, routine: SynthesizedRoutine) {
        self.routines.push(routine);
    }

    pub(crate) fn pop_routine(&mut self) -> Option<SynthesizedRoutine> {
        self.routines.pop()
    }

    pub(crate) fn insert_instance(&mut self, id: TypeId, decoder: Decoder) -> Option<Decoder> {
        self.instances.insert(id, decoder)
    }

    pub(crate) fn remove_instance(&mut self, id: TypeId) -> Option<Decoder> {
        self.instances.remove(&id)
    }

    pub(crate) fn dispatch_mut(&mut self) -> &mut DispatchTable {
        &mut self.dispatch
    }

    pub(crate) fn into_parts(self) -> (String, Vec<SynthesizedRoutine>, DispatchTable) {
        (self.name, self.routines, self.dispatch)
    }
}
