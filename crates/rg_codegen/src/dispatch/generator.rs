use alloc::borrow::{Cow, ToOwned};
use alloc::vec::Vec;

use crate::CodegenError;
use crate::dispatch::DispatchEntry;
use crate::pass::{GenerationPass, PassState};
use crate::registry::{Decoder, DecoderBody};

impl GenerationPass {
    /// Installs the typed [`GenericRead`](crate::dispatch::GenericRead) of one
    /// concrete decoder.
    ///
    /// Generic definitions are skipped and yield `Ok(false)`. A second
    /// decoder for an already delegated type is a
    /// [`DuplicateDispatch`](CodegenError::DuplicateDispatch); the first
    /// one stays installed.
    pub fn materialize(&mut self, decoder: &Decoder, is_static: bool) -> Result<bool, CodegenError> {
        self.expect_state("materialize", |state| {
            state.is_building() || state == PassState::DispatchMaterialized
        })?;
        self.materialize_entry(decoder, is_static)
            .map_err(|err| self.report(err))
    }

    fn materialize_entry(&mut self, decoder: &Decoder, is_static: bool) -> Result<bool, CodegenError> {
        let DecoderBody::Concrete { returns, read } = decoder.body() else {
            let tier = if is_static { "static" } else { "instanced" };
            log::debug!("{tier} generic definition `{}` has no dispatch entry", decoder.name());
            return Ok(false);
        };

        if self.module.as_ref().and_then(|module| module.dispatch().entry(returns.id())).is_some() {
            return Err(CodegenError::DuplicateDispatch {
                type_path: returns.path(),
            });
        }

        let key = decoder.key();
        let auto_packed = self.auto_pack.contains(key);
        let adapter = returns.make_adapter(read.clone(), auto_packed, self.policy.default_for(key));
        let entry = DispatchEntry::new(
            key.clone(),
            returns.path(),
            Cow::Owned(decoder.name().to_owned()),
            auto_packed,
            adapter,
        );
        self.module_mut().dispatch_mut().try_insert(returns.id(), entry);
        log::debug!("dispatch `{}` -> `{}`", returns.path(), decoder.name());
        Ok(true)
    }

    /// Whether `decoder` itself already owns the entry of its decoded type.
    fn is_materialized(&self, decoder: &Decoder) -> bool {
        let DecoderBody::Concrete { returns, .. } = decoder.body() else {
            return false;
        };
        self.module
            .as_ref()
            .and_then(|module| module.dispatch().entry(returns.id()))
            .is_some_and(|entry| entry.decoder() == decoder.name())
    }

    /// Materializes dispatch for every eligible decoder, once.
    ///
    /// Eligible are the static tier, closed generic instances, synthesized
    /// decoders, and the rest of the instanced tier when this pass is the
    /// base module. Returns how many entries were installed.
    pub fn materialize_dispatch(&mut self) -> Result<usize, CodegenError> {
        self.expect_building("materialize_dispatch")?;
        Ok(self.sweep_dispatch())
    }

    pub(crate) fn sweep_dispatch(&mut self) -> usize {
        let base_module = self.config.base_module;

        let mut statics: Vec<Decoder> = self.registry.iter(false).cloned().collect();
        let mut instanced: Vec<Decoder> = self
            .registry
            .iter(true)
            .filter(|decoder| base_module || decoder.is_synthesized())
            .cloned()
            .collect();
        let mut instances: Vec<Decoder> = self
            .module
            .as_ref()
            .map(|module| module.instances().cloned().collect())
            .unwrap_or_default();

        // Deterministic order, so the first of two duplicates is stable.
        statics.sort_by(|a, b| a.key().cmp(b.key()));
        instanced.sort_by(|a, b| a.key().cmp(b.key()));
        instances.sort_by(|a, b| a.name().cmp(b.name()));

        let mut installed = 0;
        let eligible = statics
            .iter()
            .map(|decoder| (decoder, true))
            .chain(instanced.iter().map(|decoder| (decoder, false)))
            .chain(instances.iter().map(|decoder| (decoder, false)));
        for (decoder, is_static) in eligible {
            if self.is_materialized(decoder) {
                continue;
            }
            match self.materialize_entry(decoder, is_static) {
                Ok(true) => installed += 1,
                Ok(false) => {}
                Err(err) => {
                    self.report(err);
                }
            }
        }

        self.state = PassState::DispatchMaterialized;
        log::debug!("materialized dispatch: {installed} entries");
        installed
    }
}
