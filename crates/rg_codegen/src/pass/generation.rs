use alloc::boxed::Box;
use alloc::vec::Vec;
use core::mem;

use crate::catalog::{AutoPackPolicy, AutoPackSet, Catalog};
use crate::dispatch::GeneratedModule;
use crate::info::{TypeInfo, TypeKey, Typed};
use crate::pass::{Artifact, PassConfig, PassState};
use crate::registry::{Decoder, DecoderRegistry};
use crate::synth::resolve::{Frame, Journal};
use crate::{CodegenError, PassFailed};

// -----------------------------------------------------------------------------
// GenerationPass

/// One build-time run: catalog, registrations, synthesis, dispatch.
///
/// Faults do not stop the pass. Each one is logged and recorded, and
/// [`seal`](Self::seal) refuses to produce an [`Artifact`] if any exist.
///
/// # Examples
///
/// ```
/// use rg_codegen::pass::{GenerationPass, PassConfig};
/// use rg_codegen::reader::Reader;
///
/// let mut pass = GenerationPass::new(PassConfig::default());
/// pass.load_catalog().unwrap();
/// pass.include::<Vec<i32>>().unwrap();
///
/// let artifact = pass.seal().unwrap();
/// let mut reader = Reader::new(&[0x02, 0x01, 0x02]);
/// assert_eq!(artifact.decode::<Vec<i32>>(&mut reader), Ok(vec![-1, 1]));
/// ```
pub struct GenerationPass {
    pub(crate) config: PassConfig,
    pub(crate) policy: AutoPackPolicy,
    pub(crate) state: PassState,
    pub(crate) registry: DecoderRegistry,
    pub(crate) auto_pack: AutoPackSet,
    /// Set by the first synthesis, after which `auto_pack` no longer grows.
    pub(crate) auto_pack_frozen: bool,
    pub(crate) module: Option<GeneratedModule>,
    pub(crate) resolving: Vec<Frame>,
    pub(crate) journal: Vec<Journal>,
    pub(crate) faults: Vec<CodegenError>,
}

impl GenerationPass {
    pub fn new(config: PassConfig) -> Self {
        Self {
            policy: config.policy(),
            config,
            state: PassState::Uninitialized,
            registry: DecoderRegistry::new(),
            auto_pack: AutoPackSet::new(),
            auto_pack_frozen: false,
            module: None,
            resolving: Vec::new(),
            journal: Vec::new(),
            faults: Vec::new(),
        }
    }

    /// Discards everything and starts over with the same config.
    pub fn reset(&mut self) {
        *self = Self::new(mem::take(&mut self.config));
    }

    #[inline]
    pub fn state(&self) -> PassState {
        self.state
    }

    #[inline]
    pub fn config(&self) -> &PassConfig {
        &self.config
    }

    /// Every fault recorded so far.
    #[inline]
    pub fn faults(&self) -> &[CodegenError] {
        &self.faults
    }

    #[inline]
    pub fn registry(&self) -> &DecoderRegistry {
        &self.registry
    }

    #[inline]
    pub fn auto_packed(&self) -> &AutoPackSet {
        &self.auto_pack
    }

    /// The generated module, if anything needed it yet.
    #[inline]
    pub fn module(&self) -> Option<&GeneratedModule> {
        self.module.as_ref()
    }

    pub(crate) fn module_mut(&mut self) -> &mut GeneratedModule {
        let name = &self.config.module_name;
        self.module.get_or_insert_with(|| GeneratedModule::new(name.clone()))
    }

    /// Logs and records a fault, handing it back.
    pub(crate) fn report(&mut self, err: CodegenError) -> CodegenError {
        log::error!("{err}");
        self.faults.push(err.clone());
        err
    }

    pub(crate) fn expect_state(
        &self,
        operation: &'static str,
        allowed: impl FnOnce(PassState) -> bool,
    ) -> Result<(), CodegenError> {
        if allowed(self.state) {
            Ok(())
        } else {
            Err(CodegenError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    #[inline]
    pub(crate) fn expect_building(&self, operation: &'static str) -> Result<(), CodegenError> {
        self.expect_state(operation, PassState::is_building)
    }

    // -------------------------------------------------------------------------
    // Catalog

    /// Registers the built-in decoders found by [`Catalog::discover`].
    pub fn load_catalog(&mut self) -> Result<usize, CodegenError> {
        self.load_catalog_from(Catalog::discover())
    }

    /// Registers the decoders of a custom catalog. Returns how many were added.
    pub fn load_catalog_from(&mut self, catalog: Catalog) -> Result<usize, CodegenError> {
        self.expect_state("load_catalog", |state| state == PassState::Uninitialized)?;

        let mut added = 0;
        for entry in catalog.entries {
            match self.registry.add(entry.decoder, entry.instanced, true) {
                Ok(_) => added += 1,
                Err(err) => {
                    self.report(err);
                }
            }
        }
        self.auto_pack.extend(catalog.auto_packed.iter().cloned());
        self.state = PassState::CatalogLoaded;
        log::debug!("catalog loaded: {added} decoder(s), {} auto-packed type(s)", self.auto_pack.len());
        Ok(added)
    }

    // -------------------------------------------------------------------------
    // Registration

    /// Adds a decoder to one tier.
    ///
    /// See [`DecoderRegistry::add`] for the duplicate rules. A duplicate is
    /// also recorded as a fault of the pass.
    ///
    /// An auto-packed decoder joins the [`AutoPackSet`] only while nothing
    /// has been synthesized yet. Later ones keep the flag on the decoder but
    /// their call sites pass no pack mode.
    pub fn register(
        &mut self,
        decoder: Decoder,
        instanced: bool,
        error_on_duplicate: bool,
    ) -> Result<Option<Decoder>, CodegenError> {
        self.expect_building("register")?;
        self.state = PassState::Registering;

        let key = decoder.key().clone();
        let auto_packed = decoder.is_auto_packed();
        let replaced = self
            .registry
            .add(decoder, instanced, error_on_duplicate)
            .map_err(|err| self.report(err))?;
        if auto_packed && self.auto_pack_frozen {
            log::warn!("`{key}` is auto-packed but was registered after synthesis began");
        } else if auto_packed {
            self.auto_pack.insert(key);
        }
        Ok(replaced)
    }

    pub fn unregister(&mut self, key: &TypeKey, instanced: bool) -> Result<Option<Decoder>, CodegenError> {
        self.expect_building("unregister")?;
        self.state = PassState::Registering;
        Ok(self.registry.remove(key, instanced))
    }

    #[inline]
    pub fn lookup(&self, key: &TypeKey, instanced: bool) -> Option<&Decoder> {
        self.registry.lookup(key, instanced)
    }

    #[inline]
    pub fn lookup_favored(&self, key: &TypeKey, favor_instanced: bool) -> Option<&Decoder> {
        self.registry.lookup_favored(key, favor_instanced)
    }

    /// Resolves the decoder of `T`, favoring the configured tier.
    pub fn include<T: Typed>(&mut self) -> Result<Decoder, CodegenError> {
        self.include_info(&T::type_info())
    }

    pub fn include_info(&mut self, info: &TypeInfo) -> Result<Decoder, CodegenError> {
        let favor_instanced = self.config.favor_instanced;
        self.get_or_synthesize(info, favor_instanced)
    }

    /// Resolves every type submitted with `#[codegen(auto_register)]`.
    ///
    /// Types are visited in path order. Returns how many resolved.
    #[cfg(feature = "auto_register")]
    pub fn synthesize_registered(&mut self) -> Result<usize, CodegenError> {
        use crate::__macro_exports::auto_register::AutoRegistration;

        self.expect_building("synthesize_registered")?;
        let mut infos: Vec<TypeInfo> = inventory::iter::<AutoRegistration>
            .into_iter()
            .map(|registration| (registration.type_info)())
            .collect();
        infos.sort_by(|a, b| a.path().cmp(b.path()));

        let resolved = infos
            .iter()
            .filter(|info| self.include_info(info).is_ok())
            .count();
        Ok(resolved)
    }

    // -------------------------------------------------------------------------
    // Sealing

    /// Finishes the pass.
    ///
    /// Dispatch is materialized first if that has not happened yet. Any
    /// recorded fault fails the pass as a whole.
    pub fn seal(&mut self) -> Result<Artifact, PassFailed> {
        if matches!(self.state, PassState::Uninitialized | PassState::Sealed) {
            let err = CodegenError::InvalidState {
                operation: "seal",
                state: self.state,
            };
            return Err(PassFailed {
                faults: Box::new([err]),
            });
        }
        if self.state.is_building() {
            self.sweep_dispatch();
        }
        self.state = PassState::Sealed;

        if !self.faults.is_empty() {
            return Err(PassFailed {
                faults: mem::take(&mut self.faults).into_boxed_slice(),
            });
        }

        let module = self
            .module
            .take()
            .unwrap_or_else(|| GeneratedModule::new(self.config.module_name.clone()));
        Ok(Artifact::new(
            module,
            mem::take(&mut self.registry),
            mem::take(&mut self.auto_pack),
        ))
    }
}
