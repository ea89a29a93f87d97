use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::iter;
use std::sync::OnceLock;

use crate::info::{TypeInfo, TypeKey};
use crate::pass::{GenerationPass, PassState};
use crate::reader::{AutoPackType, Reader};
use crate::registry::{BoundRead, Decoder, DecoderBody, DecoderFlags, GenericRoutine, ReadFn};
use crate::{CodegenError, DecodeError, Origin, Unsupported};

/// Filled with the finished routine once a composite's synthesis succeeds.
pub(crate) type Slot = Arc<OnceLock<ReadFn>>;

/// A type whose decoder is being resolved.
pub(crate) struct Frame {
    id: TypeId,
    path: &'static str,
    nullable: bool,
    slot: Option<Slot>,
}

impl Frame {
    pub(crate) fn new(info: &TypeInfo, slot: Option<Slot>) -> Self {
        Self {
            id: info.id(),
            path: info.path(),
            nullable: info.is_nullable(),
            slot,
        }
    }
}

/// A registration made while resolving, undone if an enclosing synthesis fails.
pub(crate) enum Journal {
    Registered(TypeKey),
    Instance(TypeId),
    Routine,
}

/// A decoder that forwards to the routine stored in `slot`.
pub(crate) fn forwarding(info: &TypeInfo, slot: Slot) -> Decoder {
    let type_path = info.path();
    let read: ReadFn = Arc::new(
        move |reader: &mut Reader<'_>, pack: AutoPackType| -> Result<Box<dyn Any>, DecodeError> {
            match slot.get() {
                Some(read) => read(reader, pack),
                None => Err(DecodeError::Unresolved { type_path }),
            }
        },
    );
    Decoder::concrete(
        routine_name(info),
        *info.decoded(),
        read,
        DecoderFlags::SYNTHESIZED | DecoderFlags::PLACEHOLDER,
    )
    .with_key(info.key().clone())
}

pub(crate) fn routine_name(info: &TypeInfo) -> String {
    format!("read_{}", info.ty().name())
}

// -----------------------------------------------------------------------------
// Resolution

impl GenerationPass {
    /// Returns the decoder of `info`, synthesizing it when needed.
    ///
    /// Lookup order: types currently being synthesized, closed generic
    /// instances, the registry (favoring the given tier), then synthesis.
    /// A registered generic definition is instantiated with the decoders of
    /// the type's generic arguments.
    ///
    /// A failure is recorded as a fault of the pass and nothing about the
    /// failed type stays registered.
    ///
    /// # Examples
    ///
    /// ```
    /// use rg_codegen::derive::Typed;
    /// use rg_codegen::info::Typed as _;
    /// use rg_codegen::pass::{GenerationPass, PassConfig};
    /// use rg_codegen::reader::Reader;
    ///
    /// #[derive(Typed, Default, Debug, PartialEq)]
    /// struct Score {
    ///     points: u32,
    ///     tags: Vec<String>,
    /// }
    ///
    /// let mut pass = GenerationPass::new(PassConfig::default());
    /// pass.load_catalog().unwrap();
    /// let decoder = pass.get_or_synthesize(&Score::type_info(), true).unwrap();
    /// assert!(decoder.is_synthesized());
    ///
    /// let artifact = pass.seal().unwrap();
    /// let mut reader = Reader::new(&[0x07, 0x01, 0x02, b'g', b'g']);
    /// let score: Score = artifact.decode(&mut reader).unwrap();
    /// assert_eq!(score, Score { points: 7, tags: vec!["gg".into()] });
    /// ```
    pub fn get_or_synthesize(
        &mut self,
        info: &TypeInfo,
        favor_instanced: bool,
    ) -> Result<Decoder, CodegenError> {
        self.expect_building("get_or_synthesize")?;
        self.state = PassState::Synthesizing;
        self.auto_pack_frozen = true;
        let result = self.resolve(info, favor_instanced);
        self.state = PassState::Registering;
        self.journal.clear();
        result.map_err(|err| self.report(err))
    }

    pub(crate) fn resolve(
        &mut self,
        info: &TypeInfo,
        favor_instanced: bool,
    ) -> Result<Decoder, CodegenError> {
        if let Some(index) = self.resolving.iter().position(|frame| frame.id == info.id()) {
            return self.break_cycle(index, info);
        }

        if let Some(decoder) = self.module.as_ref().and_then(|module| module.instance(info.id())) {
            return Ok(decoder.clone());
        }

        if let Some(decoder) = self.registry.lookup_favored(info.key(), favor_instanced).cloned() {
            match decoder.body() {
                DecoderBody::Concrete { returns, .. } if returns.id() == info.decoded().id() => {
                    self.resolve_arguments(info, favor_instanced)?;
                    return Ok(decoder);
                }
                DecoderBody::Concrete { returns, .. } => {
                    log::warn!(
                        "`{}` shares the key of `{}` but decodes `{}`",
                        info.path(),
                        decoder.name(),
                        returns.path()
                    );
                }
                DecoderBody::Generic(routine) => {
                    return self.instantiate(info, &decoder, *routine, favor_instanced);
                }
            }
        }

        self.synthesize(info, favor_instanced)
    }

    /// Resolves every generic argument of `info`, each failure naming `info`
    /// as the owner.
    fn resolve_arguments(
        &mut self,
        info: &TypeInfo,
        favor_instanced: bool,
    ) -> Result<Vec<(Decoder, TypeInfo)>, CodegenError> {
        let mut arguments = Vec::with_capacity(info.generics().len());
        for argument in info.generics() {
            let decoder = self.resolve(&argument, favor_instanced).map_err(|err| {
                err.required_by(Origin::GenericArgument {
                    owner: info.path().into(),
                })
            })?;
            arguments.push((decoder, argument));
        }
        Ok(arguments)
    }

    /// Runs `f` with `frame` marked as in progress.
    pub(crate) fn with_frame<R>(
        &mut self,
        frame: Frame,
        f: impl FnOnce(&mut Self) -> Result<R, CodegenError>,
    ) -> Result<R, CodegenError> {
        self.resolving.push(frame);
        let result = f(self);
        self.resolving.pop();
        result
    }

    /// Resolves a type that is already on the resolution stack.
    ///
    /// The cycle is accepted when a nullable type sits between the two
    /// occurrences; the decoder then forwards to the outer synthesis.
    fn break_cycle(&self, index: usize, info: &TypeInfo) -> Result<Decoder, CodegenError> {
        let frames = &self.resolving[index..];
        let breakable = frames.iter().any(|frame| frame.nullable);
        match &frames[0].slot {
            Some(slot) if breakable => Ok(forwarding(info, slot.clone())),
            _ => Err(CodegenError::CyclicType {
                type_path: info.path().into(),
                cycle: frames
                    .iter()
                    .map(|frame| frame.path.into())
                    .chain(iter::once(info.path().into()))
                    .collect(),
            }),
        }
    }

    fn instantiate(
        &mut self,
        info: &TypeInfo,
        definition: &Decoder,
        routine: GenericRoutine,
        favor_instanced: bool,
    ) -> Result<Decoder, CodegenError> {
        let read = self.with_frame(Frame::new(info, None), |pass| {
            let arguments = pass
                .resolve_arguments(info, favor_instanced)?
                .iter()
                .map(|(decoder, argument)| pass.bind(decoder, argument, None))
                .collect::<Result<Vec<_>, _>>()?;
            routine(info, &arguments)
        })?;

        let arguments = info
            .generics()
            .map(|argument| argument.path())
            .collect::<Vec<_>>()
            .join(", ");
        let decoder = Decoder::concrete(
            format!("{}::<{arguments}>", definition.name()),
            *info.decoded(),
            read,
            definition.flags() & DecoderFlags::AUTO_PACKED,
        )
        .with_key(info.key().clone());

        self.module_mut().insert_instance(info.id(), decoder.clone());
        self.journal.push(Journal::Instance(info.id()));
        log::debug!("instantiated `{}` for `{}`", definition.name(), info.path());
        Ok(decoder)
    }

    fn synthesize(
        &mut self,
        info: &TypeInfo,
        favor_instanced: bool,
    ) -> Result<Decoder, CodegenError> {
        if info.is_non_serializable() {
            return Err(CodegenError::UnsupportedType {
                type_path: info.path().into(),
                reason: Unsupported::NonSerializable,
            });
        }
        if let Some(reason) = self.config.exclusions.check(info.ty()) {
            return Err(CodegenError::UnsupportedType {
                type_path: info.path().into(),
                reason,
            });
        }
        match info.as_composite() {
            Some(composite) => self.synthesize_composite(info, composite, favor_instanced),
            None => Err(CodegenError::MissingDecoder {
                type_path: info.path().into(),
                origin: Origin::Root,
            }),
        }
    }

    /// Pairs `decoder` with the pack mode its call sites pass.
    pub(crate) fn bind(
        &self,
        decoder: &Decoder,
        info: &TypeInfo,
        member_pack: Option<AutoPackType>,
    ) -> Result<BoundRead, CodegenError> {
        let pack = self.policy.pack_for(&self.auto_pack, info.key(), member_pack);
        decoder.bind(pack).ok_or_else(|| CodegenError::MissingDecoder {
            type_path: info.path().into(),
            origin: Origin::Root,
        })
    }

    /// Undoes every journaled registration after `mark`.
    pub(crate) fn rollback(&mut self, mark: usize) {
        let undone: Vec<Journal> = self.journal.drain(mark..).collect();
        for entry in undone.into_iter().rev() {
            match entry {
                Journal::Registered(key) => {
                    self.registry.remove(&key, true);
                }
                Journal::Instance(id) => {
                    if let Some(module) = self.module.as_mut() {
                        module.remove_instance(id);
                    }
                }
                Journal::Routine => {
                    if let Some(module) = self.module.as_mut() {
                        module.pop_routine();
                    }
                }
            }
        }
    }
}
