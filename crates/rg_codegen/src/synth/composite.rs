use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use std::sync::OnceLock;

use crate::info::{CompositeInfo, MemberInfo, NullCheck, TypeInfo};
use crate::pass::GenerationPass;
use crate::reader::{AutoPackType, Reader, is_null_sentinel};
use crate::registry::{BoundRead, Decoder, DecoderFlags, ReadFn};
use crate::synth::SynthesizedRoutine;
use crate::synth::resolve::{Frame, Journal, forwarding, routine_name};
use crate::synth::routine::MemberStep;
use crate::{CodegenError, DecodeError, Origin, Unsupported};

impl GenerationPass {
    /// Builds a decoder reading every member of `composite` in order.
    ///
    /// A forwarding placeholder is registered before members are resolved,
    /// so self-references through nullable members resolve to it.
    pub(crate) fn synthesize_composite(
        &mut self,
        info: &TypeInfo,
        composite: &CompositeInfo,
        favor_instanced: bool,
    ) -> Result<Decoder, CodegenError> {
        for argument in info.generics() {
            self.resolve(&argument, favor_instanced).map_err(|err| {
                err.required_by(Origin::GenericArgument {
                    owner: info.path().into(),
                })
            })?;
        }

        let mark = self.journal.len();
        let slot = Arc::new(OnceLock::new());
        self.store(info, forwarding(info, slot.clone()), true)?;

        let planned = self.with_frame(Frame::new(info, Some(slot.clone())), |pass| {
            pass.plan_members(info, composite, favor_instanced)
        });
        let steps = match planned {
            Ok(steps) => steps,
            Err(err) => {
                self.rollback(mark);
                return Err(err);
            }
        };

        let read = composite_routine(composite, &steps);
        // The slot is fresh, only this synthesis fills it.
        let _ = slot.set(read.clone());

        let name = routine_name(info);
        let decoder = Decoder::concrete(name.clone(), *info.decoded(), read, DecoderFlags::SYNTHESIZED)
            .with_key(info.key().clone());
        self.store(info, decoder.clone(), false)?;

        let routine = SynthesizedRoutine::new(name, info, composite.shape().null_check(), &steps);
        self.module_mut().push_routine(routine);
        self.journal.push(Journal::Routine);

        log::debug!("synthesized `{}` with {} member(s)", info.path(), steps.len());
        Ok(decoder)
    }

    fn plan_members(
        &mut self,
        info: &TypeInfo,
        composite: &CompositeInfo,
        favor_instanced: bool,
    ) -> Result<Vec<MemberStep>, CodegenError> {
        let mut steps = Vec::with_capacity(composite.members().len());
        for member in composite.members() {
            let member_info = member.type_info();
            if member_info.decoded().id() != member.ty_id() {
                return Err(CodegenError::UnsupportedType {
                    type_path: info.path().into(),
                    reason: Unsupported::MemberShape {
                        member: member.name(),
                        declared: member.type_path(),
                        decoded: member_info.decoded().path(),
                    },
                });
            }

            let decoder = self.resolve(&member_info, favor_instanced).map_err(|err| {
                err.required_by(Origin::Member {
                    owner: info.path().into(),
                    member: member.name(),
                })
            })?;
            let read = self.bind(&decoder, &member_info, member.pack())?;
            steps.push(MemberStep {
                member: member.clone(),
                decoder: decoder.name().into(),
                read,
            });
        }
        Ok(steps)
    }

    /// Registers a synthesized decoder: closed generic instances go to the
    /// module, everything else to the instanced tier.
    fn store(&mut self, info: &TypeInfo, decoder: Decoder, first: bool) -> Result<(), CodegenError> {
        if info.is_generic_instance() {
            self.module_mut().insert_instance(info.id(), decoder);
            if first {
                self.journal.push(Journal::Instance(info.id()));
            }
        } else {
            self.registry.add(decoder, true, first)?;
            if first {
                self.journal.push(Journal::Registered(info.key().clone()));
            }
        }
        Ok(())
    }
}

/// The erased routine: null discriminator, allocation, then one read and
/// one assignment per member.
fn composite_routine(composite: &CompositeInfo, steps: &[MemberStep]) -> ReadFn {
    let composite = composite.clone();
    let null_check = composite.shape().null_check();
    let steps: Arc<[(MemberInfo, BoundRead)]> = steps
        .iter()
        .map(|step| (step.member.clone(), step.read.clone()))
        .collect();

    Arc::new(
        move |reader: &mut Reader<'_>, _: AutoPackType| -> Result<Box<dyn Any>, DecodeError> {
            let is_null = match null_check {
                NullCheck::None => false,
                NullCheck::Bool => reader.read_bool()?,
                NullCheck::PackedWhole => is_null_sentinel(reader.read_packed_whole()?),
            };
            if is_null {
                return Ok(composite.null());
            }

            let mut value = composite.allocate();
            for (member, read) in steps.iter() {
                member.set(&mut *value, read.call(reader)?)?;
            }
            composite.finish(value)
        },
    )
}
