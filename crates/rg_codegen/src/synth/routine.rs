use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::info::{MemberInfo, MemberKind, NullCheck, TypeInfo, TypeKey};
use crate::reader::AutoPackType;
use crate::registry::BoundRead;

/// A resolved member, ready to be read.
pub(crate) struct MemberStep {
    pub member: MemberInfo,
    pub decoder: String,
    pub read: BoundRead,
}

// -----------------------------------------------------------------------------
// SynthesizedRoutine

/// One member read of a synthesized routine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutineStep {
    pub member: &'static str,
    pub kind: MemberKind,
    /// Name of the decoder invoked for the member.
    pub decoder: String,
    /// Pack mode passed to the decoder, for auto-packed member types only.
    pub pack: Option<AutoPackType>,
}

/// The plan of a synthesized composite decoder.
///
/// Its [`Display`](fmt::Display) renders the routine as pseudo-code.
#[derive(Clone, Debug)]
pub struct SynthesizedRoutine {
    name: String,
    key: TypeKey,
    type_path: &'static str,
    decoded: &'static str,
    null_check: NullCheck,
    steps: Vec<RoutineStep>,
}

impl SynthesizedRoutine {
    pub(crate) fn new(name: String, info: &TypeInfo, null_check: NullCheck, steps: &[MemberStep]) -> Self {
        Self {
            name,
            key: info.key().clone(),
            type_path: info.path(),
            decoded: info.decoded().path(),
            null_check,
            steps: steps
                .iter()
                .map(|step| RoutineStep {
                    member: step.member.name(),
                    kind: step.member.kind(),
                    decoder: step.decoder.clone(),
                    pack: step.read.pack(),
                })
                .collect(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    #[inline]
    pub fn null_check(&self) -> NullCheck {
        self.null_check
    }

    #[inline]
    pub fn steps(&self) -> &[RoutineStep] {
        &self.steps
    }
}

impl fmt::Display for SynthesizedRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fn {}(reader) -> {} {{", self.name, self.decoded)?;
        match self.null_check {
            NullCheck::None => {}
            NullCheck::Bool => writeln!(f, "    if reader.read_bool()? {{ return None; }}")?,
            NullCheck::PackedWhole => {
                writeln!(f, "    if reader.read_packed_whole()? as i32 == -1 {{ return None; }}")?;
            }
        }
        writeln!(f, "    let mut value = {}::default();", self.type_path)?;
        for step in &self.steps {
            let call = match step.pack {
                Some(pack) => alloc::format!("{}(reader, {pack})?", step.decoder),
                None => alloc::format!("{}(reader)?", step.decoder),
            };
            match step.kind {
                MemberKind::Field => writeln!(f, "    value.{} = {call};", step.member)?,
                MemberKind::Property => writeln!(f, "    value.set_{}({call});", step.member)?,
            }
        }
        match self.null_check {
            NullCheck::None => writeln!(f, "    value")?,
            NullCheck::Bool | NullCheck::PackedWhole => writeln!(f, "    Some(value)")?,
        }
        f.write_str("}")
    }
}
