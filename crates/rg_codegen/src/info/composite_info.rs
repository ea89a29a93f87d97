use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId, type_name};
use core::fmt;

use crate::DecodeError;
use crate::info::{ReturnType, TypeInfo, Typed};
use crate::reader::AutoPackType;

type Setter = dyn Fn(&mut dyn Any, Box<dyn Any>) -> Result<(), DecodeError> + Send + Sync;

// -----------------------------------------------------------------------------
// Shape

/// How a composite is laid out on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Members only. Decodes to `T`.
    Value,
    /// A leading boolean, `true` meaning null. Decodes to `Option<T>`.
    Reference,
    /// A leading packed length, `-1` meaning null. Decodes to `Option<T>`.
    Collection,
}

impl Shape {
    #[inline]
    pub const fn is_nullable(self) -> bool {
        !matches!(self, Self::Value)
    }

    #[inline]
    pub const fn null_check(self) -> NullCheck {
        match self {
            Self::Value => NullCheck::None,
            Self::Reference => NullCheck::Bool,
            Self::Collection => NullCheck::PackedWhole,
        }
    }
}

/// The discriminator read before any member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NullCheck {
    None,
    /// `read_bool`, `true` short-circuits to null.
    Bool,
    /// `read_packed_whole`, `-1` as `i32` short-circuits to null.
    PackedWhole,
}

// -----------------------------------------------------------------------------
// MemberKind

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Assigned directly.
    Field,
    /// Assigned through a setter routine.
    Property,
}

// -----------------------------------------------------------------------------
// MemberInfo

/// A settable member of a composite.
#[derive(Clone)]
pub struct MemberInfo {
    name: &'static str,
    kind: MemberKind,
    ty_id: TypeId,
    ty_path: &'static str,
    type_info: fn() -> TypeInfo,
    pack: Option<AutoPackType>,
    setter: Arc<Setter>,
}

impl MemberInfo {
    /// A field of `O` holding a `F`.
    pub fn field<O: 'static, F: Typed>(name: &'static str, set: fn(&mut O, F)) -> Self {
        Self::new::<O, F>(name, MemberKind::Field, set)
    }

    /// A property of `O` whose setter takes a `F`.
    pub fn property<O: 'static, F: Typed>(name: &'static str, set: fn(&mut O, F)) -> Self {
        Self::new::<O, F>(name, MemberKind::Property, set)
    }

    fn new<O: 'static, F: Typed>(name: &'static str, kind: MemberKind, set: fn(&mut O, F)) -> Self {
        let setter = move |owner: &mut dyn Any, value: Box<dyn Any>| {
            let owner = owner
                .downcast_mut::<O>()
                .ok_or(DecodeError::MismatchedValue {
                    expected: type_name::<O>(),
                })?;
            let value = value
                .downcast::<F>()
                .map_err(|_| DecodeError::MismatchedMember {
                    member: name,
                    expected: type_name::<F>(),
                })?;
            set(owner, *value);
            Ok(())
        };

        Self {
            name,
            kind,
            ty_id: TypeId::of::<F>(),
            ty_path: type_name::<F>(),
            type_info: F::type_info,
            pack: None,
            setter: Arc::new(setter),
        }
    }

    /// Overrides the default pack mode used for this member.
    #[inline]
    pub fn with_pack(mut self, pack: AutoPackType) -> Self {
        self.pack = Some(pack);
        self
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn kind(&self) -> MemberKind {
        self.kind
    }

    /// The declared type of the member.
    #[inline]
    pub const fn ty_id(&self) -> TypeId {
        self.ty_id
    }

    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.ty_path
    }

    #[inline]
    pub fn type_info(&self) -> TypeInfo {
        (self.type_info)()
    }

    #[inline]
    pub const fn pack(&self) -> Option<AutoPackType> {
        self.pack
    }

    /// Stores a decoded value into `owner`.
    #[inline]
    pub fn set(&self, owner: &mut dyn Any, value: Box<dyn Any>) -> Result<(), DecodeError> {
        (self.setter)(owner, value)
    }
}

impl fmt::Debug for MemberInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("ty", &self.ty_path)
            .field("pack", &self.pack)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// CompositeInfo

/// The members of a composite, plus the hooks that build a value from them.
///
/// Members are decoded in declaration order into a default-constructed value.
#[derive(Clone)]
pub struct CompositeInfo {
    shape: Shape,
    members: Arc<[MemberInfo]>,
    decoded: ReturnType,
    allocate: fn() -> Box<dyn Any>,
    finish: fn(Box<dyn Any>) -> Result<Box<dyn Any>, DecodeError>,
    null: fn() -> Box<dyn Any>,
}

impl CompositeInfo {
    /// A value composite, decoding to `T`.
    pub fn value<T: Default + 'static>(members: impl IntoIterator<Item = MemberInfo>) -> Self {
        Self {
            shape: Shape::Value,
            members: members.into_iter().collect::<Vec<_>>().into(),
            decoded: ReturnType::of::<T>(),
            allocate: allocate::<T>,
            finish: |value| Ok(value),
            null: allocate::<T>,
        }
    }

    /// A reference composite, decoding to `Option<T>` behind a boolean flag.
    pub fn reference<T: Default + 'static>(members: impl IntoIterator<Item = MemberInfo>) -> Self {
        Self::nullable::<T>(Shape::Reference, members)
    }

    /// A collection-like composite, decoding to `Option<T>` behind a packed length.
    pub fn collection<T: Default + 'static>(members: impl IntoIterator<Item = MemberInfo>) -> Self {
        Self::nullable::<T>(Shape::Collection, members)
    }

    fn nullable<T: Default + 'static>(
        shape: Shape,
        members: impl IntoIterator<Item = MemberInfo>,
    ) -> Self {
        Self {
            shape,
            members: members.into_iter().collect::<Vec<_>>().into(),
            decoded: ReturnType::of::<Option<T>>(),
            allocate: allocate::<T>,
            finish: |value| {
                let value = value.downcast::<T>().map_err(|_| DecodeError::MismatchedValue {
                    expected: type_name::<T>(),
                })?;
                Ok(Box::new(Some(*value)))
            },
            null: || Box::new(None::<T>),
        }
    }

    #[inline]
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    #[inline]
    pub fn members(&self) -> &[MemberInfo] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&MemberInfo> {
        self.members.iter().find(|member| member.name == name)
    }

    #[inline]
    pub const fn decoded(&self) -> &ReturnType {
        &self.decoded
    }

    /// A fresh default value.
    #[inline]
    pub fn allocate(&self) -> Box<dyn Any> {
        (self.allocate)()
    }

    /// Converts a fully populated value into the decoded form.
    #[inline]
    pub fn finish(&self, value: Box<dyn Any>) -> Result<Box<dyn Any>, DecodeError> {
        (self.finish)(value)
    }

    /// The decoded form of an absent value.
    #[inline]
    pub fn null(&self) -> Box<dyn Any> {
        (self.null)()
    }
}

fn allocate<T: Default + 'static>() -> Box<dyn Any> {
    Box::new(T::default())
}

impl fmt::Debug for CompositeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeInfo")
            .field("shape", &self.shape)
            .field("members", &self.members)
            .field("decoded", &self.decoded)
            .finish()
    }
}
