use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use bitflags::bitflags;

use crate::info::{ArrayInfo, BoxedInfo, CompositeInfo, ListInfo, MapInfo, OptionalInfo};
use crate::info::{ReturnType, Type, TypeKey};

// -----------------------------------------------------------------------------
// TypeFlags

bitflags! {
    /// Marker attributes attached to a type.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u8 {
        /// Never synthesize a decoder for this type.
        const NON_SERIALIZABLE = 1;
    }
}

// -----------------------------------------------------------------------------
// TypeKind

/// How a type is decoded.
#[derive(Clone, Debug)]
pub enum TypeKind {
    /// Decoded only by a registered routine.
    Opaque,
    /// A user aggregate whose decoder can be synthesized from its members.
    Composite(CompositeInfo),
    /// `Vec<T>`.
    List(ListInfo),
    /// `[T; N]`.
    Array(ArrayInfo),
    /// `HashMap<K, V, S>`.
    Map(MapInfo),
    /// `Option<T>` over a non-nullable `T`.
    Optional(OptionalInfo),
    /// `Box<T>`.
    Boxed(BoxedInfo),
}

impl TypeKind {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Opaque => "Opaque",
            Self::Composite(_) => "Composite",
            Self::List(_) => "List",
            Self::Array(_) => "Array",
            Self::Map(_) => "Map",
            Self::Optional(_) => "Optional",
            Self::Boxed(_) => "Boxed",
        }
    }
}

// -----------------------------------------------------------------------------
// TypeInfo

/// Static information about a type, as far as decoding is concerned.
///
/// # Content
///
/// - [`Type`]: identity and display path of the described type.
/// - [`TypeKey`]: normalized registry key, derived from the path.
/// - decoded [`ReturnType`]: what a decoder of this type produces. This is
///   the type itself, except for nullable composites which decode to
///   `Option<T>`.
/// - generic arguments, lazily produced.
/// - [`TypeFlags`] and [`TypeKind`].
#[derive(Clone)]
pub struct TypeInfo {
    ty: Type,
    key: TypeKey,
    decoded: ReturnType,
    generics: Arc<[fn() -> TypeInfo]>,
    flags: TypeFlags,
    kind: TypeKind,
}

impl TypeInfo {
    /// Information for `T` decoding to itself.
    pub fn new<T: 'static>(kind: TypeKind) -> Self {
        let ty = Type::of::<T>();
        Self {
            key: TypeKey::new(ty.path()),
            ty,
            decoded: ReturnType::of::<T>(),
            generics: Arc::new([]),
            flags: TypeFlags::empty(),
            kind,
        }
    }

    /// Information for a type that only registered routines can decode.
    #[inline]
    pub fn opaque<T: 'static>() -> Self {
        Self::new::<T>(TypeKind::Opaque)
    }

    /// Information for a composite `T`.
    pub fn composite<T: 'static>(composite: CompositeInfo) -> Self {
        let decoded = *composite.decoded();
        let mut info = Self::new::<T>(TypeKind::Composite(composite));
        info.decoded = decoded;
        info
    }

    /// Overrides the display path, which also moves the registry key.
    pub fn with_path(mut self, path: &'static str) -> Self {
        self.ty = self.ty.with_path(path);
        self.key = TypeKey::new(path);
        self
    }

    /// Sets what a decoder of this type produces.
    pub fn decoding<D: 'static>(mut self) -> Self {
        self.decoded = ReturnType::of::<D>();
        self
    }

    /// Files the type under a shared registry key, keeping its path.
    pub(crate) fn with_key(mut self, key: TypeKey) -> Self {
        self.key = key;
        self
    }

    pub fn with_generics(mut self, generics: impl IntoIterator<Item = fn() -> TypeInfo>) -> Self {
        self.generics = generics.into_iter().collect::<Vec<_>>().into();
        self
    }

    pub fn with_flags(mut self, flags: TypeFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub const fn id(&self) -> TypeId {
        self.ty.id()
    }

    #[inline]
    pub const fn path(&self) -> &'static str {
        self.ty.path()
    }

    #[inline]
    pub const fn key(&self) -> &TypeKey {
        &self.key
    }

    #[inline]
    pub const fn decoded(&self) -> &ReturnType {
        &self.decoded
    }

    #[inline]
    pub const fn flags(&self) -> TypeFlags {
        self.flags
    }

    #[inline]
    pub const fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Produces the information of every generic argument, in order.
    pub fn generics(&self) -> impl ExactSizeIterator<Item = TypeInfo> + '_ {
        self.generics.iter().map(|info| info())
    }

    /// Whether this describes a closed instantiation of a generic definition.
    #[inline]
    pub fn is_generic_instance(&self) -> bool {
        !self.generics.is_empty()
    }

    #[inline]
    pub fn is_non_serializable(&self) -> bool {
        self.flags.contains(TypeFlags::NON_SERIALIZABLE)
    }

    /// Whether a decoded value may be absent without reading its contents.
    ///
    /// Self-references through such a type terminate on the wire.
    pub fn is_nullable(&self) -> bool {
        match &self.kind {
            TypeKind::Composite(composite) => composite.shape().is_nullable(),
            TypeKind::List(_) | TypeKind::Map(_) | TypeKind::Optional(_) => true,
            TypeKind::Boxed(boxed) => boxed.is_nullable(),
            TypeKind::Opaque | TypeKind::Array(_) => false,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeInfo> {
        match &self.kind {
            TypeKind::Composite(composite) => Some(composite),
            _ => None,
        }
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("ty", &self.ty)
            .field("key", &self.key)
            .field("decoded", &self.decoded)
            .field("generics", &self.generics.len())
            .field("flags", &self.flags)
            .field("kind", &self.kind.name())
            .finish()
    }
}
