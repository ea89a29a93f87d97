use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;

use bitflags::bitflags;

use crate::info::{ReturnType, TypeInfo, TypeKey};
use crate::reader::{AutoPackType, Reader};
use crate::{CodegenError, DecodeError};

/// A type-erased read routine. The pack mode is ignored by routines that are
/// not auto-packed.
pub type ReadFn =
    Arc<dyn Fn(&mut Reader<'_>, AutoPackType) -> Result<Box<dyn Any>, DecodeError> + Send + Sync>;

/// Instantiates a generic definition for a closed type, given bound reads
/// for each of its generic arguments.
pub type GenericRoutine = fn(&TypeInfo, &[BoundRead]) -> Result<ReadFn, CodegenError>;

// -----------------------------------------------------------------------------
// DecoderFlags

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DecoderFlags: u8 {
        /// Invoked on the reader rather than as a free function.
        const INSTANCED = 1;
        /// Takes a trailing pack mode.
        const AUTO_PACKED = 1 << 1;
        /// Produced by the composite synthesizer.
        const SYNTHESIZED = 1 << 2;
        /// Stands in for a decoder whose synthesis is still in progress.
        const PLACEHOLDER = 1 << 3;
    }
}

// -----------------------------------------------------------------------------
// DecoderBody

#[derive(Clone)]
pub enum DecoderBody {
    Concrete { returns: ReturnType, read: ReadFn },
    Generic(GenericRoutine),
}

// -----------------------------------------------------------------------------
// Decoder

/// A registered decode routine and what it produces.
///
/// # Examples
///
/// ```
/// use rg_codegen::reader::{AutoPackType, Reader};
/// use rg_codegen::registry::Decoder;
///
/// let decoder = Decoder::from_fn("read_pair", |reader| {
///     Ok((reader.read_u8()?, reader.read_u8()?))
/// });
///
/// let value = decoder.read(&mut Reader::new(&[1, 2]), AutoPackType::Packed).unwrap();
/// assert_eq!(value.downcast_ref::<(u8, u8)>(), Some(&(1, 2)));
/// ```
#[derive(Clone)]
pub struct Decoder {
    name: Cow<'static, str>,
    key: TypeKey,
    flags: DecoderFlags,
    body: DecoderBody,
}

impl Decoder {
    /// A concrete decoder keyed by the path of `returns`.
    pub fn concrete(
        name: impl Into<Cow<'static, str>>,
        returns: ReturnType,
        read: ReadFn,
        flags: DecoderFlags,
    ) -> Self {
        Self {
            name: name.into(),
            key: TypeKey::new(returns.path()),
            flags,
            body: DecoderBody::Concrete { returns, read },
        }
    }

    /// A generic definition registered under `key`.
    pub fn generic(
        name: impl Into<Cow<'static, str>>,
        key: TypeKey,
        routine: GenericRoutine,
        flags: DecoderFlags,
    ) -> Self {
        Self {
            name: name.into(),
            key,
            flags,
            body: DecoderBody::Generic(routine),
        }
    }

    /// Wraps a plain function decoding `T`.
    pub fn from_fn<T: 'static>(
        name: &'static str,
        read: fn(&mut Reader<'_>) -> Result<T, DecodeError>,
    ) -> Self {
        let read: ReadFn = Arc::new(
            move |reader: &mut Reader<'_>, _: AutoPackType| -> Result<Box<dyn Any>, DecodeError> {
                Ok(Box::new(read(reader)?))
            },
        );
        Self::concrete(name, ReturnType::of::<T>(), read, DecoderFlags::empty())
    }

    /// Wraps a function decoding `T` under a pack mode.
    pub fn from_packed_fn<T: 'static>(
        name: &'static str,
        read: fn(&mut Reader<'_>, AutoPackType) -> Result<T, DecodeError>,
    ) -> Self {
        let read: ReadFn = Arc::new(
            move |reader: &mut Reader<'_>, pack: AutoPackType| -> Result<Box<dyn Any>, DecodeError> {
                Ok(Box::new(read(reader, pack)?))
            },
        );
        Self::concrete(name, ReturnType::of::<T>(), read, DecoderFlags::AUTO_PACKED)
    }

    /// Moves the decoder to another key.
    pub fn with_key(mut self, key: TypeKey) -> Self {
        self.key = key;
        self
    }

    pub fn with_flags(mut self, flags: DecoderFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub const fn key(&self) -> &TypeKey {
        &self.key
    }

    #[inline]
    pub const fn flags(&self) -> DecoderFlags {
        self.flags
    }

    #[inline]
    pub const fn body(&self) -> &DecoderBody {
        &self.body
    }

    #[inline]
    pub const fn is_instanced(&self) -> bool {
        self.flags.contains(DecoderFlags::INSTANCED)
    }

    #[inline]
    pub const fn is_auto_packed(&self) -> bool {
        self.flags.contains(DecoderFlags::AUTO_PACKED)
    }

    #[inline]
    pub const fn is_synthesized(&self) -> bool {
        self.flags.contains(DecoderFlags::SYNTHESIZED)
    }

    #[inline]
    pub const fn is_placeholder(&self) -> bool {
        self.flags.contains(DecoderFlags::PLACEHOLDER)
    }

    #[inline]
    pub const fn is_generic(&self) -> bool {
        matches!(self.body, DecoderBody::Generic(_))
    }

    /// What a concrete decoder produces.
    pub fn returns(&self) -> Option<&ReturnType> {
        match &self.body {
            DecoderBody::Concrete { returns, .. } => Some(returns),
            DecoderBody::Generic(_) => None,
        }
    }

    pub fn read_fn(&self) -> Option<&ReadFn> {
        match &self.body {
            DecoderBody::Concrete { read, .. } => Some(read),
            DecoderBody::Generic(_) => None,
        }
    }

    /// Binds a concrete decoder to the pack mode it will be called with.
    pub fn bind(&self, pack: Option<AutoPackType>) -> Option<BoundRead> {
        match &self.body {
            DecoderBody::Concrete { returns, read } => Some(BoundRead {
                read: read.clone(),
                pack,
                returns: *returns,
            }),
            DecoderBody::Generic(_) => None,
        }
    }

    /// Runs a concrete decoder. Generic definitions cannot be run.
    pub fn read(
        &self,
        reader: &mut Reader<'_>,
        pack: AutoPackType,
    ) -> Result<Box<dyn Any>, DecodeError> {
        match &self.body {
            DecoderBody::Concrete { read, .. } => read(reader, pack),
            DecoderBody::Generic(_) => Err(DecodeError::NotMaterialized {
                type_path: "<generic definition>",
            }),
        }
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("flags", &self.flags)
            .field("returns", &self.returns())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// BoundRead

/// A concrete read routine paired with the pack mode it is invoked with.
///
/// `pack` is `None` when the decoded type has no variable-width encoding.
#[derive(Clone)]
pub struct BoundRead {
    read: ReadFn,
    pack: Option<AutoPackType>,
    returns: ReturnType,
}

impl BoundRead {
    #[inline]
    pub fn call(&self, reader: &mut Reader<'_>) -> Result<Box<dyn Any>, DecodeError> {
        (self.read)(reader, self.pack.unwrap_or_default())
    }

    #[inline]
    pub const fn pack(&self) -> Option<AutoPackType> {
        self.pack
    }

    #[inline]
    pub const fn returns(&self) -> &ReturnType {
        &self.returns
    }
}

impl fmt::Debug for BoundRead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundRead")
            .field("pack", &self.pack)
            .field("returns", &self.returns)
            .finish()
    }
}
