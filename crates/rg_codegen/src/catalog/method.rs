use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use crate::DecodeError;
use crate::info::ReturnType;
use crate::reader::{AutoPackType, Reader};
use crate::registry::GenericRoutine;

/// An erased, non-capturing read routine.
pub type ReadThunk = fn(&mut Reader<'_>, AutoPackType) -> Result<Box<dyn Any>, DecodeError>;

// -----------------------------------------------------------------------------
// Param

/// A declared parameter of a read method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Param {
    /// The reader cursor, leading on static methods.
    Reader,
    /// A trailing [`AutoPackType`].
    AutoPack,
    /// Anything else. Methods taking one are never catalogued.
    Other(&'static str),
}

// -----------------------------------------------------------------------------
// MethodBody

#[derive(Clone, Copy)]
pub enum MethodBody {
    /// Decodes one concrete type.
    Concrete {
        returns: ReturnType,
        read: ReadThunk,
    },
    /// A generic definition, instantiated per closed type.
    Generic(GenericRoutine),
    /// Not callable as a decoder.
    Unbound,
}

// -----------------------------------------------------------------------------
// ReadMethod

/// A method exposed by one of the two catalog sources.
///
/// Instance methods live on [`Reader`]; static methods are free functions
/// taking the reader as their first parameter.
#[derive(Clone, Copy)]
pub struct ReadMethod {
    pub name: &'static str,
    pub params: &'static [Param],
    /// Declared return type path; generic definitions keep their parameters.
    pub returns: &'static str,
    pub is_static: bool,
    /// Excluded from code generation regardless of its signature.
    pub codegen_exclude: bool,
    pub body: MethodBody,
}

impl ReadMethod {
    /// A concrete method decoding `T`.
    pub fn concrete<T: 'static>(
        name: &'static str,
        params: &'static [Param],
        is_static: bool,
        read: ReadThunk,
    ) -> Self {
        Self {
            name,
            params,
            returns: core::any::type_name::<T>(),
            is_static,
            codegen_exclude: false,
            body: MethodBody::Concrete {
                returns: ReturnType::of::<T>(),
                read,
            },
        }
    }

    /// Marks the method as excluded from code generation.
    pub const fn exclude(mut self) -> Self {
        self.codegen_exclude = true;
        self
    }

    /// Whether the trailing parameter is a pack mode.
    #[inline]
    pub fn is_auto_packed(&self) -> bool {
        self.params.last() == Some(&Param::AutoPack)
    }
}

impl fmt::Debug for ReadMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadMethod")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .field("is_static", &self.is_static)
            .field("codegen_exclude", &self.codegen_exclude)
            .finish()
    }
}
