use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

use crate::dispatch::GenericRead;
use crate::info::Type;
use crate::reader::AutoPackType;
use crate::registry::ReadFn;

/// Builds a type-erased [`GenericRead<T>`] around an erased read routine.
pub type AdapterFn = fn(ReadFn, bool, AutoPackType) -> Box<dyn Any + Send + Sync>;

// -----------------------------------------------------------------------------
// ReturnType

/// The value type a decoder produces.
///
/// Besides the [`Type`] itself it carries a monomorphized adapter factory,
/// which is how a type-erased routine becomes a typed
/// [`GenericRead<T>`] at dispatch time.
#[derive(Clone, Copy)]
pub struct ReturnType {
    ty: Type,
    adapter: AdapterFn,
}

impl ReturnType {
    #[inline]
    pub fn of<T: 'static>() -> Self {
        Self {
            ty: Type::of::<T>(),
            adapter: GenericRead::<T>::erased,
        }
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
    pub fn is<T: 'static>(&self) -> bool {
        self.ty.is::<T>()
    }

    /// Wraps `read` into a boxed `GenericRead<T>` for this type.
    pub(crate) fn make_adapter(
        &self,
        read: ReadFn,
        auto_packed: bool,
        default_pack: AutoPackType,
    ) -> Box<dyn Any + Send + Sync> {
        (self.adapter)(read, auto_packed, default_pack)
    }
}

impl PartialEq for ReturnType {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty
    }
}

impl Eq for ReturnType {}

impl fmt::Debug for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReturnType").field(&self.ty).finish()
    }
}
