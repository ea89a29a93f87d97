use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::{Any, type_name};
use core::fmt;

use crate::DecodeError;
use crate::reader::{AutoPackType, Reader};
use crate::registry::ReadFn;

type Plain<T> = Arc<dyn Fn(&mut Reader<'_>) -> Result<T, DecodeError> + Send + Sync>;
type Packed<T> = Arc<dyn Fn(&mut Reader<'_>, AutoPackType) -> Result<T, DecodeError> + Send + Sync>;

enum Form<T> {
    Plain(Plain<T>),
    AutoPack(Packed<T>),
}

// -----------------------------------------------------------------------------
// GenericRead

/// The typed read routine for `T` installed by dispatch materialization.
///
/// A type with a variable-width encoding gets the auto-pack form, every
/// other type gets the plain form. Both forms can be driven through
/// [`read`](Self::read), which uses the type's default pack mode.
pub struct GenericRead<T> {
    form: Form<T>,
    default_pack: AutoPackType,
}

impl<T: 'static> GenericRead<T> {
    pub(crate) fn new(read: ReadFn, auto_packed: bool, default_pack: AutoPackType) -> Self {
        let typed = move |reader: &mut Reader<'_>, pack: AutoPackType| -> Result<T, DecodeError> {
            read(reader, pack)?
                .downcast::<T>()
                .map(|value| *value)
                .map_err(|_| DecodeError::MismatchedValue {
                    expected: type_name::<T>(),
                })
        };

        let form = if auto_packed {
            Form::AutoPack(Arc::new(typed))
        } else {
            Form::Plain(Arc::new(move |reader: &mut Reader<'_>| typed(reader, default_pack)))
        };
        Self { form, default_pack }
    }

    /// Type-erased constructor stored in [`ReturnType`](crate::info::ReturnType).
    pub(crate) fn erased(
        read: ReadFn,
        auto_packed: bool,
        default_pack: AutoPackType,
    ) -> Box<dyn Any + Send + Sync> {
        Box::new(Self::new(read, auto_packed, default_pack))
    }

    /// Reads a `T` using the default pack mode.
    pub fn read(&self, reader: &mut Reader<'_>) -> Result<T, DecodeError> {
        match &self.form {
            Form::Plain(read) => read(reader),
            Form::AutoPack(read) => read(reader, self.default_pack),
        }
    }

    /// Reads a `T` with an explicit pack mode, ignored by the plain form.
    pub fn read_packed(&self, reader: &mut Reader<'_>, pack: AutoPackType) -> Result<T, DecodeError> {
        match &self.form {
            Form::Plain(read) => read(reader),
            Form::AutoPack(read) => read(reader, pack),
        }
    }
}

impl<T> GenericRead<T> {
    #[inline]
    pub fn is_auto_packed(&self) -> bool {
        matches!(self.form, Form::AutoPack(_))
    }

    #[inline]
    pub fn default_pack(&self) -> AutoPackType {
        self.default_pack
    }
}

impl<T> Clone for GenericRead<T> {
    fn clone(&self) -> Self {
        let form = match &self.form {
            Form::Plain(read) => Form::Plain(read.clone()),
            Form::AutoPack(read) => Form::AutoPack(read.clone()),
        };
        Self {
            form,
            default_pack: self.default_pack,
        }
    }
}

impl<T> fmt::Debug for GenericRead<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericRead")
            .field("type", &type_name::<T>())
            .field("auto_packed", &self.is_auto_packed())
            .field("default_pack", &self.default_pack)
            .finish()
    }
}
