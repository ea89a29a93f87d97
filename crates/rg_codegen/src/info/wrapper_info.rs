use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, type_name};
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::HashMap;

use crate::DecodeError;
use crate::info::{ReturnType, TypeInfo, Typed};

type Convert = fn(Box<dyn Any>) -> Result<Box<dyn Any>, DecodeError>;
type Collect = fn(Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, DecodeError>;
type CollectPairs = fn(Vec<(Box<dyn Any>, Box<dyn Any>)>) -> Result<Box<dyn Any>, DecodeError>;

fn unbox<T: 'static>(value: Box<dyn Any>) -> Result<T, DecodeError> {
    value
        .downcast::<T>()
        .map(|value| *value)
        .map_err(|_| DecodeError::MismatchedValue {
            expected: type_name::<T>(),
        })
}

fn unwrap_some<T: 'static>(value: Box<dyn Any>) -> Result<Box<dyn Any>, DecodeError> {
    match unbox::<Option<T>>(value)? {
        Some(value) => Ok(Box::new(value)),
        None => Err(DecodeError::UnexpectedNull {
            type_path: type_name::<T>(),
        }),
    }
}

// -----------------------------------------------------------------------------
// ElementInfo

/// A `T` held by a wrapper, described by what its decoder produces.
///
/// A nullable composite decodes to `Option<T>`. Held directly, the option
/// is unwrapped and a null element is a [`DecodeError::UnexpectedNull`].
#[derive(Clone, Copy)]
pub struct ElementInfo {
    info: fn() -> TypeInfo,
    path: &'static str,
    decoded: ReturnType,
    nullable: bool,
    unwrap: Convert,
}

impl ElementInfo {
    pub fn of<T: Typed>() -> Self {
        let decoded = *T::type_info().decoded();
        let nullable = decoded.is::<Option<T>>();
        let unwrap: Convert = if nullable { unwrap_some::<T> } else { Ok };
        Self {
            info: T::type_info,
            path: type_name::<T>(),
            decoded,
            nullable,
            unwrap,
        }
    }

    #[inline]
    pub fn info(&self) -> TypeInfo {
        (self.info)()
    }

    /// Path of the held type.
    #[inline]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// What the element's decoder produces.
    #[inline]
    pub const fn decoded(&self) -> &ReturnType {
        &self.decoded
    }

    /// Whether the element's decoder produces `Option<T>`.
    #[inline]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Turns a decoded element into the held `T`.
    #[inline]
    pub fn unwrap(&self, value: Box<dyn Any>) -> Result<Box<dyn Any>, DecodeError> {
        (self.unwrap)(value)
    }
}

impl fmt::Debug for ElementInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementInfo")
            .field("path", &self.path)
            .field("nullable", &self.nullable)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ListInfo

/// `Vec<T>`.
#[derive(Clone, Copy)]
pub struct ListInfo {
    item: ElementInfo,
    collect: Collect,
}

impl ListInfo {
    pub fn of<T: Typed>() -> Self {
        Self {
            item: ElementInfo::of::<T>(),
            collect: |items| {
                let items = items
                    .into_iter()
                    .map(unbox::<T>)
                    .collect::<Result<Vec<T>, _>>()?;
                Ok(Box::new(items))
            },
        }
    }

    #[inline]
    pub const fn item(&self) -> &ElementInfo {
        &self.item
    }

    /// Builds the list from decoded items.
    pub fn collect(&self, items: Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, DecodeError> {
        let items = items
            .into_iter()
            .map(|item| self.item.unwrap(item))
            .collect::<Result<Vec<_>, _>>()?;
        (self.collect)(items)
    }
}

impl fmt::Debug for ListInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListInfo").field("item", &self.item).finish()
    }
}

// -----------------------------------------------------------------------------
// ArrayInfo

/// `[T; N]`.
#[derive(Clone, Copy)]
pub struct ArrayInfo {
    item: ElementInfo,
    len: usize,
    collect: Collect,
}

impl ArrayInfo {
    pub fn of<T: Typed, const N: usize>() -> Self {
        Self {
            item: ElementInfo::of::<T>(),
            len: N,
            collect: |items| {
                let found = items.len();
                let items = items
                    .into_iter()
                    .map(unbox::<T>)
                    .collect::<Result<Vec<T>, _>>()?;
                let array: [T; N] = items.try_into().map_err(|_| DecodeError::LengthMismatch {
                    type_path: type_name::<[T; N]>(),
                    expected: N,
                    found,
                })?;
                Ok(Box::new(array))
            },
        }
    }

    #[inline]
    pub const fn item(&self) -> &ElementInfo {
        &self.item
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Builds the array from exactly [`len`](Self::len) decoded items.
    pub fn collect(&self, items: Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, DecodeError> {
        let items = items
            .into_iter()
            .map(|item| self.item.unwrap(item))
            .collect::<Result<Vec<_>, _>>()?;
        (self.collect)(items)
    }
}

impl fmt::Debug for ArrayInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayInfo")
            .field("item", &self.item)
            .field("len", &self.len)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// MapInfo

/// `HashMap<K, V, S>`.
#[derive(Clone, Copy)]
pub struct MapInfo {
    key: ElementInfo,
    value: ElementInfo,
    collect: CollectPairs,
}

impl MapInfo {
    pub fn of<K, V, S>() -> Self
    where
        K: Typed + Eq + Hash,
        V: Typed,
        S: BuildHasher + Default + 'static,
    {
        Self {
            key: ElementInfo::of::<K>(),
            value: ElementInfo::of::<V>(),
            collect: |entries| {
                let mut map = HashMap::<K, V, S>::with_capacity_and_hasher(entries.len(), S::default());
                for (key, value) in entries {
                    map.insert(unbox::<K>(key)?, unbox::<V>(value)?);
                }
                Ok(Box::new(map))
            },
        }
    }

    #[inline]
    pub const fn key(&self) -> &ElementInfo {
        &self.key
    }

    #[inline]
    pub const fn value(&self) -> &ElementInfo {
        &self.value
    }

    /// Builds the map from decoded entries. A repeated key keeps the last value.
    pub fn collect(
        &self,
        entries: Vec<(Box<dyn Any>, Box<dyn Any>)>,
    ) -> Result<Box<dyn Any>, DecodeError> {
        let entries = entries
            .into_iter()
            .map(|(key, value)| Ok((self.key.unwrap(key)?, self.value.unwrap(value)?)))
            .collect::<Result<Vec<_>, DecodeError>>()?;
        (self.collect)(entries)
    }
}

impl fmt::Debug for MapInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapInfo")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// OptionalInfo

/// `Option<T>` where `T` does not already decode to an option.
#[derive(Clone, Copy)]
pub struct OptionalInfo {
    inner: ElementInfo,
    some: Convert,
    none: fn() -> Box<dyn Any>,
}

impl OptionalInfo {
    pub fn of<T: Typed>() -> Self {
        Self {
            inner: ElementInfo::of::<T>(),
            some: |value| Ok(Box::new(Some(unbox::<T>(value)?))),
            none: || Box::new(None::<T>),
        }
    }

    #[inline]
    pub const fn inner(&self) -> &ElementInfo {
        &self.inner
    }

    #[inline]
    pub fn some(&self, value: Box<dyn Any>) -> Result<Box<dyn Any>, DecodeError> {
        (self.some)(value)
    }

    #[inline]
    pub fn none(&self) -> Box<dyn Any> {
        (self.none)()
    }
}

impl fmt::Debug for OptionalInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionalInfo").field("inner", &self.inner).finish()
    }
}

// -----------------------------------------------------------------------------
// BoxedInfo

/// `Box<T>`.
///
/// Boxing a nullable composite keeps it nullable: `Box<T>` then decodes to
/// `Option<Box<T>>`, which is how a reference composite refers to itself.
#[derive(Clone, Copy)]
pub struct BoxedInfo {
    inner: ElementInfo,
    wrap: Convert,
}

impl BoxedInfo {
    pub fn of<T: Typed>() -> Self {
        let inner = ElementInfo::of::<T>();
        let wrap: Convert = if inner.is_nullable() {
            |value| Ok(Box::new(unbox::<Option<T>>(value)?.map(Box::new)))
        } else {
            |value| Ok(Box::new(Box::new(unbox::<T>(value)?)))
        };
        Self { inner, wrap }
    }

    #[inline]
    pub const fn inner(&self) -> &ElementInfo {
        &self.inner
    }

    /// Whether this decodes to `Option<Box<T>>`.
    #[inline]
    pub const fn is_nullable(&self) -> bool {
        self.inner.is_nullable()
    }

    #[inline]
    pub fn wrap(&self, value: Box<dyn Any>) -> Result<Box<dyn Any>, DecodeError> {
        (self.wrap)(value)
    }
}

impl fmt::Debug for BoxedInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedInfo").field("inner", &self.inner).finish()
    }
}
