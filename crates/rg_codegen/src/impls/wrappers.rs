use alloc::boxed::Box;
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};
use std::collections::HashMap;

use crate::info::{ArrayInfo, BoxedInfo, ListInfo, MapInfo, OptionalInfo};
use crate::info::{TypeInfo, TypeKey, TypeKind, Typed};

/// Registry key shared by every `[T; N]`.
pub(crate) const ARRAY_KEY: &str = "[T; N]";

impl<T: Typed> Typed for Vec<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Self>(TypeKind::List(ListInfo::of::<T>()))
            .with_generics([T::type_info as fn() -> TypeInfo])
    }
}

impl<T: Typed, const N: usize> Typed for [T; N] {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Self>(TypeKind::Array(ArrayInfo::of::<T, N>()))
            .with_key(TypeKey::new(ARRAY_KEY))
            .with_generics([T::type_info as fn() -> TypeInfo])
    }
}

impl<K, V, S> Typed for HashMap<K, V, S>
where
    K: Typed + Eq + Hash,
    V: Typed,
    S: BuildHasher + Default + 'static,
{
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Self>(TypeKind::Map(MapInfo::of::<K, V, S>()))
            .with_generics([K::type_info as fn() -> TypeInfo, V::type_info])
    }
}

impl<T: Typed> Typed for Option<T> {
    fn type_info() -> TypeInfo {
        // Nullable composites already decode to `Option<T>`.
        let inner = T::type_info();
        if inner.decoded().is::<Self>() {
            return inner;
        }
        TypeInfo::new::<Self>(TypeKind::Optional(OptionalInfo::of::<T>()))
            .with_generics([T::type_info as fn() -> TypeInfo])
    }
}

impl<T: Typed> Typed for Box<T> {
    fn type_info() -> TypeInfo {
        let boxed = BoxedInfo::of::<T>();
        let info = TypeInfo::new::<Self>(TypeKind::Boxed(boxed))
            .with_generics([T::type_info as fn() -> TypeInfo]);
        if boxed.is_nullable() {
            info.decoding::<Option<Self>>()
        } else {
            info
        }
    }
}
