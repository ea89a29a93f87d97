use alloc::string::String;
use core::time::Duration;

use crate::info::{TypeInfo, Typed};

macro_rules! impl_opaque {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Typed for $ty {
                #[inline]
                fn type_info() -> TypeInfo {
                    TypeInfo::opaque::<Self>()
                }
            }
        )*
    };
}

impl_opaque!(
    (), bool, char, u8, i8, u16, i16, u32, i32, u64, i64, u128, i128, usize, isize, f32, f64,
    String, Duration,
);
