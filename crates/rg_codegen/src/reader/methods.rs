use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;

use crate::catalog::{MethodBody, Param, ReadMethod};
use crate::reader::Reader;

macro_rules! instance_method {
    ($name:ident() -> $ty:ty) => {
        ReadMethod::concrete::<$ty>(stringify!($name), &[], false, |reader, _| {
            Ok(Box::new(Reader::$name(reader)?) as Box<dyn Any>)
        })
    };
    ($name:ident(pack) -> $ty:ty) => {
        ReadMethod::concrete::<$ty>(stringify!($name), &[Param::AutoPack], false, |reader, pack| {
            Ok(Box::new(Reader::$name(reader, pack)?) as Box<dyn Any>)
        })
    };
}

impl Reader<'_> {
    /// The public method table of [`Reader`], as seen by the catalog.
    pub fn methods() -> Vec<ReadMethod> {
        fn unbound(name: &'static str, params: &'static [Param], returns: &'static str) -> ReadMethod {
            ReadMethod {
                name,
                params,
                returns,
                is_static: false,
                codegen_exclude: false,
                body: MethodBody::Unbound,
            }
        }

        alloc::vec![
            instance_method!(read_bool() -> bool),
            instance_method!(read_u8() -> u8),
            instance_method!(read_i8() -> i8),
            instance_method!(read_u16(pack) -> u16),
            instance_method!(read_i16(pack) -> i16),
            instance_method!(read_u32(pack) -> u32),
            instance_method!(read_i32(pack) -> i32),
            instance_method!(read_u64(pack) -> u64),
            instance_method!(read_i64(pack) -> i64),
            instance_method!(read_f32() -> f32),
            instance_method!(read_f64() -> f64),
            instance_method!(read_char() -> char),
            instance_method!(read_string() -> alloc::string::String),
            // Also consumed directly by synthesized routines.
            instance_method!(read_packed_whole() -> u64).exclude(),
            unbound("read_packed_length", &[], "core::option::Option<usize>"),
            unbound("read_into", &[Param::Other("&mut [u8]")], "()"),
            unbound("position", &[], "usize"),
            unbound("remaining", &[], "usize"),
            unbound("is_empty", &[], "bool"),
        ]
    }
}
