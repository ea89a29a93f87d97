//! Free-function read routines: the static source of the catalog.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, type_name};
use core::time::Duration;
use std::collections::HashMap;

use crate::catalog::{MethodBody, Param, ReadMethod};
use crate::impls::ARRAY_KEY;
use crate::info::{ElementInfo, TypeInfo, TypeKind};
use crate::reader::{AutoPackType, ReadError, Reader};
use crate::registry::{BoundRead, GenericRoutine, ReadFn};
use crate::{CodegenError, DecodeError, Unsupported};

/// Decodes a `Duration` as whole seconds followed by sub-second nanoseconds.
pub fn read_duration(reader: &mut Reader<'_>, pack: AutoPackType) -> Result<Duration, DecodeError> {
    let secs = reader.read_u64(pack)?;
    let nanos = reader.read_u32(pack)?;
    if nanos >= 1_000_000_000 {
        return Err(ReadError::OutOfRange {
            value: u64::from(nanos),
            target: "Duration::subsec_nanos",
        }
        .into());
    }
    Ok(Duration::new(secs, nanos))
}

/// The static method table.
pub fn methods() -> Vec<ReadMethod> {
    alloc::vec![
        generic("read_list", "alloc::vec::Vec<T>", instantiate_list),
        generic("read_option", "core::option::Option<T>", instantiate_option),
        generic("read_boxed", "alloc::boxed::Box<T>", instantiate_boxed),
        generic("read_array", ARRAY_KEY, instantiate_array),
        generic("read_map", type_name::<HashMap<(), ()>>(), instantiate_map),
        ReadMethod::concrete::<Duration>(
            "read_duration",
            &[Param::Reader, Param::AutoPack],
            true,
            |reader, pack| Ok(Box::new(read_duration(reader, pack)?) as Box<dyn Any>),
        ),
    ]
}

fn generic(
    name: &'static str,
    returns: &'static str,
    routine: GenericRoutine,
) -> ReadMethod {
    ReadMethod {
        name,
        params: &[Param::Reader],
        returns,
        is_static: true,
        codegen_exclude: false,
        body: MethodBody::Generic(routine),
    }
}

// -----------------------------------------------------------------------------
// Instantiation

fn unsupported(info: &TypeInfo, reason: Unsupported) -> CodegenError {
    CodegenError::UnsupportedType {
        type_path: info.path().into(),
        reason,
    }
}

/// Checks the arguments decode to the given elements, in order.
fn arguments<'a>(
    info: &TypeInfo,
    args: &'a [BoundRead],
    expected: &[&ElementInfo],
) -> Result<&'a [BoundRead], CodegenError> {
    if args.len() != expected.len() {
        return Err(unsupported(
            info,
            Unsupported::ArgumentCount {
                expected: expected.len(),
                found: args.len(),
            },
        ));
    }
    for (argument, element) in args.iter().zip(expected) {
        if argument.returns().id() != element.decoded().id() {
            return Err(unsupported(
                info,
                Unsupported::ArgumentMismatch {
                    expected: element.decoded().path(),
                    found: argument.returns().path(),
                },
            ));
        }
    }
    Ok(args)
}

fn kind_mismatch(info: &TypeInfo, expected: &'static str) -> CodegenError {
    unsupported(
        info,
        Unsupported::ArgumentMismatch {
            expected,
            found: info.kind().name(),
        },
    )
}

/// A packed length followed by that many items. The null sentinel reads as
/// an empty list.
fn instantiate_list(info: &TypeInfo, args: &[BoundRead]) -> Result<ReadFn, CodegenError> {
    let TypeKind::List(list) = *info.kind() else {
        return Err(kind_mismatch(info, "List"));
    };
    let item = arguments(info, args, &[list.item()])?[0].clone();

    Ok(Arc::new(
        move |reader: &mut Reader<'_>, _: AutoPackType| -> Result<Box<dyn Any>, DecodeError> {
            let Some(len) = reader.read_packed_length()? else {
                return list.collect(Vec::new());
            };
            let mut items = Vec::with_capacity(len.min(reader.remaining()));
            for _ in 0..len {
                items.push(item.call(reader)?);
            }
            list.collect(items)
        },
    ))
}

/// A packed length that must equal `N`, followed by the items.
fn instantiate_array(info: &TypeInfo, args: &[BoundRead]) -> Result<ReadFn, CodegenError> {
    let TypeKind::Array(array) = *info.kind() else {
        return Err(kind_mismatch(info, "Array"));
    };
    let item = arguments(info, args, &[array.item()])?[0].clone();
    let type_path = info.path();

    Ok(Arc::new(
        move |reader: &mut Reader<'_>, _: AutoPackType| -> Result<Box<dyn Any>, DecodeError> {
            let found = reader.read_packed_length()?.unwrap_or(0);
            if found != array.len() {
                return Err(DecodeError::LengthMismatch {
                    type_path,
                    expected: array.len(),
                    found,
                });
            }
            let mut items = Vec::with_capacity(found);
            for _ in 0..found {
                items.push(item.call(reader)?);
            }
            array.collect(items)
        },
    ))
}

/// A packed length followed by that many key and value pairs. The null
/// sentinel reads as an empty map.
fn instantiate_map(info: &TypeInfo, args: &[BoundRead]) -> Result<ReadFn, CodegenError> {
    let TypeKind::Map(map) = *info.kind() else {
        return Err(kind_mismatch(info, "Map"));
    };
    let args = arguments(info, args, &[map.key(), map.value()])?;
    let (key, value) = (args[0].clone(), args[1].clone());

    Ok(Arc::new(
        move |reader: &mut Reader<'_>, _: AutoPackType| -> Result<Box<dyn Any>, DecodeError> {
            let Some(len) = reader.read_packed_length()? else {
                return map.collect(Vec::new());
            };
            let mut entries = Vec::with_capacity(len.min(reader.remaining()));
            for _ in 0..len {
                entries.push((key.call(reader)?, value.call(reader)?));
            }
            map.collect(entries)
        },
    ))
}

/// A boolean flag, `true` meaning `None`, followed by the value.
fn instantiate_option(info: &TypeInfo, args: &[BoundRead]) -> Result<ReadFn, CodegenError> {
    let TypeKind::Optional(optional) = *info.kind() else {
        return Err(kind_mismatch(info, "Optional"));
    };
    let inner = arguments(info, args, &[optional.inner()])?[0].clone();

    Ok(Arc::new(
        move |reader: &mut Reader<'_>, _: AutoPackType| -> Result<Box<dyn Any>, DecodeError> {
            if reader.read_bool()? {
                return Ok(optional.none());
            }
            optional.some(inner.call(reader)?)
        },
    ))
}

fn instantiate_boxed(info: &TypeInfo, args: &[BoundRead]) -> Result<ReadFn, CodegenError> {
    let TypeKind::Boxed(boxed) = *info.kind() else {
        return Err(kind_mismatch(info, "Boxed"));
    };
    let inner = arguments(info, args, &[boxed.inner()])?[0].clone();

    Ok(Arc::new(
        move |reader: &mut Reader<'_>, _: AutoPackType| -> Result<Box<dyn Any>, DecodeError> {
            boxed.wrap(inner.call(reader)?)
        },
    ))
}
