//! [`Typed`](crate::info::Typed) implementations for foreign types.

mod primitives;
mod wrappers;

pub(crate) use wrappers::ARRAY_KEY;
