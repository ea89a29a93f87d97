//! Discovery of the built-in decoders.
//!
//! Two method sources are scanned: the instance methods of
//! [`Reader`](crate::reader::Reader) and the static routines in
//! [`extensions`]. Methods passing the signature rules become
//! [`Decoder`](crate::registry::Decoder)s; those taking a pack mode also
//! mark their type in the [`AutoPackSet`].

// -----------------------------------------------------------------------------
// Modules

mod auto_pack;
mod discover;
mod method;

pub mod extensions;

// -----------------------------------------------------------------------------
// Exports

pub use auto_pack::{AutoPackPolicy, AutoPackSet};
pub use discover::{Catalog, CatalogEntry, READ_PREFIX};
pub use method::{MethodBody, Param, ReadMethod, ReadThunk};
