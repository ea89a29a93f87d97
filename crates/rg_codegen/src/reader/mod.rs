//! The byte-level reader collaborator.
//!
//! [`Reader`] decodes primitives from a buffer; its method table
//! ([`Reader::methods`]) is the instance source of the catalog.

// -----------------------------------------------------------------------------
// Modules

mod auto_pack;
mod cursor;
mod error;
mod methods;

// -----------------------------------------------------------------------------
// Exports

pub use auto_pack::AutoPackType;
pub use cursor::{NULL_SENTINEL, Reader, is_null_sentinel};
pub use error::ReadError;
