//! Typed generic dispatch.
//!
//! Each concrete decoder is wrapped into a [`GenericRead<T>`] for the type it
//! produces and installed into the [`DispatchTable`] of the pass's
//! [`GeneratedModule`]. Callers then decode by type alone.

// -----------------------------------------------------------------------------
// Modules

mod generated_module;
mod generator;
mod generic_read;
mod table;

// -----------------------------------------------------------------------------
// Exports

pub use generated_module::GeneratedModule;
pub use generic_read::GenericRead;
pub use table::{DispatchEntry, DispatchTable};
