#![cfg_attr(docsrs, feature(doc_cfg))]

//! Build-time deserializer registry and generic dispatch generator.
//!
//! A [`GenerationPass`](pass::GenerationPass) catalogs the built-in read
//! routines of [`Reader`](reader::Reader), accepts user decoders, synthesizes
//! decoders for composite types from their members, and finally
//! materializes a typed dispatch table so values can be decoded by type:
//!
//! ```
//! use rg_codegen::derive::Typed;
//! use rg_codegen::pass::{GenerationPass, PassConfig};
//! use rg_codegen::reader::Reader;
//!
//! #[derive(Typed, Default, Debug, PartialEq)]
//! struct Move {
//!     dx: i16,
//!     dy: i16,
//!     sprint: bool,
//! }
//!
//! let mut pass = GenerationPass::new(PassConfig::default());
//! pass.load_catalog().unwrap();
//! pass.include::<Move>().unwrap();
//! let artifact = pass.seal().unwrap();
//!
//! let mut reader = Reader::new(&[0x04, 0x03, 0x01]);
//! let value: Move = artifact.decode(&mut reader).unwrap();
//! assert_eq!(value, Move { dx: 2, dy: -2, sprint: true });
//! ```

extern crate alloc;
extern crate self as rg_codegen;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod impls;

pub mod catalog;
pub mod dispatch;
pub mod info;
pub mod pass;
pub mod reader;
pub mod registry;
pub mod synth;

#[doc(hidden)]
pub mod __macro_exports;

// -----------------------------------------------------------------------------
// Exports

pub use error::{CodegenError, DecodeError, Origin, PassFailed, Unsupported};

pub mod derive {
    pub use rg_codegen_derive::Typed;
}

pub mod prelude {
    pub use crate::derive::Typed;
    pub use crate::info::{TypeInfo, Typed};
    pub use crate::pass::{Artifact, GenerationPass, PassConfig};
    pub use crate::reader::{AutoPackType, Reader};
    pub use crate::registry::Decoder;
}
