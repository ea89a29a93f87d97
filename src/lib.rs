#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use rg_codegen as codegen;
pub use rg_utils as utils;

pub mod prelude {
    pub use rg_codegen::prelude::*;
}
