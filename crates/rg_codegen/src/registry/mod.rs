//! Registered decoders, split into instance and static tiers.

// -----------------------------------------------------------------------------
// Modules

mod decoder;
mod decoder_registry;

// -----------------------------------------------------------------------------
// Exports

pub use decoder::{BoundRead, Decoder, DecoderBody, DecoderFlags, GenericRoutine, ReadFn};
pub use decoder_registry::{DecoderRegistry, Tier};
