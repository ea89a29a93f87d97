//! Derive macro for `rg_codegen::info::Typed`.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static CODEGEN_ATTRIBUTE_NAME: &str = "codegen";

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod expand;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// Implements `Typed` for a struct, describing it as a composite whose
/// decoder can be synthesized member by member.
///
/// Named fields become members named after the field. Tuple fields are
/// named `"0"`, `"1"` and so on. Unit structs have no members.
///
/// The struct must implement `Default`, the synthesized decoder starts from
/// `Default::default()` and assigns every member in declaration order.
///
/// ## Type attributes
///
/// ```rust, ignore
/// #[derive(Typed, Default)]
/// #[codegen(reference)]          // decodes to `Option<Self>`, leading bool marks null
/// #[codegen(collection)]         // decodes to `Option<Self>`, leading length of -1 marks null
/// #[codegen(non_serializable)]   // never synthesized
/// #[codegen(type_path = "game::Move")]
/// #[codegen(auto_register)]      // picked up by `GenerationPass::synthesize_registered`
/// struct Move { /* ... */ }
/// ```
///
/// `reference` and `collection` are exclusive. `type_path` and
/// `auto_register` are rejected on generic types.
///
/// ## Field attributes
///
/// ```rust, ignore
/// #[derive(Typed, Default)]
/// struct Settings {
///     #[codegen(skip)]
///     cache: u64,
///     #[codegen(pack = unpacked)]      // or `packed`, `packed_less`
///     flags: u32,
///     #[codegen(setter = Settings::set_volume)]
///     volume: u8,
/// }
/// ```
///
/// A member with a `setter` is assigned through `fn(&mut Self, T)` and is
/// reported as a property rather than a field.
///
/// ## Generics
///
/// Every type parameter gets a `Typed` bound and the impl requires
/// `Self: Default`. Generic arguments are recorded so each instance
/// resolves its own argument decoders.
#[proc_macro_derive(Typed, attributes(codegen))]
pub fn derive_typed(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    match expand::derive_typed(&ast) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}
