use proc_macro2::TokenStream;
use quote::quote;

/// Path of the `rg_codegen` crate as seen from the invoking crate.
#[inline(always)]
pub(crate) fn rg_codegen() -> syn::Path {
    rg_macro_utils::Manifest::shared(|m| m.get_crate_path("rg_codegen"))
}

#[inline(always)]
pub(crate) fn macro_exports(rg_codegen: &syn::Path) -> TokenStream {
    quote! { #rg_codegen::__macro_exports }
}
