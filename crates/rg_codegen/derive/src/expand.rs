use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{Data, DeriveInput, Fields, GenericParam, Index, parse_quote};

use crate::attributes::{FieldAttributes, ShapeAttr, TypeAttributes};

pub(crate) fn derive_typed(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let fields = match &ast.data {
        Data::Struct(data) => &data.fields,
        Data::Enum(data) => {
            return Err(syn::Error::new(
                data.enum_token.span,
                "`Typed` can only be derived for structs",
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span,
                "`Typed` can only be derived for structs",
            ));
        }
    };

    if let Some(param) = ast.generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(
            param,
            "`Typed` types must be 'static and cannot have lifetime parameters",
        ));
    }

    let attrs = TypeAttributes::parse(&ast.attrs)?;
    let is_generic = ast.generics.params.iter().any(|p| matches!(p, GenericParam::Type(_)));

    if is_generic && let Some(path) = &attrs.type_path {
        return Err(syn::Error::new_spanned(
            path,
            "`type_path` is not supported on generic types",
        ));
    }
    if is_generic && let Some(span) = attrs.auto_register {
        return Err(syn::Error::new(
            span,
            "`auto_register` needs a concrete type, register instances with `include`",
        ));
    }

    let rg_codegen = crate::path::rg_codegen();
    let exports = crate::path::macro_exports(&rg_codegen);

    let members = members(fields, &exports)?;

    let shape = match attrs.shape {
        ShapeAttr::Value => quote!(value),
        ShapeAttr::Reference => quote!(reference),
        ShapeAttr::Collection => quote!(collection),
    };

    let with_path = attrs.type_path.as_ref().map(|path| {
        quote! { .with_path(#path) }
    });
    let with_flags = attrs.non_serializable.then(|| {
        quote! { .with_flags(#exports::TypeFlags::NON_SERIALIZABLE) }
    });
    let with_generics = is_generic.then(|| {
        let params = ast.generics.type_params().map(|p| &p.ident);
        quote! {
            .with_generics([
                #(<#params as #exports::Typed>::type_info as fn() -> #exports::TypeInfo,)*
            ])
        }
    });

    let ident = &ast.ident;
    let (_, self_generics, _) = ast.generics.split_for_impl();
    let self_ty: syn::Type = parse_quote!(#ident #self_generics);
    let mut generics = ast.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(#exports::Typed));
    }
    if is_generic {
        generics
            .make_where_clause()
            .predicates
            .push(parse_quote!(#self_ty: ::core::default::Default));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let auto_register = auto_register(&attrs, ident, &exports);

    Ok(quote! {
        impl #impl_generics #exports::Typed for #ident #ty_generics #where_clause {
            fn type_info() -> #exports::TypeInfo {
                #exports::TypeInfo::composite::<Self>(
                    #exports::CompositeInfo::#shape::<Self>([#(#members,)*])
                )
                #with_path
                #with_flags
                #with_generics
            }
        }

        #auto_register
    })
}

fn members(fields: &Fields, exports: &TokenStream) -> syn::Result<Vec<TokenStream>> {
    let mut members = Vec::with_capacity(fields.len());
    for (index, field) in fields.iter().enumerate() {
        let attrs = FieldAttributes::parse(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        let (name, access) = match &field.ident {
            Some(ident) => (ident.to_string(), ident.to_token_stream()),
            None => (index.to_string(), Index::from(index).to_token_stream()),
        };
        let ty = &field.ty;

        let member = match &attrs.setter {
            Some(setter) => quote! {
                #exports::MemberInfo::property::<Self, #ty>(#name, #setter)
            },
            None => quote! {
                #exports::MemberInfo::field::<Self, #ty>(
                    #name,
                    |this: &mut Self, value: #ty| this.#access = value,
                )
            },
        };
        let with_pack = attrs.pack.map(|pack| {
            let variant = pack.variant();
            quote! { .with_pack(#exports::AutoPackType::#variant) }
        });

        members.push(quote! { #member #with_pack });
    }
    Ok(members)
}

#[cfg(feature = "auto_register")]
fn auto_register(attrs: &TypeAttributes, ident: &syn::Ident, exports: &TokenStream) -> TokenStream {
    let Some(span) = attrs.auto_register else {
        return TokenStream::new();
    };
    quote::quote_spanned! { span =>
        #exports::auto_register::inventory::submit! {
            #exports::auto_register::AutoRegistration::of::<#ident>()
        }
    }
}

#[cfg(not(feature = "auto_register"))]
fn auto_register(_: &TypeAttributes, _: &syn::Ident, _: &TokenStream) -> TokenStream {
    TokenStream::new()
}
