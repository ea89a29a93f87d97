//! Parsing of `#[codegen(...)]` attributes.

use proc_macro2::Span;
use syn::{Attribute, Ident, LitStr, Path, Token};

use crate::CODEGEN_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// Type attributes

/// How the decoder marks an absent value.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum ShapeAttr {
    #[default]
    Value,
    Reference,
    Collection,
}

/// Attributes written on the type itself.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    pub shape: ShapeAttr,
    pub shape_span: Option<Span>,
    pub non_serializable: bool,
    pub type_path: Option<LitStr>,
    pub auto_register: Option<Span>,
}

impl TypeAttributes {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(CODEGEN_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                let span = meta.path.require_ident()?.span();
                if meta.path.is_ident("reference") {
                    this.set_shape(ShapeAttr::Reference, span)
                } else if meta.path.is_ident("collection") {
                    this.set_shape(ShapeAttr::Collection, span)
                } else if meta.path.is_ident("non_serializable") {
                    this.non_serializable = true;
                    Ok(())
                } else if meta.path.is_ident("type_path") {
                    if this.type_path.is_some() {
                        return Err(meta.error("duplicate `type_path`"));
                    }
                    this.type_path = Some(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("auto_register") {
                    this.auto_register = Some(span);
                    Ok(())
                } else {
                    Err(meta.error(
                        "expected one of `reference`, `collection`, `non_serializable`, \
                         `type_path` or `auto_register`",
                    ))
                }
            })?;
        }
        Ok(this)
    }

    fn set_shape(&mut self, shape: ShapeAttr, span: Span) -> syn::Result<()> {
        if self.shape_span.is_some() {
            return Err(syn::Error::new(
                span,
                "`reference` and `collection` may appear only once and are exclusive",
            ));
        }
        self.shape = shape;
        self.shape_span = Some(span);
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Field attributes

/// Packing requested for one member.
#[derive(Clone, Copy)]
pub(crate) enum PackAttr {
    Packed,
    Unpacked,
    PackedLess,
}

impl PackAttr {
    fn parse(ident: &Ident) -> syn::Result<Self> {
        match ident.to_string().as_str() {
            "packed" => Ok(Self::Packed),
            "unpacked" => Ok(Self::Unpacked),
            "packed_less" => Ok(Self::PackedLess),
            _ => Err(syn::Error::new(
                ident.span(),
                "expected `packed`, `unpacked` or `packed_less`",
            )),
        }
    }

    pub(crate) fn variant(self) -> Ident {
        let name = match self {
            Self::Packed => "Packed",
            Self::Unpacked => "Unpacked",
            Self::PackedLess => "PackedLess",
        };
        Ident::new(name, Span::call_site())
    }
}

/// Attributes written on a field.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub skip: bool,
    pub setter: Option<Path>,
    pub pack: Option<PackAttr>,
}

impl FieldAttributes {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(CODEGEN_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    this.skip = true;
                } else if meta.path.is_ident("setter") {
                    let _: Token![=] = meta.input.parse()?;
                    this.setter = Some(meta.input.parse()?);
                } else if meta.path.is_ident("pack") {
                    let _: Token![=] = meta.input.parse()?;
                    let ident: Ident = meta.input.parse()?;
                    this.pack = Some(PackAttr::parse(&ident)?);
                } else {
                    return Err(meta.error("expected one of `skip`, `setter` or `pack`"));
                }
                Ok(())
            })?;
        }
        Ok(this)
    }
}
