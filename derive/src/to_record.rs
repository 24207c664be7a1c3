use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, Field, Fields, Ident, LitInt, Result, Token, parenthesized,
    parse::{Parse, ParseStream},
    ext::IdentExt,
    spanned::Spanned,
};

pub(crate) fn expand_to_record(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new(
            input.span(),
            "`ToRecord` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new(
            input.span(),
            "`ToRecord` may only be derived on structs with named fields.",
        ))?
    };

    let Some(attr) = input.attrs.iter().find(|a| a.path().is_ident("record")) else {
        Err(Error::new(
            input.span(),
            "`ToRecord` requires a `record(N)` attribute giving the global message number.",
        ))?
    };

    let RecordAttribute { number: message } = attr.meta.require_list()?.parse_args()?;

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    let mut numbers: Vec<&LitInt> = Vec::new();
    for field in &fields {
        let number = &field.number;

        if numbers
            .iter()
            .any(|n| n.base10_digits() == number.base10_digits())
        {
            Err(Error::new_spanned(number, "Field numbers must be unique."))?
        }

        numbers.push(number);
    }

    let definitions = fields.iter().map(|field| {
        let FieldMetadata {
            number, base_type, ..
        } = field;

        let size = field.size();

        quote! {
            ::cassette::sans::definition::FieldDefinition::new(
                #number,
                #size,
                ::cassette::sans::definition::BaseType::#base_type,
            )
        }
    });

    let values = fields.iter().map(|field| {
        let FieldMetadata {
            name, base_type, ..
        } = field;

        let size = field.size();

        quote! {
            values.push(::cassette::avec::IntoValue::to_value(
                &self.#name,
                ::cassette::sans::definition::BaseType::#base_type,
                #size,
            ));
        }
    });

    let count = fields.len();

    let name = &input.ident;
    let (impl_generics, type_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::cassette::avec::ToRecord for #name #type_generics #where_clause {
            const MESSAGE: u16 = #message;

            const FIELDS: &'static [::cassette::sans::definition::FieldDefinition] = &[
                #(#definitions),*
            ];

            fn values(&self) -> ::cassette::__private::Vec<::cassette::sans::data::Value<'_>> {
                let mut values = ::cassette::__private::Vec::with_capacity(#count);
                #(#values)*
                values
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    number: LitInt,
    base_type: Ident,
    size: Option<LitInt>,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let name = field.ident.clone().unwrap();

        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("field")) else {
            return Ok(None);
        };

        let FieldAttribute {
            number,
            base_type,
            size,
        } = attr.meta.require_list()?.parse_args()?;

        Ok(Some(Self {
            name,
            number,
            base_type,
            size,
        }))
    }

    /// The field size: explicit if given, else one element of the base type.
    fn size(&self) -> TokenStream2 {
        if let Some(size) = &self.size {
            quote! { #size }
        } else {
            let base_type = &self.base_type;
            quote! { ::cassette::sans::definition::BaseType::#base_type.size() }
        }
    }
}

#[derive(Debug)]
struct RecordAttribute {
    number: LitInt,
}

impl Parse for RecordAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let number = input.parse::<LitInt>()?;
        Ok(Self { number })
    }
}

#[derive(Debug)]
struct FieldAttribute {
    number: LitInt,
    base_type: Ident,
    size: Option<LitInt>,
}

impl Parse for FieldAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let number = input.parse::<LitInt>()?;
        input.parse::<Token![,]>()?;

        // `enum` is a keyword, so accept any identifier here.
        let kind = Ident::parse_any(input)?;

        let Some((base_type, needs_size)) = base_type(&kind.to_string()) else {
            Err(Error::new_spanned(
                &kind,
                "Field type must be the name of a FIT base type, such as `uint16` or `string`.",
            ))?
        };

        let size = if input.peek(syn::token::Paren) {
            let content;
            parenthesized!(content in input);
            Some(content.parse::<LitInt>()?)
        } else {
            None
        };

        if needs_size && size.is_none() {
            Err(Error::new_spanned(
                &kind,
                "Fields of this type must declare a size, as in `string(16)`.",
            ))?
        }

        if let (Some(element), Some(size)) = (float_size(base_type), &size) {
            if size.base10_parse::<u8>()? != element {
                Err(Error::new_spanned(
                    size,
                    "Float fields hold a single element, so their size may only be the element size.",
                ))?
            }
        }

        if !input.is_empty() {
            Err(input.error("Unexpected tokens after field type."))?
        }

        Ok(Self {
            number,
            base_type: Ident::new(base_type, kind.span()),
            size,
        })
    }
}

/// Map a FIT base type name to its `BaseType` variant, and whether a field of
/// that type must declare its size.
fn base_type(kind: &str) -> Option<(&'static str, bool)> {
    Some(match kind {
        "enum" => ("Enum", false),
        "sint8" => ("Sint8", false),
        "uint8" => ("Uint8", false),
        "sint16" => ("Sint16", false),
        "uint16" => ("Uint16", false),
        "sint32" => ("Sint32", false),
        "uint32" => ("Uint32", false),
        "string" => ("String", true),
        "float32" => ("Float32", false),
        "float64" => ("Float64", false),
        "uint8z" => ("Uint8z", false),
        "uint16z" => ("Uint16z", false),
        "uint32z" => ("Uint32z", false),
        "byte" => ("Byte", true),
        "sint64" => ("Sint64", false),
        "uint64" => ("Uint64", false),
        "uint64z" => ("Uint64z", false),
        _ => None?,
    })
}

fn float_size(base_type: &str) -> Option<u8> {
    match base_type {
        "Float32" => Some(4),
        "Float64" => Some(8),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_attribute() {
        let attribute: FieldAttribute = syn::parse_str("3, uint32z").unwrap();
        assert_eq!(attribute.number.base10_digits(), "3");
        assert_eq!(attribute.base_type, "Uint32z");
        assert!(attribute.size.is_none());

        let attribute: FieldAttribute = syn::parse_str("0, enum").unwrap();
        assert_eq!(attribute.base_type, "Enum");

        let attribute: FieldAttribute = syn::parse_str("8, string(24)").unwrap();
        assert_eq!(attribute.size.unwrap().base10_digits(), "24");
    }

    #[test]
    fn rejects_sizeless_strings() {
        assert!(syn::parse_str::<FieldAttribute>("8, string").is_err());
        assert!(syn::parse_str::<FieldAttribute>("1, byte").is_err());
    }

    #[test]
    fn rejects_float_arrays() {
        assert!(syn::parse_str::<FieldAttribute>("0, float32(8)").is_err());
        assert!(syn::parse_str::<FieldAttribute>("0, float64(4)").is_err());

        let attribute: FieldAttribute = syn::parse_str("0, float64(8)").unwrap();
        assert_eq!(attribute.base_type, "Float64");
    }
}
