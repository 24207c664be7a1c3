use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Field, Fields, Ident, Result, Type};

pub(crate) fn expand_to_records(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new_spanned(
            input,
            "`ToRecords` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new_spanned(
            input,
            "`ToRecords` may only be derived on structs with named fields.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    let writes = fields.iter().map(|field| {
        let FieldMetadata { name, kind } = field;

        match kind {
            Kind::Single => quote! {
                sink.write_record(&self.#name)?;
            },
            Kind::Option => quote! {
                if let ::core::option::Option::Some(record) = &self.#name {
                    sink.write_record(record)?;
                }
            },
            Kind::Vec => quote! {
                for record in &self.#name {
                    sink.write_record(record)?;
                }
            },
        }
    });

    let name = &input.ident;
    let (impl_generics, type_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::cassette::avec::ToRecords for #name #type_generics #where_clause {
            fn to_records<S: ::cassette::avec::RecordSink>(
                &self,
                sink: &mut S,
            ) -> ::core::result::Result<(), ::cassette::avec::Error> {
                #(#writes)*
                ::core::result::Result::Ok(())
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
enum Kind {
    Single,
    Option,
    Vec,
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    kind: Kind,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let name = field.ident.clone().unwrap();

        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("record")) else {
            return Ok(None);
        };

        attr.meta.require_path_only()?;

        let Type::Path(path) = &field.ty else {
            Err(Error::new_spanned(
                &field.ty,
                "Field must have a `T`, `Option<T>` or `Vec<T>` type.",
            ))?
        };

        let Some(segment) = path.path.segments.last() else {
            Err(Error::new_spanned(
                &path.path.segments,
                "Field must have a `T`, `Option<T>` or `Vec<T>` type.",
            ))?
        };

        let kind = if segment.ident == "Option" {
            Kind::Option
        } else if segment.ident == "Vec" {
            Kind::Vec
        } else {
            Kind::Single
        };

        Ok(Some(Self { name, kind }))
    }
}
