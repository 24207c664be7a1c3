//! Derive macros for the `cassette` FIT encoder.
//!
//! These are re-exported from `cassette::avec`, where they are documented.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod to_record;
mod to_records;

#[proc_macro_derive(ToRecord, attributes(record, field))]
pub fn derive_to_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match to_record::expand_to_record(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error().into(),
    }
}

#[proc_macro_derive(ToRecords, attributes(record))]
pub fn derive_to_records(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match to_records::expand_to_records(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error().into(),
    }
}
