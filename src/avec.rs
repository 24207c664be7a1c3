//! Convenience interfaces for common encoding patterns.
//!
//! The [`Encoder`] accumulates definition and data records and produces a
//! finished document. Records may be written as raw field bytes, as
//! [`Value`]s, or from types implementing [`ToRecord`]. A whole document can
//! be described by a type implementing [`ToRecords`].
//!
//! In many cases (when records are of a known shape), these traits can be
//! derived. See the [`ToRecords`](macro@ToRecords) and
//! [`ToRecord`](macro@ToRecord) macros for details.
//!
//! The plain [`Encoder`] trusts that field bytes match their definition. Use
//! the [`StrictEncoder`] to check every data record before it is written.

use alloc::{string::String, vec::Vec};

use crate::sans::{
    data::Value,
    definition::{BaseType, FieldDefinition},
};

pub mod encoder;
pub mod strict;
#[cfg(feature = "std")]
pub mod writer;

pub use encoder::{Encoder, Error, Versions, encode as encode_vec};
pub use strict::StrictEncoder;
#[cfg(feature = "std")]
pub use writer::encode as encode_writer;

/// Derive [`ToRecords`] for a struct holding a collection of records.
///
/// _Requires Cargo feature `derive`._
///
/// # Example
///
/// Add the `record` attribute to each struct field holding records. The field
/// type may be `T`, `Option<T>` or `Vec<T>`, where `T` implements
/// [`ToRecord`]. Records are written in field order, and each message is
/// defined before its first record.
///
/// ```
/// #[derive(Debug, ToRecords)]
/// struct WorkoutFile {
///     #[record]
///     file_id: FileId,
///     #[record]
///     workout: Workout,
///     #[record]
///     steps: Vec<WorkoutStep>,
/// }
/// ```
#[cfg(feature = "derive")]
pub use cassette_derive::ToRecords;

/// Write a collection of records to a sink.
///
/// See the [`ToRecords`](macro@ToRecords) derive macro for an automatic
/// implementation of this trait.
pub trait ToRecords {
    /// Write every record, in order.
    fn to_records<S: RecordSink>(&self, sink: &mut S) -> Result<(), Error>;
}

/// Derive [`ToRecord`] for a struct representing a single record.
///
/// _Requires Cargo feature `derive`._
///
/// # Examples
///
/// Add the `record(N)` attribute to the struct, where `N` is the global
/// message number. Then add the `field(N, type)` attribute to each struct
/// field to be written, where `N` is the field number and `type` is the name
/// of a FIT base type. Fields are defined in struct order.
///
/// ```
/// #[derive(Debug, ToRecord)]
/// #[record(0)]
/// struct FileId {
///     #[field(0, enum)]
///     type_: u8,
///     #[field(1, uint16)]
///     manufacturer: u16,
///     #[field(3, uint32z)]
///     serial_number: u32,
///     #[field(4, uint32)]
///     time_created: Option<u32>,
/// }
/// ```
///
/// String and byte fields must declare their size in bytes. Strings are
/// truncated to leave room for a terminator, and zero-filled.
///
/// ```
/// #[derive(Debug, ToRecord)]
/// #[record(26)]
/// struct Workout {
///     #[field(8, string(24))]
///     name: String,
/// }
/// ```
///
/// A size may also be given for integer types, declaring an array. The field
/// value is then written little-endian across the whole size. Float fields
/// hold a single element, and a size other than the element size is refused.
///
/// The Rust type need not match the base type: a float written to an integer
/// field is cast to an integer. Every value is encoded at exactly the defined
/// size.
#[cfg(feature = "derive")]
pub use cassette_derive::ToRecord;

/// Describe a single record.
///
/// See the [`ToRecord`](macro@ToRecord) derive macro for an automatic
/// implementation of this trait.
pub trait ToRecord {
    /// The global message number of this record.
    const MESSAGE: u16;
    /// The field definitions of this record.
    const FIELDS: &'static [FieldDefinition];

    /// The field values of this record, one per field definition, each
    /// encoding to exactly the defined size.
    fn values(&self) -> Vec<Value<'_>>;
}

/// A destination for records, such as an [`Encoder`] or [`StrictEncoder`].
pub trait RecordSink {
    /// Write a record, defining its message first if necessary.
    fn write_record<R: ToRecord + ?Sized>(&mut self, record: &R) -> Result<(), Error>;
}

/// Convert a Rust value into a field [`Value`].
///
/// The base type and size are those of the field definition. Numeric values
/// are truncated or extended to `size`, and `None` encodes the base type's
/// 'invalid' marker.
pub trait IntoValue {
    fn to_value(&self, base_type: BaseType, size: u8) -> Value<'_>;
}

macro_rules! into_value {
    ($variant:ident, $wide:ty, $($t:ty),*) => {
        $(
            impl IntoValue for $t {
                fn to_value(&self, _: BaseType, size: u8) -> Value<'_> {
                    Value::$variant {
                        width: size,
                        value: *self as $wide,
                    }
                }
            }
        )*
    };
}

into_value!(UInt, u64, u8, u16, u32, u64, bool);
into_value!(SInt, i64, i8, i16, i32, i64);

/// A float as a field of any base type, always `size` bytes long.
///
/// Integer types take the value cast (saturating) to an integer. Float arrays,
/// strings and bytes cannot hold a single float and encode as 'invalid'.
fn float_value(value: f64, base_type: BaseType, size: u8) -> Value<'static> {
    match base_type {
        BaseType::Float32 if size == 4 => Value::Float32(value as f32),
        BaseType::Float64 if size == 8 => Value::Float64(value),
        BaseType::Sint8 | BaseType::Sint16 | BaseType::Sint32 | BaseType::Sint64 => Value::SInt {
            width: size,
            value: value as i64,
        },
        BaseType::Enum
        | BaseType::Uint8
        | BaseType::Uint16
        | BaseType::Uint32
        | BaseType::Uint64
        | BaseType::Uint8z
        | BaseType::Uint16z
        | BaseType::Uint32z
        | BaseType::Uint64z => Value::UInt {
            width: size,
            value: value as u64,
        },
        BaseType::Float32 | BaseType::Float64 | BaseType::String | BaseType::Byte => {
            Value::Invalid {
                base_type,
                width: size,
            }
        }
    }
}

impl IntoValue for f32 {
    fn to_value(&self, base_type: BaseType, size: u8) -> Value<'_> {
        float_value(*self as f64, base_type, size)
    }
}

impl IntoValue for f64 {
    fn to_value(&self, base_type: BaseType, size: u8) -> Value<'_> {
        float_value(*self, base_type, size)
    }
}

impl IntoValue for str {
    fn to_value(&self, _: BaseType, size: u8) -> Value<'_> {
        Value::FixedString {
            width: size,
            value: self,
        }
    }
}

impl IntoValue for String {
    fn to_value(&self, base_type: BaseType, size: u8) -> Value<'_> {
        self.as_str().to_value(base_type, size)
    }
}

impl IntoValue for [u8] {
    fn to_value(&self, _: BaseType, size: u8) -> Value<'_> {
        Value::RawBytes {
            width: size,
            value: self,
        }
    }
}

impl<const N: usize> IntoValue for [u8; N] {
    fn to_value(&self, base_type: BaseType, size: u8) -> Value<'_> {
        self.as_slice().to_value(base_type, size)
    }
}

impl IntoValue for Vec<u8> {
    fn to_value(&self, base_type: BaseType, size: u8) -> Value<'_> {
        self.as_slice().to_value(base_type, size)
    }
}

impl<T: IntoValue + ?Sized> IntoValue for &T {
    fn to_value(&self, base_type: BaseType, size: u8) -> Value<'_> {
        (**self).to_value(base_type, size)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn to_value(&self, base_type: BaseType, size: u8) -> Value<'_> {
        match self {
            Some(value) => value.to_value(base_type, size),
            None => Value::Invalid {
                base_type,
                width: size,
            },
        }
    }
}
