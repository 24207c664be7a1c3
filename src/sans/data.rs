//! Encoding and validation of data records.

use alloc::vec::Vec;
use core::time::Duration;

use either::Either::{self, Left, Right};
use thiserror::Error;

use super::definition::{BaseType, FieldDefinition};

/// Seconds between the Unix epoch and the FIT epoch (1989-12-31T00:00:00Z).
pub const FIT_EPOCH_OFFSET: u64 = 631_065_600;

/// Convert a time since the Unix epoch into a FIT `date_time` value.
///
/// Times before the FIT epoch saturate to zero, and times beyond the range of
/// a `u32` saturate to its maximum.
pub fn timestamp(since_unix_epoch: Duration) -> u32 {
    let seconds = since_unix_epoch.as_secs().saturating_sub(FIT_EPOCH_OFFSET);
    u32::try_from(seconds).unwrap_or(u32::MAX)
}

/// A field value, ready to be encoded at an exact width.
///
/// Integers are written little-endian and truncated to `width` bytes. Strings
/// are truncated to leave room for a terminator and zero-filled. Byte arrays
/// are truncated or zero-filled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    UInt { width: u8, value: u64 },
    SInt { width: u8, value: i64 },
    Float32(f32),
    Float64(f64),
    FixedString { width: u8, value: &'a str },
    RawBytes { width: u8, value: &'a [u8] },
    /// The 'invalid' marker of a base type, repeated to fill `width`.
    Invalid { base_type: BaseType, width: u8 },
}

impl Value<'_> {
    /// Number of bytes this value encodes to.
    pub fn len(&self) -> usize {
        match self {
            Self::Float32(_) => 4,
            Self::Float64(_) => 8,
            Self::UInt { width, .. }
            | Self::SInt { width, .. }
            | Self::FixedString { width, .. }
            | Self::RawBytes { width, .. }
            | Self::Invalid { width, .. } => *width as usize,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append the encoded value to a buffer.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match *self {
            Self::UInt { width, value } => put_int(out, value.to_le_bytes(), width, 0),
            Self::SInt { width, value } => {
                let fill = if value < 0 { 0xFF } else { 0 };
                put_int(out, value.to_le_bytes(), width, fill)
            }
            Self::Float32(value) => out.extend_from_slice(&value.to_le_bytes()),
            Self::Float64(value) => out.extend_from_slice(&value.to_le_bytes()),
            Self::FixedString { width, value } => put_string(out, value, width),
            Self::RawBytes { width, value } => put_bytes(out, value, width),
            Self::Invalid { base_type, width } => {
                let marker = base_type.invalid();
                let marker = &marker[..base_type.size() as usize];
                out.extend(marker.iter().copied().cycle().take(width as usize));
            }
        }
    }

    /// Encode the value into a new buffer.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        self.encode_into(&mut out);
        out
    }
}

/// Write the low `width` bytes of an integer, extending with `fill` past eight.
fn put_int(out: &mut Vec<u8>, bytes: [u8; 8], width: u8, fill: u8) {
    let width = width as usize;
    let taken = width.min(bytes.len());
    out.extend_from_slice(&bytes[..taken]);
    out.resize(out.len() + (width - taken), fill);
}

/// Write a string, truncated on a character boundary to leave at least one
/// terminating zero, then zero-filled to `width`.
fn put_string(out: &mut Vec<u8>, s: &str, width: u8) {
    let width = width as usize;
    let Some(limit) = width.checked_sub(1) else {
        return;
    };

    let mut end = s.len().min(limit);
    while !s.is_char_boundary(end) {
        end -= 1;
    }

    out.extend_from_slice(&s.as_bytes()[..end]);
    out.resize(out.len() + (width - end), 0);
}

fn put_bytes(out: &mut Vec<u8>, b: &[u8], width: u8) {
    let width = width as usize;
    let end = b.len().min(width);
    out.extend_from_slice(&b[..end]);
    out.resize(out.len() + (width - end), 0);
}

/// An error validating a data record against its definition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// The record holds a different number of fields than its definition.
    #[error("Expected {expected} fields, found {found}.")]
    FieldCount { expected: usize, found: usize },
    /// A field value has a different size than its definition.
    #[error("Field {field} expected {expected} bytes, found {found}.")]
    FieldSize {
        field: u8,
        expected: u8,
        found: usize,
    },
}

/// State token to check the next field of a data record.
#[derive(Debug)]
pub struct Record<'d> {
    fields: &'d [FieldDefinition],
    position: usize,
}

/// State token marking a data record whose every field has been checked.
#[derive(Debug)]
pub struct RecordEnd(());

impl<'d> Record<'d> {
    /// Begin checking a data record against the fields of its definition.
    ///
    /// Returns the end state directly for a definition without fields.
    pub fn new(fields: &'d [FieldDefinition]) -> Either<Self, RecordEnd> {
        if fields.is_empty() {
            Right(RecordEnd(()))
        } else {
            Left(Self {
                fields,
                position: 0,
            })
        }
    }

    /// The definition of the field expected next.
    pub fn expected(&self) -> FieldDefinition {
        self.fields[self.position]
    }

    /// Transition to another state by checking the bytes of one field.
    ///
    /// Returns the matched field definition, and a successor state token.
    pub fn advance(
        self,
        r: &[u8],
    ) -> Result<(FieldDefinition, Either<Self, RecordEnd>), RecordError> {
        self.advance_size(r.len())
    }

    /// Transition to another state by checking only the size of one field.
    pub fn advance_size(
        self,
        size: usize,
    ) -> Result<(FieldDefinition, Either<Self, RecordEnd>), RecordError> {
        let field = self.expected();

        if size != field.size as usize {
            Err(RecordError::FieldSize {
                field: field.field,
                expected: field.size,
                found: size,
            })?;
        }

        let position = self.position + 1;

        let successor = if position < self.fields.len() {
            Left(Self { position, ..self })
        } else {
            Right(RecordEnd(()))
        };

        Ok((field, successor))
    }

    /// Fail for a record that ended before every field was supplied.
    pub fn finish(self) -> RecordError {
        RecordError::FieldCount {
            expected: self.fields.len(),
            found: self.position,
        }
    }
}

/// Check a full list of field values against a definition.
pub fn check_record<T: AsRef<[u8]>>(
    fields: &[FieldDefinition],
    values: &[T],
) -> Result<(), RecordError> {
    check_sizes(fields, values.iter().map(|v| v.as_ref().len()))
}

/// Check the sizes of a full list of field values against a definition.
pub fn check_sizes(
    fields: &[FieldDefinition],
    sizes: impl IntoIterator<Item = usize>,
) -> Result<(), RecordError> {
    let mut sizes = sizes.into_iter();

    let mut state = Record::new(fields);

    loop {
        state = match state {
            Left(record) => match sizes.next() {
                Some(size) => record.advance_size(size)?.1,
                None => Err(record.finish())?,
            },
            Right(RecordEnd(())) => break,
        };
    }

    let extra = sizes.count();
    if extra != 0 {
        Err(RecordError::FieldCount {
            expected: fields.len(),
            found: fields.len() + extra,
        })?;
    }

    Ok(())
}
