//! Encoder checking every data record against its definition.

use alloc::vec::Vec;

use crate::sans::{
    data::{Value, check_record, check_sizes},
    definition::FieldDefinition,
};

use super::{
    RecordSink, ToRecord, ToRecords,
    encoder::{Encoder, Error},
};

/// An [`Encoder`] that refuses data records not matching their definition.
///
/// Before a data record is written, the number of field values and the size
/// of each are compared with the current definition of its message. On a
/// mismatch, nothing is written and [`Error::Record`] is returned.
#[derive(Debug, Clone, Default)]
pub struct StrictEncoder {
    inner: Encoder,
}

impl StrictEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// See [`Encoder::define`].
    pub fn define(&mut self, global_message: u16, fields: &[FieldDefinition]) -> Result<u8, Error> {
        self.inner.define(global_message, fields)
    }

    /// Write a data record of raw field bytes, after checking them.
    pub fn write<T: AsRef<[u8]>>(&mut self, global_message: u16, values: &[T]) -> Result<(), Error> {
        check_record(self.fields(global_message)?, values)?;
        self.inner.write(global_message, values)
    }

    /// Write a data record of encoded values, after checking their sizes.
    pub fn write_values(&mut self, global_message: u16, values: &[Value]) -> Result<(), Error> {
        check_sizes(self.fields(global_message)?, values.iter().map(Value::len))?;
        self.inner.write_values(global_message, values)
    }

    /// Write every record of a collection.
    pub fn write_records(&mut self, records: &(impl ToRecords + ?Sized)) -> Result<(), Error> {
        records.to_records(self)
    }

    fn fields(&self, global_message: u16) -> Result<&[FieldDefinition], Error> {
        self.inner
            .definition(global_message)
            .ok_or(Error::UndefinedSchema(global_message))
    }

    /// See [`Encoder::finalize`].
    pub fn finalize(&self) -> Result<Vec<u8>, Error> {
        self.inner.finalize()
    }

    pub fn inner(&self) -> &Encoder {
        &self.inner
    }

    pub fn into_inner(self) -> Encoder {
        self.inner
    }
}

impl From<Encoder> for StrictEncoder {
    fn from(inner: Encoder) -> Self {
        Self { inner }
    }
}

impl RecordSink for StrictEncoder {
    fn write_record<R: ToRecord + ?Sized>(&mut self, record: &R) -> Result<(), Error> {
        // Checked against the record's own fields, before any definition is written.
        let values = record.values();
        check_sizes(R::FIELDS, values.iter().map(Value::len))?;

        self.inner.ensure_defined::<R>()?;
        self.inner.write_values(R::MESSAGE, &values)
    }
}
