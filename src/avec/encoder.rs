//! In-memory encoder implementation.

use alloc::{collections::BTreeMap, vec::Vec};

use thiserror::Error;
use tracing::{debug, trace};

use crate::sans::{
    HEADER_SIZE,
    check::compute_crc,
    data::{RecordError, Value},
    definition::{DefinitionError, DefinitionMessage, FieldDefinition},
    header::{DocumentHeader, PROFILE_VERSION, PROTOCOL_VERSION, RecordHeader},
};

use super::{RecordSink, ToRecord, ToRecords};

/// Errors occurring while encoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A data record was written for a message without a definition.
    #[error("No definition for global message {0}.")]
    UndefinedSchema(u16),
    /// Every local message number has been assigned.
    #[error("All 16 local message numbers are in use.")]
    SchemaCapacityExceeded,
    /// The definition could not be encoded.
    #[error("Invalid definition: {0}")]
    Definition(#[from] DefinitionError),
    /// A data record does not match its definition.
    #[error("Invalid record: {0}")]
    Record(#[from] RecordError),
    /// The record section does not fit the header's size field.
    #[error("Record section too large ({0} bytes).")]
    TooLarge(usize),
}

/// Versions stamped into the document header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Versions {
    pub protocol: u8,
    pub profile: u16,
}

impl Default for Versions {
    fn default() -> Self {
        Self {
            protocol: PROTOCOL_VERSION,
            profile: PROFILE_VERSION,
        }
    }
}

#[derive(Debug, Clone)]
struct Definition {
    global_message: u16,
    fields: Vec<FieldDefinition>,
    data_header: u8,
}

/// Accumulates records and produces a finished document.
///
/// Each call to [`Encoder::define`] binds a global message number to the next
/// unused local message number, of which there are sixteen. Data records are
/// written against the latest definition of their global message number.
///
/// A failed call leaves the encoder unchanged.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    versions: Versions,
    data: Vec<u8>,
    // Indexed by local message number.
    definitions: Vec<Definition>,
    locals: BTreeMap<u16, u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// An encoder stamping the given versions into its header.
    pub fn with_versions(versions: Versions) -> Self {
        Self {
            versions,
            ..Self::default()
        }
    }

    pub fn versions(&self) -> Versions {
        self.versions
    }

    /// Write a definition record for a global message.
    ///
    /// Returns the assigned local message number. Defining a global message a
    /// second time assigns a fresh local message number, and later data
    /// records use the new definition.
    pub fn define(&mut self, global_message: u16, fields: &[FieldDefinition]) -> Result<u8, Error> {
        let message = DefinitionMessage::new(global_message, fields)?;

        let local = u8::try_from(self.definitions.len()).map_err(|_| Error::SchemaCapacityExceeded)?;
        let header = RecordHeader::definition(local).map_err(|_| Error::SchemaCapacityExceeded)?;
        let data_header = RecordHeader::data(local).map_err(|_| Error::SchemaCapacityExceeded)?;

        self.data.reserve(message.record_size());
        self.data.push(header.encode());
        self.data.extend_from_slice(&message.encode());
        for field in fields {
            self.data.extend_from_slice(&field.encode());
        }

        self.definitions.push(Definition {
            global_message,
            fields: fields.to_vec(),
            data_header: data_header.encode(),
        });
        self.locals.insert(global_message, local);

        debug!(global_message, local, fields = fields.len(), "defined message");

        Ok(local)
    }

    /// Write a data record of raw field bytes.
    ///
    /// The bytes are written as given. Their count and sizes are not checked
    /// against the definition; see [`super::StrictEncoder`] for an encoder
    /// that does.
    pub fn write<I>(&mut self, global_message: u16, values: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let definition = self.definition_for(global_message)?;
        let data_header = definition.data_header;

        let start = self.data.len();
        self.data.push(data_header);
        for value in values {
            self.data.extend_from_slice(value.as_ref());
        }

        trace!(global_message, size = self.data.len() - start, "wrote record");

        Ok(())
    }

    /// Write a data record, encoding each value in turn.
    pub fn write_values(&mut self, global_message: u16, values: &[Value]) -> Result<(), Error> {
        let definition = self.definition_for(global_message)?;
        let data_header = definition.data_header;

        let start = self.data.len();
        self.data.push(data_header);
        for value in values {
            value.encode_into(&mut self.data);
        }

        trace!(global_message, size = self.data.len() - start, "wrote record");

        Ok(())
    }

    /// Write every record of a collection.
    pub fn write_records(&mut self, records: &(impl ToRecords + ?Sized)) -> Result<(), Error> {
        records.to_records(self)
    }

    /// Define the message of a record, unless its current definition already
    /// matches.
    pub(super) fn ensure_defined<R: ToRecord + ?Sized>(&mut self) -> Result<(), Error> {
        if self.definition(R::MESSAGE) != Some(R::FIELDS) {
            self.define(R::MESSAGE, R::FIELDS)?;
        }

        Ok(())
    }

    /// The fields of the current definition of a global message.
    pub fn definition(&self, global_message: u16) -> Option<&[FieldDefinition]> {
        self.definition_for(global_message)
            .ok()
            .map(|d| d.fields.as_slice())
    }

    /// The local message number currently bound to a global message.
    pub fn local_message(&self, global_message: u16) -> Option<u8> {
        self.locals.get(&global_message).copied()
    }

    fn definition_for(&self, global_message: u16) -> Result<&Definition, Error> {
        let local = self
            .local_message(global_message)
            .ok_or(Error::UndefinedSchema(global_message))?;

        let definition = &self.definitions[local as usize];
        debug_assert_eq!(definition.global_message, global_message);

        Ok(definition)
    }

    /// The record section written so far.
    pub fn payload(&self) -> &[u8] {
        &self.data
    }

    /// Number of record bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Produce a finished document from the records written so far.
    ///
    /// The document is the header, the records, and a check over the records.
    /// The encoder is left untouched, so writing may continue and a later call
    /// will produce a longer, independent document.
    pub fn finalize(&self) -> Result<Vec<u8>, Error> {
        let data_size = u32::try_from(self.data.len()).map_err(|_| Error::TooLarge(self.data.len()))?;

        let header = DocumentHeader {
            protocol_version: self.versions.protocol,
            profile_version: self.versions.profile,
            data_size,
        }
        .encode();

        let crc = compute_crc(0, &self.data);

        let mut document = Vec::with_capacity(HEADER_SIZE as usize + self.data.len() + 2);
        document.extend_from_slice(&header);
        document.extend_from_slice(&self.data);
        document.extend_from_slice(&crc.to_le_bytes());

        debug!(data_size, crc, "finalized document");

        Ok(document)
    }
}

impl RecordSink for Encoder {
    fn write_record<R: ToRecord + ?Sized>(&mut self, record: &R) -> Result<(), Error> {
        self.ensure_defined::<R>()?;
        self.write_values(R::MESSAGE, &record.values())
    }
}

/// Encode a collection of records into a finished document.
///
/// This method is also re-exported as `cassette::avec::encode_vec`.
pub fn encode(records: &(impl ToRecords + ?Sized)) -> Result<Vec<u8>, Error> {
    let mut encoder = Encoder::new();
    encoder.write_records(records)?;
    encoder.finalize()
}
