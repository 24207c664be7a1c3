//! Encoding of document and record headers.

use tartan_bitfield::bitfield;
use thiserror::Error;
use zerocopy::{
    Immutable, IntoBytes,
    byteorder::little_endian::{U16, U32},
};

use super::{HEADER_SIZE, LOCAL_MESSAGES, check::compute_crc};

/// Protocol version 2.0.
pub const PROTOCOL_VERSION: u8 = 0x20;

/// Profile version 21.40.
pub const PROFILE_VERSION: u16 = 2140;

/// Marker identifying a document as FIT data.
pub const DATA_TYPE: [u8; 4] = *b".FIT";

/// A document header, before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentHeader {
    pub protocol_version: u8,
    pub profile_version: u16,
    /// Number of record bytes following the header, excluding the trailing
    /// check.
    pub data_size: u32,
}

impl Default for DocumentHeader {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            profile_version: PROFILE_VERSION,
            data_size: 0,
        }
    }
}

impl DocumentHeader {
    /// Encode the header, followed by a check over its first twelve bytes.
    pub fn encode(&self) -> [u8; HEADER_SIZE as usize] {
        #[repr(C, packed)]
        #[derive(IntoBytes, Immutable)]
        struct FileHeader {
            header_size: u8,
            protocol_version: u8,
            profile_version: U16,
            data_size: U32,
            data_type: [u8; 4],
        }

        let header = FileHeader {
            header_size: HEADER_SIZE,
            protocol_version: self.protocol_version,
            profile_version: U16::new(self.profile_version),
            data_size: U32::new(self.data_size),
            data_type: DATA_TYPE,
        };

        let body: [u8; 12] = zerocopy::transmute!(header);
        let crc = compute_crc(0, &body);

        let mut r = [0; HEADER_SIZE as usize];
        r[..12].copy_from_slice(&body);
        r[12..].copy_from_slice(&crc.to_le_bytes());
        r
    }
}

/// An error building a record header.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordHeaderError {
    /// Local message number does not fit in a normal record header.
    #[error("Local message number out of range ({0}).")]
    LocalMessageOutOfRange(u8),
}

/// The single byte opening every record.
///
/// Only normal headers are produced. Compressed timestamp headers and
/// developer data are never emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    local_message: u8,
    is_definition: bool,
}

impl RecordHeader {
    /// Header for a definition record binding `local_message`.
    pub fn definition(local_message: u8) -> Result<Self, RecordHeaderError> {
        Self::new(local_message, true)
    }

    /// Header for a data record using the definition bound to `local_message`.
    pub fn data(local_message: u8) -> Result<Self, RecordHeaderError> {
        Self::new(local_message, false)
    }

    fn new(local_message: u8, is_definition: bool) -> Result<Self, RecordHeaderError> {
        if local_message as usize >= LOCAL_MESSAGES {
            Err(RecordHeaderError::LocalMessageOutOfRange(local_message))?;
        }

        Ok(Self {
            local_message,
            is_definition,
        })
    }

    pub fn local_message(&self) -> u8 {
        self.local_message
    }

    pub fn is_definition(&self) -> bool {
        self.is_definition
    }

    pub fn encode(&self) -> u8 {
        bitfield! {
            struct NormalHeader(u8) {
                [0..4] local_message: u8,
                [5] is_developer,
                [6] is_definition,
                [7] is_compressed,
            }
        }

        let mut header = NormalHeader(0);
        header.set_local_message(self.local_message);
        header.set_is_definition(self.is_definition);
        header.0
    }
}
