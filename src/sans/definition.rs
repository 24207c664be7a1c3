//! Encoding of definition records.

use thiserror::Error;
use zerocopy::{Immutable, IntoBytes, byteorder::little_endian::U16};

/// A base type, identifying how the bytes of a field are interpreted.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Enum = 0x00,
    Sint8 = 0x01,
    Uint8 = 0x02,
    Sint16 = 0x83,
    Uint16 = 0x84,
    Sint32 = 0x85,
    Uint32 = 0x86,
    String = 0x07,
    Float32 = 0x88,
    Float64 = 0x89,
    Uint8z = 0x0A,
    Uint16z = 0x8B,
    Uint32z = 0x8C,
    Byte = 0x0D,
    Sint64 = 0x8E,
    Uint64 = 0x8F,
    Uint64z = 0x90,
}

impl BaseType {
    /// Size in bytes of a single element of this type.
    ///
    /// A field may hold an array of elements, in which case its size is a
    /// multiple of this value.
    pub const fn size(self) -> u8 {
        match self {
            Self::Enum | Self::Sint8 | Self::Uint8 | Self::String | Self::Uint8z | Self::Byte => 1,
            Self::Sint16 | Self::Uint16 | Self::Uint16z => 2,
            Self::Sint32 | Self::Uint32 | Self::Float32 | Self::Uint32z => 4,
            Self::Float64 | Self::Sint64 | Self::Uint64 | Self::Uint64z => 8,
        }
    }

    /// The 'invalid' marker of this type, as little-endian bytes of a single
    /// element. Only the first [`BaseType::size`] bytes are meaningful.
    pub const fn invalid(self) -> [u8; 8] {
        const ONES: [u8; 8] = [0xFF; 8];
        const ZEROES: [u8; 8] = [0x00; 8];

        match self {
            Self::String | Self::Uint8z | Self::Uint16z | Self::Uint32z | Self::Uint64z => ZEROES,
            Self::Sint8 => [0x7F, 0, 0, 0, 0, 0, 0, 0],
            Self::Sint16 => [0xFF, 0x7F, 0, 0, 0, 0, 0, 0],
            Self::Sint32 => [0xFF, 0xFF, 0xFF, 0x7F, 0, 0, 0, 0],
            Self::Sint64 => [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F],
            _ => ONES,
        }
    }
}

/// A field definition: field number, size in bytes, and base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDefinition {
    pub field: u8,
    pub size: u8,
    pub base_type: BaseType,
}

impl FieldDefinition {
    /// A field holding an array of `size` bytes of `base_type`.
    pub const fn new(field: u8, size: u8, base_type: BaseType) -> Self {
        Self {
            field,
            size,
            base_type,
        }
    }

    /// A field holding a single element of `base_type`.
    pub const fn single(field: u8, base_type: BaseType) -> Self {
        Self::new(field, base_type.size(), base_type)
    }

    pub fn encode(&self) -> [u8; 3] {
        [self.field, self.size, self.base_type as u8]
    }
}

/// An error building a definition record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    /// A definition must declare at least one field.
    #[error("Definition declares no fields.")]
    Empty,
    /// A definition may declare at most 255 fields.
    #[error("Definition declares too many fields ({0}).")]
    TooManyFields(usize),
}

/// The fixed part of a definition record, between the record header and the
/// field definitions.
///
/// Records are always written little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefinitionMessage {
    pub global_message: u16,
    pub fields: u8,
}

impl DefinitionMessage {
    /// Describe a definition of `global_message` over `fields`.
    pub fn new(global_message: u16, fields: &[FieldDefinition]) -> Result<Self, DefinitionError> {
        let fields = match fields.len() {
            0 => Err(DefinitionError::Empty)?,
            n => u8::try_from(n).map_err(|_| DefinitionError::TooManyFields(n))?,
        };

        Ok(Self {
            global_message,
            fields,
        })
    }

    pub fn encode(&self) -> [u8; 5] {
        #[repr(C, packed)]
        #[derive(IntoBytes, Immutable)]
        struct Message {
            reserved: u8,
            architecture: u8,
            global_message: U16,
            fields: u8,
        }

        let message = Message {
            reserved: 0,
            architecture: 0,
            global_message: U16::new(self.global_message),
            fields: self.fields,
        };

        zerocopy::transmute!(message)
    }

    /// Total size in bytes of the definition record, including its record
    /// header.
    pub fn record_size(&self) -> usize {
        1 + 5 + 3 * self.fields as usize
    }
}
