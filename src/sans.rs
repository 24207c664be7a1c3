//! Allocation-free building blocks for FIT documents.
//!
//! This module is intended for applications that need fine control over the
//! bytes they emit. See [`crate::avec`] for an encoder covering common
//! patterns.
//!
//! # Layout
//!
//! A document is a 14-byte header, a run of records, and a two-byte cyclic
//! redundancy check over those records. Each record starts with a one-byte
//! record header carrying a local message number (0 to 15) and a flag marking
//! it as a definition or a data record.
//!
//! A definition record binds a local message number to a global message
//! number and a list of field definitions. A data record carries the raw field
//! values for the most recent definition with the same local message number,
//! in definition order, with exactly the declared sizes.
//!
//! The pieces are encoded by:
//!
//! - [`header::DocumentHeader`] and [`header::RecordHeader`].
//! - [`definition::DefinitionMessage`] and [`definition::FieldDefinition`].
//! - [`data::Value`], for turning primitives into field bytes, and
//! [`data::Record`], a state token that checks a data record against its
//! definition one field at a time.
//! - [`check::compute_crc`], for both header and document checks.
//!
//! Nothing here tracks which local message numbers are in use, or where the
//! record section ends. That bookkeeping is the job of an encoder, such as
//! [`crate::avec::Encoder`].

pub mod check;
pub mod data;
pub mod definition;
pub mod header;

/// Size in bytes of the document header written by this crate, including its
/// trailing check.
pub const HEADER_SIZE: u8 = 14;

/// Number of local message numbers addressable from a record header.
pub const LOCAL_MESSAGES: usize = 16;
