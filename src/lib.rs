#![no_std]

//! A compact serializer for Garmin's Flexible and Interoperable Data Transfer
//! protocol.
//!
//! Cassette builds FIT documents in memory: a document header, a sequence of
//! definition and data records, and a trailing cyclic redundancy check. The
//! finished bytes are handed back to the caller, who decides where they go.
//!
//! Most users should begin with the [`avec::Encoder`] and the derive macros in
//! the [`avec`] module. The primitives these are built from (header layouts,
//! base types, field values and the checksum) live in the [`sans`] module, for
//! applications that need to assemble records by hand.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable derive macros (default).
//! - `std`: enable writer-based output (default).

extern crate alloc;

pub mod avec;
pub mod sans;

#[doc(hidden)]
pub mod __private {
    pub use alloc::vec::Vec;
}
