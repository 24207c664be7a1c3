//! Writer-based output.
//!
//! _Requires Cargo feature `std`._

use std::io::Write;

use thiserror::Error;

use super::{Encoder, ToRecords, encoder};

extern crate std;

/// Errors occurring while encoding to a writer.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the supplied writer.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The document could not be encoded.
    #[error("Could not encode document: {0}")]
    Encode(#[from] encoder::Error),
}

/// Encode a collection of records, writing the finished document to a writer.
///
/// Nothing is written unless encoding succeeds. The writer is not flushed.
///
/// This method is also re-exported as `cassette::avec::encode_writer`.
///
/// _Requires Cargo feature `std`._
pub fn encode(w: &mut impl Write, records: &(impl ToRecords + ?Sized)) -> Result<(), Error> {
    let document = encoder::encode(records)?;
    w.write_all(&document)?;
    Ok(())
}

/// Finalize an encoder, writing the finished document to a writer.
///
/// _Requires Cargo feature `std`._
pub fn finalize(w: &mut impl Write, e: &Encoder) -> Result<(), Error> {
    let document = e.finalize()?;
    w.write_all(&document)?;
    Ok(())
}
