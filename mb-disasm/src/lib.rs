#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod decoder;
pub mod driver;
pub mod endian;
#[cfg(test)]
mod tests;
pub mod view;

#[cfg(feature = "std")]
pub use std;

#[cfg(not(feature = "std"))]
pub use core as std;

use thiserror_no_std::Error;

pub use decoder::{decode, format_operands, Instruction};
pub use driver::disassemble_function;
pub use endian::Endian;
pub use view::{ElfView, FuncSym, SectionInfo, SymEntry, SymbolIter};

/// Recoverable error conditions surfaced by this crate. Every fallible
/// operation returns one of these instead of panicking or aborting.
#[derive(Error, Debug)]
pub enum Error {
    /// The given path could not be opened.
    #[error("could not open path")]
    #[cfg(feature = "std")]
    InvalidPath,

    /// A std I/O operation failed while reading the file.
    #[error(transparent)]
    #[cfg(feature = "std")]
    Io(#[from] std::io::Error),

    /// The image is not a 32-bit ELF file (bad magic or wrong `EI_CLASS`).
    #[error("not a 32-bit ELF file")]
    NotElf32,

    /// A section required by the requested operation is absent.
    #[error("missing section: {0}")]
    MissingSection(&'static str),

    /// An index or offset fell outside the bounds known to the reader.
    #[error("index or offset out of range")]
    OutOfRange,
}
