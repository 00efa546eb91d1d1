//! Byte cursor primitives for the tickwire protocol codec.
//!
//! This crate provides [`ByteWriter`] and [`ByteReader`] for the fixed-layout
//! values the protocol carries: integers, Latin-1 strings, gzip-compressed
//! strings, coordinate pairs and length-prefixed arrays.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads are bounds-checked.
//! - **No domain knowledge** - This crate knows nothing about entities, RPCs, or sessions.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Byte order
//!
//! 32-bit and 64-bit integers are little-endian. 16-bit integers are
//! big-endian on this wire, for both reads and writes.
//!
//! # Example
//!
//! ```
//! use bitstream::{ByteReader, ByteWriter};
//!
//! let mut writer = ByteWriter::new();
//! writer.write_u32(42);
//! writer.write_string("hello").unwrap();
//!
//! let bytes = writer.finish();
//!
//! let mut reader = ByteReader::new(&bytes);
//! assert_eq!(reader.read_u32().unwrap(), 42);
//! assert_eq!(reader.read_string().unwrap(), "hello");
//! assert!(!reader.can_read(1));
//! ```

mod error;
mod reader;
mod writer;

pub use error::{CursorError, CursorResult};
pub use reader::{ByteReader, DEFAULT_MAX_DECOMPRESSED};
pub use writer::ByteWriter;
