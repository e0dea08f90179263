//! Durability layer for seatguard
//!
//! This crate implements the write-ahead log:
//! - WalEntry types: GroupRegistered, Admission
//! - Entry encoding/decoding with CRC32 checksums
//! - Durability modes: InMemory, Buffered (default), Strict
//! - Torn-tail tolerant reader used by recovery

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encoding;
pub mod entry;
pub mod wal;

pub use encoding::{decode_entry, encode_entry, Decoded};
pub use entry::WalEntry;
pub use wal::{read_entries, DurabilityMode, Wal, WAL_FILE_NAME};
