//! Entry framing with CRC32 checksums
//!
//! ```text
//! +----------------+----------------+------------------+
//! | len: u32 (LE)  | crc32: u32 (LE)| bincode payload  |
//! +----------------+----------------+------------------+
//! ```
//!
//! The checksum covers the payload only.

use crate::entry::WalEntry;
use byteorder::{ByteOrder, LittleEndian};
use seatguard_core::StoreError;

/// Bytes before the payload
pub const FRAME_HEADER_LEN: usize = 8;

/// Result of decoding one frame
#[derive(Debug, PartialEq)]
pub enum Decoded {
    /// A whole, valid frame
    Entry {
        /// Decoded entry
        entry: WalEntry,
        /// Total frame length (header + payload)
        len: usize,
    },
    /// The buffer ends inside the frame
    Incomplete,
    /// Payload bytes do not match the stored checksum
    ChecksumMismatch,
}

/// Encode an entry as one frame
pub fn encode_entry(entry: &WalEntry) -> Result<Vec<u8>, StoreError> {
    let payload = bincode::serialize(entry)?;
    let len = u32::try_from(payload.len()).map_err(|_| {
        StoreError::Serialization(format!("entry of {} bytes exceeds frame limit", payload.len()))
    })?;

    let mut frame = vec![0u8; FRAME_HEADER_LEN];
    LittleEndian::write_u32(&mut frame[0..4], len);
    LittleEndian::write_u32(&mut frame[4..8], crc32fast::hash(&payload));
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decode the frame at the start of `buf`
///
/// `offset` is the position of `buf` in the file, used in error reports.
/// A frame whose checksum passes but whose payload does not decode is
/// reported as corruption rather than a torn tail.
pub fn decode_entry(buf: &[u8], offset: u64) -> Result<Decoded, StoreError> {
    if buf.len() < FRAME_HEADER_LEN {
        return Ok(Decoded::Incomplete);
    }
    let len = LittleEndian::read_u32(&buf[0..4]) as usize;
    let crc = LittleEndian::read_u32(&buf[4..8]);
    let end = FRAME_HEADER_LEN + len;
    if buf.len() < end {
        return Ok(Decoded::Incomplete);
    }
    let payload = &buf[FRAME_HEADER_LEN..end];
    if crc32fast::hash(payload) != crc {
        return Ok(Decoded::ChecksumMismatch);
    }
    let entry = bincode::deserialize(payload).map_err(|e| StoreError::Corruption {
        offset,
        reason: e.to_string(),
    })?;
    Ok(Decoded::Entry { entry, len: end })
}
