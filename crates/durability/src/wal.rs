//! Write-ahead log file
//!
//! Append-only file of framed [`WalEntry`] records. Opening a log reads
//! every valid frame, truncates a torn tail left by a crash mid-append, and
//! positions the writer after the last valid frame.
//!
//! A failed append is cut back off the file before the error is returned,
//! so a frame whose transaction was aborted can never reach the log. If
//! that cut fails too, the handle is poisoned and refuses further appends.

use crate::encoding::{decode_entry, encode_entry, Decoded};
use crate::entry::WalEntry;
use seatguard_core::StoreError;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// File name of the log inside a database directory
pub const WAL_FILE_NAME: &str = "seatguard.wal";

/// Durability mode
///
/// | Mode | Log | Per commit |
/// |------|-----|------------|
/// | InMemory | none | nothing |
/// | Buffered | append | write to the OS |
/// | Strict | append | write + `sync_data` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurabilityMode {
    /// No log; state is lost when the database drops
    InMemory,
    /// Flushed to the OS on every commit
    #[default]
    Buffered,
    /// Synced to disk on every commit
    Strict,
}

impl DurabilityMode {
    /// Whether this mode writes a log at all
    pub fn requires_wal(&self) -> bool {
        !matches!(self, DurabilityMode::InMemory)
    }
}

/// Write-ahead log handle
#[derive(Debug)]
pub struct Wal {
    path: PathBuf,
    file: File,
    mode: DurabilityMode,
    len: u64,
    /// Set when a failed append could not be rolled back
    poisoned: bool,
}

impl Wal {
    /// Open or create the log at `path`
    ///
    /// Returns the handle together with every entry recovered from the file.
    pub fn open(
        path: impl AsRef<Path>,
        mode: DurabilityMode,
    ) -> Result<(Self, Vec<WalEntry>), StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        let (entries, valid_len) = scan(&buf)?;

        if (valid_len as usize) < buf.len() {
            warn!(
                path = %path.display(),
                valid_len,
                file_len = buf.len(),
                "Truncating torn WAL tail"
            );
            file.set_len(valid_len)?;
            file.sync_data()?;
        }
        file.seek(SeekFrom::Start(valid_len))?;

        debug!(path = %path.display(), entries = entries.len(), "WAL opened");
        Ok((
            Wal {
                path,
                file,
                mode,
                len: valid_len,
                poisoned: false,
            },
            entries,
        ))
    }

    /// Append one entry and make it as durable as the mode requires
    ///
    /// When this returns `Ok`, the entry is the durability point of its
    /// transaction.
    pub fn append(&mut self, entry: &WalEntry) -> Result<(), StoreError> {
        let frame = encode_entry(entry)?;
        let mode = self.mode;
        self.append_frame(&frame, |file, frame| {
            file.write_all(frame)?;
            if mode == DurabilityMode::Strict {
                file.sync_data()?;
            }
            Ok(())
        })
    }

    fn append_frame<F>(&mut self, frame: &[u8], write: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut File, &[u8]) -> std::io::Result<()>,
    {
        if self.poisoned {
            return Err(StoreError::Corruption {
                offset: self.len,
                reason: "log tail could not be rolled back after a failed append".to_string(),
            });
        }
        if let Err(e) = write(&mut self.file, frame) {
            self.rollback();
            return Err(e.into());
        }
        self.len += frame.len() as u64;
        Ok(())
    }

    /// Cut the file back to the last complete frame
    fn rollback(&mut self) {
        let len = self.len;
        let restored = self
            .file
            .set_len(len)
            .and_then(|_| self.file.seek(SeekFrom::Start(len)).map(|_| ()));
        if let Err(e) = restored {
            error!(
                path = %self.path.display(),
                valid_len = len,
                error = %e,
                "WAL rollback failed, refusing further appends"
            );
            self.poisoned = true;
        } else {
            warn!(path = %self.path.display(), valid_len = len, "WAL append failed, tail rolled back");
        }
    }

    /// Sync regardless of mode
    pub fn sync(&mut self) -> Result<(), StoreError> {
        self.file.sync_data()?;
        Ok(())
    }

    /// Check if a failed rollback has disabled this log
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Bytes of valid log
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Log file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durability mode
    pub fn mode(&self) -> DurabilityMode {
        self.mode
    }
}

impl Drop for Wal {
    fn drop(&mut self) {
        if let Err(e) = self.sync() {
            warn!(path = %self.path.display(), error = %e, "WAL sync on close failed");
        }
    }
}

/// Read every valid entry from the log at `path` without modifying it
pub fn read_entries(path: impl AsRef<Path>) -> Result<Vec<WalEntry>, StoreError> {
    let mut buf = Vec::new();
    File::open(path.as_ref())?.read_to_end(&mut buf)?;
    Ok(scan(&buf)?.0)
}

/// Decode frames until the first torn or checksum-failing one
fn scan(buf: &[u8]) -> Result<(Vec<WalEntry>, u64), StoreError> {
    let mut entries = Vec::new();
    let mut offset = 0usize;
    while offset < buf.len() {
        match decode_entry(&buf[offset..], offset as u64)? {
            Decoded::Entry { entry, len } => {
                entries.push(entry);
                offset += len;
            }
            Decoded::Incomplete => {
                warn!(offset, "Incomplete WAL frame, ignoring tail");
                break;
            }
            Decoded::ChecksumMismatch => {
                warn!(offset, "WAL frame failed checksum, ignoring tail");
                break;
            }
        }
    }
    Ok((entries, offset as u64))
}
