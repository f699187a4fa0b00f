// Byte storage backends
//
// MemoryStorage handles share one buffer, so a clone behaves like the same
// hub after a power cycle. FileStorage writes through to disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::hub::{HubError, Result, Storage};

/// Size of the user storage area
pub const STORAGE_SIZE: usize = 512;

fn check_range(len: usize, offset: usize, count: usize) -> Result<()> {
    match offset.checked_add(count) {
        Some(end) if end <= len => Ok(()),
        _ => Err(HubError::StorageRange { offset, count }),
    }
}

#[derive(Debug, Clone)]
pub struct MemoryStorage {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl MemoryStorage {
    /// Zeroed storage, as on a freshly flashed hub
    pub fn new() -> Self {
        Self::filled(0)
    }

    pub fn filled(byte: u8) -> Self {
        Self {
            bytes: Arc::new(Mutex::new(vec![byte; STORAGE_SIZE])),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn read(&mut self, offset: usize, count: usize) -> Result<Vec<u8>> {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        check_range(bytes.len(), offset, count)?;
        Ok(bytes[offset..offset + count].to_vec())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let mut bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        check_range(bytes.len(), offset, data.len())?;
        bytes[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }
}

/// Storage image kept in a file between program runs
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl FileStorage {
    /// Open the image at `path`; a missing file starts zeroed
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No storage image at {}, starting blank", path.display());
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        bytes.resize(STORAGE_SIZE, 0);
        Ok(Self { path, bytes })
    }
}

impl Storage for FileStorage {
    fn read(&mut self, offset: usize, count: usize) -> Result<Vec<u8>> {
        check_range(self.bytes.len(), offset, count)?;
        Ok(self.bytes[offset..offset + count].to_vec())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        check_range(self.bytes.len(), offset, data.len())?;
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        fs::write(&self.path, &self.bytes)?;
        debug!("Wrote {} bytes at {} to {}", data.len(), offset, self.path.display());
        Ok(())
    }
}
