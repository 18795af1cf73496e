use std::{fs, io, path::PathBuf};

use bootcfg_core::fs::Filesystem;
use embedded_io::{ErrorKind, ErrorType};

#[derive(Debug)]
pub struct SdError(io::Error);

impl embedded_io::Error for SdError {
    fn kind(&self) -> ErrorKind {
        match self.0.kind() {
            io::ErrorKind::NotFound => ErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            io::ErrorKind::AlreadyExists => ErrorKind::AlreadyExists,
            io::ErrorKind::InvalidInput => ErrorKind::InvalidInput,
            io::ErrorKind::OutOfMemory => ErrorKind::OutOfMemory,
            _ => ErrorKind::Other,
        }
    }
}

impl From<io::Error> for SdError {
    fn from(err: io::Error) -> Self {
        SdError(err)
    }
}

/// Host directory mounted as the SD card root.
pub struct SdCardDir {
    root: PathBuf,
}

impl SdCardDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl ErrorType for SdCardDir {
    type Error = SdError;
}

impl Filesystem for SdCardDir {
    fn read(&mut self, path: &str, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let data = fs::read(self.resolve(path))?;
        let len = buf.len().min(data.len());
        buf[..len].copy_from_slice(&data[..len]);
        Ok(len)
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), Self::Error> {
        let target = self.resolve(path);
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, data)?;
        log::debug!("Wrote {} bytes to {}", data.len(), target.display());
        Ok(())
    }

    fn delete(&mut self, path: &str) -> Result<(), Self::Error> {
        fs::remove_file(self.resolve(path))?;
        Ok(())
    }
}
