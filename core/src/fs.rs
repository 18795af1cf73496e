use core::result::Result;

use embedded_io::ErrorType;

/// Whole-file access to the SD card.
///
/// Implementations report a missing file through an error whose
/// [`embedded_io::Error::kind`] is [`embedded_io::ErrorKind::NotFound`];
/// callers rely on that to treat absent files as a non-event.
pub trait Filesystem: ErrorType {
    /// Read up to `buf.len()` bytes from the start of the file at `path`.
    fn read(&mut self, path: &str, buf: &mut [u8]) -> Result<usize, Self::Error>;
    /// Create or truncate the file at `path` and write all of `data`.
    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), Self::Error>;
    fn delete(&mut self, path: &str) -> Result<(), Self::Error>;
}

impl<F: Filesystem + ?Sized> Filesystem for &mut F {
    fn read(&mut self, path: &str, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(path, buf)
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write(path, data)
    }

    fn delete(&mut self, path: &str) -> Result<(), Self::Error> {
        (**self).delete(path)
    }
}
