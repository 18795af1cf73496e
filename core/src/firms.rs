//! Cached patched FIRM images on the SD card.

use embedded_io::{Error as _, ErrorKind};
use log::{debug, info, warn};

use crate::fs::Filesystem;

pub const FIRM_COUNT: usize = 6;

/// Index of the patched 9.0 FIRM, the default image on an updated SysNAND.
pub const PATCHED_DEFAULT_FIRM: usize = 3;
/// Index of the patched AGB_FIRM used for GBA titles.
pub const PATCHED_AGB_FIRM: usize = 5;

pub const PATCHED_FIRMS: [&str; FIRM_COUNT] = [
    "/aurei/patched_firmware_sys.bin",
    "/aurei/patched_firmware_emu.bin",
    "/aurei/patched_firmware_em2.bin",
    "/aurei/patched_firmware90.bin",
    "/aurei/patched_firmware_twl.bin",
    "/aurei/patched_firmware_agb.bin",
];

/// Remove one cached image. A file that is already gone is fine, and any
/// other failure only costs a re-patch on the next boot, so nothing is
/// reported to the caller.
pub fn delete_firm<F: Filesystem>(fs: &mut F, path: &str) {
    match fs.delete(path) {
        Ok(()) => info!("Deleted {}", path),
        Err(err) if err.kind() == ErrorKind::NotFound => debug!("{} already absent", path),
        Err(err) => warn!("Failed to delete {}: {:?}", path, err.kind()),
    }
}

/// Delete the first `count` paths, last one first. Every path is attempted
/// regardless of how the others went.
pub fn delete_firms<F: Filesystem>(fs: &mut F, paths: &[&str], count: usize) {
    for path in paths.iter().take(count).rev() {
        delete_firm(fs, path);
    }
}
