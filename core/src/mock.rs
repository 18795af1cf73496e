//! Recording collaborators for host-side tests
//!
//! Each mock logs the calls made on it so tests can assert on the exact
//! sequence of side effects.

use core::cell::RefCell;
use std::collections::BTreeMap;
use std::string::{String, ToString};
use std::vec::Vec;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_io::{ErrorKind, ErrorType};

use crate::{
    display::{SPACING_Y, Screen},
    fs::Filesystem,
    input::{KeyMask, KeySource},
    power::Platform,
};

/// Key source that plays back `(mask, samples)` runs, then reports no keys.
#[derive(Debug, Clone)]
pub struct ScriptedKeys {
    script: Vec<(KeyMask, usize)>,
    position: usize,
    remaining: usize,
    samples: usize,
}

impl ScriptedKeys {
    pub fn new(script: &[(KeyMask, usize)]) -> Self {
        let mut keys = Self {
            script: script.to_vec(),
            position: 0,
            remaining: 0,
            samples: 0,
        };
        keys.remaining = keys.script.first().map_or(0, |&(_, n)| n);
        keys
    }

    /// Script that presses each mask once for `hold` samples, separated by
    /// releases.
    pub fn presses(masks: &[KeyMask], hold: usize) -> Self {
        let mut script = Vec::new();
        for &mask in masks {
            script.push((KeyMask::empty(), 1));
            script.push((mask, hold));
        }
        Self::new(&script)
    }

    /// Number of samples taken so far.
    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.script.len()
    }
}

impl KeySource for ScriptedKeys {
    fn sample(&mut self) -> KeyMask {
        self.samples += 1;
        while self.remaining == 0 {
            self.position += 1;
            match self.script.get(self.position) {
                Some(&(_, n)) => self.remaining = n,
                None => return KeyMask::empty(),
            }
        }
        self.remaining -= 1;
        self.script[self.position].0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockFsError(pub ErrorKind);

impl embedded_io::Error for MockFsError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Filesystem operation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsOp {
    Read { path: String },
    Write { path: String, data: Vec<u8> },
    Delete { path: String },
}

/// In-memory SD card
#[derive(Debug, Default)]
pub struct MemoryFs {
    files: BTreeMap<String, Vec<u8>>,
    ops: RefCell<Vec<FsOp>>,
    fail_writes: bool,
    fail_deletes: bool,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, data: &[u8]) {
        self.files.insert(path.to_string(), data.to_vec());
    }

    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.files.get(path).cloned()
    }

    /// Get operation log (for test verification)
    pub fn ops(&self) -> Vec<FsOp> {
        self.ops.borrow().clone()
    }

    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Make every delete fail with a non-NotFound error.
    pub fn fail_deletes(&mut self, fail: bool) {
        self.fail_deletes = fail;
    }
}

impl ErrorType for MemoryFs {
    type Error = MockFsError;
}

impl Filesystem for MemoryFs {
    fn read(&mut self, path: &str, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.ops.borrow_mut().push(FsOp::Read {
            path: path.to_string(),
        });
        let data = self
            .files
            .get(path)
            .ok_or(MockFsError(ErrorKind::NotFound))?;
        let len = buf.len().min(data.len());
        buf[..len].copy_from_slice(&data[..len]);
        Ok(len)
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), Self::Error> {
        self.ops.borrow_mut().push(FsOp::Write {
            path: path.to_string(),
            data: data.to_vec(),
        });
        if self.fail_writes {
            return Err(MockFsError(ErrorKind::OutOfMemory));
        }
        self.files.insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, path: &str) -> Result<(), Self::Error> {
        self.ops.borrow_mut().push(FsOp::Delete {
            path: path.to_string(),
        });
        if self.fail_deletes {
            return Err(MockFsError(ErrorKind::PermissionDenied));
        }
        self.files
            .remove(path)
            .map(|_| ())
            .ok_or(MockFsError(ErrorKind::NotFound))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformOp {
    I2cWrite { device: u8, register: u8, value: u8 },
    ClearBootEnv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockI2cError;

#[derive(Debug, Default)]
pub struct MockPlatform {
    ops: Vec<PlatformOp>,
    fail_i2c: bool,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<PlatformOp> {
        self.ops.clone()
    }

    pub fn fail_i2c(&mut self, fail: bool) {
        self.fail_i2c = fail;
    }
}

impl Platform for MockPlatform {
    type Error = MockI2cError;

    fn i2c_write_register(&mut self, device: u8, register: u8, value: u8)
        -> Result<(), Self::Error> {
        self.ops.push(PlatformOp::I2cWrite {
            device,
            register,
            value,
        });
        if self.fail_i2c {
            Err(MockI2cError)
        } else {
            Ok(())
        }
    }

    fn clear_boot_env(&mut self) {
        self.ops.push(PlatformOp::ClearBootEnv);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    Init,
    String {
        text: String,
        x: i32,
        y: i32,
        color: Rgb888,
    },
    Character {
        character: char,
        x: i32,
        y: i32,
        color: Rgb888,
    },
    Present,
}

/// Screen that records draw calls instead of rasterizing them.
#[derive(Debug, Default)]
pub struct RecordingScreen {
    ops: Vec<DrawOp>,
}

impl RecordingScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn strings(&self) -> Vec<(String, i32, i32, Rgb888)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::String { text, x, y, color } => Some((text.clone(), *x, *y, *color)),
                _ => None,
            })
            .collect()
    }

    pub fn characters(&self) -> Vec<(char, i32, i32, Rgb888)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Character {
                    character,
                    x,
                    y,
                    color,
                } => Some((*character, *x, *y, *color)),
                _ => None,
            })
            .collect()
    }
}

impl Screen for RecordingScreen {
    fn init_screens(&mut self) {
        self.ops.push(DrawOp::Init);
    }

    fn draw_string(&mut self, text: &str, x: i32, y: i32, color: Rgb888) -> i32 {
        self.ops.push(DrawOp::String {
            text: text.to_string(),
            x,
            y,
            color,
        });
        y + SPACING_Y * text.matches('\n').count() as i32
    }

    fn draw_character(&mut self, character: char, x: i32, y: i32, color: Rgb888) {
        self.ops.push(DrawOp::Character {
            character,
            x,
            y,
            color,
        });
    }

    fn present(&mut self) {
        self.ops.push(DrawOp::Present);
    }
}
