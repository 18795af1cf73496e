//! Packed boot configuration word and its on-card persistence.
//!
//! The word is stored as its low three bytes, little-endian:
//!
//! | bits  | meaning                                          |
//! |-------|--------------------------------------------------|
//! | 0     | Updated SysNAND mode (A9LH-only)                 |
//! | 1     | Use pre-patched FIRMs                            |
//! | 2     | Force A9LH detection                             |
//! | 3     | Use 9.0 FIRM as default                          |
//! | 4     | Use second EmuNAND as default                    |
//! | 5     | Show current NAND in System Settings             |
//! | 6     | Show GBA boot screen in patched AGB_FIRM         |
//! | 7-9   | not used by the menu, carried through untouched  |
//! | 10-11 | screen-init brightness level                     |
//! | 12-23 | last-used boot options, owned by the loader      |

use bitfield::bitfield;
use embedded_io::{Error as _, ErrorKind};
use log::{debug, info};

use crate::{error::Error, fs::Filesystem};

pub const CONFIG_PATH: &str = "/aurei/config.bin";

/// Size of the persisted word on the card.
pub const CONFIG_SIZE: usize = 3;

pub const CHECKBOX_COUNT: usize = 7;

const CHECKBOX_MASK: u32 = (1 << CHECKBOX_COUNT) - 1;
const BRIGHTNESS_SHIFT: u32 = 10;
const BRIGHTNESS_MASK: u32 = 0b11 << BRIGHTNESS_SHIFT;
/// Bits the menu never rewrites: the unused 7-9 gap and the last-used boot options.
const PRESERVED_MASK: u32 = 0xFFF000 | 0b111 << CHECKBOX_COUNT;
const WORD_MASK: u32 = 0xFF_FFFF;

bitfield! {
    /// The single persisted configuration value.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct ConfigWord(u32);
    impl Debug;
    pub updated_sysnand, set_updated_sysnand: 0;
    pub use_prepatched_firms, set_use_prepatched_firms: 1;
    pub force_a9lh_detection, set_force_a9lh_detection: 2;
    pub use_90_firm, set_use_90_firm: 3;
    pub use_second_emunand, set_use_second_emunand: 4;
    pub show_nand_in_settings, set_show_nand_in_settings: 5;
    pub show_gba_boot_screen, set_show_gba_boot_screen: 6;
    pub u8, brightness_level, set_brightness_level: 11, 10;
    /// Set by the loader when the previous boot ran A9LH on an updated SysNAND.
    pub prior_updated_sysnand, _: 16;
    pub u16, last_boot_options, _: 23, 12;
}

impl ConfigWord {
    pub const fn new(raw: u32) -> Self {
        ConfigWord(raw & WORD_MASK)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn checkbox(self, index: usize) -> bool {
        (self.0 >> index) & 1 != 0
    }

    pub fn brightness(self) -> Brightness {
        Brightness::from_level(self.brightness_level())
    }

    pub const fn to_bytes(self) -> [u8; CONFIG_SIZE] {
        let bytes = self.0.to_le_bytes();
        [bytes[0], bytes[1], bytes[2]]
    }

    pub const fn from_bytes(bytes: [u8; CONFIG_SIZE]) -> Self {
        ConfigWord(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]))
    }
}

/// Screen-init brightness. The stored level counts down from the brightest
/// setting, so level 0 is labelled "4" on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Brightness(u8);

impl Brightness {
    pub const LEVELS: u8 = 4;

    pub const fn from_level(level: u8) -> Self {
        Brightness(level % Self::LEVELS)
    }

    pub const fn level(self) -> u8 {
        self.0
    }

    /// Next level, wrapping 3 back to 0.
    pub const fn next(self) -> Self {
        Brightness((self.0 + 1) % Self::LEVELS)
    }
}

/// The seven checkbox settings, in bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckboxOption {
    UpdatedSysNand,
    PrePatchedFirms,
    ForceA9lh,
    Use90Firm,
    SecondEmuNand,
    ShowNandInSettings,
    ShowGbaBootScreen,
}

impl CheckboxOption {
    pub const ALL: [CheckboxOption; CHECKBOX_COUNT] = [
        CheckboxOption::UpdatedSysNand,
        CheckboxOption::PrePatchedFirms,
        CheckboxOption::ForceA9lh,
        CheckboxOption::Use90Firm,
        CheckboxOption::SecondEmuNand,
        CheckboxOption::ShowNandInSettings,
        CheckboxOption::ShowGbaBootScreen,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn label(self) -> &'static str {
        match self {
            CheckboxOption::UpdatedSysNand => "( ) Updated SysNAND mode (A9LH-only)",
            CheckboxOption::PrePatchedFirms => "( ) Use pre-patched FIRMs",
            CheckboxOption::ForceA9lh => "( ) Force A9LH detection",
            CheckboxOption::Use90Firm => "( ) Use 9.0 FIRM as default",
            CheckboxOption::SecondEmuNand => "( ) Use second EmuNAND as default",
            CheckboxOption::ShowNandInSettings => "( ) Show current NAND in System Settings",
            CheckboxOption::ShowGbaBootScreen => "( ) Show GBA boot screen in patched AGB_FIRM",
        }
    }
}

/// Editable view of the menu-owned part of a [`ConfigWord`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionSet {
    pub checkboxes: [bool; CHECKBOX_COUNT],
    pub brightness: Brightness,
}

impl OptionSet {
    pub fn decode(word: ConfigWord) -> Self {
        let mut checkboxes = [false; CHECKBOX_COUNT];
        for (index, checkbox) in checkboxes.iter_mut().enumerate() {
            *checkbox = word.checkbox(index);
        }
        OptionSet {
            checkboxes,
            brightness: word.brightness(),
        }
    }

    pub fn is_enabled(&self, option: CheckboxOption) -> bool {
        self.checkboxes[option.index()]
    }

    /// Rewrite the checkbox and brightness bits of `word`, leaving every
    /// other bit as it was.
    pub fn encode_into(&self, word: ConfigWord) -> ConfigWord {
        let mut raw = word.raw() & PRESERVED_MASK;
        for (index, &enabled) in self.checkboxes.iter().enumerate() {
            raw |= (enabled as u32) << index;
        }
        raw |= (self.brightness.level() as u32) << BRIGHTNESS_SHIFT;
        debug_assert_eq!(raw & !(PRESERVED_MASK | CHECKBOX_MASK | BRIGHTNESS_MASK), 0);
        ConfigWord(raw)
    }
}

/// Read the persisted word. A card without a config file boots with every
/// option off.
pub fn load_config<F: Filesystem>(fs: &mut F, path: &str) -> Result<ConfigWord, Error<F::Error>> {
    let mut bytes = [0u8; CONFIG_SIZE];
    match fs.read(path, &mut bytes) {
        Ok(CONFIG_SIZE) => {
            let word = ConfigWord::from_bytes(bytes);
            info!("Loaded configuration {:#08x} from {}", word.raw(), path);
            Ok(word)
        }
        Ok(read) => Err(Error::ShortConfig(read)),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("No configuration at {}, using defaults", path);
            Ok(ConfigWord::default())
        }
        Err(err) => Err(Error::Read(err)),
    }
}

pub fn save_config<F: Filesystem>(
    fs: &mut F,
    path: &str,
    word: ConfigWord,
) -> Result<(), Error<F::Error>> {
    info!("Saving configuration {:#08x} to {}", word.raw(), path);
    fs.write(path, &word.to_bytes()).map_err(Error::Write)
}
