//! Boot configuration screen.
//!
//! One modal screen: seven checkboxes and a brightness selector, driven by
//! the d-pad, A and START. START commits the new word to the card and reboots
//! the console; the screen never returns to its caller.

use core::fmt::Write;

use embedded_graphics::pixelcolor::Rgb888;
use heapless::String;
use log::{debug, info};

use crate::{
    config::{self, CHECKBOX_COUNT, CheckboxOption, ConfigWord, OptionSet},
    display::{COLOR_BLACK, COLOR_RED, COLOR_TITLE, COLOR_WHITE, SPACING_X, SPACING_Y, Screen},
    error::{self, Error},
    firms::{self, FIRM_COUNT, PATCHED_AGB_FIRM, PATCHED_DEFAULT_FIRM},
    fs::Filesystem,
    input::{Buttons, InputReader, KeyMask, KeySource},
    power::{self, Platform},
};

pub const CONFIG_TITLE: &str = "Boot configuration";
const HELP_TEXT: &str = "Press A to select, START to save and reboot";
const BRIGHTNESS_TEXT: &str = "Screen-init brightness: 4( ) 3( ) 2( ) 1( )";

const MARGIN_X: i32 = 10;
const TITLE_Y: i32 = 10;
const HELP_Y: i32 = 30;
const BRIGHTNESS_Y: i32 = 53;
/// Column of the first brightness marker, and the stride between markers.
const BRIGHTNESS_MARKER_COLUMN: i32 = 26;
const BRIGHTNESS_MARKER_STRIDE: i32 = 5;

/// Keys that wake the menu. Anything else is polled past.
pub const MENU_BUTTONS: KeyMask = KeyMask::empty()
    .with(Buttons::Up)
    .with(Buttons::Down)
    .with(Buttons::Left)
    .with(Buttons::Right)
    .with(Buttons::A)
    .with(Buttons::Start);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    Up,
    Down,
    Left,
    Right,
    Toggle,
    Save,
}

impl MenuKey {
    /// Only a mask holding exactly one menu key dispatches. A chord such as
    /// A+Up wakes the menu but does nothing.
    pub fn from_mask(mask: KeyMask) -> Option<Self> {
        [
            (Buttons::Up, MenuKey::Up),
            (Buttons::Down, MenuKey::Down),
            (Buttons::Left, MenuKey::Left),
            (Buttons::Right, MenuKey::Right),
            (Buttons::A, MenuKey::Toggle),
            (Buttons::Start, MenuKey::Save),
        ]
        .into_iter()
        .find(|&(button, _)| mask == KeyMask::from(button))
        .map(|(_, key)| key)
    }
}

/// What a cursor position points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Checkbox(usize),
    Brightness,
}

/// Menu cursor: 0..=6 are the checkboxes, 7 is the brightness row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor(u8);

impl Cursor {
    pub const BRIGHTNESS: Cursor = Cursor(CHECKBOX_COUNT as u8);
    const LAST_CHECKBOX: Cursor = Cursor(CHECKBOX_COUNT as u8 - 1);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn slot(self) -> Slot {
        if self == Self::BRIGHTNESS {
            Slot::Brightness
        } else {
            Slot::Checkbox(self.index())
        }
    }

    /// Up wraps from the first checkbox to the brightness row.
    pub fn up(self) -> Self {
        if self.0 == 0 { Self::BRIGHTNESS } else { Cursor(self.0 - 1) }
    }

    /// Down wraps from the last checkbox back to the first, so the
    /// brightness row is only reachable going up. From the brightness row
    /// Down also lands on the first checkbox.
    pub fn down(self) -> Self {
        if self.0 >= Self::LAST_CHECKBOX.0 { Cursor(0) } else { Cursor(self.0 + 1) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Idle,
    Confirmed,
}

/// Screen rows of the last rendered frame, brightness row in the last slot.
type Layout = [i32; CHECKBOX_COUNT + 1];

pub struct ConfigMenu {
    options: OptionSet,
    cursor: Cursor,
    rows: Layout,
}

impl ConfigMenu {
    pub fn new(word: ConfigWord) -> Self {
        let options = OptionSet::decode(word);
        info!(
            "Configuration menu opened with {:#08x} ({:?})",
            word.raw(),
            options
        );
        ConfigMenu {
            options,
            cursor: Cursor::default(),
            rows: [0; CHECKBOX_COUNT + 1],
        }
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn rows(&self) -> &Layout {
        &self.rows
    }

    pub fn handle(&mut self, key: MenuKey) -> MenuState {
        debug!("Menu key {:?} at {:?}", key, self.cursor.slot());
        match key {
            MenuKey::Up => self.cursor = self.cursor.up(),
            MenuKey::Down => self.cursor = self.cursor.down(),
            MenuKey::Left => self.cursor = Cursor(0),
            MenuKey::Right => self.cursor = Cursor::LAST_CHECKBOX,
            MenuKey::Toggle => match self.cursor.slot() {
                Slot::Checkbox(index) => {
                    self.options.checkboxes[index] = !self.options.checkboxes[index]
                }
                Slot::Brightness => self.options.brightness = self.options.brightness.next(),
            },
            MenuKey::Save => return MenuState::Confirmed,
        }
        MenuState::Idle
    }

    fn line_color(&self, slot: Slot) -> Rgb888 {
        if self.cursor.slot() == slot { COLOR_RED } else { COLOR_WHITE }
    }

    fn marker_color(&self, enabled: bool, slot: Slot) -> Rgb888 {
        if enabled { self.line_color(slot) } else { COLOR_BLACK }
    }

    /// Draw the option rows. The title and help text are drawn once by
    /// [`ConfigMenu::run`].
    pub fn render<S: Screen>(&mut self, screen: &mut S) {
        let brightness_y = screen.draw_string(
            BRIGHTNESS_TEXT,
            MARGIN_X,
            BRIGHTNESS_Y,
            self.line_color(Slot::Brightness),
        );
        self.rows[CHECKBOX_COUNT] = brightness_y;

        let mut y = brightness_y + SPACING_Y;
        for option in CheckboxOption::ALL {
            let index = option.index();
            let slot = Slot::Checkbox(index);
            y = screen.draw_string(option.label(), MARGIN_X, y + SPACING_Y, self.line_color(slot));
            self.rows[index] = y;
            screen.draw_character(
                'x',
                MARGIN_X + SPACING_X,
                y,
                self.marker_color(self.options.checkboxes[index], slot),
            );
        }

        for level in 0..4u8 {
            let column = BRIGHTNESS_MARKER_COLUMN + BRIGHTNESS_MARKER_STRIDE * level as i32;
            screen.draw_character(
                'x',
                MARGIN_X + column * SPACING_X,
                brightness_y,
                self.marker_color(self.options.brightness.level() == level, Slot::Brightness),
            );
        }

        screen.present();
    }

    /// Modal loop. Renders, waits for a menu key, applies it, and repeats
    /// until START; returns the edited options.
    pub fn run<S, K>(&mut self, screen: &mut S, input: &mut InputReader<K>) -> OptionSet
    where
        S: Screen,
        K: KeySource,
    {
        screen.init_screens();
        screen.draw_string(CONFIG_TITLE, MARGIN_X, TITLE_Y, COLOR_TITLE);
        screen.draw_string(HELP_TEXT, MARGIN_X, HELP_Y, COLOR_WHITE);

        loop {
            let pressed = loop {
                self.render(screen);
                let pressed = input.wait_for_confirmed_key();
                if pressed.intersects(MENU_BUTTONS) {
                    break pressed;
                }
            };

            if let Some(key) = MenuKey::from_mask(pressed) {
                if self.handle(key) == MenuState::Confirmed {
                    return self.options;
                }
            }
        }
    }
}

/// Apply the edited options: drop cached FIRMs the change invalidated, then
/// write the new word to `config_path`. Returns the word that was written.
///
/// The invalidation checks compare against `old`, the word the menu was
/// opened with.
pub fn commit<F: Filesystem>(
    fs: &mut F,
    old: ConfigWord,
    options: &OptionSet,
    config_path: &str,
    patched_firms: &[&str; FIRM_COUNT],
) -> Result<ConfigWord, Error<F::Error>> {
    // The patched 9.0 FIRM is built for one SysNAND mode.
    if old.prior_updated_sysnand()
        && old.updated_sysnand() != options.is_enabled(CheckboxOption::UpdatedSysNand)
    {
        firms::delete_firm(fs, patched_firms[PATCHED_DEFAULT_FIRM]);
    }

    if old.show_gba_boot_screen() != options.is_enabled(CheckboxOption::ShowGbaBootScreen) {
        firms::delete_firm(fs, patched_firms[PATCHED_AGB_FIRM]);
    }

    let word = options.encode_into(old);
    config::save_config(fs, config_path, word)?;
    Ok(word)
}

/// Everything the configuration screen drives.
pub struct MenuContext<'a, S, K, F, P> {
    pub screen: &'a mut S,
    pub input: &'a mut InputReader<K>,
    pub fs: &'a mut F,
    pub platform: &'a mut P,
}

/// Commit the options, then clear the boot environment and request the
/// reboot. Nothing touches the platform when the commit fails.
pub fn save_and_reboot<F: Filesystem, P: Platform>(
    fs: &mut F,
    platform: &mut P,
    old: ConfigWord,
    options: &OptionSet,
    config_path: &str,
    patched_firms: &[&str; FIRM_COUNT],
) -> Result<ConfigWord, Error<F::Error>> {
    let word = commit(fs, old, options, config_path, patched_firms)?;
    info!("Configuration saved: {:#08x}", word.raw());

    platform.clear_boot_env();
    power::request_reboot(platform);
    Ok(word)
}

/// Everything after START: either a reboot request, or the error screen
/// followed by a shutdown request.
pub fn finish<S, K, F, P>(
    ctx: &mut MenuContext<'_, S, K, F, P>,
    old: ConfigWord,
    options: &OptionSet,
    config_path: &str,
    patched_firms: &[&str; FIRM_COUNT],
) -> Result<ConfigWord, Error<F::Error>>
where
    S: Screen,
    K: KeySource,
    F: Filesystem,
    P: Platform,
{
    save_and_reboot(ctx.fs, ctx.platform, old, options, config_path, patched_firms).inspect_err(
        |err| {
            // On overflow `write!` stops at the first fragment that does not
            // fit; the text before it is still shown.
            let mut message: String<96> = String::new();
            let _ = write!(message, "{}", err);
            error::report_fatal_error(ctx.screen, ctx.input, ctx.platform, &message);
        },
    )
}

/// Run the configuration screen, save the result and reboot.
pub fn configure<S, K, F, P>(
    mut ctx: MenuContext<'_, S, K, F, P>,
    config: ConfigWord,
    config_path: &str,
    patched_firms: &[&str; FIRM_COUNT],
) -> !
where
    S: Screen,
    K: KeySource,
    F: Filesystem,
    P: Platform,
{
    let mut menu = ConfigMenu::new(config);
    let options = menu.run(ctx.screen, ctx.input);

    let _ = finish(&mut ctx, config, &options, config_path, patched_firms);
    power::halt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Brightness, CONFIG_PATH},
        firms::PATCHED_FIRMS,
        mock::{DrawOp, FsOp, MemoryFs, MockPlatform, PlatformOp, RecordingScreen, ScriptedKeys},
        power::{I2C_DEV_MCU, MCU_POWER_OFF, MCU_POWER_REGISTER, MCU_REBOOT},
    };
    use std::vec::Vec;

    fn press(button: Buttons) -> KeyMask {
        KeyMask::from(button)
    }

    fn run_menu(word: ConfigWord, masks: &[KeyMask]) -> OptionSet {
        let mut screen = RecordingScreen::new();
        let mut input = InputReader::with_debounce(ScriptedKeys::presses(masks, 3), 2);
        ConfigMenu::new(word).run(&mut screen, &mut input)
    }

    fn deleted(fs: &MemoryFs) -> Vec<std::string::String> {
        fs.ops()
            .into_iter()
            .filter_map(|op| match op {
                FsOp::Delete { path } => Some(path),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_up_wraps_to_brightness_down_wraps_to_first() {
        assert_eq!(Cursor(0).up(), Cursor::BRIGHTNESS);
        assert_eq!(Cursor(6).down(), Cursor(0));
        assert_eq!(Cursor::BRIGHTNESS.down(), Cursor(0));
        assert_eq!(Cursor::BRIGHTNESS.up(), Cursor(6));
        assert_eq!(Cursor(3).down(), Cursor(4));
        assert_eq!(Cursor(3).up(), Cursor(2));
    }

    #[test]
    fn test_left_and_right_jump_to_checkbox_ends() {
        for start in 0..=7u8 {
            let mut menu = ConfigMenu::new(ConfigWord::default());
            menu.cursor = Cursor(start);
            menu.handle(MenuKey::Left);
            assert_eq!(menu.cursor(), Cursor(0));

            menu.cursor = Cursor(start);
            menu.handle(MenuKey::Right);
            assert_eq!(menu.cursor(), Cursor(6));
            assert_eq!(menu.cursor().slot(), Slot::Checkbox(6));
        }
    }

    #[test]
    fn test_down_never_reaches_brightness() {
        let mut menu = ConfigMenu::new(ConfigWord::default());
        for _ in 0..32 {
            menu.handle(MenuKey::Down);
            assert_ne!(menu.cursor().slot(), Slot::Brightness);
        }
    }

    #[test]
    fn test_toggle_flips_checkbox_and_advances_brightness() {
        let mut menu = ConfigMenu::new(ConfigWord::new(0x000C00));
        assert_eq!(menu.handle(MenuKey::Toggle), MenuState::Idle);
        assert!(menu.options().checkboxes[0]);
        menu.handle(MenuKey::Toggle);
        assert!(!menu.options().checkboxes[0]);

        menu.handle(MenuKey::Up);
        assert_eq!(menu.cursor().slot(), Slot::Brightness);
        let levels: Vec<u8> = (0..4)
            .map(|_| {
                menu.handle(MenuKey::Toggle);
                menu.options().brightness.level()
            })
            .collect();
        assert_eq!(levels, [0, 1, 2, 3]);
        assert_eq!(menu.options().checkboxes, [false; CHECKBOX_COUNT]);
    }

    #[test]
    fn test_save_confirms() {
        let mut menu = ConfigMenu::new(ConfigWord::default());
        assert_eq!(menu.handle(MenuKey::Save), MenuState::Confirmed);
    }

    #[test]
    fn test_only_single_menu_keys_dispatch() {
        assert_eq!(MenuKey::from_mask(press(Buttons::A)), Some(MenuKey::Toggle));
        assert_eq!(MenuKey::from_mask(press(Buttons::Start)), Some(MenuKey::Save));
        assert_eq!(MenuKey::from_mask(press(Buttons::B)), None);
        assert_eq!(MenuKey::from_mask(press(Buttons::A) | Buttons::Up), None);
        assert!(!press(Buttons::Select).intersects(MENU_BUTTONS));
        assert!((press(Buttons::A) | Buttons::L).intersects(MENU_BUTTONS));
    }

    #[test]
    fn test_render_layout() {
        let mut screen = RecordingScreen::new();
        let mut menu = ConfigMenu::new(ConfigWord::new(0x000841));
        menu.render(&mut screen);

        let rows = *menu.rows();
        assert_eq!(rows[CHECKBOX_COUNT], BRIGHTNESS_Y);
        assert_eq!(rows[0], BRIGHTNESS_Y + 2 * SPACING_Y);
        for i in 1..CHECKBOX_COUNT {
            assert_eq!(rows[i], rows[i - 1] + SPACING_Y);
        }

        let strings = screen.strings();
        assert_eq!(strings[0].0, BRIGHTNESS_TEXT);
        assert_eq!(strings[0].3, COLOR_WHITE);
        assert_eq!(strings[1].0, CheckboxOption::UpdatedSysNand.label());
        assert_eq!(strings[1].3, COLOR_RED);
        assert_eq!(strings[2].3, COLOR_WHITE);

        let marks = screen.characters();
        // Checkbox 0 is enabled and selected, 1 is disabled, 6 is enabled.
        assert_eq!(marks[0], ('x', MARGIN_X + SPACING_X, rows[0], COLOR_RED));
        assert_eq!(marks[1].3, COLOR_BLACK);
        assert_eq!(marks[6].3, COLOR_WHITE);
        // Brightness level 2 is the only lit marker on its row.
        let brightness: Vec<_> = marks[CHECKBOX_COUNT..].iter().map(|m| (m.1, m.3)).collect();
        assert_eq!(
            brightness,
            [
                (MARGIN_X + 26 * SPACING_X, COLOR_BLACK),
                (MARGIN_X + 31 * SPACING_X, COLOR_BLACK),
                (MARGIN_X + 36 * SPACING_X, COLOR_WHITE),
                (MARGIN_X + 41 * SPACING_X, COLOR_BLACK),
            ]
        );
        assert_eq!(screen.ops().last(), Some(&DrawOp::Present));
    }

    #[test]
    fn test_run_ignores_other_keys_and_chords() {
        let options = run_menu(
            ConfigWord::default(),
            &[
                press(Buttons::B),
                press(Buttons::A) | Buttons::Up,
                press(Buttons::Down),
                press(Buttons::A),
                press(Buttons::Start),
            ],
        );
        assert_eq!(options.checkboxes, [false, true, false, false, false, false, false]);
        assert_eq!(options.brightness, Brightness::default());
    }

    #[test]
    fn test_run_draws_title_once() {
        let mut screen = RecordingScreen::new();
        let keys = ScriptedKeys::presses(&[press(Buttons::Down), press(Buttons::Start)], 3);
        let mut input = InputReader::with_debounce(keys, 2);
        ConfigMenu::new(ConfigWord::default()).run(&mut screen, &mut input);

        let strings = screen.strings();
        assert_eq!(strings.iter().filter(|s| s.0 == CONFIG_TITLE).count(), 1);
        assert_eq!(strings[0], (CONFIG_TITLE.into(), MARGIN_X, TITLE_Y, COLOR_TITLE));
        assert_eq!(screen.ops()[0], DrawOp::Init);
        // One frame per key press.
        let frames = screen.ops().iter().filter(|op| **op == DrawOp::Present).count();
        assert_eq!(frames, 2);
    }

    #[test]
    fn test_sysnand_change_drops_patched_default_firm() {
        let old = ConfigWord::new(0x010000);
        let mut options = OptionSet::decode(old);
        options.checkboxes[0] = true;

        let mut fs = MemoryFs::new();
        fs.insert(PATCHED_FIRMS[PATCHED_DEFAULT_FIRM], &[0xAA]);
        commit(&mut fs, old, &options, CONFIG_PATH, &PATCHED_FIRMS).unwrap();

        assert_eq!(deleted(&fs), [PATCHED_FIRMS[PATCHED_DEFAULT_FIRM]]);
        assert!(fs.contents(PATCHED_FIRMS[PATCHED_DEFAULT_FIRM]).is_none());
    }

    #[test]
    fn test_sysnand_change_without_a9lh_history_keeps_cache() {
        let old = ConfigWord::new(0x000000);
        let mut options = OptionSet::decode(old);
        options.checkboxes[0] = true;

        let mut fs = MemoryFs::new();
        commit(&mut fs, old, &options, CONFIG_PATH, &PATCHED_FIRMS).unwrap();
        assert!(deleted(&fs).is_empty());
    }

    #[test]
    fn test_gba_screen_change_drops_patched_agb_firm() {
        let old = ConfigWord::new(0x000040);
        let mut options = OptionSet::decode(old);
        options.checkboxes[6] = false;

        let mut fs = MemoryFs::new();
        commit(&mut fs, old, &options, CONFIG_PATH, &PATCHED_FIRMS).unwrap();
        assert_eq!(deleted(&fs), [PATCHED_FIRMS[PATCHED_AGB_FIRM]]);

        let mut fs = MemoryFs::new();
        let unchanged = OptionSet::decode(old);
        commit(&mut fs, old, &unchanged, CONFIG_PATH, &PATCHED_FIRMS).unwrap();
        assert!(deleted(&fs).is_empty());
    }

    #[test]
    fn test_commit_deletes_before_writing() {
        let old = ConfigWord::new(0x010040);
        let mut options = OptionSet::decode(old);
        options.checkboxes[0] = true;
        options.checkboxes[6] = false;

        let mut fs = MemoryFs::new();
        let word = commit(&mut fs, old, &options, CONFIG_PATH, &PATCHED_FIRMS).unwrap();
        assert_eq!(word.raw(), 0x010001);
        assert_eq!(
            fs.ops(),
            [
                FsOp::Delete {
                    path: PATCHED_FIRMS[PATCHED_DEFAULT_FIRM].into()
                },
                FsOp::Delete {
                    path: PATCHED_FIRMS[PATCHED_AGB_FIRM].into()
                },
                FsOp::Write {
                    path: CONFIG_PATH.into(),
                    data: [0x01, 0x00, 0x01].to_vec(),
                },
            ]
        );
    }

    #[test]
    fn test_commit_reports_write_failure() {
        let old = ConfigWord::default();
        let mut fs = MemoryFs::new();
        fs.fail_writes(true);
        let result = commit(&mut fs, old, &OptionSet::decode(old), CONFIG_PATH, &PATCHED_FIRMS);
        assert!(matches!(result, Err(Error::Write(_))));
    }

    #[test]
    fn test_toggle_first_option_and_brightness_then_save() {
        let old = ConfigWord::new(0x000000);
        let options = run_menu(
            old,
            &[
                press(Buttons::A),
                press(Buttons::Up),
                press(Buttons::A),
                press(Buttons::Start),
            ],
        );

        let mut fs = MemoryFs::new();
        let word = commit(&mut fs, old, &options, CONFIG_PATH, &PATCHED_FIRMS).unwrap();
        assert_eq!(word.raw() & 0xFFF, 0b0100_0000_0001);
        assert_eq!(word.raw() & 0xFFF000, 0);
        assert_eq!(fs.contents(CONFIG_PATH).unwrap(), [0x01, 0x04, 0x00]);
    }

    #[test]
    fn test_save_keeps_last_boot_options() {
        let old = ConfigWord::new(0xA5A07F);
        let options = run_menu(
            old,
            &[
                press(Buttons::Right),
                press(Buttons::A),
                press(Buttons::Up),
                press(Buttons::Up),
                press(Buttons::Up),
                press(Buttons::Up),
                press(Buttons::Up),
                press(Buttons::Up),
                press(Buttons::Up),
                press(Buttons::A),
                press(Buttons::Start),
            ],
        );

        let mut fs = MemoryFs::new();
        let word = commit(&mut fs, old, &options, CONFIG_PATH, &PATCHED_FIRMS).unwrap();
        assert_eq!(word.last_boot_options(), 0xA5A);
        assert!(!word.show_gba_boot_screen());
        assert_eq!(word.brightness_level(), 1);
        assert_eq!(word.raw() & 0x3F, 0x3F);
    }

    #[test]
    fn test_save_clears_boot_env_before_reboot() {
        let old = ConfigWord::new(0x000000);
        let mut options = OptionSet::decode(old);
        options.checkboxes[2] = true;

        let mut screen = RecordingScreen::new();
        let mut input = InputReader::with_debounce(ScriptedKeys::new(&[]), 2);
        let mut fs = MemoryFs::new();
        let mut platform = MockPlatform::new();
        let mut ctx = MenuContext {
            screen: &mut screen,
            input: &mut input,
            fs: &mut fs,
            platform: &mut platform,
        };

        let word = finish(&mut ctx, old, &options, CONFIG_PATH, &PATCHED_FIRMS).unwrap();
        assert_eq!(word.raw(), 0x000004);
        assert_eq!(fs.contents(CONFIG_PATH).unwrap(), [0x04, 0x00, 0x00]);
        assert_eq!(
            platform.ops(),
            [
                PlatformOp::ClearBootEnv,
                PlatformOp::I2cWrite {
                    device: I2C_DEV_MCU,
                    register: MCU_POWER_REGISTER,
                    value: MCU_REBOOT,
                },
            ]
        );
        assert!(screen.ops().is_empty());
    }

    #[test]
    fn test_failed_save_shows_error_and_shuts_down() {
        let old = ConfigWord::default();
        let options = OptionSet::decode(old);

        let mut screen = RecordingScreen::new();
        let keys = ScriptedKeys::presses(&[press(Buttons::B)], 3);
        let mut input = InputReader::with_debounce(keys, 2);
        let mut fs = MemoryFs::new();
        fs.fail_writes(true);
        let mut platform = MockPlatform::new();
        let mut ctx = MenuContext {
            screen: &mut screen,
            input: &mut input,
            fs: &mut fs,
            platform: &mut platform,
        };

        let result = finish(&mut ctx, old, &options, CONFIG_PATH, &PATCHED_FIRMS);
        assert!(matches!(result, Err(Error::Write(_))));
        assert_eq!(
            platform.ops(),
            [PlatformOp::I2cWrite {
                device: I2C_DEV_MCU,
                register: MCU_POWER_REGISTER,
                value: MCU_POWER_OFF,
            }]
        );

        let strings = screen.strings();
        assert_eq!(strings[0].0, "An error has occurred:");
        assert!(strings[1].0.starts_with("Couldn't save the configuration\n"));
    }
}
