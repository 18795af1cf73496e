//! Error type of the persistence path and the fatal error screen.

use core::fmt;

use log::error;

use crate::{
    display::{COLOR_RED, COLOR_WHITE, SPACING_Y, Screen},
    input::{InputReader, KeyMask, KeySource},
    power::{self, Platform},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error<E> {
    /// Reading the configuration file failed.
    Read(E),
    /// Writing the configuration file failed.
    Write(E),
    /// The configuration file held fewer than three bytes.
    ShortConfig(usize),
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Read(err) => write!(f, "Couldn't read the configuration\n({:?})", err),
            Error::Write(err) => write!(f, "Couldn't save the configuration\n({:?})", err),
            Error::ShortConfig(len) => {
                write!(f, "The configuration file is corrupted\n({} bytes)", len)
            }
        }
    }
}

/// Draw the error screen and wait for a key. Any confirmed key counts,
/// not only the menu controls.
pub fn show_fatal_error<S, K>(screen: &mut S, input: &mut InputReader<K>, message: &str) -> KeyMask
where
    S: Screen,
    K: KeySource,
{
    error!("Fatal: {}", message);
    screen.init_screens();

    screen.draw_string("An error has occurred:", 10, 10, COLOR_RED);
    let y = screen.draw_string(message, 10, 30, COLOR_WHITE);
    screen.draw_string("Press any button to shutdown", 10, y + 2 * SPACING_Y, COLOR_WHITE);
    screen.present();

    input.wait_for_confirmed_key()
}

/// Show the error screen, then ask the MCU to power off once a key is
/// confirmed.
pub fn report_fatal_error<S, K, P>(
    screen: &mut S,
    input: &mut InputReader<K>,
    platform: &mut P,
    message: &str,
) where
    S: Screen,
    K: KeySource,
    P: Platform,
{
    show_fatal_error(screen, input, message);
    power::request_shutdown(platform);
}

/// The loader's only user-visible failure path. Nothing resumes from here;
/// the console powers off once the user has seen the message.
pub fn fatal_error<S, K, P>(
    screen: &mut S,
    input: &mut InputReader<K>,
    platform: &mut P,
    message: &str,
) -> !
where
    S: Screen,
    K: KeySource,
    P: Platform,
{
    report_fatal_error(screen, input, platform, message);
    power::halt()
}
