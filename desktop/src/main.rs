use std::{cell::RefCell, env, rc::Rc};

use bootcfg_core::{
    config::{CONFIG_PATH, load_config},
    display::Console,
    error::fatal_error,
    firms::PATCHED_FIRMS,
    framebuffer::{FrameBuffer, HEIGHT, WIDTH},
    input::InputReader,
    menu::{MenuContext, configure},
};

use crate::{
    display::{MinifbDisplay, MinifbKeys},
    mcu::HostMcu,
    sd_card::SdCardDir,
};

mod display;
mod mcu;
mod sd_card;

const DEFAULT_SD_ROOT: &str = "sdmc";
const DEFAULT_DEBOUNCE: u32 = 4;

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {}={:?}", name, value);
            default
        }),
        Err(_) => default,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Boot configuration simulator started");

    let sd_root: String = env_or("BOOTCFG_SD_ROOT", DEFAULT_SD_ROOT.to_string());
    let debounce = env_or("BOOTCFG_DEBOUNCE", DEFAULT_DEBOUNCE);
    let boot_env = env_or("BOOTCFG_BOOT_ENV", 0u32);
    log::info!("SD card root: {}, debounce: {} samples", sd_root, debounce);

    let mut window = minifb::Window::new(
        "Boot configuration",
        WIDTH,
        HEIGHT,
        minifb::WindowOptions {
            scale: minifb::Scale::X2,
            ..minifb::WindowOptions::default()
        },
    )
    .unwrap_or_else(|e| {
        panic!("Unable to open window: {}", e);
    });

    window.set_target_fps(60);
    let window = Rc::new(RefCell::new(window));

    let mut frame = Box::new(FrameBuffer::new());
    let mut screen = Console::new(&mut frame, MinifbDisplay::new(window.clone()));
    let mut input = InputReader::with_debounce(MinifbKeys::new(window), debounce);
    let mut fs = SdCardDir::new(sd_root);
    let mut mcu = HostMcu::new(boot_env);

    let config = match load_config(&mut fs, CONFIG_PATH) {
        Ok(config) => config,
        Err(err) => {
            let message = err.to_string();
            fatal_error(&mut screen, &mut input, &mut mcu, &message)
        }
    };

    configure(
        MenuContext {
            screen: &mut screen,
            input: &mut input,
            fs: &mut fs,
            platform: &mut mcu,
        },
        config,
        CONFIG_PATH,
        &PATCHED_FIRMS,
    )
}
