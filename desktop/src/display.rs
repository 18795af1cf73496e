use std::{cell::RefCell, rc::Rc};

use bootcfg_core::{
    display::Display,
    framebuffer::{FrameBuffer, HEIGHT, WIDTH},
    input::{Buttons, KeyMask, KeySource},
};
use embedded_graphics::pixelcolor::RgbColor;

const DISPLAY_BUFFER_SIZE: usize = WIDTH * HEIGHT;

const KEY_MAP: [(minifb::Key, Buttons); 12] = [
    (minifb::Key::Enter, Buttons::A),
    (minifb::Key::Backspace, Buttons::B),
    (minifb::Key::RightShift, Buttons::Select),
    (minifb::Key::Space, Buttons::Start),
    (minifb::Key::Right, Buttons::Right),
    (minifb::Key::Left, Buttons::Left),
    (minifb::Key::Up, Buttons::Up),
    (minifb::Key::Down, Buttons::Down),
    (minifb::Key::W, Buttons::R),
    (minifb::Key::Q, Buttons::L),
    (minifb::Key::X, Buttons::X),
    (minifb::Key::Y, Buttons::Y),
];

pub type SharedWindow = Rc<RefCell<minifb::Window>>;

/// Simulated top screen
pub struct MinifbDisplay {
    // Actual display buffer
    display_buffer: Vec<u32>,
    window: SharedWindow,
}

impl MinifbDisplay {
    pub fn new(window: SharedWindow) -> Self {
        Self {
            display_buffer: vec![0; DISPLAY_BUFFER_SIZE],
            window,
        }
    }

    fn update_display(&mut self) {
        if let Err(e) = self
            .window
            .borrow_mut()
            .update_with_buffer(&self.display_buffer, WIDTH, HEIGHT)
        {
            log::warn!("Failed to update window: {}", e);
        }
    }
}

impl Display for MinifbDisplay {
    fn init(&mut self) {
        log::debug!("Screens initialized");
    }

    fn show(&mut self, frame: &FrameBuffer) {
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let color = frame.pixel(x, y);
                self.display_buffer[y * WIDTH + x] =
                    (color.r() as u32) << 16 | (color.g() as u32) << 8 | color.b() as u32;
            }
        }
        self.update_display();
    }
}

/// Keyboard standing in for the console's HID pad.
pub struct MinifbKeys {
    window: SharedWindow,
}

impl MinifbKeys {
    pub fn new(window: SharedWindow) -> Self {
        Self { window }
    }
}

impl KeySource for MinifbKeys {
    fn sample(&mut self) -> KeyMask {
        let mut window = self.window.borrow_mut();
        if !window.is_open() {
            // The menu only ever leaves by rebooting; a closed window is a
            // pulled battery.
            log::info!("Window closed, powering off");
            std::process::exit(0);
        }
        window.update();

        let mut current = KeyMask::empty();
        for (key, button) in KEY_MAP {
            if window.is_key_down(key) {
                current |= button;
            }
        }
        log::trace!("Key mask: {:012b}", current.bits());
        current
    }
}
