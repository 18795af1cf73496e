//! Reboot and shutdown through the MCU.
//!
//! Both triggers are fire-and-forget: the MCU cuts power asynchronously, so
//! the ARM9 spins until that happens and never observes the outcome.

use core::fmt::Debug;

use log::{error, info};

/// I2C device index of the power-management MCU.
pub const I2C_DEV_MCU: u8 = 3;
pub const MCU_POWER_REGISTER: u8 = 0x20;
pub const MCU_POWER_OFF: u8 = 1;
pub const MCU_REBOOT: u8 = 1 << 2;

/// Hardware the boot menu pokes directly.
pub trait Platform {
    type Error: Debug;

    fn i2c_write_register(&mut self, device: u8, register: u8, value: u8)
        -> Result<(), Self::Error>;

    /// Zero the boot environment register so the next boot is treated as a
    /// cold boot rather than a return from a previously launched FIRM.
    fn clear_boot_env(&mut self);
}

impl<P: Platform + ?Sized> Platform for &mut P {
    type Error = P::Error;

    fn i2c_write_register(&mut self, device: u8, register: u8, value: u8)
        -> Result<(), Self::Error> {
        (**self).i2c_write_register(device, register, value)
    }

    fn clear_boot_env(&mut self) {
        (**self).clear_boot_env()
    }
}

fn write_power_register<P: Platform>(platform: &mut P, value: u8) {
    if let Err(err) = platform.i2c_write_register(I2C_DEV_MCU, MCU_POWER_REGISTER, value) {
        error!("MCU power register write failed: {:?}", err);
    }
}

pub fn request_reboot<P: Platform>(platform: &mut P) {
    info!("Requesting reboot");
    write_power_register(platform, MCU_REBOOT);
}

pub fn request_shutdown<P: Platform>(platform: &mut P) {
    info!("Requesting shutdown");
    write_power_register(platform, MCU_POWER_OFF);
}

/// Spin until the MCU pulls the power.
pub fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
