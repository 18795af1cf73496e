use std::convert::Infallible;

use bootcfg_core::power::{
    I2C_DEV_MCU, MCU_POWER_OFF, MCU_POWER_REGISTER, MCU_REBOOT, Platform,
};

/// Stand-in for the power-management MCU and the boot environment register.
pub struct HostMcu {
    boot_env: u32,
}

impl HostMcu {
    /// `boot_env` is what the register held when the loader started.
    pub fn new(boot_env: u32) -> Self {
        Self { boot_env }
    }
}

impl Platform for HostMcu {
    type Error = Infallible;

    fn i2c_write_register(&mut self, device: u8, register: u8, value: u8)
        -> Result<(), Self::Error> {
        log::debug!("I2C write dev={} reg={:#04x} value={:#04x}", device, register, value);
        if device == I2C_DEV_MCU && register == MCU_POWER_REGISTER {
            match value {
                MCU_REBOOT => {
                    log::info!("MCU: rebooting (boot env {:#x})", self.boot_env);
                    std::process::exit(0);
                }
                MCU_POWER_OFF => {
                    log::info!("MCU: powering off");
                    std::process::exit(0);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn clear_boot_env(&mut self) {
        self.boot_env = 0;
    }
}
