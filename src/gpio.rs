//! Button inputs over sysfs GPIO

use anyhow::Context;
use linux_embedded_hal::{sysfs_gpio::Direction, SysfsPin};

pub type Pin = SysfsPin;

/// Initialize a GPIO pin as an input. The buttons are wired with pull-ups, so
/// an idle pin reads high.
pub fn init_pin(pin_num: u64) -> anyhow::Result<Pin> {
    let pin = SysfsPin::new(pin_num);
    pin.export().context("Error exporting pin")?;
    while !pin.is_exported() {}
    pin.set_direction(Direction::In)
        .context("Error setting pin direction")?;
    Ok(pin)
}
