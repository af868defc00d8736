//! Mock GPIO, to allow compiling/running on non-Pi machines. Buttons are never
//! pressed.

use embedded_hal::digital::{ErrorType, InputPin};
use std::convert::Infallible;

#[derive(Debug)]
pub struct Pin;

pub fn init_pin(_: u64) -> anyhow::Result<Pin> {
    Ok(Pin)
}

impl ErrorType for Pin {
    type Error = Infallible;
}

impl InputPin for Pin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(true)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(false)
    }
}
