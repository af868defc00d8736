pub mod config;
pub mod display;
pub mod error;
#[cfg_attr(not(target_arch = "arm"), path = "mock_gpio.rs")]
pub mod gpio;
pub mod mode;
pub mod network;
pub mod platform;
pub mod remote_config;
pub mod scheduler;
#[cfg(test)]
pub mod testing;
pub mod timer;
pub mod util;
pub mod view;
