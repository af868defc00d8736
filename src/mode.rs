use crate::platform::Platform;
use log::info;
use std::fmt;

/// The two base views the device alternates between
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Clock,
    Weather,
}

impl Mode {
    pub fn toggle(self) -> Self {
        match self {
            Self::Clock => Self::Weather,
            Self::Weather => Self::Clock,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clock => f.write_str("clock"),
            Self::Weather => f.write_str("weather"),
        }
    }
}

/// Physical buttons on the board
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ButtonId {
    Down,
    Up,
}

/// Which button (if any) was held when we sampled the inputs
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ButtonEdge {
    Down,
    Up,
    None,
}

impl ButtonEdge {
    /// Sample both buttons once. Inputs are active-low, so `false` means
    /// pressed. If both are held, down wins.
    pub fn sample(platform: &mut impl Platform) -> Self {
        if !platform.read_button(ButtonId::Down) {
            Self::Down
        } else if !platform.read_button(ButtonId::Up) {
            Self::Up
        } else {
            Self::None
        }
    }
}

/// Tracks the operator's selected mode
#[derive(Debug, Default)]
pub struct ModeSelector {
    current: Mode,
}

impl ModeSelector {
    pub fn current(&self) -> Mode {
        self.current
    }

    /// Apply a button edge. With only two modes, both buttons just flip to
    /// the other one. Return whether the mode changed.
    pub fn apply(&mut self, edge: ButtonEdge) -> bool {
        match edge {
            ButtonEdge::Down | ButtonEdge::Up => {
                self.current = self.current.toggle();
                info!("Switched to {} mode", self.current);
                true
            }
            ButtonEdge::None => false,
        }
    }
}
