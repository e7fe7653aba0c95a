//! Press-to-latch helpers for momentary buttons.
//!
//! Every mode switch on the vehicle goes through [`Toggle`]: the latched mode
//! flips once per press, no matter how many cycles the button stays held.

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    On,
    #[default]
    Off,
}

impl Mode {
    pub fn is_on(self) -> bool {
        self == Mode::On
    }

    pub fn flipped(self) -> Self {
        match self {
            Mode::On => Mode::Off,
            Mode::Off => Mode::On,
        }
    }
}

/// Low->high transition detector.
///
/// An unseeded detector adopts the first level it sees without reporting an
/// edge, so a button that is already held when the core starts does not
/// fire. [`Edge::seeded`] gives an explicit previous level instead.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Edge {
    last_level: Option<bool>,
}

impl Edge {
    pub const fn new() -> Self {
        Self { last_level: None }
    }

    pub const fn seeded(previous_level: bool) -> Self {
        Self {
            last_level: Some(previous_level),
        }
    }

    /// Returns true only on the cycle the input goes from low to high.
    pub fn rising(&mut self, level: bool) -> bool {
        let rose = matches!(self.last_level, Some(false)) && level;
        self.last_level = Some(level);
        rose
    }
}

/// Latches a boolean mode that flips on each press of a momentary input.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Toggle {
    edge: Edge,
    mode: Mode,
}

impl Toggle {
    pub const fn new() -> Self {
        Self {
            edge: Edge::new(),
            mode: Mode::Off,
        }
    }

    /// A toggle that treats `previous_level` as the level seen before the
    /// first update.
    pub const fn seeded(previous_level: bool) -> Self {
        Self {
            edge: Edge::seeded(previous_level),
            mode: Mode::Off,
        }
    }

    /// Feeds this cycle's input level and returns the latched mode.
    pub fn update(&mut self, level: bool) -> Mode {
        if self.edge.rising(level) {
            self.mode = self.mode.flipped();
        }
        self.mode
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_on(&self) -> bool {
        self.mode.is_on()
    }

    /// Forces the latched mode, e.g. when a match phase starts. The edge
    /// history is kept so a button held through the reset doesn't re-fire.
    pub fn set(&mut self, mode: Mode) {
        self.mode = mode;
    }
}
