use std::{path::PathBuf, time::Duration};

pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 500;
pub const SPEED_STEP: u32 = 10;
pub const MIN_INSTRUCTIONS_PER_SECOND: u32 = 10;
pub const DEFAULT_SCALE: usize = 8;
/// Largest window scale; 64 already gives a 4096x2048 window.
pub const MAX_SCALE: usize = 64;

/// What DXYN does with sprite pixels that fall off the right or bottom edge.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SpriteEdge {
    /// The origin wraps onto the screen; pixels past the edge are dropped.
    #[default]
    Clip,
    /// Every pixel wraps around both axes.
    Wrap,
}

/// Behaviours that differ between interpreters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Quirks {
    pub sprite_edge: SpriteEdge,
}

/// Target instruction rate. Only paces calls to `step`; timers run at 60 Hz
/// regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Speed(u32);

impl Default for Speed {
    fn default() -> Self {
        Self(DEFAULT_INSTRUCTIONS_PER_SECOND)
    }
}

impl Speed {
    pub fn new(ips: u32) -> Self {
        Self(ips.max(MIN_INSTRUCTIONS_PER_SECOND))
    }

    pub fn ips(&self) -> u32 {
        self.0
    }

    pub fn faster(&mut self) {
        self.0 = self.0.saturating_add(SPEED_STEP);
    }

    pub fn slower(&mut self) {
        if self.0 > MIN_INSTRUCTIONS_PER_SECOND {
            self.0 = (self.0 - SPEED_STEP).max(MIN_INSTRUCTIONS_PER_SECOND);
        }
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_secs(1) / self.0
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub rom: PathBuf,
    pub speed: Speed,
    /// Window pixels per cell along each axis.
    pub scale: usize,
    pub quirks: Quirks,
}

impl Config {
    pub fn new(rom: PathBuf) -> Self {
        Self {
            rom,
            speed: Speed::default(),
            scale: DEFAULT_SCALE,
            quirks: Quirks::default(),
        }
    }
}
