use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_WIDTH: usize = 64;
pub const DEFAULT_HEIGHT: usize = 64;

/// Initial fill applied when a universe is built from [`Params`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seeding {
    /// All cells dead.
    Empty,
    /// Cell `i` alive iff `i % 2 == 0 || i % 7 == 0`.
    Stripes,
    /// A single glider in the top-left corner.
    Spaceship,
    /// Independent draw per cell at `fill_probability`.
    #[default]
    Random,
}

/// All tunable parameters. Every field has a default, so partial JSON is accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    pub seeding: Seeding,
    pub fill_probability: f64,

    // Driver pacing
    pub ticks_per_frame: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: 42,
            seeding: Seeding::Random,
            fill_probability: 0.5,
            ticks_per_frame: 1,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.fill_probability) {
            return Err(ConfigError::FillProbability(self.fill_probability));
        }
        if self.width.checked_mul(self.height).is_none() {
            return Err(ConfigError::AreaOverflow {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let params: Params = serde_json::from_str(s)?;
        params.validate()?;
        Ok(params)
    }
}
