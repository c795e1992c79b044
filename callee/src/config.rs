//! Callee configuration.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::Result;
use rand::Rng;
use shared::config::{parse_or, ServerConfig};
use validator::{Validate, ValidationError};

/// Default port of the callee service.
pub const DEFAULT_PORT: u16 = 5000;

/// Dice used by `/rolldice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Validate)]
pub struct DiceConfig {
    /// Number of faces; rolls land in `1..=sides`.
    #[validate(range(min = 1, max = 1000))]
    pub sides: u32,
}

impl Default for DiceConfig {
    fn default() -> Self {
        Self { sides: 6 }
    }
}

impl DiceConfig {
    /// Rolls the dice once.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.random_range(1..=self.sides)
    }
}

/// Artificial delay bounds used by `/slow`, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Validate)]
#[validate(schema(function = "validate_delay_bounds"))]
pub struct DelayConfig {
    /// Shortest delay.
    #[validate(range(min = 0.0, max = 60.0))]
    pub min_secs: f64,
    /// Longest delay.
    #[validate(range(min = 0.0, max = 60.0))]
    pub max_secs: f64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            min_secs: 0.1,
            max_secs: 2.0,
        }
    }
}

impl DelayConfig {
    /// Draws a delay uniformly from `[min_secs, max_secs]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.random_range(self.min_secs..=self.max_secs)
    }
}

fn validate_delay_bounds(config: &DelayConfig) -> Result<(), ValidationError> {
    // NaN slips through range checks since every comparison with it is false
    if !config.min_secs.is_finite() || !config.max_secs.is_finite() {
        return Err(ValidationError::new("delay_bounds_not_finite"));
    }
    if config.min_secs > config.max_secs {
        return Err(ValidationError::new("min_secs_exceeds_max_secs"));
    }
    Ok(())
}

/// Callee configuration.
///
/// Configuration values can be set via environment variables:
/// - `CALLEE_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `CALLEE_PORT`: The port to listen on (default: 5000)
/// - `CALLEE_DICE_SIDES`: Faces of the dice (default: 6)
/// - `CALLEE_DELAY_MIN_SECS`: Shortest `/slow` delay (default: 0.1)
/// - `CALLEE_DELAY_MAX_SECS`: Longest `/slow` delay (default: 2.0)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Server binding.
    pub server: ServerConfig,
    /// Dice settings.
    pub dice: DiceConfig,
    /// Delay settings.
    pub delay: DelayConfig,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed, or if the
    /// resulting settings are out of range.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a new configuration from an environment snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed, or if the
    /// resulting settings are out of range.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig::from_lookup("CALLEE", DEFAULT_PORT, &lookup)?;

        let dice = DiceConfig {
            sides: parse_or(&lookup, "CALLEE_DICE_SIDES", DiceConfig::default().sides)?,
        };
        dice.validate()?;

        let defaults = DelayConfig::default();
        let delay = DelayConfig {
            min_secs: parse_or(&lookup, "CALLEE_DELAY_MIN_SECS", defaults.min_secs)?,
            max_secs: parse_or(&lookup, "CALLEE_DELAY_MAX_SECS", defaults.max_secs)?,
        };
        delay.validate()?;

        Ok(Self {
            server,
            dice,
            delay,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::with_port(DEFAULT_PORT),
            dice: DiceConfig::default(),
            delay: DelayConfig::default(),
        }
    }
}
