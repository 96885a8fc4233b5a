//! Pacing configuration for the sequence player

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delay before advancing past a step that does not set its own
pub const DEFAULT_STEP_DELAY_MS: u64 = 3000;

/// Blank pause between hiding one message and showing the next
pub const DEFAULT_INTER_MESSAGE_GAP_MS: u64 = 300;

/// Environment variable overriding [`PlayerConfig::default_step_delay_ms`]
pub const STEP_DELAY_ENV: &str = "KATARIBE_STEP_DELAY_MS";

/// Environment variable overriding [`PlayerConfig::inter_message_gap_ms`]
pub const GAP_ENV: &str = "KATARIBE_GAP_MS";

/// Player pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Used for steps without an explicit delay
    pub default_step_delay_ms: u64,
    /// Pause between hiding a message and showing the next one
    pub inter_message_gap_ms: u64,
    /// Pause a branch waits after hiding the choice prompt
    pub choice_pause_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_step_delay_ms: DEFAULT_STEP_DELAY_MS,
            inter_message_gap_ms: DEFAULT_INTER_MESSAGE_GAP_MS,
            choice_pause_ms: 0,
        }
    }
}

impl PlayerConfig {
    /// Pacing with no gap and no choice pause, handy when stepping time by hand
    pub fn immediate() -> Self {
        Self {
            inter_message_gap_ms: 0,
            choice_pause_ms: 0,
            ..Self::default()
        }
    }

    /// Apply `KATARIBE_*` overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from a lookup function. Unparsable values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = parse_ms(&lookup, STEP_DELAY_ENV) {
            self.default_step_delay_ms = value;
        }
        if let Some(value) = parse_ms(&lookup, GAP_ENV) {
            self.inter_message_gap_ms = value;
        }
        self
    }

    pub fn default_step_delay(&self) -> Duration {
        Duration::from_millis(self.default_step_delay_ms)
    }

    pub fn inter_message_gap(&self) -> Duration {
        Duration::from_millis(self.inter_message_gap_ms)
    }

    pub fn choice_pause(&self) -> Duration {
        Duration::from_millis(self.choice_pause_ms)
    }
}

fn parse_ms(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<u64> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("[Config] Ignoring {}={:?}: not a millisecond count", name, raw);
            None
        }
    }
}
