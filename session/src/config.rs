use heist_dda_system_difficulty::DifficultyConfig;
use heist_dda_system_log::LogConfig;
use serde::{Deserialize, Serialize};

/// Configuration loaded once per process and shared by every playthrough.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Difficulty tuning.
    pub difficulty: DifficultyConfig,
    /// Export location of the difficulty trace.
    pub log: LogConfig,
}
