//! JSON configuration parsing for headless mode
//!
//! Parses JSON match configurations and resolves them into a [`Ruleset`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::combat::constants::MAX_TICK_MS;
use crate::combat::ruleset::Ruleset;

/// Headless match configuration loaded from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlessMatchConfig {
    /// Skill table to load instead of the built-in one (RON)
    #[serde(default)]
    pub skills_path: Option<String>,
    /// Overrides the skill table's match duration
    #[serde(default)]
    pub match_duration_ms: Option<u64>,
    /// Random seed for deterministic match reproduction
    /// If provided, the match will use a seeded RNG for reproducible results
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Where to write the JSON match report (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    /// Simulated frame length in milliseconds (default: 16)
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    /// How long the scripted player watches a cast before interrupting it (default: 250)
    #[serde(default = "default_reaction_ms")]
    pub reaction_ms: u64,
    /// Whether the scripted player raises its defensive against big red casts
    #[serde(default = "default_true")]
    pub use_defensive: bool,
    /// Route AI diagnostics to the debug log
    #[serde(default)]
    pub debug_ai: bool,
}

fn default_frame_ms() -> u64 {
    16
}

fn default_reaction_ms() -> u64 {
    250
}

fn default_true() -> bool {
    true
}

impl Default for HeadlessMatchConfig {
    fn default() -> Self {
        Self {
            skills_path: None,
            match_duration_ms: None,
            random_seed: None,
            output_path: None,
            frame_ms: default_frame_ms(),
            reaction_ms: default_reaction_ms(),
            use_defensive: true,
            debug_ai: false,
        }
    }
}

impl HeadlessMatchConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, String> {
        let config: HeadlessMatchConfig =
            serde_json::from_str(contents).map_err(|e| format!("Failed to parse JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.frame_ms == 0 || self.frame_ms > MAX_TICK_MS {
            return Err(format!(
                "frame_ms must be between 1 and {} (got {})",
                MAX_TICK_MS, self.frame_ms
            ));
        }

        if self.match_duration_ms == Some(0) {
            return Err("match_duration_ms must be positive".to_string());
        }

        Ok(())
    }

    /// Skill table and settings for this match, with overrides applied.
    pub fn load_ruleset(&self) -> Result<Ruleset, String> {
        let mut ruleset = match &self.skills_path {
            Some(path) => Ruleset::load_from_file(Path::new(path))?,
            None => Ruleset::default(),
        };

        if let Some(duration) = self.match_duration_ms {
            ruleset.settings.match_duration_ms = duration;
        }
        ruleset.settings.debug_ai |= self.debug_ai;

        Ok(ruleset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = HeadlessMatchConfig::from_json_str("{}").unwrap();
        assert_eq!(config, HeadlessMatchConfig::default());
    }

    #[test]
    fn test_frame_out_of_range_rejected() {
        let err = HeadlessMatchConfig::from_json_str(r#"{"frame_ms": 500}"#).unwrap_err();
        assert!(err.contains("frame_ms"), "{}", err);
        assert!(HeadlessMatchConfig::from_json_str(r#"{"frame_ms": 0}"#).is_err());
    }

    #[test]
    fn test_zero_duration_rejected() {
        assert!(HeadlessMatchConfig::from_json_str(r#"{"match_duration_ms": 0}"#).is_err());
    }

    #[test]
    fn test_overrides_applied_to_ruleset() {
        let config = HeadlessMatchConfig {
            match_duration_ms: Some(30_000),
            debug_ai: true,
            ..Default::default()
        };
        let ruleset = config.load_ruleset().unwrap();
        assert_eq!(ruleset.settings.match_duration_ms, 30_000);
        assert!(ruleset.settings.debug_ai);
    }

    #[test]
    fn test_missing_skills_file_reported() {
        let config = HeadlessMatchConfig {
            skills_path: Some("does/not/exist.ron".to_string()),
            ..Default::default()
        };
        assert!(config.load_ruleset().is_err());
    }
}
