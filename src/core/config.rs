//! Engine tuning configuration.
//!
//! Every coefficient that balances the fishing minigame lives here so it can be
//! tuned from a JSON file without touching code. Defaults come from
//! [`crate::core::constants`].

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::*;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub timing: TimingConfig,
    pub selection: SelectionConfig,
    pub fight: FightConfig,
    pub skill: SkillConfig,
}

/// Phase timer settings. All durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimingConfig {
    pub fight_tick_ms: u64,
    pub no_bite_wait_min_ms: u64,
    pub no_bite_wait_max_ms: u64,
    /// Fractional spread applied around a species' bite speed (0.3 = ±30%).
    pub bite_speed_jitter: f64,
    pub bite_window_ms: u64,
    pub bite_window_floor_ms: u64,
    /// Hard fight timeout as a multiple of the species' base fight time.
    pub fight_timeout_multiplier: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fight_tick_ms: FIGHT_TICK_MS,
            no_bite_wait_min_ms: NO_BITE_WAIT_MIN_MS,
            no_bite_wait_max_ms: NO_BITE_WAIT_MAX_MS,
            bite_speed_jitter: BITE_SPEED_JITTER,
            bite_window_ms: BITE_WINDOW_MS,
            bite_window_floor_ms: BITE_WINDOW_FLOOR_MS,
            fight_timeout_multiplier: FIGHT_TIMEOUT_MULTIPLIER,
        }
    }
}

/// How the synthetic "no bite" entry is weighted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum NoBiteWeight {
    /// Fraction of the summed candidate weights.
    Proportional(f64),
    /// Fixed weight regardless of the candidates.
    Fixed(f64),
}

impl Default for NoBiteWeight {
    fn default() -> Self {
        NoBiteWeight::Proportional(NO_BITE_PROPORTION)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectionConfig {
    pub bait_match_multiplier: f64,
    pub no_bite: NoBiteWeight,
    /// Used when the no-bite weight would otherwise be zero and nothing can bite.
    pub no_bite_floor: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            bait_match_multiplier: BAIT_MATCH_MULTIPLIER,
            no_bite: NoBiteWeight::default(),
            no_bite_floor: NO_BITE_FLOOR_WEIGHT,
        }
    }
}

/// Stamina/tension race coefficients. Stamina amounts are in species stamina
/// points; tension amounts are on the 0-100 meter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FightConfig {
    pub break_threshold: f64,
    pub reel_base: f64,
    pub passive_drain: f64,
    pub burst_chance_divisor: f64,
    pub burst_tension_base: f64,
    pub burst_aggression_scale: f64,
    pub tension_decay: f64,
    pub reel_strain: f64,
    pub slack_relief: f64,
    pub slack_recovery: f64,
}

impl Default for FightConfig {
    fn default() -> Self {
        Self {
            break_threshold: BREAK_THRESHOLD,
            reel_base: REEL_BASE_POWER,
            passive_drain: PASSIVE_STAMINA_DRAIN,
            burst_chance_divisor: BURST_CHANCE_DIVISOR,
            burst_tension_base: BURST_TENSION_BASE,
            burst_aggression_scale: BURST_AGGRESSION_SCALE,
            tension_decay: TENSION_DECAY,
            reel_strain: REEL_STRAIN,
            slack_relief: SLACK_RELIEF,
            slack_recovery: SLACK_RECOVERY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillConfig {
    /// Skill checks add a uniform integer jitter in `[-jitter, jitter]`.
    pub jitter: i32,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            jitter: SKILL_CHECK_JITTER,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse engine config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read engine config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid engine config: {0}")]
    Invalid(String),
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.timing;
        if t.fight_tick_ms == 0 {
            return Err(ConfigError::Invalid("fightTickMs must be positive".into()));
        }
        if t.no_bite_wait_min_ms > t.no_bite_wait_max_ms {
            return Err(ConfigError::Invalid(
                "noBiteWaitMinMs must not exceed noBiteWaitMaxMs".into(),
            ));
        }
        if !(0.0..1.0).contains(&t.bite_speed_jitter) {
            return Err(ConfigError::Invalid(
                "biteSpeedJitter must be in [0, 1)".into(),
            ));
        }
        if t.bite_window_floor_ms > t.bite_window_ms {
            return Err(ConfigError::Invalid(
                "biteWindowFloorMs must not exceed biteWindowMs".into(),
            ));
        }
        if t.fight_timeout_multiplier == 0 {
            return Err(ConfigError::Invalid(
                "fightTimeoutMultiplier must be positive".into(),
            ));
        }

        let s = &self.selection;
        let no_bite = match s.no_bite {
            NoBiteWeight::Proportional(v) | NoBiteWeight::Fixed(v) => v,
        };
        if s.bait_match_multiplier < 0.0 || no_bite < 0.0 || s.no_bite_floor <= 0.0 {
            return Err(ConfigError::Invalid(
                "selection weights must be non-negative and the no-bite floor positive".into(),
            ));
        }

        let f = &self.fight;
        if f.break_threshold <= 0.0 || f.break_threshold > METER_MAX {
            return Err(ConfigError::Invalid(
                "breakThreshold must be in (0, 100]".into(),
            ));
        }
        if f.burst_chance_divisor <= 0.0 {
            return Err(ConfigError::Invalid(
                "burstChanceDivisor must be positive".into(),
            ));
        }
        let amounts = [
            f.reel_base,
            f.passive_drain,
            f.burst_tension_base,
            f.burst_aggression_scale,
            f.tension_decay,
            f.reel_strain,
            f.slack_relief,
            f.slack_recovery,
        ];
        if amounts.iter().any(|v| *v < 0.0 || !v.is_finite()) {
            return Err(ConfigError::Invalid(
                "fight coefficients must be finite and non-negative".into(),
            ));
        }

        if self.skill.jitter < 0 {
            return Err(ConfigError::Invalid("skill jitter must be >= 0".into()));
        }
        Ok(())
    }
}

/// Load the engine config from `ANGLER_CONFIG_PATH`, falling back to defaults.
pub fn load_config_from_env() -> EngineConfig {
    let Some(path) = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from) else {
        tracing::info!(target: "angler::config", "engine_config.loaded=builtin");
        return EngineConfig::default();
    };

    match EngineConfig::from_file(&path) {
        Ok(config) => {
            tracing::info!(
                target: "angler::config",
                path = %path.display(),
                "engine_config.loaded=file"
            );
            config
        }
        Err(err) => {
            tracing::warn!(
                target: "angler::config",
                path = %path.display(),
                error = %err,
                "engine_config.load_failed"
            );
            EngineConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timing.fight_tick_ms, 250);
        assert_eq!(config.selection.no_bite, NoBiteWeight::Proportional(0.3));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "timing": { "fightTickMs": 100 }, "selection": { "noBite": { "kind": "fixed", "value": 5.0 } } }"#,
        )
        .expect("partial config should parse");
        assert_eq!(config.timing.fight_tick_ms, 100);
        assert_eq!(config.timing.bite_window_ms, BITE_WINDOW_MS);
        assert_eq!(config.selection.no_bite, NoBiteWeight::Fixed(5.0));
        assert_eq!(config.fight, FightConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "timing": { "fightTickMs": 0 } }"#)
            .expect_err("zero tick must be rejected");
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = EngineConfig::from_json_str(r#"{ "fight": { "breakThreshold": 150.0 } }"#)
            .expect_err("threshold above the meter must be rejected");
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = EngineConfig::from_json_str(
            r#"{ "timing": { "noBiteWaitMinMs": 30000, "noBiteWaitMaxMs": 1000 } }"#,
        )
        .expect_err("inverted wait range must be rejected");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_hand_built_config_validated() {
        let mut config = EngineConfig::default();
        config.timing.no_bite_wait_min_ms = 30_000;
        config.timing.no_bite_wait_max_ms = 1_000;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = EngineConfig::default();
        config.timing.bite_speed_jitter = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = EngineConfig::from_json_str("{ not json").expect_err("should fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/angler/config.json"))
            .expect_err("missing file should fail");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
