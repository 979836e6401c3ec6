//! Game tunables. Defaults match the shipped game; `data/game.json` may
//! override any subset of them.

use crate::types::DurationMs;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Points removed from the single stat picked on each decay tick.
    pub decay_amount: u8,
    /// How long a stat may sit at zero before the pet dies.
    pub death_threshold_ms: DurationMs,
    /// Age below which a pet is still an egg.
    pub egg_max_age_ms: DurationMs,
    /// Age below which a pet is still a baby.
    pub baby_max_age_ms: DurationMs,
    /// Every stat must be strictly above this for the pet to count as happy.
    pub happy_threshold: u8,
    /// Boost applied by eat, play and train.
    pub action_boost: u8,
    /// Hunger spent by a training session.
    pub train_hunger_cost: u8,
    /// Evaluation coins needed to trigger an evolution.
    pub evolution_coin_threshold: u32,
    pub starting_coins: u64,
    /// Scores below this are penalised.
    pub evaluation_low_cutoff: u8,
    /// Scores at or above this are rewarded.
    pub evaluation_high_cutoff: u8,
    pub evaluation_penalty: i32,
    pub evaluation_reward: i32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            decay_amount:             5,
            death_threshold_ms:       60_000,
            egg_max_age_ms:           3 * 60_000,
            baby_max_age_ms:          6 * 60_000,
            happy_threshold:          50,
            action_boost:             20,
            train_hunger_cost:        1,
            evolution_coin_threshold: 50,
            starting_coins:           100,
            evaluation_low_cutoff:    50,
            evaluation_high_cutoff:   60,
            evaluation_penalty:       -5,
            evaluation_reward:        10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub decay_interval_ms:    u64,
    pub persist_debounce_ms:  u64,
    pub hub_sync_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            decay_interval_ms:    10_000,
            persist_debounce_ms:  1_000,
            hub_sync_interval_ms: 30_000,
        }
    }
}

impl TimingConfig {
    pub fn decay_interval(&self) -> Duration {
        Duration::from_millis(self.decay_interval_ms)
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }

    pub fn hub_sync_interval(&self) -> Duration {
        Duration::from_millis(self.hub_sync_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub base_url:          String,
    /// Public URL of this game, reported to the Hub at registration.
    pub app_url:           String,
    pub owner_name:        String,
    pub timeout_ms:        u64,
    pub gift_amount:       u64,
    pub leaderboard_limit: u32,
    pub messages_limit:    u32,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            base_url:          "https://regenmon-final.vercel.app/api".into(),
            app_url:           "http://localhost:5173".into(),
            owner_name:        "elemon_user".into(),
            timeout_ms:        8_000,
            gift_amount:       10,
            leaderboard_limit: 10,
            messages_limit:    20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub api_url:         String,
    pub model:           String,
    pub max_image_bytes: usize,
    pub timeout_ms:      u64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            api_url:         "https://api.openai.com/v1/chat/completions".into(),
            model:           "gpt-4o".into(),
            max_image_bytes: 5 * 1024 * 1024,
            timeout_ms:      20_000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rules:     RulesConfig,
    pub timing:    TimingConfig,
    pub hub:       HubConfig,
    pub evaluator: EvaluatorConfig,
}

impl GameConfig {
    /// Load from the data/ directory. Keys missing from the file keep their
    /// defaults. In tests, use `GameConfig::default()`.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/game.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: GameConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations that would break the lifecycle rules.
    pub fn validate(&self) -> anyhow::Result<()> {
        let r = &self.rules;
        if r.egg_max_age_ms >= r.baby_max_age_ms {
            anyhow::bail!(
                "egg_max_age_ms ({}) must be below baby_max_age_ms ({})",
                r.egg_max_age_ms,
                r.baby_max_age_ms
            );
        }
        if r.evaluation_low_cutoff > r.evaluation_high_cutoff {
            anyhow::bail!(
                "evaluation_low_cutoff ({}) must not exceed evaluation_high_cutoff ({})",
                r.evaluation_low_cutoff,
                r.evaluation_high_cutoff
            );
        }
        if r.decay_amount == 0 || r.death_threshold_ms <= 0 {
            anyhow::bail!("decay_amount and death_threshold_ms must be positive");
        }
        if self.timing.decay_interval_ms == 0 || self.timing.hub_sync_interval_ms == 0 {
            anyhow::bail!("timer intervals must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let json = r#"{ "rules": { "decay_amount": 7 }, "timing": { "persist_debounce_ms": 250 } }"#;
        let cfg: GameConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.rules.decay_amount, 7);
        assert_eq!(cfg.rules.death_threshold_ms, 60_000);
        assert_eq!(cfg.timing.persist_debounce_ms, 250);
        assert_eq!(cfg.timing.decay_interval_ms, 10_000);
        assert_eq!(cfg.hub.owner_name, "elemon_user");
        cfg.validate().unwrap();
    }

    #[test]
    fn inverted_stage_ages_are_rejected() {
        let mut cfg = GameConfig::default();
        cfg.rules.egg_max_age_ms = cfg.rules.baby_max_age_ms;
        assert!(cfg.validate().is_err());
    }
}
