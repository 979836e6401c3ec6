//! Evolution countdown shown next to the pet.
//!
//! Progress is happy time measured against the stage milestones. Between
//! ticks the value is interpolated from `last_update` while the pet is
//! happy and frozen while it is sad.

use crate::{
    config::RulesConfig,
    snapshot::{PetSnapshot, Stage},
    types::{DurationMs, Timestamp},
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionProgress {
    pub next_stage:   Stage,
    pub remaining_ms: DurationMs,
    /// 0..=100
    pub percent:      f64,
    pub paused:       bool,
}

impl EvolutionProgress {
    /// `mm:ss` rendering of the remaining time.
    pub fn remaining_label(&self) -> String {
        let total_secs = self.remaining_ms / 1000;
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }
}

pub fn evolution_progress(
    pet: &PetSnapshot,
    now: Timestamp,
    rules: &RulesConfig,
) -> Option<EvolutionProgress> {
    let milestone = match pet.stage {
        Stage::Egg  => rules.egg_max_age_ms,
        Stage::Baby => rules.baby_max_age_ms,
        Stage::Adult | Stage::Dead => return None,
    };
    let next_stage = pet.stage.next()?;

    let paused = !pet.is_happy(rules.happy_threshold);
    let since_tick = if paused { 0 } else { (now - pet.last_update).max(0) };
    let happy = pet.happy_time_accumulated + since_tick;

    Some(EvolutionProgress {
        next_stage,
        remaining_ms: (milestone - happy).max(0),
        percent: (happy as f64 / milestone as f64 * 100.0).min(100.0),
        paused,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Species;

    #[test]
    fn interpolates_while_happy() {
        let rules = RulesConfig::default();
        let mut pet = PetSnapshot::hatch("Ember", Species::Fire, 0, 100);
        pet.happy_time_accumulated = 60_000;
        pet.last_update = 100_000;

        let p = evolution_progress(&pet, 130_000, &rules).unwrap();
        assert_eq!(p.next_stage, Stage::Baby);
        assert!(!p.paused);
        assert_eq!(p.remaining_ms, 180_000 - 90_000);
        assert_eq!(p.remaining_label(), "01:30");
        assert!((p.percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn freezes_while_sad() {
        let rules = RulesConfig::default();
        let mut pet = PetSnapshot::hatch("Ember", Species::Fire, 0, 100);
        pet.stats.hunger = 10;
        pet.happy_time_accumulated = 60_000;
        pet.last_update = 100_000;

        let p = evolution_progress(&pet, 500_000, &rules).unwrap();
        assert!(p.paused);
        assert_eq!(p.remaining_ms, 120_000);
    }

    #[test]
    fn adults_and_dead_pets_have_no_countdown() {
        let rules = RulesConfig::default();
        let mut pet = PetSnapshot::hatch("Ember", Species::Fire, 0, 100);
        pet.stage = Stage::Adult;
        assert!(evolution_progress(&pet, 0, &rules).is_none());
        pet.stage = Stage::Dead;
        assert!(evolution_progress(&pet, 0, &rules).is_none());
    }
}
