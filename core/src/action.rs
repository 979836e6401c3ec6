//! Action processor: player care actions and image-evaluation rewards.
//!
//! Both transforms are pure. They reject a dead pet with `InvalidState`;
//! the controller decides how to surface that.

use crate::{
    config::RulesConfig,
    decay::next_death_timer,
    error::{PetError, PetResult},
    snapshot::{PetSnapshot, StatKind},
    types::Timestamp,
};
use serde::{Deserialize, Serialize};

/// Care actions a player can issue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PetAction {
    Eat,
    Play,
    Train,
}

impl PetAction {
    pub fn boosted_stat(&self) -> StatKind {
        match self {
            Self::Eat   => StatKind::Hunger,
            Self::Play  => StatKind::Happiness,
            Self::Train => StatKind::Energy,
        }
    }
}

fn ensure_alive(prev: &PetSnapshot, what: &str) -> PetResult<()> {
    if prev.is_dead() {
        return Err(PetError::InvalidState(format!(
            "{} is dead; {what} is not allowed",
            prev.name
        )));
    }
    Ok(())
}

pub fn apply_action(
    prev: &PetSnapshot,
    action: PetAction,
    now: Timestamp,
    rules: &RulesConfig,
) -> PetResult<PetSnapshot> {
    ensure_alive(prev, "care")?;

    let mut next = prev.clone();
    next.stats = next.stats.adjusted(action.boosted_stat(), i32::from(rules.action_boost));

    if action == PetAction::Train {
        next.stats = next
            .stats
            .adjusted(StatKind::Hunger, -i32::from(rules.train_hunger_cost));
        next.training_history.push(now);
        next.total_trainings += 1;
    }

    next.death_timer = next_death_timer(&next.stats, prev.death_timer, now);
    next.last_update = now;
    Ok(next)
}

/// Flat band mapping an evaluation score to a stat delta.
pub fn evaluation_delta(score: u8, rules: &RulesConfig) -> i32 {
    if score < rules.evaluation_low_cutoff {
        rules.evaluation_penalty
    } else if score >= rules.evaluation_high_cutoff {
        rules.evaluation_reward
    } else {
        0
    }
}

pub fn apply_evaluation(
    prev: &PetSnapshot,
    score: u8,
    now: Timestamp,
    rules: &RulesConfig,
) -> PetResult<PetSnapshot> {
    ensure_alive(prev, "evaluation")?;

    let delta = evaluation_delta(score.min(100), rules);
    let mut next = prev.clone();
    next.stats = prev.stats.adjusted_all(delta);
    next.evaluation_coins = prev.evaluation_coins + delta.max(0) as u32;

    // Edge-triggered: checked only at the moment coins are credited.
    if next.evaluation_coins >= rules.evolution_coin_threshold {
        if let Some(evolved) = prev.stage.next() {
            log::info!(
                "{} evolves {} -> {} from evaluation rewards ({} coins)",
                prev.name,
                prev.stage,
                evolved,
                next.evaluation_coins
            );
            next.stage = evolved;
            next.evaluation_coins = 0;
        }
    }

    next.death_timer = next_death_timer(&next.stats, prev.death_timer, now);
    next.last_update = now;
    Ok(next)
}
