//! Decay engine: one tick of neglect.
//!
//! A tick erodes exactly one randomly chosen stat, accumulates happy time
//! for the interval that just ended, arms or clears the death timer, and
//! re-evaluates the age-based stage. The caller owns cadence: every call
//! applies one decrement.

use crate::{
    config::RulesConfig,
    rng::StatSource,
    snapshot::{PetSnapshot, Stage, Stats},
    types::Timestamp,
};

/// Stage purely by age since birth.
pub fn stage_from_age(birth_time: Timestamp, now: Timestamp, rules: &RulesConfig) -> Stage {
    let age = now - birth_time;
    if age < rules.egg_max_age_ms {
        Stage::Egg
    } else if age < rules.baby_max_age_ms {
        Stage::Baby
    } else {
        Stage::Adult
    }
}

/// Death-timer rule shared by every transition: armed at the first instant
/// any stat is zero, cleared the instant none is.
pub(crate) fn next_death_timer(
    stats: &Stats,
    prev_timer: Option<Timestamp>,
    now: Timestamp,
) -> Option<Timestamp> {
    if stats.any_zero() {
        prev_timer.or(Some(now))
    } else {
        None
    }
}

/// Advance `prev` by one decay tick ending at `now`.
pub fn decay(
    prev: &PetSnapshot,
    now: Timestamp,
    rules: &RulesConfig,
    rng: &mut dyn StatSource,
) -> PetSnapshot {
    if prev.is_dead() {
        return prev.clone();
    }

    let elapsed = (now - prev.last_update).max(0);

    // Happiness is judged on the stats the pet had during the interval.
    let happy_time_accumulated = if prev.is_happy(rules.happy_threshold) {
        prev.happy_time_accumulated + elapsed
    } else {
        prev.happy_time_accumulated
    };

    let eroded = rng.pick_stat();
    let stats = prev.stats.adjusted(eroded, -i32::from(rules.decay_amount));

    let mut died = false;
    let death_timer = match (stats.any_zero(), prev.death_timer) {
        (true, Some(armed)) => {
            died = now - armed >= rules.death_threshold_ms;
            Some(armed)
        }
        _ => next_death_timer(&stats, prev.death_timer, now),
    };

    let stage = if died {
        Stage::Dead
    } else {
        let aged = stage_from_age(prev.birth_time, now, rules);
        if aged.rank() > prev.stage.rank() {
            aged
        } else {
            prev.stage
        }
    };

    log::debug!(
        "decay: {} eroded {:?} -> {:?} stage={} death_timer={:?}",
        prev.name,
        eroded,
        stats,
        stage,
        death_timer
    );

    PetSnapshot {
        stage,
        stats,
        death_timer,
        happy_time_accumulated,
        last_update: now,
        ..prev.clone()
    }
}
