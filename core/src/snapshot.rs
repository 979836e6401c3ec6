//! The pet snapshot: the complete state of one pet at one instant.
//!
//! Snapshots are values. Every decay tick and every action produces a
//! successor; nothing mutates a snapshot that a reader already holds.

use crate::{
    error::PetError,
    types::{DurationMs, RegenmonId, Timestamp},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const STAT_MIN: u8 = 0;
pub const STAT_MAX: u8 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Fire,
    Water,
    Earth,
    Air,
}

impl Species {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fire  => "fire",
            Self::Water => "water",
            Self::Earth => "earth",
            Self::Air   => "air",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = PetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fire"  => Ok(Self::Fire),
            "water" => Ok(Self::Water),
            "earth" => Ok(Self::Earth),
            "air"   => Ok(Self::Air),
            other   => Err(PetError::Validation(format!("unknown species '{other}'"))),
        }
    }
}

/// Lifecycle position. `Dead` is absorbing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Egg,
    Baby,
    Adult,
    Dead,
}

impl Stage {
    /// Ordering used by the "never regress" rule. Dead outranks everything.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Egg   => 0,
            Self::Baby  => 1,
            Self::Adult => 2,
            Self::Dead  => 3,
        }
    }

    /// The stage an evolution moves to, if any.
    pub fn next(&self) -> Option<Stage> {
        match self {
            Self::Egg  => Some(Self::Baby),
            Self::Baby => Some(Self::Adult),
            Self::Adult | Self::Dead => None,
        }
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, Self::Dead)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Egg   => "egg",
            Self::Baby  => "baby",
            Self::Adult => "adult",
            Self::Dead  => "dead",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = PetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "egg"   => Ok(Self::Egg),
            "baby"  => Ok(Self::Baby),
            "adult" => Ok(Self::Adult),
            "dead"  => Ok(Self::Dead),
            other   => Err(PetError::Validation(format!("unknown stage '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Hunger,
    Happiness,
    Energy,
}

impl StatKind {
    pub const ALL: [StatKind; 3] = [StatKind::Hunger, StatKind::Happiness, StatKind::Energy];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub hunger:    u8,
    pub happiness: u8,
    pub energy:    u8,
}

impl Stats {
    pub fn full() -> Self {
        Self { hunger: STAT_MAX, happiness: STAT_MAX, energy: STAT_MAX }
    }

    /// Build from raw values, clamping each into `[0, 100]`.
    pub fn clamped(hunger: i64, happiness: i64, energy: i64) -> Self {
        Self {
            hunger:    clamp_stat(hunger),
            happiness: clamp_stat(happiness),
            energy:    clamp_stat(energy),
        }
    }

    pub fn get(&self, kind: StatKind) -> u8 {
        match kind {
            StatKind::Hunger    => self.hunger,
            StatKind::Happiness => self.happiness,
            StatKind::Energy    => self.energy,
        }
    }

    /// Returns a copy with `kind` moved by `delta`, clamped.
    pub fn adjusted(self, kind: StatKind, delta: i32) -> Self {
        let mut next = self;
        let value = clamp_stat(i64::from(self.get(kind)) + i64::from(delta));
        match kind {
            StatKind::Hunger    => next.hunger = value,
            StatKind::Happiness => next.happiness = value,
            StatKind::Energy    => next.energy = value,
        }
        next
    }

    /// Returns a copy with all three stats moved by `delta`, clamped.
    pub fn adjusted_all(self, delta: i32) -> Self {
        StatKind::ALL
            .iter()
            .fold(self, |acc, kind| acc.adjusted(*kind, delta))
    }

    pub fn any_zero(&self) -> bool {
        StatKind::ALL.iter().any(|k| self.get(*k) == STAT_MIN)
    }

    pub fn all_above(&self, threshold: u8) -> bool {
        StatKind::ALL.iter().all(|k| self.get(*k) > threshold)
    }
}

fn clamp_stat(value: i64) -> u8 {
    value.clamp(i64::from(STAT_MIN), i64::from(STAT_MAX)) as u8
}

/// How the pet looks right now. Only presentation cares, but the rule is
/// the same one that gates happy-time accumulation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Happy,
    Sad,
}

/// Linkage to the pet's identity on the Hub.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HubRegistration {
    /// Assigned once at registration, never changed afterwards.
    pub regenmon_id:   Option<RegenmonId>,
    pub is_registered: bool,
    pub total_points:  u64,
    pub public:        bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PetSnapshot {
    pub name:                   String,
    pub species:                Species,
    pub stage:                  Stage,
    pub stats:                  Stats,
    pub birth_time:             Timestamp,
    pub last_update:            Timestamp,
    /// Set while at least one stat sits at zero.
    pub death_timer:            Option<Timestamp>,
    pub happy_time_accumulated: DurationMs,
    pub coins:                  u64,
    /// Positive evaluation rewards since the last evaluation-driven evolution.
    pub evaluation_coins:       u32,
    pub hub:                    HubRegistration,
    pub training_history:       Vec<Timestamp>,
    pub total_trainings:        u32,
}

impl PetSnapshot {
    /// A freshly hatched egg with full stats.
    pub fn hatch(name: &str, species: Species, now: Timestamp, starting_coins: u64) -> Self {
        Self {
            name: name.to_string(),
            species,
            stage: Stage::Egg,
            stats: Stats::full(),
            birth_time: now,
            last_update: now,
            death_timer: None,
            happy_time_accumulated: 0,
            coins: starting_coins,
            evaluation_coins: 0,
            hub: HubRegistration::default(),
            training_history: Vec::new(),
            total_trainings: 0,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.stage.is_dead()
    }

    pub fn is_happy(&self, threshold: u8) -> bool {
        self.stats.all_above(threshold)
    }

    pub fn emotion(&self, threshold: u8) -> Emotion {
        if self.is_happy(threshold) {
            Emotion::Happy
        } else {
            Emotion::Sad
        }
    }

    pub fn regenmon_id(&self) -> Option<&str> {
        if self.hub.is_registered {
            self.hub.regenmon_id.as_deref()
        } else {
            None
        }
    }
}
