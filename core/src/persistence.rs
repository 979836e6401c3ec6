//! Persistence contract and the primitive record shape.
//!
//! One row per user, holding settings and at most one pet. Pet records are
//! primitive (timestamps as integers, enums as strings) and tolerant of
//! older rows: any field they lack falls back to a documented default.

use crate::{
    config::RulesConfig,
    error::PetResult,
    snapshot::{HubRegistration, PetSnapshot, Stats},
    types::{RegenmonId, Timestamp, UserId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSettings {
    pub muted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub user_id:  UserId,
    pub settings: UserSettings,
    pub pet:      Option<PetRecord>,
}

/// A pet as stored. Fields added after the first release are optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PetRecord {
    pub name:                   String,
    pub species:                String,
    pub stage:                  String,
    pub hunger:                 i64,
    pub happiness:              i64,
    pub energy:                 i64,
    pub birth_time:             Timestamp,
    pub last_update:            Timestamp,
    #[serde(default)]
    pub death_timer:            Option<Timestamp>,
    /// Missing: zero.
    #[serde(default)]
    pub happy_time_accumulated: i64,
    /// Missing: the starting grant.
    #[serde(default)]
    pub coins:                  Option<u64>,
    #[serde(default)]
    pub evaluation_coins:       u32,
    #[serde(default)]
    pub regenmon_id:            Option<RegenmonId>,
    /// Missing: registered iff a Hub id is present.
    #[serde(default)]
    pub is_registered:          Option<bool>,
    #[serde(default)]
    pub total_points:           u64,
    #[serde(default)]
    pub is_public:              bool,
    #[serde(default)]
    pub training_history:       Vec<Timestamp>,
    #[serde(default)]
    pub total_trainings:        u32,
}

impl PetRecord {
    pub fn from_snapshot(pet: &PetSnapshot) -> Self {
        Self {
            name:                   pet.name.clone(),
            species:                pet.species.as_str().to_string(),
            stage:                  pet.stage.as_str().to_string(),
            hunger:                 i64::from(pet.stats.hunger),
            happiness:              i64::from(pet.stats.happiness),
            energy:                 i64::from(pet.stats.energy),
            birth_time:             pet.birth_time,
            last_update:            pet.last_update,
            death_timer:            pet.death_timer,
            happy_time_accumulated: pet.happy_time_accumulated,
            coins:                  Some(pet.coins),
            evaluation_coins:       pet.evaluation_coins,
            regenmon_id:            pet.hub.regenmon_id.clone(),
            is_registered:          Some(pet.hub.is_registered),
            total_points:           pet.hub.total_points,
            is_public:              pet.hub.public,
            training_history:       pet.training_history.clone(),
            total_trainings:        pet.total_trainings,
        }
    }

    /// Hydrate a snapshot, filling defaults and re-establishing the
    /// stat-range and death-timer invariants on rows written by older
    /// builds.
    pub fn into_snapshot(self, rules: &RulesConfig) -> PetResult<PetSnapshot> {
        let stats = Stats::clamped(self.hunger, self.happiness, self.energy);
        let death_timer = if stats.any_zero() {
            self.death_timer.or(Some(self.last_update))
        } else {
            None
        };
        let is_registered = self.is_registered.unwrap_or(self.regenmon_id.is_some());
        let total_trainings = self.total_trainings.max(self.training_history.len() as u32);

        Ok(PetSnapshot {
            name: self.name,
            species: self.species.parse()?,
            stage: self.stage.parse()?,
            stats,
            birth_time: self.birth_time,
            last_update: self.last_update,
            death_timer,
            happy_time_accumulated: self.happy_time_accumulated.max(0),
            coins: self.coins.unwrap_or(rules.starting_coins),
            evaluation_coins: self.evaluation_coins,
            hub: HubRegistration {
                regenmon_id: self.regenmon_id,
                is_registered,
                total_points: self.total_points,
                public: self.is_public,
            },
            training_history: self.training_history,
            total_trainings,
        })
    }
}

/// Storage backend keyed by user id, one pet per user.
///
/// Calls are blocking; the controller runs them off the async runtime's
/// worker threads.
pub trait PetRepository: Send + Sync + 'static {
    fn get_user_record(&self, user_id: &str) -> PetResult<Option<UserRecord>>;

    fn upsert_user(&self, user_id: &str) -> PetResult<()>;

    fn update_settings(&self, user_id: &str, settings: &UserSettings) -> PetResult<()>;

    /// Insert or replace the user's single pet.
    fn save_pet_state(&self, user_id: &str, pet: &PetRecord) -> PetResult<()>;

    fn delete_pet(&self, user_id: &str) -> PetResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Species, Stage};

    #[test]
    fn old_rows_get_defaults() {
        // Shape written before coins, hub linkage and training existed.
        let json = r#"{
            "name": "Mochi", "species": "fire", "stage": "baby",
            "hunger": 80, "happiness": 60, "energy": 70,
            "birthTime": 1000, "lastUpdate": 5000
        }"#;
        let record: PetRecord = serde_json::from_str(json).unwrap();
        let rules = RulesConfig::default();
        let pet = record.into_snapshot(&rules).unwrap();
        assert_eq!(pet.species, Species::Fire);
        assert_eq!(pet.stage, Stage::Baby);
        assert_eq!(pet.coins, rules.starting_coins);
        assert_eq!(pet.happy_time_accumulated, 0);
        assert!(pet.training_history.is_empty());
        assert!(!pet.hub.is_registered);
        assert_eq!(pet.death_timer, None);
    }

    #[test]
    fn snapshot_survives_record_form() {
        let rules = RulesConfig::default();
        let mut pet = PetSnapshot::hatch("Tide", Species::Water, 10, 100);
        pet.stats.energy = 0;
        pet.death_timer = Some(20);
        pet.hub.regenmon_id = Some("r-1".into());
        pet.hub.is_registered = true;
        pet.training_history = vec![15, 18];
        pet.total_trainings = 2;
        let back = PetRecord::from_snapshot(&pet).into_snapshot(&rules).unwrap();
        assert_eq!(back, pet);
    }

    #[test]
    fn unknown_species_is_rejected() {
        let mut record = PetRecord::from_snapshot(&PetSnapshot::hatch("X", Species::Air, 0, 0));
        record.species = "plasma".into();
        assert!(record.into_snapshot(&RulesConfig::default()).is_err());
    }
}
