//! Shared test doubles: an in-memory repository that records every write
//! and a Hub whose answers are scripted per test.

#![allow(dead_code)]

use regenmon_core::{
    clock::ManualClock,
    config::GameConfig,
    controller::LifecycleController,
    error::{PetError, PetResult},
    hub::{
        HubApi, HubBalance, HubProfile, InteractionOutcome, LeaderboardPage, MessagePage,
        Pagination, Registration, SyncPayload,
    },
    persistence::{PetRecord, PetRepository, UserRecord, UserSettings},
    rng::ScriptedStats,
    snapshot::{PetSnapshot, StatKind},
};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use tokio::sync::Notify;

pub const START: i64 = 1_700_000_000_000;

// ── Repository ────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryRepo {
    users:      Mutex<HashMap<String, (UserSettings, Option<PetRecord>)>>,
    pub writes: Mutex<Vec<(String, PetRecord)>>,
    pub deletes: Mutex<Vec<String>>,
    /// When set, every pet save blocks its thread this long before writing.
    pub save_delay: Mutex<Option<Duration>>,
    saves_started: AtomicUsize,
}

impl MemoryRepo {
    pub fn with_pet(user_id: &str, pet: PetRecord) -> Self {
        let repo = Self::default();
        repo.users
            .lock()
            .unwrap()
            .insert(user_id.to_string(), (UserSettings::default(), Some(pet)));
        repo
    }

    pub fn slow_saves(delay: Duration) -> Self {
        let repo = Self::default();
        *repo.save_delay.lock().unwrap() = Some(delay);
        repo
    }

    /// Saves that have begun, including ones still sleeping.
    pub fn saves_started(&self) -> usize {
        self.saves_started.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn last_write(&self) -> Option<PetRecord> {
        self.writes.lock().unwrap().last().map(|(_, r)| r.clone())
    }

    pub fn stored_pet(&self, user_id: &str) -> Option<PetRecord> {
        self.users
            .lock()
            .unwrap()
            .get(user_id)
            .and_then(|(_, pet)| pet.clone())
    }

    pub fn stored_settings(&self, user_id: &str) -> Option<UserSettings> {
        self.users.lock().unwrap().get(user_id).map(|(s, _)| *s)
    }
}

impl PetRepository for MemoryRepo {
    fn get_user_record(&self, user_id: &str) -> PetResult<Option<UserRecord>> {
        Ok(self.users.lock().unwrap().get(user_id).map(|(settings, pet)| UserRecord {
            user_id: user_id.to_string(),
            settings: *settings,
            pet: pet.clone(),
        }))
    }

    fn upsert_user(&self, user_id: &str) -> PetResult<()> {
        self.users
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_insert((UserSettings::default(), None));
        Ok(())
    }

    fn update_settings(&self, user_id: &str, settings: &UserSettings) -> PetResult<()> {
        self.users
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_insert((UserSettings::default(), None))
            .0 = *settings;
        Ok(())
    }

    fn save_pet_state(&self, user_id: &str, pet: &PetRecord) -> PetResult<()> {
        self.saves_started.fetch_add(1, Ordering::SeqCst);
        let delay = *self.save_delay.lock().unwrap();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        self.users
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_insert((UserSettings::default(), None))
            .1 = Some(pet.clone());
        self.writes.lock().unwrap().push((user_id.to_string(), pet.clone()));
        Ok(())
    }

    fn delete_pet(&self, user_id: &str) -> PetResult<()> {
        if let Some(entry) = self.users.lock().unwrap().get_mut(user_id) {
            entry.1 = None;
        }
        self.deletes.lock().unwrap().push(user_id.to_string());
        Ok(())
    }
}

// ── Hub ───────────────────────────────────────────────────────────

/// `None` in a slot means the call fails as if the Hub were down.
#[derive(Default)]
pub struct ScriptedHub {
    pub registration: Mutex<Option<Registration>>,
    pub sync_balance: Mutex<Option<HubBalance>>,
    pub interaction:  Mutex<Option<InteractionOutcome>>,
    pub sync_calls:   Mutex<Vec<(String, SyncPayload)>>,
    pub feeds:        Mutex<Vec<(String, Option<String>)>>,
    pub messages_sent: Mutex<Vec<(String, String)>>,
    /// When set, sync waits for a permit before answering.
    pub sync_gate:    Mutex<Option<Arc<Notify>>>,
    /// When set, feed and gift wait for a permit before answering.
    pub interaction_gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedHub {
    pub fn registering(id: &str, balance: u64, total_points: u64) -> Self {
        let hub = Self::default();
        *hub.registration.lock().unwrap() = Some(Registration {
            regenmon_id: id.to_string(),
            balance: HubBalance { balance, total_points },
            already_registered: false,
        });
        hub
    }

    pub fn answer_sync(&self, balance: u64, total_points: u64) {
        *self.sync_balance.lock().unwrap() = Some(HubBalance { balance, total_points });
    }

    pub fn answer_interactions(&self, success: bool, message: &str, sender_balance: Option<u64>) {
        *self.interaction.lock().unwrap() = Some(InteractionOutcome {
            success,
            message: message.to_string(),
            sender_balance,
        });
    }

    pub fn gate_sync(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.sync_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn gate_interactions(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.interaction_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn sync_count(&self) -> usize {
        self.sync_calls.lock().unwrap().len()
    }

    fn interaction_result(&self) -> PetResult<InteractionOutcome> {
        self.interaction.lock().unwrap().clone().ok_or(PetError::HubUnavailable)
    }

    async fn wait_for_interaction_gate(&self) {
        let gate = self.interaction_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

impl HubApi for ScriptedHub {
    async fn register(&self, _pet: &PetSnapshot, _owner_name: &str) -> PetResult<Registration> {
        self.registration.lock().unwrap().clone().ok_or(PetError::HubUnavailable)
    }

    async fn sync(&self, regenmon_id: &str, payload: &SyncPayload) -> PetResult<HubBalance> {
        self.sync_calls
            .lock()
            .unwrap()
            .push((regenmon_id.to_string(), payload.clone()));
        let gate = self.sync_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let answer = *self.sync_balance.lock().unwrap();
        answer.ok_or(PetError::Hub { status: 503, message: "down".into() })
    }

    async fn leaderboard(&self, page: u32, limit: u32) -> PetResult<LeaderboardPage> {
        Ok(LeaderboardPage {
            items: Vec::new(),
            pagination: Pagination { page, limit, total: 0, total_pages: 1 },
        })
    }

    async fn profile(&self, _id: &str) -> PetResult<HubProfile> {
        Err(PetError::HubUnavailable)
    }

    async fn feed(&self, target_id: &str, from_id: Option<&str>) -> PetResult<InteractionOutcome> {
        self.feeds
            .lock()
            .unwrap()
            .push((target_id.to_string(), from_id.map(str::to_string)));
        self.wait_for_interaction_gate().await;
        self.interaction_result()
    }

    async fn gift(
        &self,
        _target_id: &str,
        _from_id: Option<&str>,
        _amount: u64,
    ) -> PetResult<InteractionOutcome> {
        self.wait_for_interaction_gate().await;
        self.interaction_result()
    }

    async fn send_message(
        &self,
        target_id: &str,
        text: &str,
        _from_id: Option<&str>,
        _from_name: Option<&str>,
    ) -> PetResult<InteractionOutcome> {
        self.messages_sent
            .lock()
            .unwrap()
            .push((target_id.to_string(), text.to_string()));
        self.interaction_result()
    }

    async fn messages(&self, _id: &str, _page: u32, _limit: u32) -> PetResult<MessagePage> {
        Ok(MessagePage { messages: Vec::new(), total: 0 })
    }
}

// ── Wiring ────────────────────────────────────────────────────────

pub struct Rig {
    pub controller: LifecycleController<MemoryRepo, ScriptedHub>,
    pub repo:       Arc<MemoryRepo>,
    pub hub:        Arc<ScriptedHub>,
    pub clock:      Arc<ManualClock>,
}

pub fn rig(repo: MemoryRepo, hub: ScriptedHub, erodes: StatKind) -> Rig {
    let _ = env_logger::builder().is_test(true).try_init();
    let repo = Arc::new(repo);
    let hub = Arc::new(hub);
    let clock = Arc::new(ManualClock::new(START));
    let controller = LifecycleController::new(
        GameConfig::default(),
        Arc::clone(&repo),
        Arc::clone(&hub),
        clock.clone(),
        Box::new(ScriptedStats::always(erodes)),
    );
    Rig { controller, repo, hub, clock }
}
