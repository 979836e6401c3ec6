//! The lifecycle controller: owner of the live pet.
//!
//! RULES:
//!   - Every change to the live snapshot goes through `commit`, under the
//!     state lock, as a whole-value replace.
//!   - Decay writes stats and stage; the Hub writes coins and total points.
//!     The two families never overlap, so interleaved commits are safe.
//!   - Collaborator failures stop here. They are logged, or surfaced as an
//!     `ActionStatus` for user-initiated social calls, never propagated.
//!   - Anything that lands after an await checks the session id first.
//!   - Saves and deletes of the stored pet take the `writes` lock, and a save
//!     re-checks the session while holding it. A reset therefore never races
//!     a save that is already running.

use crate::{
    action::{apply_action, apply_evaluation, PetAction},
    clock::Clock,
    config::GameConfig,
    debounce::Debouncer,
    decay::decay,
    error::{PetError, PetResult},
    evaluator::{evaluate_or_default, EvaluationCategory, EvaluationResult, ImageEvaluator, Upload},
    event::{transitions, PetEvent},
    hub::{HubApi, HubBalance, HubProfile, LeaderboardPage, MessagePage, SyncPayload},
    persistence::{PetRecord, PetRepository, UserSettings},
    reconcile::merge_hub_reconciliation,
    rng::StatSource,
    snapshot::{PetSnapshot, Species},
    types::{RegenmonId, SessionId, UserId},
};
use log::{debug, info, warn};
use serde::Serialize;
use std::{
    sync::{Arc, Mutex as StdMutex, Weak},
    time::Duration,
};
use tokio::{
    sync::{broadcast, watch, Mutex},
    task::JoinHandle,
};
use uuid::Uuid;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Uninitialized,
    Loading,
    /// No pet: the caller should offer pet creation.
    Absent,
    Loaded,
    Playing,
}

/// Inline result of a social interaction, shown next to the control that
/// triggered it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActionStatus {
    pub ok:   bool,
    pub text: String,
}

impl ActionStatus {
    fn failed(text: &str) -> Self {
        Self { ok: false, text: text.to_string() }
    }
}

struct PendingWrite {
    session: SessionId,
    user_id: UserId,
    record:  PetRecord,
}

struct LiveState {
    phase:    Phase,
    user_id:  Option<UserId>,
    session:  Option<SessionId>,
    pet:      Option<PetSnapshot>,
    settings: UserSettings,
    rng:      Box<dyn StatSource>,
}

struct Inner<S, H> {
    config:  GameConfig,
    repo:    Arc<S>,
    hub:     Arc<H>,
    clock:   Arc<dyn Clock>,
    live:    Mutex<LiveState>,
    session: watch::Sender<Option<SessionId>>,
    events:  broadcast::Sender<PetEvent>,
    persist: Debouncer<PendingWrite>,
    writes:  Arc<Mutex<()>>,
    timers:  StdMutex<Vec<JoinHandle<()>>>,
}

impl<S, H> Drop for Inner<S, H> {
    fn drop(&mut self) {
        if let Ok(timers) = self.timers.get_mut() {
            for timer in timers.drain(..) {
                timer.abort();
            }
        }
    }
}

/// Cheap to clone; all clones drive the same pet.
pub struct LifecycleController<S, H> {
    inner: Arc<Inner<S, H>>,
}

impl<S, H> Clone for LifecycleController<S, H> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<S: PetRepository, H: HubApi> LifecycleController<S, H> {
    /// Build a controller. Must be called from within a tokio runtime.
    pub fn new(
        config: GameConfig,
        repo: Arc<S>,
        hub: Arc<H>,
        clock: Arc<dyn Clock>,
        rng: Box<dyn StatSource>,
    ) -> Self {
        let (session_tx, session_rx) = watch::channel(None);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let writes = Arc::new(Mutex::new(()));
        let sink_repo = Arc::clone(&repo);
        let sink_writes = Arc::clone(&writes);
        let persist = Debouncer::spawn(config.timing.persist_debounce(), move |write: PendingWrite| {
            let repo = Arc::clone(&sink_repo);
            let writes = Arc::clone(&sink_writes);
            let session_rx = session_rx.clone();
            async move {
                let _ordered = writes.lock().await;
                let live_session = *session_rx.borrow();
                if live_session != Some(write.session) {
                    debug!("discarding pet write for ended session {}", write.session);
                    return;
                }
                if let Err(e) = save_blocking(repo, write.user_id, write.record).await {
                    warn!("debounced pet save failed: {e}");
                }
            }
        });

        Self {
            inner: Arc::new(Inner {
                config,
                repo,
                hub,
                clock,
                live: Mutex::new(LiveState {
                    phase:    Phase::Uninitialized,
                    user_id:  None,
                    session:  None,
                    pet:      None,
                    settings: UserSettings::default(),
                    rng,
                }),
                session: session_tx,
                events,
                persist,
                writes,
                timers: StdMutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.inner.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PetEvent> {
        self.inner.events.subscribe()
    }

    pub async fn phase(&self) -> Phase {
        self.inner.live.lock().await.phase
    }

    pub async fn snapshot(&self) -> Option<PetSnapshot> {
        self.inner.live.lock().await.pet.clone()
    }

    pub async fn settings(&self) -> UserSettings {
        self.inner.live.lock().await.settings
    }

    // ── Identity ──────────────────────────────────────────────────

    /// Attach the signed-in user. Any previous session is ended.
    pub async fn sign_in(&self, user_id: &str) {
        self.inner.persist.flush().await;
        let mut live = self.inner.live.lock().await;
        live.user_id = Some(user_id.to_string());
        live.pet = None;
        live.settings = UserSettings::default();
        live.phase = Phase::Uninitialized;
        self.end_session(&mut live);
        info!("user {user_id} signed in");
    }

    /// Detach the user. Pending writes are flushed first; late Hub
    /// responses for the old session are dropped.
    pub async fn sign_out(&self) {
        self.inner.persist.flush().await;
        let mut live = self.inner.live.lock().await;
        if let Some(user_id) = live.user_id.take() {
            info!("user {user_id} signed out");
        }
        live.pet = None;
        live.phase = Phase::Uninitialized;
        self.end_session(&mut live);
    }

    // ── Load / start / reset ──────────────────────────────────────

    /// Fetch the user's record and hydrate the live pet from it.
    /// Without a signed-in user this does nothing.
    pub async fn load(&self) -> PetResult<Option<PetSnapshot>> {
        let user_id = {
            let mut live = self.inner.live.lock().await;
            let Some(user_id) = live.user_id.clone() else {
                debug!("load skipped: no signed-in user");
                return Ok(None);
            };
            live.phase = Phase::Loading;
            user_id
        };

        let repo = Arc::clone(&self.inner.repo);
        let fetch_user = user_id.clone();
        let fetched = tokio::task::spawn_blocking(move || {
            let record = repo.get_user_record(&fetch_user)?;
            if record.is_none() {
                repo.upsert_user(&fetch_user)?;
            }
            Ok::<_, PetError>(record)
        })
        .await?;

        let mut live = self.inner.live.lock().await;
        if live.user_id.as_deref() != Some(user_id.as_str()) || live.phase != Phase::Loading {
            debug!("discarding load for {user_id}: session changed");
            return Ok(live.pet.clone());
        }

        let record = match fetched {
            Ok(record) => record,
            Err(e) => {
                live.phase = Phase::Uninitialized;
                return Err(e);
            }
        };

        let (settings, pet) = match record {
            Some(record) => (record.settings, record.pet),
            None => (UserSettings::default(), None),
        };
        live.settings = settings;

        let pet = match pet {
            Some(record) => match record.into_snapshot(&self.inner.config.rules) {
                Ok(pet) => pet,
                Err(e) => {
                    live.phase = Phase::Uninitialized;
                    return Err(e);
                }
            },
            None => {
                live.phase = Phase::Absent;
                info!("no pet stored for {user_id}");
                return Ok(None);
            }
        };

        self.begin_session(&mut live);
        live.phase = Phase::Loaded;
        live.pet = Some(pet.clone());
        info!("loaded {} ({}) for {user_id}", pet.name, pet.stage);
        self.emit(PetEvent::GameLoaded { name: pet.name.clone(), stage: pet.stage });
        Ok(Some(pet))
    }

    /// Hatch a new egg. Hub registration is attempted but never required.
    /// The first save is written straight through, not debounced.
    pub async fn start_game(&self, name: &str, species: Species) -> PetResult<PetSnapshot> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PetError::Validation("the pet needs a name".into()));
        }
        {
            let live = self.inner.live.lock().await;
            if live.pet.is_some() {
                return Err(PetError::InvalidState("a pet already exists; reset first".into()));
            }
        }

        let rules = &self.inner.config.rules;
        let now = self.inner.clock.now();
        let hatched = PetSnapshot::hatch(name, species, now, rules.starting_coins);

        let mut pet = hatched.clone();
        match self.inner.hub.register(&hatched, &self.inner.config.hub.owner_name).await {
            Ok(registration) => {
                info!(
                    "{name} registered on the hub as {} (already registered: {})",
                    registration.regenmon_id, registration.already_registered
                );
                pet.hub.regenmon_id = Some(registration.regenmon_id);
                pet.hub.is_registered = true;
                pet.coins = registration.balance.balance;
                pet.hub.total_points = registration.balance.total_points;
            }
            Err(e) => warn!("hub registration failed, playing local-only: {e}"),
        }

        let (user_id, session) = {
            let mut live = self.inner.live.lock().await;
            if live.pet.is_some() {
                return Err(PetError::InvalidState("a pet already exists; reset first".into()));
            }
            self.inner.persist.cancel();
            let session = self.begin_session(&mut live);
            live.pet = Some(pet.clone());
            live.phase = Phase::Playing;
            (live.user_id.clone(), session)
        };

        info!("hatched {name} the {species} egg");
        self.emit(PetEvent::GameStarted { name: name.to_string(), species, at: now });
        for event in transitions(&hatched, &pet) {
            self.emit(event);
        }

        if let Some(user_id) = user_id {
            let _ordered = self.inner.writes.lock().await;
            let live_session = *self.inner.session.borrow();
            if live_session != Some(session) {
                debug!("initial save skipped: session {session} already ended");
            } else {
                let record = PetRecord::from_snapshot(&pet);
                if let Err(e) = save_blocking(Arc::clone(&self.inner.repo), user_id, record).await {
                    warn!("initial save of session {session} failed: {e}");
                }
            }
        }
        Ok(pet)
    }

    /// Forget the pet locally and in storage. The Hub entry is left as is.
    pub async fn reset_game(&self) -> PetResult<()> {
        let user_id = {
            let mut live = self.inner.live.lock().await;
            self.inner.persist.cancel();
            self.end_session(&mut live);
            if let Some(pet) = live.pet.take() {
                info!("reset: released {}", pet.name);
            }
            live.phase = Phase::Absent;
            live.user_id.clone()
        };
        self.emit(PetEvent::GameReset);

        if let Some(user_id) = user_id {
            // Waits out a save that started before the session ended.
            let _ordered = self.inner.writes.lock().await;
            let repo = Arc::clone(&self.inner.repo);
            let deleted = tokio::task::spawn_blocking(move || repo.delete_pet(&user_id)).await?;
            if let Err(e) = deleted {
                warn!("deleting stored pet failed: {e}");
            }
        }
        Ok(())
    }

    // ── Gameplay ──────────────────────────────────────────────────

    /// One decay tick. Returns the new snapshot, or `None` with no pet.
    pub async fn tick(&self) -> PetResult<Option<PetSnapshot>> {
        let now = self.inner.clock.now();
        let mut live = self.inner.live.lock().await;
        let Some(prev) = live.pet.clone() else {
            return Ok(None);
        };
        if prev.is_dead() {
            return Ok(Some(prev));
        }
        let next = decay(&prev, now, &self.inner.config.rules, live.rng.as_mut());
        Ok(Some(self.commit(&mut live, next)))
    }

    /// Care for the pet, then sync with the Hub if registered.
    /// On a dead pet this is a no-op returning the unchanged snapshot.
    pub async fn perform_action(&self, action: PetAction) -> PetResult<PetSnapshot> {
        let now = self.inner.clock.now();
        self.apply_then_sync(|prev, rules| apply_action(prev, action, now, rules), "action")
            .await
    }

    /// Apply an evaluation score, then sync with the Hub if registered.
    pub async fn handle_evaluation(&self, result: &EvaluationResult) -> PetResult<PetSnapshot> {
        let now = self.inner.clock.now();
        let score = result.score;
        self.apply_then_sync(|prev, rules| apply_evaluation(prev, score, now, rules), "evaluation")
            .await
    }

    /// Evaluate an upload and feed the result into the pet. Only invalid
    /// uploads are errors; evaluator outages yield the neutral score.
    pub async fn evaluate_upload<E: ImageEvaluator>(
        &self,
        evaluator: &E,
        upload: &Upload,
        category: EvaluationCategory,
    ) -> PetResult<(EvaluationResult, PetSnapshot)> {
        {
            let live = self.inner.live.lock().await;
            match &live.pet {
                None => return Err(PetError::InvalidState("no pet to evaluate for".into())),
                Some(pet) if pet.is_dead() => {
                    return Err(PetError::InvalidState("the pet has died".into()))
                }
                Some(_) => {}
            }
        }
        let result = evaluate_or_default(evaluator, upload, category).await?;
        info!("{} evaluation scored {}/100", category.as_str(), result.score);
        let pet = self.handle_evaluation(&result).await?;
        Ok((result, pet))
    }

    /// Overwrite the coin balance and nothing else.
    pub async fn update_coins(&self, balance: u64) -> PetResult<PetSnapshot> {
        let mut live = self.inner.live.lock().await;
        let prev = living_pet(&live)?;
        let mut next = prev;
        next.coins = balance;
        Ok(self.commit(&mut live, next))
    }

    /// Flip leaderboard visibility. Local only.
    pub async fn toggle_public(&self) -> PetResult<bool> {
        let mut live = self.inner.live.lock().await;
        let prev = living_pet(&live)?;
        let mut next = prev;
        next.hub.public = !next.hub.public;
        let public = next.hub.public;
        self.commit(&mut live, next);
        Ok(public)
    }

    pub async fn set_muted(&self, muted: bool) -> PetResult<()> {
        let user_id = {
            let mut live = self.inner.live.lock().await;
            live.settings.muted = muted;
            live.user_id.clone()
        };
        let Some(user_id) = user_id else {
            return Ok(());
        };
        let repo = Arc::clone(&self.inner.repo);
        let settings = UserSettings { muted };
        let saved = tokio::task::spawn_blocking(move || repo.update_settings(&user_id, &settings)).await?;
        if let Err(e) = saved {
            warn!("saving settings failed: {e}");
        }
        Ok(())
    }

    /// One passive reconciliation with the Hub. Silent on failure.
    pub async fn sync_now(&self) {
        let target = {
            let live = self.inner.live.lock().await;
            sync_target(&live)
        };
        if let Some((session, regenmon_id, payload)) = target {
            self.sync_and_reconcile(session, &regenmon_id, &payload).await;
        }
    }

    // ── Timers ────────────────────────────────────────────────────

    /// Start the decay clock and the passive Hub sync. Both stop on
    /// `shutdown` or when the last controller handle is dropped.
    pub fn spawn_timers(&self) {
        let timing = &self.inner.config.timing;
        let decay_task = self.spawn_interval(timing.decay_interval(), |controller| async move {
            if let Err(e) = controller.tick().await {
                warn!("decay tick failed: {e}");
            }
        });
        let sync_task = self.spawn_interval(timing.hub_sync_interval(), |controller| async move {
            controller.sync_now().await;
        });
        match self.inner.timers.lock() {
            Ok(mut timers) => {
                timers.push(decay_task);
                timers.push(sync_task);
            }
            Err(_) => {
                decay_task.abort();
                sync_task.abort();
                warn!("timer registry poisoned; timers not started");
            }
        }
    }

    /// Stop both timers and write out any pending save.
    pub async fn shutdown(&self) {
        if let Ok(mut timers) = self.inner.timers.lock() {
            for timer in timers.drain(..) {
                timer.abort();
            }
        }
        self.inner.persist.flush().await;
        debug!("controller shut down");
    }

    fn spawn_interval<F, Fut>(&self, every: Duration, job: F) -> JoinHandle<()>
    where
        F: Fn(LifecycleController<S, H>) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let weak: Weak<Inner<S, H>> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                job(LifecycleController { inner }).await;
            }
        })
    }

    // ── Social ────────────────────────────────────────────────────

    pub async fn feed_pet(&self, target_id: &str) -> ActionStatus {
        let (session, from) = self.own_identity().await;
        match self.inner.hub.feed(target_id, from.as_deref()).await {
            Ok(outcome) => {
                self.adopt_sender_balance(session, outcome.success, outcome.sender_balance).await;
                status_from(outcome.success, outcome.message, "¡Alimentado!")
            }
            Err(e) => {
                warn!("feeding {target_id} failed: {e}");
                ActionStatus::failed("Error al alimentar.")
            }
        }
    }

    pub async fn gift_pet(&self, target_id: &str) -> ActionStatus {
        let (session, from) = self.own_identity().await;
        let amount = self.inner.config.hub.gift_amount;
        match self.inner.hub.gift(target_id, from.as_deref(), amount).await {
            Ok(outcome) => {
                self.adopt_sender_balance(session, outcome.success, outcome.sender_balance).await;
                status_from(outcome.success, outcome.message, "¡Regalo enviado!")
            }
            Err(e) => {
                warn!("gifting {target_id} failed: {e}");
                ActionStatus::failed("Error al enviar regalo.")
            }
        }
    }

    /// Empty text is rejected before the Hub is contacted.
    pub async fn send_message(&self, target_id: &str, text: &str) -> PetResult<ActionStatus> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PetError::Validation("message text is empty".into()));
        }
        let (from, from_name) = {
            let live = self.inner.live.lock().await;
            let pet = live.pet.as_ref();
            (
                pet.and_then(|p| p.regenmon_id().map(str::to_string)),
                pet.map(|p| p.name.clone()),
            )
        };
        let sent = self
            .inner
            .hub
            .send_message(target_id, text, from.as_deref(), from_name.as_deref())
            .await;
        Ok(match sent {
            Ok(outcome) => status_from(outcome.success, outcome.message, "¡Mensaje enviado!"),
            Err(e) => {
                warn!("messaging {target_id} failed: {e}");
                ActionStatus::failed("Error al enviar mensaje.")
            }
        })
    }

    pub async fn leaderboard(&self, page: u32) -> PetResult<LeaderboardPage> {
        let limit = self.inner.config.hub.leaderboard_limit;
        self.inner.hub.leaderboard(page.max(1), limit).await
    }

    pub async fn profile(&self, regenmon_id: &str) -> PetResult<HubProfile> {
        self.inner.hub.profile(regenmon_id).await
    }

    /// Messages addressed to this pet.
    pub async fn messages(&self, page: u32) -> PetResult<MessagePage> {
        let (_, regenmon_id) = self.own_identity().await;
        let Some(regenmon_id) = regenmon_id else {
            return Err(PetError::InvalidState("the pet is not registered on the hub".into()));
        };
        let limit = self.inner.config.hub.messages_limit;
        self.inner.hub.messages(&regenmon_id, page.max(1), limit).await
    }

    // ── Commit path ───────────────────────────────────────────────

    async fn apply_then_sync<F>(&self, transform: F, what: &str) -> PetResult<PetSnapshot>
    where
        F: FnOnce(&PetSnapshot, &crate::config::RulesConfig) -> PetResult<PetSnapshot>,
    {
        let (committed, target) = {
            let mut live = self.inner.live.lock().await;
            let Some(prev) = live.pet.clone() else {
                return Err(PetError::InvalidState(format!("no pet for {what}")));
            };
            if prev.is_dead() {
                warn!("{what} ignored: {} has died", prev.name);
                return Ok(prev);
            }
            let next = transform(&prev, &self.inner.config.rules)?;
            let committed = self.commit(&mut live, next);
            (committed, sync_target(&live))
        };

        let Some((session, regenmon_id, payload)) = target else {
            return Ok(committed);
        };
        self.sync_and_reconcile(session, &regenmon_id, &payload).await;
        let live = self.inner.live.lock().await;
        if live.session != Some(session) {
            return Ok(committed);
        }
        Ok(live.pet.clone().unwrap_or(committed))
    }

    async fn sync_and_reconcile(&self, session: SessionId, regenmon_id: &str, payload: &SyncPayload) {
        match self.inner.hub.sync(regenmon_id, payload).await {
            Ok(balance) => self.reconcile(session, &balance).await,
            Err(e) => warn!("hub sync for {regenmon_id} failed, keeping local values: {e}"),
        }
    }

    async fn reconcile(&self, session: SessionId, balance: &HubBalance) {
        let mut live = self.inner.live.lock().await;
        if live.session != Some(session) {
            debug!("discarding hub balance for ended session {session}");
            return;
        }
        let Some(prev) = live.pet.clone() else { return };
        let next = merge_hub_reconciliation(&prev, balance);
        if next != prev {
            self.commit(&mut live, next);
        }
    }

    /// Replace the live snapshot, publish what changed, schedule a save.
    fn commit(&self, live: &mut LiveState, next: PetSnapshot) -> PetSnapshot {
        let events = match &live.pet {
            Some(prev) => transitions(prev, &next),
            None => Vec::new(),
        };
        live.pet = Some(next.clone());
        if live.phase == Phase::Loaded {
            live.phase = Phase::Playing;
        }

        for event in events {
            info!("[{}] {}: {:?}", event.kind(), next.name, event);
            self.emit(event);
        }

        if let (Some(user_id), Some(session)) = (live.user_id.clone(), live.session) {
            self.inner.persist.push(PendingWrite {
                session,
                user_id,
                record: PetRecord::from_snapshot(&next),
            });
        }
        next
    }

    fn begin_session(&self, live: &mut LiveState) -> SessionId {
        let session = Uuid::new_v4();
        live.session = Some(session);
        self.inner.session.send_replace(Some(session));
        session
    }

    fn end_session(&self, live: &mut LiveState) {
        live.session = None;
        self.inner.session.send_replace(None);
    }

    fn emit(&self, event: PetEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    async fn own_identity(&self) -> (Option<SessionId>, Option<RegenmonId>) {
        let live = self.inner.live.lock().await;
        let regenmon_id = live.pet.as_ref().and_then(|p| p.regenmon_id().map(str::to_string));
        (live.session, regenmon_id)
    }

    /// The balance belongs to the pet that sent the interaction; a pet
    /// started since then keeps its own coins.
    async fn adopt_sender_balance(
        &self,
        session: Option<SessionId>,
        success: bool,
        sender_balance: Option<u64>,
    ) {
        let (true, Some(balance)) = (success, sender_balance) else { return };
        let mut live = self.inner.live.lock().await;
        if session.is_none() || live.session != session {
            debug!("sender balance dropped: session changed");
            return;
        }
        match living_pet(&live) {
            Ok(prev) if prev.coins != balance => {
                let mut next = prev;
                next.coins = balance;
                self.commit(&mut live, next);
            }
            Ok(_) => {}
            Err(e) => debug!("sender balance not applied: {e}"),
        }
    }
}

fn living_pet(live: &LiveState) -> PetResult<PetSnapshot> {
    match &live.pet {
        None => Err(PetError::InvalidState("no pet".into())),
        Some(pet) if pet.is_dead() => Err(PetError::InvalidState("the pet has died".into())),
        Some(pet) => Ok(pet.clone()),
    }
}

fn sync_target(live: &LiveState) -> Option<(SessionId, RegenmonId, SyncPayload)> {
    let session = live.session?;
    let pet = live.pet.as_ref()?;
    let regenmon_id = pet.regenmon_id()?.to_string();
    Some((session, regenmon_id, SyncPayload::from_snapshot(pet)))
}

fn status_from(success: bool, message: String, fallback: &str) -> ActionStatus {
    let text = if message.trim().is_empty() { fallback.to_string() } else { message };
    ActionStatus { ok: success, text }
}

async fn save_blocking<S: PetRepository>(
    repo: Arc<S>,
    user_id: UserId,
    record: PetRecord,
) -> PetResult<()> {
    tokio::task::spawn_blocking(move || repo.save_pet_state(&user_id, &record)).await?
}
