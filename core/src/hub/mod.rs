//! The Hub: the shared cross-player service.
//!
//! RULE: every Hub call is an optional enrichment. Callers must keep the
//! game playable when any of these futures resolves to an error.

mod client;

pub use client::HubClient;

use crate::{
    error::{PetError, PetResult},
    snapshot::{PetSnapshot, Stats},
    types::{RegenmonId, Timestamp},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Currency the Hub reports back after register or sync.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HubBalance {
    pub balance:      u64,
    pub total_points: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub regenmon_id:        RegenmonId,
    pub balance:            HubBalance,
    pub already_registered: bool,
}

/// What a sync call reports about the pet.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    pub stats:            Stats,
    pub total_points:     u64,
    pub training_history: Vec<Timestamp>,
}

impl SyncPayload {
    pub fn from_snapshot(pet: &PetSnapshot) -> Self {
        Self {
            stats:            pet.stats,
            total_points:     pet.hub.total_points,
            training_history: pet.training_history.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank:          u32,
    pub id:            RegenmonId,
    pub name:          String,
    #[serde(default)]
    pub owner_name:    Option<String>,
    #[serde(default)]
    pub sprite:        String,
    #[serde(default)]
    pub stage:         u8,
    pub total_points:  u64,
    #[serde(default)]
    pub balance:       u64,
    #[serde(default)]
    pub registered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_synced:   Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page:        u32,
    pub limit:       u32,
    pub total:       u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardPage {
    pub items:      Vec<LeaderboardEntry>,
    pub pagination: Pagination,
}

/// Stats as other players' games report them; not clamped by us.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HubStats {
    pub happiness: i64,
    pub energy:    i64,
    pub hunger:    i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HubProfile {
    pub id:            RegenmonId,
    pub name:          String,
    #[serde(default)]
    pub owner_name:    Option<String>,
    #[serde(default)]
    pub sprite:        String,
    #[serde(default)]
    pub app_url:       String,
    pub total_points:  u64,
    #[serde(default)]
    pub balance:       u64,
    #[serde(default)]
    pub stats:         HubStats,
    #[serde(default)]
    pub registered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_synced:   Option<DateTime<Utc>>,
    #[serde(default)]
    pub visits:        u64,
}

/// Result of feed, gift or message. A rejected interaction is not an
/// error: the Hub answers `success = false` with a reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionOutcome {
    pub success:        bool,
    pub message:        String,
    pub sender_balance: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HubMessage {
    pub id:               String,
    pub from_regenmon_id: Option<RegenmonId>,
    #[serde(default)]
    pub from_name:        String,
    pub message:          String,
    pub created_at:       DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePage {
    pub messages: Vec<HubMessage>,
    pub total:    u32,
}

impl MessagePage {
    pub fn total_pages(&self, limit: u32) -> u32 {
        self.total.div_ceil(limit.max(1)).max(1)
    }
}

/// The contract the controller needs from the Hub.
pub trait HubApi: Send + Sync + 'static {
    fn register(
        &self,
        pet: &PetSnapshot,
        owner_name: &str,
    ) -> impl Future<Output = PetResult<Registration>> + Send;

    fn sync(
        &self,
        regenmon_id: &str,
        payload: &SyncPayload,
    ) -> impl Future<Output = PetResult<HubBalance>> + Send;

    fn leaderboard(
        &self,
        page: u32,
        limit: u32,
    ) -> impl Future<Output = PetResult<LeaderboardPage>> + Send;

    fn profile(&self, id: &str) -> impl Future<Output = PetResult<HubProfile>> + Send;

    fn feed(
        &self,
        target_id: &str,
        from_id: Option<&str>,
    ) -> impl Future<Output = PetResult<InteractionOutcome>> + Send;

    fn gift(
        &self,
        target_id: &str,
        from_id: Option<&str>,
        amount: u64,
    ) -> impl Future<Output = PetResult<InteractionOutcome>> + Send;

    fn send_message(
        &self,
        target_id: &str,
        text: &str,
        from_id: Option<&str>,
        from_name: Option<&str>,
    ) -> impl Future<Output = PetResult<InteractionOutcome>> + Send;

    fn messages(
        &self,
        id: &str,
        page: u32,
        limit: u32,
    ) -> impl Future<Output = PetResult<MessagePage>> + Send;
}

/// A Hub that is never there. Used for local-only play.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineHub;

impl HubApi for OfflineHub {
    async fn register(&self, _pet: &PetSnapshot, _owner_name: &str) -> PetResult<Registration> {
        Err(PetError::HubUnavailable)
    }

    async fn sync(&self, _regenmon_id: &str, _payload: &SyncPayload) -> PetResult<HubBalance> {
        Err(PetError::HubUnavailable)
    }

    async fn leaderboard(&self, _page: u32, _limit: u32) -> PetResult<LeaderboardPage> {
        Err(PetError::HubUnavailable)
    }

    async fn profile(&self, _id: &str) -> PetResult<HubProfile> {
        Err(PetError::HubUnavailable)
    }

    async fn feed(&self, _target_id: &str, _from_id: Option<&str>) -> PetResult<InteractionOutcome> {
        Err(PetError::HubUnavailable)
    }

    async fn gift(
        &self,
        _target_id: &str,
        _from_id: Option<&str>,
        _amount: u64,
    ) -> PetResult<InteractionOutcome> {
        Err(PetError::HubUnavailable)
    }

    async fn send_message(
        &self,
        _target_id: &str,
        _text: &str,
        _from_id: Option<&str>,
        _from_name: Option<&str>,
    ) -> PetResult<InteractionOutcome> {
        Err(PetError::HubUnavailable)
    }

    async fn messages(&self, _id: &str, _page: u32, _limit: u32) -> PetResult<MessagePage> {
        Err(PetError::HubUnavailable)
    }
}
