//! HTTP client for the Hub REST API.
//!
//! The Hub wraps every response in `{ success, message?, data?, pagination? }`.
//! Reads and registration treat a non-2xx status as an error. Social
//! interactions (feed, gift, message) turn a non-2xx status into an
//! unsuccessful outcome carrying the Hub's reason, so the player sees why.

use super::{
    HubApi, HubBalance, HubMessage, HubProfile, InteractionOutcome, LeaderboardEntry,
    LeaderboardPage, MessagePage, Pagination, Registration, SyncPayload,
};
use crate::{
    config::HubConfig,
    error::{PetError, PetResult},
    snapshot::PetSnapshot,
};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

pub struct HubClient {
    client:   Client,
    base_url: String,
    app_url:  String,
}

impl HubClient {
    pub fn new(config: &HubConfig) -> PetResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_url:  config.app_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn sprite_for(&self, pet: &PetSnapshot) -> String {
        format!("{}/assets/{}-adult_happy.png", self.app_url, pet.species)
    }

    /// Fail on non-2xx, then decode the envelope.
    async fn decode<T: DeserializeOwned>(response: Response, op: &str) -> PetResult<Envelope<T>> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("hub {op} failed: {status} {body}");
            return Err(PetError::Hub {
                status:  status.as_u16(),
                message: if body.is_empty() { status.to_string() } else { body },
            });
        }
        let envelope: Envelope<T> = response.json().await?;
        if !envelope.success {
            return Err(PetError::Hub {
                status:  status.as_u16(),
                message: envelope.message.unwrap_or_else(|| format!("{op} rejected")),
            });
        }
        Ok(envelope)
    }

    /// Interactions report a refusal in-band instead of failing.
    async fn interaction(response: Response, op: &str) -> PetResult<InteractionOutcome> {
        let status = response.status();
        let envelope: Option<Envelope<InteractionData>> = response.json().await.ok();

        if !status.is_success() {
            let message = envelope
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("Error {}: {}", status.as_u16(), status));
            log::warn!("hub {op} refused: {message}");
            return Ok(InteractionOutcome { success: false, message, sender_balance: None });
        }

        let envelope = envelope.ok_or_else(|| PetError::Hub {
            status:  status.as_u16(),
            message: format!("{op} returned an unreadable body"),
        })?;
        let data = envelope.data.unwrap_or_default();
        Ok(InteractionOutcome {
            success:        envelope.success,
            message:        data.message.or(envelope.message).unwrap_or_default(),
            sender_balance: data.sender_balance,
        })
    }
}

impl HubApi for HubClient {
    async fn register(&self, pet: &PetSnapshot, owner_name: &str) -> PetResult<Registration> {
        let request = RegisterRequest {
            name:       &pet.name,
            owner_name,
            app_url:    &self.app_url,
            sprite:     self.sprite_for(pet),
        };
        let response = self.client.post(self.url("/register")).json(&request).send().await?;
        let envelope: Envelope<RegisterData> = Self::decode(response, "register").await?;
        let data = envelope.data.ok_or_else(|| missing_data("register"))?;
        Ok(Registration {
            regenmon_id:        data.id,
            balance:            HubBalance { balance: data.balance, total_points: data.total_points },
            already_registered: data.already_registered.unwrap_or(false),
        })
    }

    async fn sync(&self, regenmon_id: &str, payload: &SyncPayload) -> PetResult<HubBalance> {
        let request = SyncRequest { regenmon_id, payload };
        let response = self.client.post(self.url("/sync")).json(&request).send().await?;
        let envelope: Envelope<HubBalance> = Self::decode(response, "sync").await?;
        envelope.data.ok_or_else(|| missing_data("sync"))
    }

    async fn leaderboard(&self, page: u32, limit: u32) -> PetResult<LeaderboardPage> {
        let response = self
            .client
            .get(self.url("/leaderboard"))
            .query(&[("page", page), ("limit", limit)])
            .send()
            .await?;
        let envelope: Envelope<Vec<LeaderboardEntry>> = Self::decode(response, "leaderboard").await?;
        Ok(LeaderboardPage {
            items:      envelope.data.unwrap_or_default(),
            pagination: envelope.pagination.unwrap_or(Pagination {
                page,
                limit,
                total: 0,
                total_pages: 1,
            }),
        })
    }

    async fn profile(&self, id: &str) -> PetResult<HubProfile> {
        let response = self.client.get(self.url(&format!("/regenmon/{id}"))).send().await?;
        let envelope: Envelope<HubProfile> = Self::decode(response, "profile").await?;
        envelope.data.ok_or_else(|| missing_data("profile"))
    }

    async fn feed(&self, target_id: &str, from_id: Option<&str>) -> PetResult<InteractionOutcome> {
        let request = InteractionRequest { from_regenmon_id: from_id, ..Default::default() };
        let response = self
            .client
            .post(self.url(&format!("/regenmon/{target_id}/feed")))
            .json(&request)
            .send()
            .await?;
        Self::interaction(response, "feed").await
    }

    async fn gift(
        &self,
        target_id: &str,
        from_id: Option<&str>,
        amount: u64,
    ) -> PetResult<InteractionOutcome> {
        let request = InteractionRequest {
            from_regenmon_id: from_id,
            amount: Some(amount),
            ..Default::default()
        };
        let response = self
            .client
            .post(self.url(&format!("/regenmon/{target_id}/gift")))
            .json(&request)
            .send()
            .await?;
        Self::interaction(response, "gift").await
    }

    async fn send_message(
        &self,
        target_id: &str,
        text: &str,
        from_id: Option<&str>,
        from_name: Option<&str>,
    ) -> PetResult<InteractionOutcome> {
        let request = InteractionRequest {
            from_regenmon_id: from_id,
            from_name,
            message: Some(text),
            amount: None,
        };
        let response = self
            .client
            .post(self.url(&format!("/regenmon/{target_id}/messages")))
            .json(&request)
            .send()
            .await?;
        Self::interaction(response, "message").await
    }

    async fn messages(&self, id: &str, page: u32, limit: u32) -> PetResult<MessagePage> {
        let response = self
            .client
            .get(self.url(&format!("/regenmon/{id}/messages")))
            .query(&[("limit", limit), ("page", page)])
            .send()
            .await?;
        let envelope: Envelope<MessagesData> = Self::decode(response, "messages").await?;
        let data = envelope.data.unwrap_or_default();
        Ok(MessagePage { messages: data.messages, total: data.total })
    }
}

fn missing_data(op: &str) -> PetError {
    PetError::Hub { status: 200, message: format!("{op} response carried no data") }
}

// Wire format

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success:    bool,
    #[serde(default)]
    message:    Option<String>,
    data:       Option<T>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest<'a> {
    name:       &'a str,
    owner_name: &'a str,
    app_url:    &'a str,
    sprite:     String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterData {
    id:                 String,
    balance:            u64,
    total_points:       u64,
    #[serde(default)]
    already_registered: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncRequest<'a> {
    regenmon_id: &'a str,
    #[serde(flatten)]
    payload:     &'a SyncPayload,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct InteractionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    from_regenmon_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    from_name:        Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message:          Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount:           Option<u64>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct InteractionData {
    #[serde(default)]
    message:        Option<String>,
    #[serde(default)]
    sender_balance: Option<u64>,
}

#[derive(Deserialize, Default)]
struct MessagesData {
    #[serde(default)]
    messages: Vec<HubMessage>,
    #[serde(default)]
    total:    u32,
}
