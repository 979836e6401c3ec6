//! Image evaluation: a vision model scores a player's upload 0–100.
//!
//! The score feeds `action::apply_evaluation`. Invalid uploads are
//! rejected before any network call; every other failure degrades to a
//! neutral score so the player is never blocked.

use crate::{
    config::EvaluatorConfig,
    error::{PetError, PetResult},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{future::Future, time::Duration};

pub const NEUTRAL_SCORE: u8 = 50;
pub const MAINTENANCE_FEEDBACK: &str = "⚠️ Sistema en mantenimiento. Recompensa base asignada.";

const SYSTEM_PROMPT: &str = "Actúa como un profesor amigable de un juego educativo. \
Tu misión es evaluar la imagen del estudiante. Sin importar el contenido, siempre extrae \
un valor educativo. Responde estrictamente en este formato: Score: [0-100]/100. \
[Feedback de 1-2 oraciones en español alentador].";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EvaluationCategory {
    #[serde(rename = "letras")]
    Letters,
    #[serde(rename = "poemas")]
    Poems,
    #[serde(rename = "diseño")]
    Design,
}

impl EvaluationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Letters => "letras",
            Self::Poems   => "poemas",
            Self::Design  => "diseño",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvaluationResult {
    pub score:    u8,
    pub feedback: String,
}

impl EvaluationResult {
    pub fn neutral() -> Self {
        Self { score: NEUTRAL_SCORE, feedback: MAINTENANCE_FEEDBACK.to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMime {
    Png,
    Jpeg,
}

impl ImageMime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png  => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// A player's uploaded image.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub mime:  String,
}

/// PNG or JPEG, non-empty, at most `max_bytes`.
pub fn validate_upload(upload: &Upload, max_bytes: usize) -> PetResult<ImageMime> {
    let mime = match upload.mime.as_str() {
        "image/png"                => ImageMime::Png,
        "image/jpeg" | "image/jpg" => ImageMime::Jpeg,
        other => {
            return Err(PetError::Validation(format!(
                "only PNG or JPEG images are accepted (got '{other}')"
            )))
        }
    };
    if upload.bytes.is_empty() {
        return Err(PetError::Validation("image is empty".into()));
    }
    if upload.bytes.len() > max_bytes {
        return Err(PetError::Validation(format!(
            "image must be smaller than {} MB",
            max_bytes / (1024 * 1024)
        )));
    }
    Ok(mime)
}

/// Parse a `Score: NN/100. feedback` reply. Without a score marker the
/// whole reply is feedback and the score is neutral.
pub fn parse_score_reply(content: &str) -> EvaluationResult {
    const MARKER: &str = "Score:";
    if let Some(start) = content.find(MARKER) {
        let rest = content[start + MARKER.len()..].trim_start();
        let digits_len = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        let after = &rest[digits_len..];
        if digits_len > 0 && after.starts_with("/100") {
            let score = rest[..digits_len]
                .parse::<u32>()
                .map(|n| n.min(100) as u8)
                .unwrap_or(NEUTRAL_SCORE);
            let feedback = match after["/100".len()..].strip_prefix('.') {
                Some(tail) => format!("{}{}", &content[..start], tail.trim_start()),
                None => content.to_string(),
            };
            return EvaluationResult { score, feedback: feedback.trim().to_string() };
        }
    }
    EvaluationResult { score: NEUTRAL_SCORE, feedback: content.trim().to_string() }
}

pub trait ImageEvaluator: Send + Sync {
    fn evaluate(
        &self,
        upload: &Upload,
        category: EvaluationCategory,
    ) -> impl Future<Output = PetResult<EvaluationResult>> + Send;

    fn max_image_bytes(&self) -> usize;
}

/// Validate, then evaluate, degrading any non-validation failure to the
/// neutral result.
pub async fn evaluate_or_default<E: ImageEvaluator>(
    evaluator: &E,
    upload: &Upload,
    category: EvaluationCategory,
) -> PetResult<EvaluationResult> {
    validate_upload(upload, evaluator.max_image_bytes())?;
    match evaluator.evaluate(upload, category).await {
        Ok(result) => Ok(result),
        Err(PetError::Validation(msg)) => Err(PetError::Validation(msg)),
        Err(e) => {
            log::warn!("image evaluation failed, assigning neutral score: {e}");
            Ok(EvaluationResult::neutral())
        }
    }
}

/// OpenAI-compatible vision client.
pub struct VisionEvaluator {
    client:          Client,
    api_key:         String,
    api_url:         String,
    model:           String,
    max_image_bytes: usize,
}

impl VisionEvaluator {
    pub fn new(api_key: String, config: &EvaluatorConfig) -> PetResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            api_key,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            max_image_bytes: config.max_image_bytes,
        })
    }

    /// Required: EVALUATOR_API_KEY
    pub fn from_env(config: &EvaluatorConfig) -> PetResult<Self> {
        let api_key = std::env::var("EVALUATOR_API_KEY")
            .map_err(|_| PetError::Evaluation("EVALUATOR_API_KEY not set".into()))?;
        Self::new(api_key, config)
    }
}

impl ImageEvaluator for VisionEvaluator {
    async fn evaluate(
        &self,
        upload: &Upload,
        category: EvaluationCategory,
    ) -> PetResult<EvaluationResult> {
        let mime = validate_upload(upload, self.max_image_bytes)?;
        let data_url = format!("data:{};base64,{}", mime.as_str(), STANDARD.encode(&upload.bytes));

        let request = ChatRequest {
            model: &self.model,
            max_tokens: 150,
            messages: vec![
                ChatMessage {
                    role:    "system",
                    content: vec![ContentPart::Text { text: SYSTEM_PROMPT.to_string() }],
                },
                ChatMessage {
                    role:    "user",
                    content: vec![
                        ContentPart::Text {
                            text: format!("Evalúa esta imagen de categoría: {}", category.as_str()),
                        },
                        ContentPart::ImageUrl { image_url: ImageUrl { url: data_url } },
                    ],
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| PetError::Evaluation(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(PetError::Evaluation(format!("API error: {status}")));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| PetError::Evaluation(e.to_string()))?;

        completion
            .choices
            .first()
            .map(|c| parse_score_reply(&c.message.content))
            .ok_or_else(|| PetError::Evaluation("Empty response".into()))
    }

    fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model:      &'a str,
    max_tokens: u32,
    messages:   Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role:    &'static str,
    content: Vec<ContentPart>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}
