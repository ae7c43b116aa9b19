//! # tarot_reading
//!
//! Turns the cards picked during a session into narrative text.
//!
//! The primary path is an OpenAI-compatible chat-completions endpoint that
//! is asked to answer with `{ "readings": [ ... ] }`, one passage per card.
//! Whenever that path fails (no key, network error, malformed answer) the
//! caller falls back to [`fallback_reading`], which is built purely from the
//! static meanings in [`tarot_deck::meaning`].
//!
//! ```rust
//! use tarot_deck::{Orientation, Spread};
//! use tarot_reading::{fallback_reading, DrawnCard, ReadingRequest, ReadingSource};
//!
//! let req = ReadingRequest {
//!     question: "What should I focus on?".into(),
//!     spread:   Spread::Single,
//!     cards:    vec![DrawnCard::new(0, Orientation::Upright, "Guidance")],
//! };
//! let reading = fallback_reading(&req);
//! assert_eq!(reading.passages.len(), 1);
//! assert_eq!(reading.source, ReadingSource::Fallback);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tarot_deck::{meaning, Card, Orientation, Spread};
use thiserror::Error;
use tracing::{debug, info, warn};

// ════════════════════════════════════════════════════════════════════════════
// Request / result model
// ════════════════════════════════════════════════════════════════════════════

/// One card as it was drawn: deck index, orientation and spread position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DrawnCard {
    pub index:          usize,
    pub name:           String,
    pub orientation:    Orientation,
    pub position_label: String,
}

impl DrawnCard {
    /// Build from a deck index; unknown indices get a placeholder name.
    pub fn new(index: usize, orientation: Orientation, position_label: &str) -> Self {
        let name = Card::at(index)
            .map(|c| c.name)
            .unwrap_or_else(|| format!("Card #{}", index));
        DrawnCard { index, name, orientation, position_label: position_label.to_string() }
    }
}

/// Everything the reading generator needs for one session.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReadingRequest {
    pub question: String,
    pub spread:   Spread,
    pub cards:    Vec<DrawnCard>,
}

/// Where a reading's text came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadingSource { Service, Fallback }

/// Narrative passages, one per drawn card in request order.
#[derive(Clone, Debug, PartialEq)]
pub struct Reading {
    pub passages: Vec<String>,
    pub source:   ReadingSource,
}

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum ReadingError {
    #[error("no API key configured (set TAROT_API_KEY)")]
    MissingApiKey,

    #[error("reading request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("reading service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed reading response: {0}")]
    Malformed(String),

    #[error("reading response has {got} passages for {expected} cards")]
    Incomplete { expected: usize, got: usize },
}

// ════════════════════════════════════════════════════════════════════════════
// ReadingService — anything that can produce passages for a request
// ════════════════════════════════════════════════════════════════════════════

/// A narrative generator. Implementations may block; callers run them on a
/// worker thread.
pub trait ReadingService: Send + 'static {
    fn generate(&self, request: &ReadingRequest) -> Result<Vec<String>, ReadingError>;

    fn name(&self) -> &'static str { "reading-service" }
}

/// Run `service`, falling back to the static narrative on any error.
pub fn reading_or_fallback(service: &dyn ReadingService, request: &ReadingRequest) -> Reading {
    match service.generate(request) {
        Ok(passages) => Reading { passages, source: ReadingSource::Service },
        Err(e) => {
            warn!(service = service.name(), error = %e, "reading failed, using static narrative");
            fallback_reading(request)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Static fallback
// ════════════════════════════════════════════════════════════════════════════

/// Build one passage per card from the static card meanings.
pub fn fallback_reading(request: &ReadingRequest) -> Reading {
    let passages = request.cards.iter().map(fallback_passage).collect();
    Reading { passages, source: ReadingSource::Fallback }
}

/// Static passage for a single drawn card.
pub fn fallback_passage(card: &DrawnCard) -> String {
    match Card::at(card.index) {
        Some(c) => {
            let m = meaning(&c, card.orientation);
            format!(
                "{} — {} ({}): {}. {}",
                card.position_label, m.title, m.orientation_label, m.keywords, m.description
            )
        }
        None => format!("{} — {}", card.position_label, card.name),
    }
}

/// Service that never reaches the network; always answers with the static
/// narrative. Used when no API key is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineReadingService;

impl ReadingService for OfflineReadingService {
    fn generate(&self, request: &ReadingRequest) -> Result<Vec<String>, ReadingError> {
        Ok(fallback_reading(request).passages)
    }

    fn name(&self) -> &'static str { "offline" }
}

// ════════════════════════════════════════════════════════════════════════════
// Prompt construction
// ════════════════════════════════════════════════════════════════════════════

pub const SYSTEM_PROMPT: &str = "You are a mysterious, empathetic and deeply perceptive tarot \
reader. Your readings are elegant and go straight to the heart. Always answer in JSON.";

/// Render the user prompt describing the question and the drawn cards.
pub fn build_user_prompt(request: &ReadingRequest) -> String {
    let cards = request.cards.iter().enumerate()
        .map(|(i, c)| format!(
            "{}. [{}]: {} ({})",
            i + 1, c.position_label, c.name, c.orientation.label()
        ))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Interpret the spread below for the user's question.\n\n\
         Question: \"{question}\"\n\
         Spread: {spread}\n\n\
         Cards:\n{cards}\n\n\
         Requirements:\n\
         1. Combine each card's meaning, position, orientation and the question.\n\
         2. Reply with plain JSON only, no markdown.\n\
         3. The JSON must contain a \"readings\" array with exactly {n} strings, \
         one per card in the order listed.\n",
        question = request.question,
        spread   = request.spread.name(),
        cards    = cards,
        n        = request.cards.len(),
    )
}

// ════════════════════════════════════════════════════════════════════════════
// Response parsing
// ════════════════════════════════════════════════════════════════════════════

/// Strip an optional markdown code fence around a JSON body.
fn strip_code_fence(text: &str) -> &str {
    let t = text.trim();
    let t = t.strip_prefix("```json").or_else(|| t.strip_prefix("```")).unwrap_or(t);
    let t = t.strip_suffix("```").unwrap_or(t);
    t.trim()
}

/// Reduce one `readings` item to text. Objects are mined for the usual
/// fields before falling back to their JSON form.
fn passage_text(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Object(map) => ["interpretation", "analysis", "description"].iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| item.to_string()),
        other => other.to_string(),
    }
}

/// Parse the model's message content into exactly `expected` passages.
pub fn parse_readings(content: &str, expected: usize) -> Result<Vec<String>, ReadingError> {
    let body = strip_code_fence(content);
    let json: Value = serde_json::from_str(body)
        .map_err(|e| ReadingError::Malformed(e.to_string()))?;

    let items = json.get("readings")
        .and_then(Value::as_array)
        .ok_or_else(|| ReadingError::Malformed("missing \"readings\" array".into()))?;

    let passages: Vec<String> = items.iter().map(passage_text).collect();
    if passages.len() < expected {
        return Err(ReadingError::Incomplete { expected, got: passages.len() });
    }
    Ok(passages.into_iter().take(expected).collect())
}

// ════════════════════════════════════════════════════════════════════════════
// ChatReadingClient — chat-completions backend
// ════════════════════════════════════════════════════════════════════════════

/// Connection settings for the chat-completions endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadingConfig {
    pub endpoint:    String,
    pub model:       String,
    pub api_key:     Option<String>,
    pub temperature: f32,
    pub timeout:     Duration,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        ReadingConfig {
            endpoint:    "https://api.deepseek.com/chat/completions".to_string(),
            model:       "deepseek-chat".to_string(),
            api_key:     None,
            temperature: 1.0,
            timeout:     Duration::from_secs(20),
        }
    }
}

impl ReadingConfig {
    /// Defaults overridden by `TAROT_API_KEY`, `TAROT_API_URL` and
    /// `TAROT_MODEL`.
    pub fn from_env() -> Self {
        let mut cfg = ReadingConfig::default();
        if let Ok(v) = std::env::var("TAROT_API_KEY") {
            if !v.trim().is_empty() { cfg.api_key = Some(v.trim().to_string()); }
        }
        if let Ok(v) = std::env::var("TAROT_API_URL") {
            cfg.endpoint = v;
        }
        if let Ok(v) = std::env::var("TAROT_MODEL") {
            cfg.model = v;
        }
        cfg
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model:           &'a str,
    messages:        Vec<ChatMessage<'a>>,
    temperature:     f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role:    &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

/// Blocking chat-completions client.
pub struct ChatReadingClient {
    config: ReadingConfig,
    http:   reqwest::blocking::Client,
}

impl ChatReadingClient {
    pub fn new(config: ReadingConfig) -> Result<Self, ReadingError> {
        if config.api_key.is_none() {
            return Err(ReadingError::MissingApiKey);
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(ChatReadingClient { config, http })
    }
}

impl ReadingService for ChatReadingClient {
    fn generate(&self, request: &ReadingRequest) -> Result<Vec<String>, ReadingError> {
        let key = self.config.api_key.as_deref().ok_or(ReadingError::MissingApiKey)?;
        let user_prompt = build_user_prompt(request);

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user",   content: &user_prompt },
            ],
            temperature:     self.config.temperature,
            response_format: ResponseFormat { kind: "json_object" },
        };

        info!(model = %self.config.model, cards = request.cards.len(), "requesting reading");
        let response = self.http
            .post(&self.config.endpoint)
            .bearer_auth(key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ReadingError::Status { status: status.as_u16(), body });
        }

        let chat: ChatResponse = response.json()?;
        let content = chat.choices.first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| ReadingError::Malformed("no choices in response".into()))?;
        debug!(len = content.len(), "reading content received");

        parse_readings(content, request.cards.len())
    }

    fn name(&self) -> &'static str { "chat-completions" }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn three_card_request() -> ReadingRequest {
        ReadingRequest {
            question: "Where is my career going?".into(),
            spread:   Spread::TimeFlow,
            cards: vec![
                DrawnCard::new(0,  Orientation::Upright,  "Past"),
                DrawnCard::new(13, Orientation::Reversed, "Present"),
                DrawnCard::new(40, Orientation::Upright,  "Future"),
            ],
        }
    }

    struct Failing;
    impl ReadingService for Failing {
        fn generate(&self, _: &ReadingRequest) -> Result<Vec<String>, ReadingError> {
            Err(ReadingError::Malformed("boom".into()))
        }
    }

    #[test]
    fn fallback_has_one_passage_per_card() {
        let r = fallback_reading(&three_card_request());
        assert_eq!(r.passages.len(), 3);
        assert!(r.passages[1].contains("Death"));
        assert!(r.passages[1].contains("Reversed"));
        assert!(r.passages[2].starts_with("Future"));
    }

    #[test]
    fn failing_service_degrades_to_fallback() {
        let req = three_card_request();
        let r = reading_or_fallback(&Failing, &req);
        assert_eq!(r.source, ReadingSource::Fallback);
        assert_eq!(r.passages.len(), req.cards.len());
    }

    #[test]
    fn offline_service_succeeds() {
        let req = three_card_request();
        let r = reading_or_fallback(&OfflineReadingService, &req);
        assert_eq!(r.source, ReadingSource::Service);
        assert_eq!(r.passages.len(), 3);
    }

    #[test]
    fn prompt_lists_every_card() {
        let p = build_user_prompt(&three_card_request());
        assert!(p.contains("1. [Past]: The Fool (Upright)"));
        assert!(p.contains("2. [Present]: Death (Reversed)"));
        assert!(p.contains("exactly 3 strings"));
    }

    #[test]
    fn parse_plain_strings() {
        let got = parse_readings(r#"{"readings": ["a", "b"]}"#, 2).unwrap();
        assert_eq!(got, vec!["a", "b"]);
    }

    #[test]
    fn parse_strips_code_fence() {
        let text = "```json\n{\"readings\": [\"only\"]}\n```";
        assert_eq!(parse_readings(text, 1).unwrap(), vec!["only"]);
    }

    #[test]
    fn parse_reduces_objects() {
        let text = r#"{"readings": [{"interpretation": "x"}, {"analysis": "y"}, {"other": 1}]}"#;
        let got = parse_readings(text, 3).unwrap();
        assert_eq!(got[0], "x");
        assert_eq!(got[1], "y");
        assert_eq!(got[2], r#"{"other":1}"#);
    }

    #[test]
    fn parse_rejects_short_answer() {
        let err = parse_readings(r#"{"readings": ["a"]}"#, 3).unwrap_err();
        assert!(matches!(err, ReadingError::Incomplete { expected: 3, got: 1 }));
    }

    #[test]
    fn parse_rejects_missing_array() {
        assert!(matches!(parse_readings("{}", 1), Err(ReadingError::Malformed(_))));
        assert!(matches!(parse_readings("not json", 1), Err(ReadingError::Malformed(_))));
    }

    #[test]
    fn client_requires_key() {
        let cfg = ReadingConfig { api_key: None, ..ReadingConfig::default() };
        assert!(matches!(ChatReadingClient::new(cfg), Err(ReadingError::MissingApiKey)));
    }
}
