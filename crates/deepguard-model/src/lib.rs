#![warn(missing_docs)]
//! # deepguard-model
//!
//! ## Purpose
//! Wraps the external generative-AI service behind an injectable transport.
//!
//! ## Responsibilities
//! - Model one request (system instruction, turn history, output schema).
//! - Load endpoint, model name and API key from the environment.
//! - Implement the transport for the Gemini `generateContent` REST API.
//!
//! ## Data flow
//! Client code builds a [`ModelRequest`] -> [`ModelTransport::generate`] ->
//! raw response text -> contract validation in the caller.
//!
//! ## Ownership and lifetimes
//! Requests own their text so a transport can outlive the caller's buffers
//! across `.await` points.
//!
//! ## Error model
//! [`ModelError::MissingApiKey`] is fatal and reported by
//! [`ModelTransport::ensure_ready`] before any request. Every other variant
//! describes a recoverable call failure.
//!
//! ## Security and privacy notes
//! The API key travels in the `x-goog-api-key` header, never in the URL, and
//! [`ApiKey`]'s `Debug` output is redacted.
//!
//! ## Example
//! ```rust
//! use deepguard_model::{ModelConfig, ModelRequest};
//!
//! let config = ModelConfig::from_lookup(|_| None).expect("defaults are valid");
//! assert!(config.api_key().is_none());
//!
//! let request = ModelRequest::prompt("Classify this message");
//! assert_eq!(request.contents.len(), 1);
//! ```

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default API base URL.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

/// Environment variable overriding [`DEFAULT_MODEL`].
pub const MODEL_ENV_VAR: &str = "DEEPGUARD_MODEL";

/// Environment variable overriding [`DEFAULT_ENDPOINT`].
pub const ENDPOINT_ENV_VAR: &str = "DEEPGUARD_ENDPOINT";

const ERROR_BODY_LIMIT: usize = 512;

// Keywords the `responseSchema` field understands; everything else is dropped.
const GEMINI_SCHEMA_KEYWORDS: [&str; 13] = [
    "type",
    "format",
    "description",
    "nullable",
    "enum",
    "properties",
    "required",
    "items",
    "minimum",
    "maximum",
    "minItems",
    "maxItems",
    "propertyOrdering",
];

/// Speaker of one request turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelRole {
    /// Text written by the user.
    User,
    /// Text previously produced by the model.
    Model,
}

impl ModelRole {
    fn as_wire(self) -> &'static str {
        match self {
            ModelRole::User => "user",
            ModelRole::Model => "model",
        }
    }
}

/// One turn of request history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTurn {
    /// Speaker.
    pub role: ModelRole,
    /// Turn text.
    pub text: String,
}

impl ModelTurn {
    /// User turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ModelRole::User,
            text: text.into(),
        }
    }

    /// Model turn.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ModelRole::Model,
            text: text.into(),
        }
    }
}

/// One generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    /// Persona preamble applied to every turn.
    pub system_instruction: Option<String>,
    /// Ordered history, ending with the turn to answer.
    pub contents: Vec<ModelTurn>,
    /// JSON schema the response must follow. `None` requests free text.
    pub response_schema: Option<Value>,
}

impl ModelRequest {
    /// Single-prompt request.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            system_instruction: None,
            contents: vec![ModelTurn::user(text)],
            response_schema: None,
        }
    }

    /// Multi-turn request under a system instruction.
    pub fn conversation(system_instruction: impl Into<String>, contents: Vec<ModelTurn>) -> Self {
        Self {
            system_instruction: Some(system_instruction.into()),
            contents,
            response_schema: None,
        }
    }

    /// Requests JSON output conforming to `schema`.
    pub fn with_response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// Abstract capability over the external model.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    /// Checks that a call can be attempted at all.
    ///
    /// # Errors
    /// Returns [`ModelError::MissingApiKey`] when no credential is configured.
    fn ensure_ready(&self) -> Result<(), ModelError> {
        Ok(())
    }

    /// Sends one request and returns the raw response text, which may be
    /// empty.
    async fn generate(&self, request: &ModelRequest) -> Result<String, ModelError>;
}

/// Secret API key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a key, returning `None` for blank input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// Returns the secret for request signing.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Transport configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    endpoint: Url,
    model: String,
    api_key: Option<ApiKey>,
}

impl ModelConfig {
    /// Builds a validated configuration.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidEndpoint`] for a non-HTTPS endpoint and
    /// [`ModelError::InvalidModel`] for a blank model name.
    pub fn new(
        endpoint: &str,
        model: impl Into<String>,
        api_key: Option<ApiKey>,
    ) -> Result<Self, ModelError> {
        let endpoint = validate_endpoint(endpoint)?;
        let model = model.into();
        if model.trim().is_empty() {
            return Err(ModelError::InvalidModel);
        }

        Ok(Self {
            endpoint,
            model: model.trim().to_string(),
            api_key,
        })
    }

    /// Reads configuration from the process environment.
    ///
    /// A missing key is not an error here; it surfaces on the first call.
    ///
    /// # Errors
    /// See [`ModelConfig::new`].
    pub fn from_env() -> Result<Self, ModelError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// See [`ModelConfig::new`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ModelError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = API_KEY_ENV_VARS
            .iter()
            .copied()
            .find_map(|name| lookup(name).and_then(ApiKey::new));
        let endpoint = lookup(ENDPOINT_ENV_VAR)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let model = lookup(MODEL_ENV_VAR)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Self::new(&endpoint, model, api_key)
    }

    /// Configured API base URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Configured model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Configured API key, if any.
    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    /// Full `generateContent` URL for the configured model.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidEndpoint`] if the composed URL is invalid.
    pub fn generate_content_url(&self) -> Result<Url, ModelError> {
        let base = self.endpoint.as_str().trim_end_matches('/');
        let raw = format!("{base}/models/{}:generateContent", self.model);
        Url::parse(&raw).map_err(|error| ModelError::InvalidEndpoint(error.to_string()))
    }
}

/// Validates the API base URL.
///
/// # Errors
/// Returns [`ModelError::InvalidEndpoint`] for unparsable or non-HTTPS URLs.
pub fn validate_endpoint(endpoint: &str) -> Result<Url, ModelError> {
    let parsed = Url::parse(endpoint)
        .map_err(|error| ModelError::InvalidEndpoint(format!("invalid model url: {error}")))?;

    if parsed.scheme() != "https" {
        return Err(ModelError::InvalidEndpoint(
            "model endpoint must use https".to_string(),
        ));
    }

    Ok(parsed)
}

/// Transport for the Gemini `generateContent` REST API.
#[derive(Debug, Clone)]
pub struct GeminiTransport {
    client: reqwest::Client,
    config: ModelConfig,
}

impl GeminiTransport {
    /// Creates a transport with a default HTTP client.
    pub fn new(config: ModelConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Creates a transport around a caller-supplied HTTP client.
    pub fn with_client(client: reqwest::Client, config: ModelConfig) -> Self {
        Self { client, config }
    }

    /// Transport configuration.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

#[async_trait]
impl ModelTransport for GeminiTransport {
    fn ensure_ready(&self) -> Result<(), ModelError> {
        self.config
            .api_key()
            .map(|_| ())
            .ok_or(ModelError::MissingApiKey)
    }

    async fn generate(&self, request: &ModelRequest) -> Result<String, ModelError> {
        let api_key = self.config.api_key().ok_or(ModelError::MissingApiKey)?;
        let url = self.config.generate_content_url()?;
        debug!(
            model = self.config.model(),
            turns = request.contents.len(),
            structured = request.response_schema.is_some(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key.expose())
            .json(&gemini_request_body(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ModelError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        extract_response_text(&body)
    }
}

/// Encodes a request as a `generateContent` body.
pub fn gemini_request_body(request: &ModelRequest) -> Value {
    let contents: Vec<Value> = request
        .contents
        .iter()
        .map(|turn| {
            json!({
                "role": turn.role.as_wire(),
                "parts": [{ "text": turn.text }],
            })
        })
        .collect();

    let mut body = Map::new();
    body.insert("contents".to_string(), Value::Array(contents));

    if let Some(instruction) = &request.system_instruction {
        body.insert(
            "systemInstruction".to_string(),
            json!({ "parts": [{ "text": instruction }] }),
        );
    }

    if let Some(schema) = &request.response_schema {
        body.insert(
            "generationConfig".to_string(),
            json!({
                "responseMimeType": "application/json",
                "responseSchema": to_gemini_schema(schema),
            }),
        );
    }

    Value::Object(body)
}

/// Projects a JSON Schema document into the `responseSchema` dialect.
///
/// `type` names are upper-cased and unsupported keywords (`$schema`, `title`,
/// `additionalProperties`, ...) are removed at every level.
pub fn to_gemini_schema(schema: &Value) -> Value {
    let Value::Object(map) = schema else {
        return schema.clone();
    };

    let mut projected = Map::new();
    for (key, value) in map {
        if !GEMINI_SCHEMA_KEYWORDS.contains(&key.as_str()) {
            continue;
        }

        let value = match (key.as_str(), value) {
            ("type", Value::String(name)) => Value::String(name.to_ascii_uppercase()),
            ("properties", Value::Object(properties)) => Value::Object(
                properties
                    .iter()
                    .map(|(name, property)| (name.clone(), to_gemini_schema(property)))
                    .collect(),
            ),
            ("items", items) => to_gemini_schema(items),
            (_, other) => other.clone(),
        };
        projected.insert(key.clone(), value);
    }

    Value::Object(projected)
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Concatenates the text parts of the first candidate.
///
/// A response without candidates or text yields an empty string.
///
/// # Errors
/// Returns [`ModelError::Decode`] when the body is not a response envelope.
pub fn extract_response_text(raw: &str) -> Result<String, ModelError> {
    let response: GenerateContentResponse = serde_json::from_str(raw)?;
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    Ok(text)
}

/// Errors produced by configuration and transports.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No API key configured.
    #[error("API key not found; set API_KEY or GEMINI_API_KEY")]
    MissingApiKey,
    /// Endpoint violates URL policy.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Model name is blank.
    #[error("model name must be non-empty")]
    InvalidModel,
    /// HTTP client failure.
    #[error("model transport failure: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success HTTP status.
    #[error("model service returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },
    /// Response envelope could not be decoded.
    #[error("model response decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Failure reported by a non-HTTP transport.
    #[error("model transport failure: {0}")]
    Transport(String),
}

impl ModelError {
    /// Returns `true` for errors that must reach the caller instead of being
    /// replaced by a fallback value.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ModelError::MissingApiKey)
    }
}
