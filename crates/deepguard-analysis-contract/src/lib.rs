#![warn(missing_docs)]
//! # deepguard-analysis-contract
//!
//! ## Purpose
//! Defines the structured outputs requested from the external model and the
//! client-side validation applied to them.
//!
//! ## Responsibilities
//! - Own the frozen JSON schemas for [`AnalysisResult`] and [`DecoyPayload`].
//! - Validate raw model text against those schemas before decoding.
//! - Provide the fixed degraded-mode records used when a call fails.
//! - Project trust scores into gauge bands.
//!
//! ## Data flow
//! Raw model text -> [`ContractValidator::parse`] -> typed result ->
//! dashboard state.
//!
//! ## Ownership and lifetimes
//! Parsed values are owned structs to avoid borrowing from transient network
//! buffers.
//!
//! ## Error model
//! Empty text, invalid JSON and schema violations return
//! [`AnalysisContractError`]. Callers decide whether to substitute a fallback.

use std::fmt;

use jsonschema::JSONSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Frozen JSON schema for [`AnalysisResult`].
pub const ANALYSIS_RESULT_SCHEMA: &str =
    include_str!("../../../contracts/analysis-result.schema.json");

/// Frozen JSON schema for [`DecoyPayload`].
pub const DECOY_PAYLOAD_SCHEMA: &str = include_str!("../../../contracts/decoy-payload.schema.json");

/// Flag text carried by the degraded-mode analysis.
pub const ANALYSIS_FALLBACK_FLAG: &str = "Analysis Error - Check Connection";

/// Five-point ordinal threat severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// No threat indicators.
    Safe,
    /// Minor indicators.
    Low,
    /// Suspicious; verify before acting.
    Medium,
    /// Likely malicious.
    High,
    /// Active attack.
    Critical,
}

impl RiskLevel {
    /// Wire representation (`SAFE`, `LOW`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommended response to a communication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SuggestedAction {
    /// Nothing to do.
    Ignore,
    /// Block the sender.
    Block,
    /// Reply with decoy data.
    Decoy,
    /// Verify through an independent channel.
    Verify,
}

impl fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SuggestedAction::Ignore => "IGNORE",
            SuggestedAction::Block => "BLOCK",
            SuggestedAction::Decoy => "DECOY",
            SuggestedAction::Verify => "VERIFY",
        };
        f.write_str(label)
    }
}

/// Threat classification for one communication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Safety confidence in [0, 100]; higher is safer.
    pub trust_score: u8,
    /// Severity classification.
    pub risk_level: RiskLevel,
    /// Ordered red flags.
    pub flags: Vec<String>,
    /// Model explanation.
    pub reasoning: String,
    /// Inferred sender intent.
    pub intent: String,
    /// Tone of the message.
    pub sentiment: String,
    /// Recommended response.
    pub suggested_action: SuggestedAction,
}

impl AnalysisResult {
    /// Degraded-mode result substituted when analysis fails.
    pub fn fallback() -> Self {
        Self {
            trust_score: 50,
            risk_level: RiskLevel::Medium,
            flags: vec![ANALYSIS_FALLBACK_FLAG.to_string()],
            reasoning: "Could not connect to DeepGuard AI Analysis engine. Please verify your API \
                key and network connection."
                .to_string(),
            intent: "Unknown".to_string(),
            sentiment: "Neutral".to_string(),
            suggested_action: SuggestedAction::Verify,
        }
    }

    /// Gauge band for this result's trust score.
    pub fn trust_band(&self) -> TrustBand {
        trust_band(self.trust_score)
    }
}

/// Synthetic identity handed back to a suspected attacker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoyPayload {
    /// Persona name.
    pub fake_name: String,
    /// Account identifier recognisable as synthetic on inspection.
    pub fake_account: String,
    /// Persona postal address.
    pub fake_address: String,
    /// Reply body ready to paste back to the sender.
    pub generated_email_body: String,
}

impl DecoyPayload {
    /// Payload substituted when decoy generation fails.
    pub fn fallback() -> Self {
        Self {
            fake_name: "John Doe".to_string(),
            fake_account: "123-456-7890".to_string(),
            fake_address: "123 Fake St, Springfield, IL".to_string(),
            generated_email_body: "I'm having trouble processing your request. Could you verify \
                the account details?"
                .to_string(),
        }
    }
}

/// Trust gauge colour band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustBand {
    /// Score below 50.
    Danger,
    /// Score in [50, 80).
    Caution,
    /// Score of 80 or above.
    Safe,
}

/// Maps a trust score to its gauge band.
pub fn trust_band(score: u8) -> TrustBand {
    match score {
        0..=49 => TrustBand::Danger,
        50..=79 => TrustBand::Caution,
        _ => TrustBand::Safe,
    }
}

/// Compiled schema that gates decoding of raw model output.
pub struct ContractValidator {
    name: &'static str,
    schema: Value,
    compiled: JSONSchema,
}

impl ContractValidator {
    /// Compiles a validator from raw schema text.
    ///
    /// # Errors
    /// Returns [`AnalysisContractError::Schema`] when the schema is not valid
    /// JSON or does not compile.
    pub fn compile(name: &'static str, raw_schema: &str) -> Result<Self, AnalysisContractError> {
        let schema: Value = serde_json::from_str(raw_schema)
            .map_err(|error| AnalysisContractError::Schema(format!("{name}: {error}")))?;
        let compiled = JSONSchema::compile(&schema)
            .map_err(|error| AnalysisContractError::Schema(format!("{name}: {error}")))?;

        Ok(Self {
            name,
            schema,
            compiled,
        })
    }

    /// Validator for [`AnalysisResult`].
    ///
    /// # Errors
    /// See [`ContractValidator::compile`].
    pub fn analysis_result() -> Result<Self, AnalysisContractError> {
        Self::compile("AnalysisResult", ANALYSIS_RESULT_SCHEMA)
    }

    /// Validator for [`DecoyPayload`].
    ///
    /// # Errors
    /// See [`ContractValidator::compile`].
    pub fn decoy_payload() -> Result<Self, AnalysisContractError> {
        Self::compile("DecoyPayload", DECOY_PAYLOAD_SCHEMA)
    }

    /// Contract name used in diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Schema document sent alongside requests.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Validates raw model text and decodes it.
    ///
    /// # Errors
    /// - [`AnalysisContractError::EmptyPayload`] for blank text.
    /// - [`AnalysisContractError::Decode`] for invalid JSON or a shape serde
    ///   cannot map.
    /// - [`AnalysisContractError::InvalidContract`] for schema violations.
    pub fn parse<T: DeserializeOwned>(&self, raw: &str) -> Result<T, AnalysisContractError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AnalysisContractError::EmptyPayload);
        }

        let value: Value = serde_json::from_str(raw).map_err(AnalysisContractError::Decode)?;
        if let Err(errors) = self.compiled.validate(&value) {
            let detail = errors
                .map(|error| error.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AnalysisContractError::InvalidContract(format!(
                "{}: {detail}",
                self.name
            )));
        }

        serde_json::from_value(value).map_err(AnalysisContractError::Decode)
    }
}

impl fmt::Debug for ContractValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractValidator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Parses raw model text into an [`AnalysisResult`].
///
/// # Errors
/// See [`ContractValidator::parse`].
pub fn parse_analysis_result(raw: &str) -> Result<AnalysisResult, AnalysisContractError> {
    ContractValidator::analysis_result()?.parse(raw)
}

/// Parses raw model text into a [`DecoyPayload`].
///
/// # Errors
/// See [`ContractValidator::parse`].
pub fn parse_decoy_payload(raw: &str) -> Result<DecoyPayload, AnalysisContractError> {
    ContractValidator::decoy_payload()?.parse(raw)
}

/// Analysis contract errors.
#[derive(Debug, Error)]
pub enum AnalysisContractError {
    /// Frozen schema failed to load or compile.
    #[error("schema failure: {0}")]
    Schema(String),
    /// Model returned no text.
    #[error("empty model payload")]
    EmptyPayload,
    /// JSON decode failure.
    #[error("analysis decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Parsed payload violates the schema.
    #[error("analysis contract violation: {0}")]
    InvalidContract(String),
}
