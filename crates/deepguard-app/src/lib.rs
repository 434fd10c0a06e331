#![warn(missing_docs)]
//! # deepguard-app
//!
//! ## Purpose
//! Orchestrates the analysis pipeline behind the DeepGuard dashboard.
//!
//! ## Responsibilities
//! - Classify communications through the external model ([`AnalysisClient`]).
//! - Produce decoy personas for suspected attackers ([`DecoyGenerator`]).
//! - Run the follow-up conversation about one analysis
//!   ([`ConversationSession`]).
//! - Wire the three into the dashboard state with stale-response guarding
//!   ([`Dashboard`]).
//!
//! ## Data flow
//! Select communication -> analysis request -> result applied to dashboard
//! state -> session opened -> decoy and chat requests on demand.
//!
//! ## Ownership and lifetimes
//! Clients share one transport through `Arc<dyn ModelTransport>`. Pending
//! requests carry owned clones of their inputs so they can be awaited without
//! borrowing the dashboard.
//!
//! ## Error model
//! Recoverable call failures are replaced by fixed fallback values and logged.
//! Only configuration failures (missing API key, unknown ids, empty chat text)
//! reach callers as [`AppError`].
//!
//! ## Security and privacy notes
//! - Error text is passed through [`redact_sensitive`] before logging.
//! - The API key never appears in prompts or logs.

mod analysis;
mod dashboard;
mod decoy;
pub mod prompts;
mod session;

use deepguard_analysis_contract::AnalysisContractError;
use deepguard_core::{CoreError, Inbox};
use deepguard_model::{GeminiTransport, ModelConfig, ModelError};
use thiserror::Error;
use tracing::warn;

pub use analysis::AnalysisClient;
pub use dashboard::{AnalysisOutcome, Dashboard, DecoyOutcome, PendingAnalysis, PendingDecoy};
pub use decoy::DecoyGenerator;
pub use session::ConversationSession;

/// Build-time application version loaded from root `VERSION`.
pub const APP_VERSION: &str = env!("DEEPGUARD_VERSION");

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Builds a dashboard over the demo inbox and the environment-configured
/// Gemini transport.
///
/// # Errors
/// Returns [`AppError::Model`] when the endpoint configuration is invalid.
pub fn dashboard_from_env() -> Result<Dashboard, AppError> {
    let config = ModelConfig::from_env()?;
    let transport = std::sync::Arc::new(GeminiTransport::new(config));
    Dashboard::new(Inbox::mock(), transport)
}

/// Redacts common secret markers in log-safe output.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for key in ["x-goog-api-key", "api_key", "key=", "authorization", "bearer"] {
        redacted = redact_key_value(&redacted, key);
    }
    redacted
}

// Everything from the first marker onwards is dropped.
fn redact_key_value(input: &str, key: &str) -> String {
    let lower = input.to_ascii_lowercase();
    if let Some(position) = lower.find(key) {
        let prefix = &input[..position];
        let marker = key.trim_end_matches('=');
        return format!("{prefix}{marker}=<redacted>");
    }

    input.to_string()
}

// Shared degraded-mode policy: fatal errors propagate, everything else is
// logged and replaced with `fallback`.
pub(crate) fn recover<T>(
    operation: &'static str,
    outcome: Result<T, AppError>,
    fallback: impl FnOnce() -> T,
) -> Result<T, AppError> {
    match outcome {
        Ok(value) => Ok(value),
        Err(error) if error.is_fatal() => Err(error),
        Err(error) => {
            warn!(
                operation,
                error = %redact_sensitive(&error.to_string()),
                "request failed; substituting fallback"
            );
            Ok(fallback())
        }
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Message store error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    /// Model configuration or transport error.
    #[error("model error: {0}")]
    Model(#[from] ModelError),
    /// Model output violated its contract.
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisContractError),
    /// Chat text was blank.
    #[error("chat message is empty")]
    EmptyMessage,
    /// Chat requested before an analysis opened a session.
    #[error("no conversation session is open")]
    NoSession,
}

impl AppError {
    /// Returns `true` for errors no fallback may hide.
    pub fn is_fatal(&self) -> bool {
        match self {
            AppError::Model(error) => error.is_fatal(),
            AppError::Analysis(AnalysisContractError::Schema(_)) => true,
            AppError::Core(_) | AppError::EmptyMessage | AppError::NoSession => true,
            AppError::Analysis(_) => false,
        }
    }
}
