//! Synthetic persona generation for replying to suspected attackers.

use std::sync::Arc;

use deepguard_analysis_contract::{ContractValidator, DecoyPayload};
use deepguard_model::{ModelRequest, ModelTransport};

use crate::{AppError, prompts, recover};

/// Produces [`DecoyPayload`] values, substituting [`DecoyPayload::fallback`]
/// on failure.
#[derive(Clone)]
pub struct DecoyGenerator {
    transport: Arc<dyn ModelTransport>,
    validator: Arc<ContractValidator>,
}

impl DecoyGenerator {
    /// Creates a generator over `transport`.
    ///
    /// # Errors
    /// Returns [`AppError::Analysis`] if the frozen schema fails to compile.
    pub fn new(transport: Arc<dyn ModelTransport>) -> Result<Self, AppError> {
        Ok(Self {
            transport,
            validator: Arc::new(ContractValidator::decoy_payload()?),
        })
    }

    /// Generates one decoy payload.
    ///
    /// Only the first [`prompts::DECOY_CONTEXT_LIMIT`] characters of
    /// `original_content` are sent.
    ///
    /// # Errors
    /// Returns [`AppError::Model`] only when no API key is configured.
    pub async fn generate_decoy(
        &self,
        original_content: &str,
        attack_type_label: &str,
    ) -> Result<DecoyPayload, AppError> {
        self.transport.ensure_ready()?;
        let request =
            ModelRequest::prompt(prompts::decoy_prompt(original_content, attack_type_label))
                .with_response_schema(self.validator.schema().clone());

        recover("generate_decoy", self.request(&request).await, DecoyPayload::fallback)
    }

    async fn request(&self, request: &ModelRequest) -> Result<DecoyPayload, AppError> {
        let raw = self.transport.generate(request).await?;
        Ok(self.validator.parse(&raw)?)
    }
}
