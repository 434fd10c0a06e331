//! Threat classification through the external model.

use std::sync::Arc;

use deepguard_analysis_contract::{AnalysisResult, ContractValidator};
use deepguard_core::Communication;
use deepguard_model::{ModelRequest, ModelTransport};

use crate::{AppError, prompts, recover};

/// Classifies communications, substituting [`AnalysisResult::fallback`] when
/// the model cannot produce a schema-conforming answer.
#[derive(Clone)]
pub struct AnalysisClient {
    transport: Arc<dyn ModelTransport>,
    validator: Arc<ContractValidator>,
}

impl AnalysisClient {
    /// Creates a client over `transport`.
    ///
    /// # Errors
    /// Returns [`AppError::Analysis`] if the frozen schema fails to compile.
    pub fn new(transport: Arc<dyn ModelTransport>) -> Result<Self, AppError> {
        Ok(Self {
            transport,
            validator: Arc::new(ContractValidator::analysis_result()?),
        })
    }

    /// Classifies one message.
    ///
    /// Every call issues a fresh request; nothing is cached.
    ///
    /// # Errors
    /// Returns [`AppError::Model`] only when no API key is configured. All
    /// other failures yield the fallback result.
    pub async fn analyze(
        &self,
        subject: &str,
        body: &str,
        sender_address: &str,
    ) -> Result<AnalysisResult, AppError> {
        self.transport.ensure_ready()?;
        let request = ModelRequest::prompt(prompts::analysis_prompt(subject, body, sender_address))
            .with_response_schema(self.validator.schema().clone());

        recover("analyze", self.request(&request).await, AnalysisResult::fallback)
    }

    /// Classifies a stored communication by its subject, body and sender
    /// address.
    ///
    /// # Errors
    /// See [`AnalysisClient::analyze`].
    pub async fn analyze_communication(
        &self,
        communication: &Communication,
    ) -> Result<AnalysisResult, AppError> {
        self.analyze(
            &communication.subject,
            &communication.content,
            &communication.sender_email,
        )
        .await
    }

    async fn request(&self, request: &ModelRequest) -> Result<AnalysisResult, AppError> {
        let raw = self.transport.generate(request).await?;
        Ok(self.validator.parse(&raw)?)
    }
}
