//! Stateful follow-up conversation about one analysed communication.

use std::fmt;
use std::sync::Arc;

use deepguard_analysis_contract::AnalysisResult;
use deepguard_core::{Communication, ConversationTurn, Transcript, TurnRole};
use deepguard_model::{ModelRequest, ModelTransport, ModelTurn};
use tracing::{info, warn};

use crate::{AppError, prompts, redact_sensitive};

/// Conversation scoped to one communication and its analysis.
///
/// The transcript is what the user sees: a seed agent turn followed by one
/// user/agent pair per [`ConversationSession::send`]. The model history only
/// holds exchanges that actually reached the model, so failed turns are not
/// replayed on the next request.
pub struct ConversationSession {
    transport: Arc<dyn ModelTransport>,
    communication_id: String,
    system_instruction: String,
    history: Vec<ModelTurn>,
    transcript: Transcript,
}

impl ConversationSession {
    /// Opens a session seeded with the analysis context.
    ///
    /// # Errors
    /// Returns [`AppError::Model`] when no API key is configured.
    pub fn open(
        transport: Arc<dyn ModelTransport>,
        communication: &Communication,
        analysis: &AnalysisResult,
    ) -> Result<Self, AppError> {
        transport.ensure_ready()?;

        let mut transcript = Transcript::new();
        transcript.push(
            TurnRole::Agent,
            prompts::seed_greeting(communication, analysis),
        );
        info!(
            communication_id = %communication.id,
            risk_level = %analysis.risk_level,
            "conversation session opened"
        );

        Ok(Self {
            transport,
            communication_id: communication.id.clone(),
            system_instruction: prompts::session_instruction(communication, analysis),
            history: Vec::new(),
            transcript,
        })
    }

    /// Sends one user message and records the agent's reply.
    ///
    /// `&mut self` keeps turns strictly sequential. A failed or empty reply is
    /// recorded as [`prompts::CHAT_APOLOGY`] and the session stays usable.
    ///
    /// # Errors
    /// Returns [`AppError::EmptyMessage`] for blank text; the transcript is
    /// left untouched in that case.
    pub async fn send(&mut self, text: &str) -> Result<&ConversationTurn, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::EmptyMessage);
        }

        self.transcript.push(TurnRole::User, text);

        let mut contents = self.history.clone();
        contents.push(ModelTurn::user(text));
        let request = ModelRequest::conversation(self.system_instruction.clone(), contents);

        let reply = match self.transport.generate(&request).await {
            Ok(reply) if !reply.trim().is_empty() => {
                self.history.push(ModelTurn::user(text));
                self.history.push(ModelTurn::model(reply.clone()));
                reply
            }
            Ok(_) => {
                warn!(
                    communication_id = %self.communication_id,
                    "empty chat reply; recording apology"
                );
                prompts::CHAT_APOLOGY.to_string()
            }
            Err(error) => {
                warn!(
                    communication_id = %self.communication_id,
                    error = %redact_sensitive(&error.to_string()),
                    "chat turn failed; recording apology"
                );
                prompts::CHAT_APOLOGY.to_string()
            }
        };

        Ok(self.transcript.push(TurnRole::Agent, reply))
    }

    /// Communication this session belongs to.
    pub fn communication_id(&self) -> &str {
        &self.communication_id
    }

    /// Persona and analysis context applied to every turn.
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Visible turns in send order.
    pub fn transcript(&self) -> &[ConversationTurn] {
        self.transcript.turns()
    }
}

impl fmt::Debug for ConversationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationSession")
            .field("communication_id", &self.communication_id)
            .field("turns", &self.transcript.len())
            .finish_non_exhaustive()
    }
}
