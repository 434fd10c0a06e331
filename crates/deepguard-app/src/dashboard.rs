//! Dashboard orchestration: view events in, state transitions out.

use std::sync::Arc;

use deepguard_analysis_contract::{AnalysisResult, DecoyPayload};
use deepguard_core::{Communication, ConversationTurn, Inbox};
use deepguard_model::ModelTransport;
use deepguard_ui::{DashboardState, PanelTab, RequestTicket, View};
use tracing::{debug, info};

use crate::{APP_VERSION, AnalysisClient, AppError, ConversationSession, DecoyGenerator};

/// Analysis request issued by [`Dashboard::select`], not yet awaited.
///
/// Owns everything it needs so the dashboard stays free for other events
/// while the request runs.
pub struct PendingAnalysis {
    ticket: RequestTicket,
    communication: Communication,
    client: AnalysisClient,
}

impl PendingAnalysis {
    /// Ticket identifying this request.
    pub fn ticket(&self) -> &RequestTicket {
        &self.ticket
    }

    /// Runs the request.
    pub async fn run(self) -> AnalysisOutcome {
        let result = self.client.analyze_communication(&self.communication).await;
        AnalysisOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

/// Settled analysis request, ready for [`Dashboard::apply_analysis`].
#[derive(Debug)]
pub struct AnalysisOutcome {
    /// Ticket the request was issued with.
    pub ticket: RequestTicket,
    /// Result, or the fatal error that prevented the call.
    pub result: Result<AnalysisResult, AppError>,
}

/// Decoy request issued by [`Dashboard::request_decoy`], not yet awaited.
pub struct PendingDecoy {
    ticket: RequestTicket,
    original_content: String,
    attack_type: String,
    generator: DecoyGenerator,
}

impl PendingDecoy {
    /// Ticket identifying this request.
    pub fn ticket(&self) -> &RequestTicket {
        &self.ticket
    }

    /// Runs the request.
    pub async fn run(self) -> DecoyOutcome {
        let result = self
            .generator
            .generate_decoy(&self.original_content, &self.attack_type)
            .await;
        DecoyOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

/// Settled decoy request, ready for [`Dashboard::apply_decoy`].
#[derive(Debug)]
pub struct DecoyOutcome {
    /// Ticket the request was issued with.
    pub ticket: RequestTicket,
    /// Payload, or the fatal error that prevented the call.
    pub result: Result<DecoyPayload, AppError>,
}

/// Dashboard controller owning the state container and the model clients.
pub struct Dashboard {
    inbox: Inbox,
    state: DashboardState,
    transport: Arc<dyn ModelTransport>,
    analyst: AnalysisClient,
    decoys: DecoyGenerator,
    session: Option<ConversationSession>,
}

impl Dashboard {
    /// Creates a dashboard over `inbox`, sharing `transport` between clients.
    ///
    /// # Errors
    /// Returns [`AppError::Analysis`] if a frozen schema fails to compile.
    pub fn new(inbox: Inbox, transport: Arc<dyn ModelTransport>) -> Result<Self, AppError> {
        Ok(Self {
            inbox,
            state: DashboardState::new(APP_VERSION),
            analyst: AnalysisClient::new(Arc::clone(&transport))?,
            decoys: DecoyGenerator::new(Arc::clone(&transport))?,
            transport,
            session: None,
        })
    }

    /// Selects a communication and issues its analysis request.
    ///
    /// Analysis, decoy and session of the previous selection are dropped
    /// before the request is created.
    ///
    /// # Errors
    /// Returns [`AppError::Core`] for an id the inbox does not hold.
    pub fn select(&mut self, communication_id: &str) -> Result<PendingAnalysis, AppError> {
        let communication = self.inbox.require(communication_id)?.clone();
        self.session = None;
        let ticket = self.state.select(communication.clone());
        info!(
            communication_id,
            sequence = ticket.sequence,
            "communication selected"
        );

        Ok(PendingAnalysis {
            ticket,
            communication,
            client: self.analyst.clone(),
        })
    }

    /// Applies a settled analysis.
    ///
    /// Returns `Ok(false)` when the outcome belongs to a superseded request and
    /// was discarded. A fresh result also opens the conversation session.
    ///
    /// # Errors
    /// Propagates the outcome's fatal error after clearing the pending slot,
    /// and [`ConversationSession::open`] errors.
    pub fn apply_analysis(&mut self, outcome: AnalysisOutcome) -> Result<bool, AppError> {
        let AnalysisOutcome { ticket, result } = outcome;
        let result = match result {
            Ok(result) => result,
            Err(error) => {
                self.state.abandon_analysis(&ticket);
                return Err(error);
            }
        };

        if !self.state.apply_analysis(&ticket, result.clone()) {
            debug!(
                communication_id = %ticket.communication_id,
                sequence = ticket.sequence,
                "discarding stale analysis result"
            );
            return Ok(false);
        }

        let Some(communication) = self.state.selected().cloned() else {
            return Ok(true);
        };
        self.session = Some(ConversationSession::open(
            Arc::clone(&self.transport),
            &communication,
            &result,
        )?);
        Ok(true)
    }

    /// Selects, analyses and applies in one step.
    ///
    /// # Errors
    /// See [`Dashboard::select`] and [`Dashboard::apply_analysis`].
    pub async fn select_and_analyze(&mut self, communication_id: &str) -> Result<bool, AppError> {
        let pending = self.select(communication_id)?;
        let outcome = pending.run().await;
        self.apply_analysis(outcome)
    }

    /// Issues a decoy request for the current selection.
    ///
    /// The analysis reasoning serves as the attack-type label. Returns `None`
    /// without a ready analysis or while another decoy request is outstanding.
    pub fn request_decoy(&mut self) -> Option<PendingDecoy> {
        let original_content = self.state.selected()?.content.clone();
        let attack_type = self.state.analysis()?.reasoning.clone();
        let ticket = self.state.begin_decoy()?;

        Some(PendingDecoy {
            ticket,
            original_content,
            attack_type,
            generator: self.decoys.clone(),
        })
    }

    /// Applies a settled decoy request; stale outcomes return `Ok(false)`.
    ///
    /// # Errors
    /// Propagates the outcome's fatal error after clearing the pending flag.
    pub fn apply_decoy(&mut self, outcome: DecoyOutcome) -> Result<bool, AppError> {
        let DecoyOutcome { ticket, result } = outcome;
        match result {
            Ok(payload) => Ok(self.state.apply_decoy(&ticket, payload)),
            Err(error) => {
                self.state.abandon_decoy(&ticket);
                Err(error)
            }
        }
    }

    /// Requests, awaits and applies a decoy in one step.
    ///
    /// Returns `Ok(false)` when no decoy could be requested.
    ///
    /// # Errors
    /// See [`Dashboard::apply_decoy`].
    pub async fn generate_decoy(&mut self) -> Result<bool, AppError> {
        let Some(pending) = self.request_decoy() else {
            return Ok(false);
        };
        let outcome = pending.run().await;
        self.apply_decoy(outcome)
    }

    /// Sends chat text through the open session and returns the agent turn.
    ///
    /// # Errors
    /// Returns [`AppError::NoSession`] before an analysis has been applied and
    /// [`AppError::EmptyMessage`] for blank text.
    pub async fn send_chat(&mut self, text: &str) -> Result<ConversationTurn, AppError> {
        let session = self.session.as_mut().ok_or(AppError::NoSession)?;
        self.state.set_agent_typing(true);
        let reply = session.send(text).await.cloned();
        self.state.set_agent_typing(false);
        reply
    }

    /// Switches the top-level view; leaving the inbox drops the session.
    pub fn navigate(&mut self, view: View) {
        self.state.navigate(view);
        if self.state.selected().is_none() {
            self.session = None;
        }
    }

    /// Message store.
    pub fn inbox(&self) -> &Inbox {
        &self.inbox
    }

    /// State container for rendering.
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Switches the analysis panel tab.
    pub fn set_tab(&mut self, tab: PanelTab) {
        self.state.set_tab(tab);
    }

    /// Toggles the mobile navigation menu.
    pub fn toggle_mobile_menu(&mut self) {
        self.state.toggle_mobile_menu();
    }

    /// Session of the current selection.
    pub fn session(&self) -> Option<&ConversationSession> {
        self.session.as_ref()
    }

    /// Transcript of the current session; empty without one.
    pub fn transcript(&self) -> &[ConversationTurn] {
        self.session
            .as_ref()
            .map(ConversationSession::transcript)
            .unwrap_or_default()
    }
}
