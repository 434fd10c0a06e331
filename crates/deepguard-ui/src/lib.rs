#![warn(missing_docs)]
//! # deepguard-ui
//!
//! ## Purpose
//! Defines the explicit application state the dashboard renders from.
//!
//! ## Responsibilities
//! - Track the selected communication, its analysis slot and decoy payload.
//! - Expose the loading flags (analyzing, generating decoy, agent typing).
//! - Guard against stale responses with per-request tickets.
//! - Hold purely local view state (active view, panel tab, mobile menu).
//!
//! ## Data flow
//! Orchestration code calls a `begin` transition, runs the request, then hands
//! the outcome back with the ticket it was issued. Mismatched tickets are
//! discarded so a late result never lands on a newer selection.
//!
//! ## Ownership and lifetimes
//! `DashboardState` owns clones of everything it shows, so in-flight request
//! futures never borrow it.
//!
//! ## Error model
//! Transitions never fail; rejected transitions return `false` or `None`.

use deepguard_analysis_contract::{AnalysisResult, DecoyPayload};
use deepguard_core::Communication;

/// Top-level dashboard view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Message list with the analysis panel.
    #[default]
    Inbox,
    /// Analytics charts.
    ThreatMonitor,
    /// Incident audit log.
    Incidents,
    /// Preferences.
    Settings,
}

/// Tab of the analysis side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelTab {
    /// Score gauge, flags and decoy.
    #[default]
    Report,
    /// Conversation with the agent.
    Chat,
}

/// Presentation-only loading indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadingFlags {
    /// Analysis request outstanding.
    pub analyzing: bool,
    /// Decoy request outstanding.
    pub generating_decoy: bool,
    /// Chat reply outstanding.
    pub agent_typing: bool,
}

/// Identity of one outstanding request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    /// Communication the request was issued for.
    pub communication_id: String,
    /// Monotonic issue number.
    pub sequence: u64,
}

/// Analysis associated with the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnalysisSlot {
    /// Nothing requested.
    #[default]
    Empty,
    /// Request outstanding.
    Pending(RequestTicket),
    /// Result available.
    Ready(AnalysisResult),
}

/// Aggregate dashboard state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    /// App version shown in the sidebar.
    pub version: String,
    view: View,
    tab: PanelTab,
    mobile_menu_open: bool,
    selected: Option<Communication>,
    analysis: AnalysisSlot,
    decoy: Option<DecoyPayload>,
    pending_decoy: Option<RequestTicket>,
    agent_typing: bool,
    next_sequence: u64,
}

impl DashboardState {
    /// Creates the initial state: inbox view, nothing selected.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            view: View::Inbox,
            tab: PanelTab::Report,
            mobile_menu_open: false,
            selected: None,
            analysis: AnalysisSlot::Empty,
            decoy: None,
            pending_decoy: None,
            agent_typing: false,
            next_sequence: 0,
        }
    }

    /// Selects a communication and issues the ticket for its analysis.
    ///
    /// Previous analysis, decoy and flags are cleared before the ticket is
    /// handed out.
    pub fn select(&mut self, communication: Communication) -> RequestTicket {
        let ticket = self.issue_ticket(&communication.id);
        self.selected = Some(communication);
        self.analysis = AnalysisSlot::Pending(ticket.clone());
        self.decoy = None;
        self.pending_decoy = None;
        self.agent_typing = false;
        self.tab = PanelTab::Report;
        self.mobile_menu_open = false;
        ticket
    }

    /// Stores an analysis result if `ticket` is still the outstanding one.
    ///
    /// Returns `false` when the result is stale and was discarded.
    pub fn apply_analysis(&mut self, ticket: &RequestTicket, result: AnalysisResult) -> bool {
        if !self.is_pending_analysis(ticket) {
            return false;
        }
        self.analysis = AnalysisSlot::Ready(result);
        true
    }

    /// Clears a pending analysis that produced no result.
    pub fn abandon_analysis(&mut self, ticket: &RequestTicket) -> bool {
        if !self.is_pending_analysis(ticket) {
            return false;
        }
        self.analysis = AnalysisSlot::Empty;
        true
    }

    /// Issues a decoy ticket for the current selection.
    ///
    /// Returns `None` without a ready analysis or while a decoy request is
    /// already outstanding.
    pub fn begin_decoy(&mut self) -> Option<RequestTicket> {
        if self.pending_decoy.is_some() || self.analysis().is_none() {
            return None;
        }
        let communication_id = self.selected.as_ref()?.id.clone();
        let ticket = self.issue_ticket(&communication_id);
        self.pending_decoy = Some(ticket.clone());
        self.tab = PanelTab::Report;
        Some(ticket)
    }

    /// Stores a decoy payload if `ticket` is still the outstanding one.
    pub fn apply_decoy(&mut self, ticket: &RequestTicket, payload: DecoyPayload) -> bool {
        if self.pending_decoy.as_ref() != Some(ticket) {
            return false;
        }
        self.pending_decoy = None;
        self.decoy = Some(payload);
        true
    }

    /// Clears a pending decoy request that produced no payload.
    pub fn abandon_decoy(&mut self, ticket: &RequestTicket) -> bool {
        if self.pending_decoy.as_ref() != Some(ticket) {
            return false;
        }
        self.pending_decoy = None;
        true
    }

    /// Sets the agent-typing indicator.
    pub fn set_agent_typing(&mut self, typing: bool) {
        self.agent_typing = typing;
    }

    /// Switches the top-level view. Leaving the inbox clears the selection.
    pub fn navigate(&mut self, view: View) {
        self.view = view;
        self.mobile_menu_open = false;
        if view != View::Inbox {
            self.clear_selection();
        }
    }

    /// Drops the selection and everything scoped to it.
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.analysis = AnalysisSlot::Empty;
        self.decoy = None;
        self.pending_decoy = None;
        self.agent_typing = false;
    }

    /// Switches the side-panel tab.
    pub fn set_tab(&mut self, tab: PanelTab) {
        self.tab = tab;
    }

    /// Toggles the mobile navigation menu.
    pub fn toggle_mobile_menu(&mut self) {
        self.mobile_menu_open = !self.mobile_menu_open;
    }

    /// Currently selected communication.
    pub fn selected(&self) -> Option<&Communication> {
        self.selected.as_ref()
    }

    /// Analysis slot of the current selection.
    pub fn analysis_slot(&self) -> &AnalysisSlot {
        &self.analysis
    }

    /// Ready analysis of the current selection.
    pub fn analysis(&self) -> Option<&AnalysisResult> {
        match &self.analysis {
            AnalysisSlot::Ready(result) => Some(result),
            _ => None,
        }
    }

    /// Decoy payload of the current selection.
    pub fn decoy(&self) -> Option<&DecoyPayload> {
        self.decoy.as_ref()
    }

    /// Loading indicators derived from outstanding requests.
    pub fn loading(&self) -> LoadingFlags {
        LoadingFlags {
            analyzing: matches!(self.analysis, AnalysisSlot::Pending(_)),
            generating_decoy: self.pending_decoy.is_some(),
            agent_typing: self.agent_typing,
        }
    }

    /// Active top-level view.
    pub fn view(&self) -> View {
        self.view
    }

    /// Active side-panel tab.
    pub fn tab(&self) -> PanelTab {
        self.tab
    }

    /// Whether the mobile menu is open.
    pub fn mobile_menu_open(&self) -> bool {
        self.mobile_menu_open
    }

    /// One-line status for the analysis panel.
    pub fn status_line(&self) -> String {
        match (&self.selected, &self.analysis) {
            (None, _) => "Select a conversation to analyze.".to_string(),
            (Some(_), AnalysisSlot::Pending(_)) => "Analyzing communication...".to_string(),
            (Some(_), AnalysisSlot::Empty) => "No analysis available".to_string(),
            (Some(_), AnalysisSlot::Ready(result)) => format!(
                "{} risk, trust score {}/100",
                result.risk_level, result.trust_score
            ),
        }
    }

    fn is_pending_analysis(&self, ticket: &RequestTicket) -> bool {
        matches!(&self.analysis, AnalysisSlot::Pending(pending) if pending == ticket)
    }

    fn issue_ticket(&mut self, communication_id: &str) -> RequestTicket {
        self.next_sequence += 1;
        RequestTicket {
            communication_id: communication_id.to_string(),
            sequence: self.next_sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for dashboard transitions.

    use deepguard_analysis_contract::RiskLevel;
    use deepguard_core::Inbox;

    use super::*;

    fn message(id: &str) -> Communication {
        Inbox::mock().get(id).cloned().expect("fixture id")
    }

    #[test]
    fn late_result_for_previous_selection_is_discarded() {
        let mut state = DashboardState::new("v0.1.0");
        let first = state.select(message("1"));
        let second = state.select(message("2"));

        assert!(!state.apply_analysis(&first, AnalysisResult::fallback()));
        assert!(state.loading().analyzing);
        assert_eq!(state.analysis(), None);

        let mut fresh = AnalysisResult::fallback();
        fresh.risk_level = RiskLevel::Critical;
        assert!(state.apply_analysis(&second, fresh));
        assert_eq!(
            state.analysis().map(|result| result.risk_level),
            Some(RiskLevel::Critical)
        );
        assert!(!state.loading().analyzing);
    }

    #[test]
    fn reselecting_same_message_still_rejects_older_ticket() {
        let mut state = DashboardState::new("v0.1.0");
        let older = state.select(message("1"));
        let newer = state.select(message("1"));
        assert_ne!(older, newer);
        assert!(!state.apply_analysis(&older, AnalysisResult::fallback()));
        assert!(state.apply_analysis(&newer, AnalysisResult::fallback()));
    }

    #[test]
    fn decoy_requires_ready_analysis_and_single_flight() {
        let mut state = DashboardState::new("v0.1.0");
        assert!(state.begin_decoy().is_none());

        let ticket = state.select(message("1"));
        assert!(state.begin_decoy().is_none());

        state.apply_analysis(&ticket, AnalysisResult::fallback());
        let decoy = state.begin_decoy().expect("analysis is ready");
        assert!(state.begin_decoy().is_none());
        assert!(state.loading().generating_decoy);

        assert!(state.apply_decoy(&decoy, DecoyPayload::fallback()));
        assert!(!state.loading().generating_decoy);
        assert_eq!(
            state.decoy().map(|payload| payload.fake_name.as_str()),
            Some("John Doe")
        );
    }

    #[test]
    fn new_selection_clears_decoy_and_stale_decoy_ticket() {
        let mut state = DashboardState::new("v0.1.0");
        let ticket = state.select(message("1"));
        state.apply_analysis(&ticket, AnalysisResult::fallback());
        let decoy = state.begin_decoy().expect("analysis is ready");

        state.select(message("3"));
        assert!(!state.apply_decoy(&decoy, DecoyPayload::fallback()));
        assert_eq!(state.decoy(), None);
        assert_eq!(state.loading(), LoadingFlags {
            analyzing: true,
            generating_decoy: false,
            agent_typing: false,
        });
    }

    #[test]
    fn leaving_inbox_clears_selection() {
        let mut state = DashboardState::new("v0.1.0");
        state.select(message("2"));
        state.toggle_mobile_menu();

        state.navigate(View::Incidents);
        assert_eq!(state.selected(), None);
        assert_eq!(state.analysis_slot(), &AnalysisSlot::Empty);
        assert!(!state.mobile_menu_open());
        assert_eq!(state.status_line(), "Select a conversation to analyze.");
    }

    #[test]
    fn abandoned_analysis_leaves_empty_slot() {
        let mut state = DashboardState::new("v0.1.0");
        let ticket = state.select(message("4"));
        assert!(state.abandon_analysis(&ticket));
        assert!(!state.loading().analyzing);
        assert_eq!(state.status_line(), "No analysis available");
    }
}
