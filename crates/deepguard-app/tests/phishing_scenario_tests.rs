//! End-to-end dashboard flow over the Amazon phishing fixture.

mod common;

use common::{ScriptedTransport, decoy_json, phishing_analysis_json, shared};
use deepguard_analysis_contract::RiskLevel;
use deepguard_app::Dashboard;
use deepguard_core::{Inbox, TurnRole};
use deepguard_ui::{PanelTab, View};

#[tokio::test]
async fn phishing_scenario_tests_select_decoy_and_chat() {
    let transport = ScriptedTransport::new(vec![
        Ok(phishing_analysis_json()),
        Ok(decoy_json()),
        Ok("The sender domain imitates Amazon and demands card details.".to_string()),
    ]);
    let mut dashboard = Dashboard::new(Inbox::mock(), shared(&transport)).expect("dashboard");

    assert!(dashboard.select_and_analyze("1").await.expect("analysis"));
    let state = dashboard.state();
    assert!(
        state
            .selected()
            .is_some_and(|message| message.subject.starts_with("URGENT: Suspicious activity"))
    );
    let analysis = state.analysis().expect("analysis applied");
    assert!(analysis.risk_level >= RiskLevel::High);
    assert!(!analysis.flags.is_empty());
    assert!(!state.loading().analyzing);

    dashboard.set_tab(PanelTab::Chat);
    assert!(dashboard.generate_decoy().await.expect("decoy"));
    assert_eq!(dashboard.state().tab(), PanelTab::Report);
    let decoy = dashboard.state().decoy().expect("decoy applied");
    assert!(!decoy.generated_email_body.is_empty());
    assert!(!dashboard.state().loading().generating_decoy);

    // The decoy prompt is labelled with the analysis reasoning.
    let decoy_prompt = &transport.requests()[1].contents[0].text;
    assert!(decoy_prompt.contains("Attack Logic detected: Credential phishing impersonating Amazon."));

    let before = dashboard.transcript().len();
    let reply = dashboard.send_chat("why is this risky?").await.expect("chat");
    assert_eq!(reply.role, TurnRole::Agent);
    assert!(!dashboard.state().loading().agent_typing);

    let transcript = dashboard.transcript();
    assert_eq!(transcript.len(), before + 2);
    assert_eq!(transcript[before].role, TurnRole::User);
    assert_eq!(transcript[before].text, "why is this risky?");
    assert_eq!(transcript[before + 1], reply);
    assert!(transcript[0].text.contains("The risk level is CRITICAL."));
}

#[tokio::test]
async fn phishing_scenario_tests_chat_requires_an_analysis() {
    let transport = ScriptedTransport::new(vec![]);
    let mut dashboard = Dashboard::new(Inbox::mock(), shared(&transport)).expect("dashboard");

    assert!(dashboard.send_chat("hello").await.is_err());
    assert!(!dashboard.generate_decoy().await.expect("no decoy without analysis"));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn phishing_scenario_tests_navigation_away_clears_selection() {
    let transport = ScriptedTransport::new(vec![Ok(phishing_analysis_json())]);
    let mut dashboard = Dashboard::new(Inbox::mock(), shared(&transport)).expect("dashboard");

    dashboard.select_and_analyze("1").await.expect("analysis");
    dashboard.navigate(View::ThreatMonitor);

    assert_eq!(dashboard.state().view(), View::ThreatMonitor);
    assert!(dashboard.state().selected().is_none());
    assert!(dashboard.session().is_none());
}
