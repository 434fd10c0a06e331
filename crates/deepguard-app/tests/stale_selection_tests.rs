//! Integration tests for the stale-response guard.

mod common;

use common::{ScriptedTransport, phishing_analysis_json, shared};
use deepguard_analysis_contract::RiskLevel;
use deepguard_app::Dashboard;
use deepguard_core::Inbox;

#[tokio::test]
async fn stale_selection_tests_late_result_is_not_attributed_to_new_selection() {
    let transport = ScriptedTransport::new(vec![
        Ok(phishing_analysis_json()),
        Ok(String::new()),
    ]);
    let mut dashboard = Dashboard::new(Inbox::mock(), shared(&transport)).expect("dashboard");

    let first = dashboard.select("1").expect("known id");
    let second = dashboard.select("3").expect("known id");
    assert!(dashboard.state().loading().analyzing);

    // Run both, then settle the first one last.
    let first_outcome = first.run().await;
    let second_outcome = second.run().await;

    assert!(dashboard.apply_analysis(second_outcome).expect("fresh result applies"));
    assert!(!dashboard.apply_analysis(first_outcome).expect("stale result is discarded"));

    assert_eq!(
        dashboard.state().selected().map(|message| message.id.as_str()),
        Some("3")
    );
    let analysis = dashboard.state().analysis().expect("analysis applied");
    assert_eq!(analysis.risk_level, RiskLevel::Medium);
    assert_eq!(
        dashboard.session().map(|session| session.communication_id()),
        Some("3")
    );
}

#[tokio::test]
async fn stale_selection_tests_new_selection_drops_session_and_decoy() {
    let transport = ScriptedTransport::new(vec![
        Ok(phishing_analysis_json()),
        Ok(common::decoy_json()),
        Ok(phishing_analysis_json()),
    ]);
    let mut dashboard = Dashboard::new(Inbox::mock(), shared(&transport)).expect("dashboard");

    dashboard.select_and_analyze("1").await.expect("analysis");
    assert!(dashboard.generate_decoy().await.expect("decoy"));
    assert!(dashboard.state().decoy().is_some());

    let pending = dashboard.select("2").expect("known id");
    assert!(dashboard.state().decoy().is_none());
    assert!(dashboard.session().is_none());
    assert!(dashboard.transcript().is_empty());

    dashboard.apply_analysis(pending.run().await).expect("apply");
    assert_eq!(dashboard.transcript().len(), 1);
}
