//! Integration tests for analysis degraded-mode behavior.

mod common;

use common::{ScriptedTransport, phishing_analysis_json, shared};
use deepguard_analysis_contract::{AnalysisResult, RiskLevel, SuggestedAction};
use deepguard_app::AnalysisClient;
use deepguard_model::ModelError;

#[tokio::test]
async fn analysis_fallback_tests_returns_parsed_result_on_success() {
    let transport = ScriptedTransport::new(vec![Ok(phishing_analysis_json())]);
    let client = AnalysisClient::new(shared(&transport)).expect("client should build");

    let result = client
        .analyze("URGENT", "verify your card", "support@amazon-security-alert-x92.com")
        .await
        .expect("analysis should settle");

    assert_eq!(result.risk_level, RiskLevel::Critical);
    assert!(result.trust_score <= 100);
    assert_eq!(result.suggested_action, SuggestedAction::Decoy);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].response_schema.is_some());
    assert!(requests[0].contents[0].text.contains("Sender: support@amazon-security-alert-x92.com"));
}

#[tokio::test]
async fn analysis_fallback_tests_substitutes_fixed_record_on_failures() {
    let transport = ScriptedTransport::new(vec![
        Err(ModelError::Transport("connection reset".to_string())),
        Ok(String::new()),
        Ok("{\"trustScore\": 12".to_string()),
        Ok(r#"{"trustScore": 250, "riskLevel": "HIGH"}"#.to_string()),
        Err(ModelError::Status {
            status: 403,
            body: "API key not valid".to_string(),
        }),
    ]);
    let client = AnalysisClient::new(shared(&transport)).expect("client should build");

    for _ in 0..5 {
        let result = client
            .analyze("subject", "body", "sender@example.test")
            .await
            .expect("recoverable failures never surface");
        assert_eq!(result, AnalysisResult::fallback());
        assert_eq!(result.trust_score, 50);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.flags, vec!["Analysis Error - Check Connection".to_string()]);
        assert_eq!(result.suggested_action, SuggestedAction::Verify);
    }
}

#[tokio::test]
async fn analysis_fallback_tests_repeats_request_without_caching() {
    let transport = ScriptedTransport::new(vec![
        Ok(phishing_analysis_json()),
        Ok(phishing_analysis_json()),
    ]);
    let client = AnalysisClient::new(shared(&transport)).expect("client should build");

    for _ in 0..2 {
        client
            .analyze("same", "same", "same@example.test")
            .await
            .expect("analysis should settle");
    }
    assert_eq!(transport.requests().len(), 2);
}
