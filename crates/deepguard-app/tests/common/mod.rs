//! Shared fixtures for app integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use deepguard_model::{ModelError, ModelRequest, ModelTransport};

/// Deterministic transport replaying scripted replies in order.
#[derive(Debug)]
pub struct ScriptedTransport {
    ready: bool,
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    requests: Mutex<Vec<ModelRequest>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    /// Transport with a configured key and the given replies.
    pub fn new(replies: Vec<Result<String, ModelError>>) -> Arc<Self> {
        Arc::new(Self {
            ready: true,
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Transport behaving as if no API key were configured.
    pub fn without_key() -> Arc<Self> {
        Arc::new(Self {
            ready: false,
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().expect("request lock should work").clone()
    }
}

#[async_trait]
impl ModelTransport for ScriptedTransport {
    fn ensure_ready(&self) -> Result<(), ModelError> {
        if self.ready {
            Ok(())
        } else {
            Err(ModelError::MissingApiKey)
        }
    }

    async fn generate(&self, request: &ModelRequest) -> Result<String, ModelError> {
        self.requests
            .lock()
            .expect("request lock should work")
            .push(request.clone());
        self.replies
            .lock()
            .expect("reply lock should work")
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Transport("script exhausted".to_string())))
    }
}

/// Upcasts a scripted transport for client constructors.
#[allow(dead_code)]
pub fn shared(transport: &Arc<ScriptedTransport>) -> Arc<dyn ModelTransport> {
    transport.clone()
}

/// Schema-conforming analysis of the Amazon phishing fixture.
#[allow(dead_code)]
pub fn phishing_analysis_json() -> String {
    serde_json::json!({
        "trustScore": 9,
        "riskLevel": "CRITICAL",
        "flags": ["Urgency pressure", "Lookalike sender domain", "Requests card details"],
        "reasoning": "Credential phishing impersonating Amazon",
        "intent": "Payment card theft",
        "sentiment": "Threatening",
        "suggestedAction": "DECOY"
    })
    .to_string()
}

/// Schema-conforming decoy payload.
#[allow(dead_code)]
pub fn decoy_json() -> String {
    serde_json::json!({
        "fakeName": "Margaret Okafor",
        "fakeAccount": "AMZ-0000-TEST-4417",
        "fakeAddress": "42 Nowhere Lane, Springfield, IL",
        "generatedEmailBody": "Hello, the link did not load. My account is AMZ-0000-TEST-4417."
    })
    .to_string()
}
