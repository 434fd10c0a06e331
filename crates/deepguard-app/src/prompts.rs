//! Prompt templates sent to the external model.
//!
//! Every template is deterministic: the same inputs always produce the same
//! text, so requests can be asserted on in tests.

use deepguard_analysis_contract::AnalysisResult;
use deepguard_core::Communication;

/// Characters of the original message included in a decoy prompt.
pub const DECOY_CONTEXT_LIMIT: usize = 1000;

/// Characters of the message body included in a session preamble.
pub const SESSION_CONTEXT_LIMIT: usize = 800;

/// Agent turn recorded when a chat reply cannot be obtained.
pub const CHAT_APOLOGY: &str =
    "I'm having trouble connecting to the secure server. Please try again.";

/// Returns the first `limit` characters of `text`.
///
/// Counts Unicode scalar values, so multi-byte text is never split inside a
/// character. Text at or under the limit is returned unchanged.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}

/// Threat-classification prompt for one communication.
pub fn analysis_prompt(subject: &str, body: &str, sender: &str) -> String {
    format!(
        "Analyze the following communication for cybersecurity threats, specifically targeting \
Small and Medium Enterprises (SMEs).
Look for signs of:
1. Phishing / Social Engineering (urgency, fear, authority).
2. CEO Fraud / BEC (Business Email Compromise).
3. Deepfake text patterns (unnatural phrasing).
4. Domain spoofing checks (simulated based on sender email).

Sender: {sender}
Subject: {subject}
Content: {body}

Return the response in JSON format strictly adhering to the following schema."
    )
}

/// Decoy-persona prompt. `original_content` is cut to [`DECOY_CONTEXT_LIMIT`].
pub fn decoy_prompt(original_content: &str, attack_type: &str) -> String {
    let context = truncate_chars(original_content, DECOY_CONTEXT_LIMIT);
    format!(
        "The user is being targeted by a scammer.
Attack Logic detected: {attack_type}.

Original Message Context:
\"{context}...\"

TASK: Generate \"Decoy Data\" to reply with.
1. Create a realistic but fake persona (Name, Address).
2. Create a fake account number/ID that looks valid for this context but is clearly \
recognizable as fake data if analyzed.
3. Write a polite, slightly confused-sounding email body that provides this information to \
the scammer to waste their time and pollute their database.

Return strictly JSON."
    )
}

/// System instruction seeding a conversational session.
pub fn session_instruction(communication: &Communication, analysis: &AnalysisResult) -> String {
    let content = truncate_chars(&communication.content, SESSION_CONTEXT_LIMIT);
    format!(
        "You are DeepGuard, an advanced AI Cybersecurity Agent for SMEs.
You are currently analyzing a specific message for the user.

Context - The Message being analyzed:
Sender: {sender} ({sender_email})
Subject: {subject}
Content: \"{content}...\"

Context - Your Security Analysis:
Risk Level: {risk_level}
Trust Score: {trust_score}/100
Flags: {flags}
Reasoning: {reasoning}

Your Role:
1. Act as a helpful, vigilant security consultant.
2. Explain technical threats in simple business terms.
3. If the user asks, help draft safe responses or explain why a message is a scam.
4. If the user wants to \"mess with\" the scammer, suggest generating Decoy Data (which they \
can do from the report panel).

Tone: Professional, Protective, slightly futuristic but accessible.
Keep responses concise (under 100 words) unless asked for a detailed report.",
        sender = communication.sender,
        sender_email = communication.sender_email,
        subject = communication.subject,
        risk_level = analysis.risk_level,
        trust_score = analysis.trust_score,
        flags = analysis.flags.join(", "),
        reasoning = analysis.reasoning,
    )
}

/// Opening agent turn of every session transcript.
pub fn seed_greeting(communication: &Communication, analysis: &AnalysisResult) -> String {
    format!(
        "I've analyzed this message from {}. The risk level is {}. Would you like a breakdown of \
the red flags?",
        communication.sender, analysis.risk_level
    )
}
