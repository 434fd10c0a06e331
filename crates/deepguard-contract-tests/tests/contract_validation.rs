//! Validates contract fixtures against frozen JSON schemas.

use deepguard_analysis_contract::{AnalysisResult, DecoyPayload};
use jsonschema::JSONSchema;
use serde_json::Value;

fn load_json(path: &str) -> Value {
    let raw = std::fs::read_to_string(path).expect("json file should be readable");
    serde_json::from_str(&raw).expect("json file should be valid")
}

fn compile_validator(schema_path: &str) -> JSONSchema {
    let schema = load_json(schema_path);
    JSONSchema::compile(&schema).expect("schema should compile")
}

#[test]
fn analysis_fixture_matches_schema() {
    let validator = compile_validator(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/analysis-result.schema.json"
    ));
    let fixture = load_json(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/fixtures/analysis-result.valid.json"
    ));
    assert!(
        validator.is_valid(&fixture),
        "analysis fixture should validate against schema"
    );
}

#[test]
fn invalid_analysis_fixture_is_rejected() {
    let validator = compile_validator(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/analysis-result.schema.json"
    ));
    let fixture = load_json(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/fixtures/analysis-result.invalid.json"
    ));
    assert!(
        !validator.is_valid(&fixture),
        "out-of-range score, unknown level and missing action must fail"
    );
}

#[test]
fn fallback_fixture_matches_runtime_fallback() {
    let fixture = load_json(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/fixtures/analysis-result.fallback.json"
    ));
    let runtime = serde_json::to_value(AnalysisResult::fallback()).expect("fallback encodes");
    assert_eq!(fixture, runtime, "fallback record must stay verbatim");
}

#[test]
fn decoy_fixture_matches_schema() {
    let validator = compile_validator(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/decoy-payload.schema.json"
    ));
    let fixture = load_json(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/fixtures/decoy-payload.valid.json"
    ));
    assert!(
        validator.is_valid(&fixture),
        "decoy fixture should validate against schema"
    );

    let fallback = serde_json::to_value(DecoyPayload::fallback()).expect("fallback encodes");
    assert!(validator.is_valid(&fallback), "decoy fallback should validate");
}
