//! End-to-end pipeline scenarios: a signed stored identity, a credential
//! bundle, and in-memory collaborators behind every seam.

use std::sync::Arc;

use chrono::{Duration, Utc};

use sis_core::{TrustVector, ValidationConfig};
use sis_did::{KeyResolver, SignatureVerifier};
use sis_integration_tests::{
    current_item, signature_of, FakeCredentialStore, FakeDidSource, TestSigner, CONTROLLER, KID,
};
use sis_service::audit::{
    RecordingAuditSink, STORED_IDENTITY_READ, STORED_IDENTITY_RETURNED,
};
use sis_service::credential_store::IdentityRecord;
use sis_service::providers::StaticConfigurationProvider;
use sis_service::{
    Auditor, CredentialStoreError, ErrorCode, PipelineOutcome, UserIdentityRequest,
    ValidationPipeline,
};

const FRAUD_ISSUER: &str = "https://fraud.example";
const SUBJECT: &str = "urn:fdc:test:user";

fn validation_config() -> ValidationConfig {
    ValidationConfig {
        fraud_issuers: vec![FRAUD_ISSUER.into()],
        fraud_validity_period_hours: 4320,
        controller_allow_list: vec![CONTROLLER.into()],
        ..Default::default()
    }
}

fn fraud_vc_payload(issued_days_ago: i64) -> serde_json::Value {
    let nbf = (Utc::now() - Duration::days(issued_days_ago)).timestamp();
    serde_json::json!({
        "iss": FRAUD_ISSUER,
        "nbf": nbf,
        "sub": SUBJECT,
        "vc": {
            "type": ["VerifiableCredential", "IdentityCheckCredential"],
            "evidence": [{"checkDetails": [{"checkMethod": "data"}]}]
        }
    })
}

fn stored_identity_payload(credential_signatures: &[String]) -> serde_json::Value {
    serde_json::json!({
        "sub": SUBJECT,
        "vot": "P2",
        "vtm": [],
        "credentials": credential_signatures
    })
}

struct Harness {
    pipeline: ValidationPipeline,
    sink: Arc<RecordingAuditSink>,
}

impl Harness {
    fn new(signer: &TestSigner, identity: Result<IdentityRecord, CredentialStoreError>) -> Self {
        Self::with_config(signer, identity, validation_config())
    }

    fn with_config(
        signer: &TestSigner,
        identity: Result<IdentityRecord, CredentialStoreError>,
        config: ValidationConfig,
    ) -> Self {
        let store = match identity {
            Ok(record) => FakeCredentialStore::serving(record),
            Err(error) => FakeCredentialStore::failing(error),
        };
        let source = FakeDidSource::with_document(CONTROLLER, signer.did_document(CONTROLLER, KID));
        let resolver = Arc::new(KeyResolver::new(Arc::new(source)));
        let sink = Arc::new(RecordingAuditSink::new());

        let pipeline = ValidationPipeline::new(
            Arc::new(StaticConfigurationProvider(config)),
            Arc::new(store),
            SignatureVerifier::new(resolver),
            Auditor::new(sink.clone()),
        );
        Self { pipeline, sink }
    }

    async fn run(&self, authorization: Option<&str>) -> PipelineOutcome {
        let request = UserIdentityRequest {
            vtr: vec![TrustVector::P2],
            govuk_signin_journey_id: Some("journey-1".into()),
        };
        self.pipeline.handle(authorization, &request).await
    }
}

fn bearer(signer: &TestSigner) -> String {
    let token = signer.sign(KID, &serde_json::json!({"sub": SUBJECT, "scope": "proving"}));
    format!("Bearer {token}")
}

fn record_with_fraud_check(signer: &TestSigner, issued_days_ago: i64) -> IdentityRecord {
    let fraud_jwt = signer.sign(KID, &fraud_vc_payload(issued_days_ago));
    let stored_jwt = signer.sign(KID, &stored_identity_payload(&[signature_of(&fraud_jwt)]));
    IdentityRecord {
        si: current_item(&stored_jwt),
        vcs: vec![current_item(&fraud_jwt)],
    }
}

#[tokio::test]
async fn valid_stored_identity_returns_full_success() {
    let signer = TestSigner::generate();
    let harness = Harness::new(&signer, Ok(record_with_fraud_check(&signer, 30)));

    let outcome = harness.run(Some(&bearer(&signer))).await;

    let PipelineOutcome::Success(response) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(response.vot, TrustVector::P2);
    assert!(response.is_valid);
    assert!(!response.expired);
    assert!(response.kid_valid);
    assert!(response.signature_valid);
    assert_eq!(response.content.sub, SUBJECT);
    assert_eq!(response.content.vot, Some(TrustVector::P2));

    let events = harness.sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_name, STORED_IDENTITY_READ);
    assert_eq!(events[0].user.user_id, SUBJECT);
    assert_eq!(
        events[0].user.govuk_signin_journey_id.as_deref(),
        Some("journey-1")
    );
    let read_extensions = events[0].extensions.as_ref().unwrap();
    assert_eq!(read_extensions["retrieval_outcome"], "success");
    assert_eq!(read_extensions["max_vot"], "P2");
    assert!(read_extensions["timestamp_fraud_check_iat"].is_i64());
    assert!(events[0].restricted.as_ref().unwrap()["stored_identity_jwt"].is_string());

    assert_eq!(events[1].event_name, STORED_IDENTITY_RETURNED);
    let returned_extensions = events[1].extensions.as_ref().unwrap();
    assert_eq!(returned_extensions["returned_outcome"], "success");
    assert_eq!(returned_extensions["vot"], "P2");
    assert_eq!(returned_extensions["is_valid"], true);
    assert_eq!(returned_extensions["expired"], false);
    assert!(events[1].restricted.as_ref().unwrap()["response_body"].is_string());
}

#[tokio::test]
async fn missing_authorization_fails_without_audit() {
    let signer = TestSigner::generate();
    let harness = Harness::new(&signer, Ok(record_with_fraud_check(&signer, 30)));

    let outcome = harness.run(None).await;

    assert!(matches!(
        outcome,
        PipelineOutcome::Failure(ErrorCode::InvalidToken)
    ));
    assert!(harness.sink.events().is_empty());
}

#[tokio::test]
async fn malformed_bearer_token_fails_without_audit() {
    let signer = TestSigner::generate();
    let harness = Harness::new(&signer, Ok(record_with_fraud_check(&signer, 30)));

    let outcome = harness.run(Some("Bearer bad.bearer.token")).await;

    assert!(matches!(
        outcome,
        PipelineOutcome::Failure(ErrorCode::InvalidToken)
    ));
    assert!(harness.sink.events().is_empty());
}

#[tokio::test]
async fn missing_record_maps_to_no_record_with_audit_pair() {
    let signer = TestSigner::generate();
    let harness = Harness::new(&signer, Err(CredentialStoreError::NotFound));

    let outcome = harness.run(Some(&bearer(&signer))).await;

    assert!(matches!(
        outcome,
        PipelineOutcome::Failure(ErrorCode::NoRecord)
    ));
    let events = harness.sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0].extensions.as_ref().unwrap()["retrieval_outcome"],
        "no_record"
    );
    let returned_extensions = events[1].extensions.as_ref().unwrap();
    assert_eq!(returned_extensions["returned_outcome"], "error");
    assert_eq!(returned_extensions["error_code"], "no_record");
}

#[tokio::test]
async fn store_forbidden_maps_to_forbidden() {
    let signer = TestSigner::generate();
    let harness = Harness::new(&signer, Err(CredentialStoreError::Forbidden));

    let outcome = harness.run(Some(&bearer(&signer))).await;

    assert!(matches!(
        outcome,
        PipelineOutcome::Failure(ErrorCode::Forbidden)
    ));
    let events = harness.sink.events();
    assert_eq!(
        events[0].extensions.as_ref().unwrap()["retrieval_outcome"],
        "service_error"
    );
    assert_eq!(
        events[1].extensions.as_ref().unwrap()["error_code"],
        "forbidden"
    );
}

#[tokio::test]
async fn store_unauthorized_maps_to_invalid_token() {
    let signer = TestSigner::generate();
    let harness = Harness::new(&signer, Err(CredentialStoreError::Unauthorized));

    let outcome = harness.run(Some(&bearer(&signer))).await;
    assert!(matches!(
        outcome,
        PipelineOutcome::Failure(ErrorCode::InvalidToken)
    ));
    assert_eq!(harness.sink.events().len(), 2);
}

#[tokio::test]
async fn store_failure_maps_to_server_error() {
    let signer = TestSigner::generate();
    let harness = Harness::new(
        &signer,
        Err(CredentialStoreError::Service("status 500".into())),
    );

    let outcome = harness.run(Some(&bearer(&signer))).await;
    assert!(matches!(
        outcome,
        PipelineOutcome::Failure(ErrorCode::ServerError)
    ));
    let events = harness.sink.events();
    assert_eq!(
        events[0].extensions.as_ref().unwrap()["retrieval_outcome"],
        "service_error"
    );
    assert_eq!(
        events[1].extensions.as_ref().unwrap()["error_code"],
        "server_error"
    );
}

#[tokio::test]
async fn tampered_signature_degrades_but_still_succeeds() {
    let signer = TestSigner::generate();
    let impostor = TestSigner::generate();

    // Stored identity signed by a key the DID document does not vouch for.
    let fraud_jwt = signer.sign(KID, &fraud_vc_payload(30));
    let stored_jwt = impostor.sign(KID, &stored_identity_payload(&[signature_of(&fraud_jwt)]));
    let record = IdentityRecord {
        si: current_item(&stored_jwt),
        vcs: vec![current_item(&fraud_jwt)],
    };
    let harness = Harness::new(&signer, Ok(record));

    let outcome = harness.run(Some(&bearer(&signer))).await;

    let PipelineOutcome::Success(response) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert!(response.kid_valid);
    assert!(!response.signature_valid);
    assert!(response.is_valid);
}

#[tokio::test]
async fn unlisted_controller_invalidates_kid_and_skips_verification() {
    let signer = TestSigner::generate();
    let mut config = validation_config();
    config.controller_allow_list = vec!["other.controller.example".into()];
    let harness = Harness::with_config(&signer, Ok(record_with_fraud_check(&signer, 30)), config);

    let outcome = harness.run(Some(&bearer(&signer))).await;

    let PipelineOutcome::Success(response) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert!(!response.kid_valid);
    assert!(!response.signature_valid);
}

#[tokio::test]
async fn stale_fraud_check_marks_identity_expired() {
    let signer = TestSigner::generate();
    let harness = Harness::new(&signer, Ok(record_with_fraud_check(&signer, 200)));

    let outcome = harness.run(Some(&bearer(&signer))).await;

    let PipelineOutcome::Success(response) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert!(response.expired);
    assert!(response.signature_valid);
}

#[tokio::test]
async fn missing_fraud_check_marks_identity_expired() {
    let signer = TestSigner::generate();
    let stored_jwt = signer.sign(KID, &stored_identity_payload(&[]));
    let record = IdentityRecord {
        si: current_item(&stored_jwt),
        vcs: Vec::new(),
    };
    let harness = Harness::new(&signer, Ok(record));

    let outcome = harness.run(Some(&bearer(&signer))).await;

    let PipelineOutcome::Success(response) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert!(response.expired);
    // An empty declared set matches the empty presented set.
    assert!(response.is_valid);
}

#[tokio::test]
async fn extra_presented_credential_breaks_consistency() {
    let signer = TestSigner::generate();
    let fraud_jwt = signer.sign(KID, &fraud_vc_payload(30));
    let extra_jwt = signer.sign(
        KID,
        &serde_json::json!({
            "iss": "https://passport.example",
            "nbf": (Utc::now() - Duration::days(10)).timestamp(),
            "sub": SUBJECT,
            "vc": {"type": ["VerifiableCredential", "IdentityCheckCredential"], "evidence": []}
        }),
    );
    // The assertion only references the fraud credential.
    let stored_jwt = signer.sign(KID, &stored_identity_payload(&[signature_of(&fraud_jwt)]));
    let record = IdentityRecord {
        si: current_item(&stored_jwt),
        vcs: vec![current_item(&fraud_jwt), current_item(&extra_jwt)],
    };
    let harness = Harness::new(&signer, Ok(record));

    let outcome = harness.run(Some(&bearer(&signer))).await;

    let PipelineOutcome::Success(response) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert!(!response.is_valid);
    assert!(response.signature_valid);
}

#[tokio::test]
async fn requested_levels_cap_at_stored_maximum() {
    let signer = TestSigner::generate();
    let harness = Harness::new(&signer, Ok(record_with_fraud_check(&signer, 30)));

    let request = UserIdentityRequest {
        vtr: vec![TrustVector::P1, TrustVector::P3],
        govuk_signin_journey_id: None,
    };
    let outcome = harness
        .pipeline
        .handle(Some(&bearer(&signer)), &request)
        .await;

    let PipelineOutcome::Success(response) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    // Stored maximum is P2: P3 is unattainable, P1 is the best on offer.
    assert_eq!(response.vot, TrustVector::P1);
}

#[tokio::test]
async fn undecodable_stored_identity_is_a_server_error_with_audit_pair() {
    let signer = TestSigner::generate();
    let record = IdentityRecord {
        si: current_item("not-a-jwt"),
        vcs: Vec::new(),
    };
    let harness = Harness::new(&signer, Ok(record));

    let outcome = harness.run(Some(&bearer(&signer))).await;

    assert!(matches!(
        outcome,
        PipelineOutcome::Failure(ErrorCode::ServerError)
    ));
    let events = harness.sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0].extensions.as_ref().unwrap()["retrieval_outcome"],
        "service_error"
    );
    assert_eq!(
        events[1].extensions.as_ref().unwrap()["error_code"],
        "server_error"
    );
}

#[tokio::test]
async fn key_resolution_is_cached_across_requests() {
    let signer = TestSigner::generate();
    let source = Arc::new(FakeDidSource::with_document(
        CONTROLLER,
        signer.did_document(CONTROLLER, KID),
    ));
    let resolver = Arc::new(KeyResolver::new(source.clone()));
    let sink = Arc::new(RecordingAuditSink::new());
    let record = record_with_fraud_check(&signer, 30);
    let pipeline = ValidationPipeline::new(
        Arc::new(StaticConfigurationProvider(validation_config())),
        Arc::new(FakeCredentialStore::serving(record)),
        SignatureVerifier::new(resolver),
        Auditor::new(sink),
    );
    let request = UserIdentityRequest {
        vtr: vec![TrustVector::P2],
        govuk_signin_journey_id: None,
    };

    for _ in 0..3 {
        let outcome = pipeline.handle(Some(&bearer(&signer)), &request).await;
        assert!(matches!(outcome, PipelineOutcome::Success(_)));
    }
    assert_eq!(source.fetch_count(), 1);
}
