//! The validation pipeline: authenticates the caller, retrieves the stored
//! identity, evaluates it, and assembles the externally observable outcome
//! together with its audit events.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use sis_core::TrustVector;
use sis_credentials::{
    evaluate_identity_expiry, jwt, select_trust_level, validate_credential_set,
    StoredIdentityClaims, VerifiableCredentialJwt,
};
use sis_did::{did_web, SignatureVerifier};

use crate::audit::{AuditUser, Auditor, IdentityReadExtensions, IdentityReturnedExtensions};
use crate::credential_store::{current_credentials, CredentialStore, CredentialStoreError};
use crate::error::ErrorCode;
use crate::providers::ConfigurationProvider;

/// The request body of `POST /user-identity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentityRequest {
    pub vtr: Vec<TrustVector>,
    #[serde(
        rename = "govukSigninJourneyId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub govuk_signin_journey_id: Option<String>,
}

impl UserIdentityRequest {
    /// `P0` is a result, never a request; an empty vector requests nothing.
    pub fn is_valid(&self) -> bool {
        !self.vtr.is_empty() && !self.vtr.contains(&TrustVector::P0)
    }
}

/// The success response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentityResponse {
    pub content: StoredIdentityClaims,
    pub vot: TrustVector,
    #[serde(rename = "isValid")]
    pub is_valid: bool,
    pub expired: bool,
    #[serde(rename = "kidValid")]
    pub kid_valid: bool,
    #[serde(rename = "signatureValid")]
    pub signature_valid: bool,
}

/// Terminal outcome of a pipeline run.
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Success(UserIdentityResponse),
    Failure(ErrorCode),
}

#[derive(Debug, Deserialize)]
struct AccessTokenClaims {
    #[serde(default)]
    sub: Option<String>,
}

pub struct ValidationPipeline {
    config: Arc<dyn ConfigurationProvider>,
    store: Arc<dyn CredentialStore>,
    verifier: SignatureVerifier,
    auditor: Auditor,
}

impl ValidationPipeline {
    pub fn new(
        config: Arc<dyn ConfigurationProvider>,
        store: Arc<dyn CredentialStore>,
        verifier: SignatureVerifier,
        auditor: Auditor,
    ) -> Self {
        Self {
            config,
            store,
            verifier,
            auditor,
        }
    }

    /// Run the pipeline for one request. The caller has already parsed and
    /// validated the body; this takes over from authentication onwards.
    pub async fn handle(
        &self,
        authorization: Option<&str>,
        request: &UserIdentityRequest,
    ) -> PipelineOutcome {
        // No audit events before this point: without a decodable bearer
        // token there is no subject to attribute them to.
        let Some(authorization) = authorization else {
            tracing::error!("authorization header was not included in request");
            return PipelineOutcome::Failure(ErrorCode::InvalidToken);
        };
        let subject = match authenticate_caller(authorization) {
            Ok(subject) => subject,
            Err(reason) => {
                tracing::error!(reason, "error whilst decoding bearer token");
                return PipelineOutcome::Failure(ErrorCode::InvalidToken);
            }
        };

        let user = AuditUser {
            user_id: subject,
            govuk_signin_journey_id: request.govuk_signin_journey_id.clone(),
        };

        match self.validate(authorization, request, &user).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(error = %err, "error retrieving user identity");
                self.audit_failure(ErrorCode::ServerError, IdentityReadExtensions::ServiceError, &user)
                    .await;
                PipelineOutcome::Failure(ErrorCode::ServerError)
            }
        }
    }

    async fn validate(
        &self,
        authorization: &str,
        request: &UserIdentityRequest,
        user: &AuditUser,
    ) -> anyhow::Result<PipelineOutcome> {
        let config = self.config.configuration().await?;

        let record = match self.store.get_identity(authorization).await {
            Ok(record) => record,
            Err(err) => {
                tracing::error!(error = %err, "error received from credential store");
                let code = match err {
                    CredentialStoreError::Unauthorized => ErrorCode::InvalidToken,
                    CredentialStoreError::Forbidden => ErrorCode::Forbidden,
                    CredentialStoreError::NotFound => ErrorCode::NoRecord,
                    CredentialStoreError::Service(_) => ErrorCode::ServerError,
                };
                let read_extensions = match code {
                    ErrorCode::NoRecord => IdentityReadExtensions::NoRecord,
                    _ => IdentityReadExtensions::ServiceError,
                };
                self.audit_failure(code, read_extensions, user).await;
                return Ok(PipelineOutcome::Failure(code));
            }
        };

        let stored_identity_jwt = record.si.vc.clone();
        let content: StoredIdentityClaims = jwt::decode_body(&stored_identity_jwt)?;
        let header = jwt::decode_header(&stored_identity_jwt)?;

        let current_jwts = current_credentials(&record);
        let bundle: Vec<VerifiableCredentialJwt> = current_jwts
            .iter()
            .map(|token| jwt::decode_body(token))
            .collect::<Result<_, _>>()?;

        let expiry = evaluate_identity_expiry(&bundle, &config, Utc::now());

        let kid = header.kid.as_deref().unwrap_or("");
        let kid_valid = did_web::is_valid_did_web(kid)
            && did_web::controller(kid).is_some_and(|controller| {
                config
                    .controller_allow_list
                    .iter()
                    .any(|allowed| allowed == &controller)
            });
        let signature_valid = if kid_valid {
            self.verifier.verify(kid, &stored_identity_jwt).await
        } else {
            false
        };

        let vot = select_trust_level(&content, &request.vtr);
        let is_valid = validate_credential_set(&content, &current_jwts);

        self.auditor
            .identity_record_read(
                IdentityReadExtensions::Success {
                    max_vot: content.max_trust_vector(),
                    timestamp_fraud_check_iat: expiry.fraud_check_issued_at,
                },
                Some(stored_identity_jwt),
                user.clone(),
            )
            .await;

        let mut content = content;
        content.vot = Some(vot);
        let response = UserIdentityResponse {
            content,
            vot,
            is_valid,
            expired: expiry.expired,
            kid_valid,
            signature_valid,
        };

        let response_body = serde_json::to_string(&response)?;
        self.auditor
            .identity_record_returned(
                IdentityReturnedExtensions::Success {
                    vot,
                    is_valid,
                    expired: expiry.expired,
                },
                Some(response_body),
                user.clone(),
            )
            .await;

        Ok(PipelineOutcome::Success(response))
    }

    async fn audit_failure(
        &self,
        code: ErrorCode,
        read_extensions: IdentityReadExtensions,
        user: &AuditUser,
    ) {
        self.auditor
            .identity_record_read(read_extensions, None, user.clone())
            .await;
        self.auditor
            .identity_record_returned(
                IdentityReturnedExtensions::Error {
                    error_code: code.as_str().to_string(),
                },
                None,
                user.clone(),
            )
            .await;
    }
}

/// Extract the subject from the bearer token. The token is issued by a
/// separately-trusted upstream, so its payload is decoded without signature
/// verification.
fn authenticate_caller(authorization: &str) -> Result<String, &'static str> {
    let token = authorization
        .split_whitespace()
        .nth(1)
        .ok_or("no token in authorization header")?;
    let claims: AccessTokenClaims =
        jwt::decode_body(token).map_err(|_| "token payload is undecodable")?;
    claims.sub.ok_or("token has no subject claim")
}
