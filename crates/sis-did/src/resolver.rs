use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::{DashMapKeyCache, KeyCache};
use crate::did_web::parse_did_web;
use crate::document::{AssertionMethod, DidDocument, PublicKeyJwk};
use crate::error::DidError;

/// Source of DID documents for a controller.
#[async_trait]
pub trait DidDocumentSource: Send + Sync {
    async fn fetch(&self, controller: &str) -> Result<DidDocument, DidError>;
}

/// Fetches `did:web` documents over HTTPS: path segments of the controller
/// map to URL path segments, and a bare domain resolves under
/// `/.well-known/did.json`.
pub struct HttpDidDocumentSource {
    client: reqwest::Client,
}

impl HttpDidDocumentSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn document_url(controller: &str) -> String {
        if controller.contains(':') {
            format!("https://{}/did.json", controller.replace(':', "/"))
        } else {
            format!("https://{controller}/.well-known/did.json")
        }
    }
}

impl Default for HttpDidDocumentSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DidDocumentSource for HttpDidDocumentSource {
    async fn fetch(&self, controller: &str) -> Result<DidDocument, DidError> {
        let url = Self::document_url(controller);
        tracing::debug!(%url, "fetching DID document");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| DidError::DocumentFetch {
                controller: controller.to_string(),
                reason: err.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DidError::DocumentFetch {
                controller: controller.to_string(),
                reason: format!("status {}", response.status()),
            });
        }

        response
            .json::<DidDocument>()
            .await
            .map_err(|err| DidError::MalformedDocument(err.to_string()))
    }
}

/// Resolves a `did:web` kid to public key material, memoizing resolved keys
/// per kid for the resolver's lifetime.
pub struct KeyResolver {
    source: Arc<dyn DidDocumentSource>,
    cache: Arc<dyn KeyCache>,
}

impl KeyResolver {
    pub fn new(source: Arc<dyn DidDocumentSource>) -> Self {
        Self::with_cache(source, Arc::new(DashMapKeyCache::new()))
    }

    pub fn with_cache(source: Arc<dyn DidDocumentSource>, cache: Arc<dyn KeyCache>) -> Self {
        Self { source, cache }
    }

    /// Resolve a kid to its embedded JWK. A malformed kid fails before any
    /// I/O; a cache hit skips the document fetch entirely.
    pub async fn resolve_key(&self, kid: &str) -> Result<PublicKeyJwk, DidError> {
        let parts = parse_did_web(kid)?;

        if let Some(key) = self.cache.get(kid) {
            tracing::debug!(kid, "resolved key from cache");
            return Ok(key);
        }

        let document = self.source.fetch(&parts.controller).await?;
        let key = find_assertion_key(&document, kid)?;
        self.cache.put(kid.to_string(), key.clone());
        Ok(key)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

fn find_assertion_key(document: &DidDocument, kid: &str) -> Result<PublicKeyJwk, DidError> {
    for entry in &document.assertion_method {
        match entry {
            AssertionMethod::Embedded(method) if method.id == kid => {
                return Ok(method.public_key_jwk.clone());
            }
            AssertionMethod::Reference(reference) if reference == kid => {
                return Err(DidError::UnsupportedReference(kid.to_string()));
            }
            _ => {}
        }
    }
    Err(DidError::UnresolvableKid(kid.to_string()))
}
