//! `did:web` key resolution and signature verification.
//!
//! A stored identity assertion is signed with a key identified by a
//! `did:web:<controller>#<fragment>` kid. This crate parses and validates
//! those identifiers, fetches the controller's DID document, resolves the
//! kid to embedded JWK material (memoized per kid), and verifies compact-JWT
//! signatures against the resolved key.

pub mod cache;
pub mod did_web;
pub mod document;
pub mod error;
pub mod resolver;
pub mod verify;

pub use cache::{DashMapKeyCache, KeyCache};
pub use did_web::{controller, is_valid_did_web, parse_did_web, DidWebParts};
pub use document::{AssertionMethod, DidDocument, PublicKeyJwk, VerificationMethod};
pub use error::DidError;
pub use resolver::{DidDocumentSource, HttpDidDocumentSource, KeyResolver};
pub use verify::SignatureVerifier;
