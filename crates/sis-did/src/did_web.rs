//! Parsing and validation of `did:web:<controller>#<fragment>` identifiers.

use crate::error::DidError;

const SCHEME: &str = "did:web:";

/// The two components of a `did:web` key identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DidWebParts {
    /// The document controller: everything between the scheme and the `#`.
    pub controller: String,
    /// The key fragment after the `#`.
    pub fragment: String,
}

/// Parse a `did:web` key identifier. The scheme is matched
/// case-insensitively; controller and fragment must both be non-empty and
/// restricted to the identifier character set.
pub fn parse_did_web(kid: &str) -> Result<DidWebParts, DidError> {
    let invalid = || DidError::InvalidKeyIdentifier(kid.to_string());

    let scheme = kid.get(..SCHEME.len()).ok_or_else(invalid)?;
    if !scheme.eq_ignore_ascii_case(SCHEME) {
        return Err(invalid());
    }

    let rest = &kid[SCHEME.len()..];
    let (controller, fragment) = rest.split_once('#').ok_or_else(invalid)?;

    if controller.is_empty()
        || fragment.is_empty()
        || controller.split(':').any(|segment| segment.is_empty())
        || !controller.chars().all(is_identifier_char)
        || !fragment.chars().all(is_identifier_char)
    {
        return Err(invalid());
    }

    Ok(DidWebParts {
        controller: controller.to_string(),
        fragment: fragment.to_string(),
    })
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~' | '%' | ':')
}

/// Whether the kid is a well-formed `did:web` key identifier.
pub fn is_valid_did_web(kid: &str) -> bool {
    parse_did_web(kid).is_ok()
}

/// The controller component, if the kid parses.
pub fn controller(kid: &str) -> Option<String> {
    parse_did_web(kid).ok().map(|parts| parts.controller)
}
