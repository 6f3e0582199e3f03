//! Request and response payloads for the repository API.

use serde::Serialize;
use serde_json::Value;

use crate::models::Token;

/// Credentials sent to the token endpoint.
#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// JSON body of a metadata submission: the caller's fresh token plus the
/// record's full metadata (including its `knowledge_objects` linkage list).
#[derive(Debug, Serialize)]
pub struct MetadataEnvelope {
    pub user_tokens: Token,
    pub metadata: Value,
}
