//! Repository API client.
//!
//! Thin client over the EU-FarmBook upload endpoints. Every call fetches a
//! fresh token; nothing is cached between calls. Requests run one at a
//! time from the orchestrator, so the client holds no state beyond the
//! configured connection.

pub mod types;

use serde_json::Value;

use crate::config::{Config, REQUEST_TIMEOUT};
use crate::error::{AuthError, AuthResult, UploadError, UploadResult};
use crate::models::Token;
use types::{AuthRequest, MetadataEnvelope};

/// Client for the repository's authentication and upload endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    project_id: String,
    email: String,
    password: String,
}

impl ApiClient {
    /// Build a client from the runtime configuration.
    pub fn new(config: &Config) -> UploadResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base: config.api_address.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            email: config.email.clone(),
            password: config.password.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Fetch a fresh token for the configured account.
    pub async fn authenticate(&self) -> AuthResult<Token> {
        let response = self
            .http
            .post(self.endpoint("/api/authentication/token/"))
            .json(&AuthRequest {
                email: &self.email,
                password: &self.password,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| AuthError::Malformed(e.to_string()))
    }

    /// Probe the API's database status endpoint.
    pub async fn db_status(&self) -> AuthResult<Value> {
        let response = self
            .http
            .get(self.endpoint("/api/status/db_status"))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(parse_body(&body))
    }

    /// List the projects the account is registered for.
    pub async fn projects(&self) -> AuthResult<Value> {
        let token = self.authenticate().await?;
        let response = self
            .http
            .post(self.endpoint("/api/authentication/projects/"))
            .json(&token)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(parse_body(&body))
    }

    /// Upload one knowledge-object file; returns the server-assigned
    /// `database_id`.
    pub async fn upload_file(&self, file_name: &str, bytes: Vec<u8>) -> UploadResult<String> {
        let token = self.authenticate().await?;

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("ufile", part);

        let response = self
            .http
            .post(self.endpoint("/api/upload/knowledge_object_file"))
            .query(&[
                ("user_tokens", serde_json::to_string(&token)?),
                ("project_id", self.project_id.clone()),
            ])
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        match parse_body(&body).get("database_id") {
            Some(Value::String(id)) => Ok(id.clone()),
            Some(other) if !other.is_null() => Ok(other.to_string()),
            _ => Err(UploadError::MissingField("database_id")),
        }
    }

    /// Submit a record's metadata. `dry_run` selects the validate endpoint,
    /// which checks the metadata against remote rules without persisting.
    pub async fn submit_metadata(&self, metadata: Value, dry_run: bool) -> UploadResult<Value> {
        let token = self.authenticate().await?;

        let path = if dry_run {
            "/api/upload/validate_knowledge_object_metadata"
        } else {
            "/api/upload/knowledge_object_metadata"
        };

        let envelope = MetadataEnvelope {
            user_tokens: token,
            metadata,
        };

        let response = self
            .http
            .post(self.endpoint(path))
            .query(&[("project_id", self.project_id.clone())])
            .json(&envelope)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(parse_body(&body))
    }
}

/// Parse a response body as JSON, falling back to the raw text for
/// endpoints that answer with a bare string.
fn parse_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_config() -> Config {
        Config {
            api_address: "https://api.example.test/".to_string(),
            project_id: "proj-1".to_string(),
            email: "curator@example.test".to_string(),
            password: "secret".to_string(),
            metadata_dir: PathBuf::from("data"),
            objects_dir: PathBuf::from("data/kos"),
        }
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = ApiClient::new(&test_config()).unwrap();
        assert_eq!(
            client.endpoint("/api/status/db_status"),
            "https://api.example.test/api/status/db_status"
        );
    }

    #[test]
    fn test_parse_body_falls_back_to_text() {
        assert_eq!(parse_body("{\"ok\": true}")["ok"], Value::Bool(true));
        assert_eq!(parse_body("plain message"), Value::String("plain message".into()));
    }
}
