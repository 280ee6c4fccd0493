//! crm-adapter — outbound HTTP client for the CRM contact backend.
//!
//! Purpose
//! - Implement the `ContactBackend` port from the `domain` crate against the
//!   CRM's contact resource (Freshsales-style API).
//! - Every request carries a static `Authorization: Token token=<key>`
//!   header and JSON content type; request and response bodies nest the
//!   contact fields under a `contact` key.
//!
//! Notes
//! - Any failure of the outbound call — transport error or non-2xx status —
//!   is surfaced as a single `Upstream` error carrying the failure's
//!   message. The CRM's own "not found" is not special-cased; it arrives as
//!   whatever error body the CRM returned. No retries.

use domain::{BackendError, Contact, ContactBackend, ContactUpdate, NewContact};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Errors from the CRM client.
#[derive(Debug, thiserror::Error)]
pub enum CrmError {
    #[error("CRM api key contains invalid header characters")]
    InvalidApiKey,
    #[error("CRM request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("CRM request error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<CrmError> for BackendError {
    fn from(e: CrmError) -> Self {
        BackendError::Upstream(e.to_string())
    }
}

/// HTTP client for the CRM contact resource, built once at startup and
/// reused for the process lifetime.
#[derive(Clone)]
pub struct CrmClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct ContactEnvelope<T> {
    contact: T,
}

#[derive(Deserialize)]
struct ContactReply {
    contact: Contact,
}

impl CrmClient {
    /// Build a client for an explicit base URL (tests, local development).
    pub fn new<S: Into<String>>(base_url: S, api_key: &str) -> Result<Self, CrmError> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Token token={api_key}"))
            .map_err(|_| CrmError::InvalidApiKey)?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build a client from the CRM account domain, e.g. `acme` →
    /// `https://acme.freshsales.io/api`.
    pub fn for_domain(domain: &str, api_key: &str) -> Result<Self, CrmError> {
        Self::new(format!("https://{domain}.freshsales.io/api"), api_key)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Pass the response through on 2xx; otherwise capture status and body
    /// text as the failure message.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, CrmError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(CrmError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn create_contact(&self, new: &NewContact) -> Result<Contact, CrmError> {
        trace!(url = %self.url("contacts"), "crm create");
        let resp = self
            .http
            .post(self.url("contacts"))
            .json(&ContactEnvelope { contact: new })
            .send()
            .await?;
        let reply: ContactReply = Self::check(resp).await?.json().await?;
        Ok(reply.contact)
    }

    async fn get_contact(&self, id: i64) -> Result<Contact, CrmError> {
        let resp = self
            .http
            .get(self.url(&format!("contacts/{id}")))
            .send()
            .await?;
        let reply: ContactReply = Self::check(resp).await?.json().await?;
        Ok(reply.contact)
    }

    async fn update_contact(&self, id: i64, changes: &ContactUpdate) -> Result<Contact, CrmError> {
        let resp = self
            .http
            .put(self.url(&format!("contacts/{id}")))
            .json(&ContactEnvelope { contact: changes })
            .send()
            .await?;
        let reply: ContactReply = Self::check(resp).await?.json().await?;
        Ok(reply.contact)
    }

    async fn delete_contact(&self, id: i64) -> Result<(), CrmError> {
        let resp = self
            .http
            .delete(self.url(&format!("contacts/{id}")))
            .send()
            .await?;
        // Response body is ignored on success.
        Self::check(resp).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ContactBackend for CrmClient {
    async fn create(&self, new: &NewContact) -> Result<Contact, BackendError> {
        Ok(self.create_contact(new).await?)
    }

    async fn get(&self, id: i64) -> Result<Contact, BackendError> {
        Ok(self.get_contact(id).await?)
    }

    async fn update(
        &self,
        id: i64,
        changes: &ContactUpdate,
    ) -> Result<Option<Contact>, BackendError> {
        Ok(Some(self.update_contact(id, changes).await?))
    }

    async fn delete(&self, id: i64) -> Result<(), BackendError> {
        Ok(self.delete_contact(id).await?)
    }
}
