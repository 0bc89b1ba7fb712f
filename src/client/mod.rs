//! HTTP client for one tenant's marketing and portal API.
//!
//! [`MarketingClient`] is a thin typed wrapper over the JSON endpoints.
//! [`MarketingDashboard`] keeps the CRM page state on top of it.

pub mod dashboard;

pub use dashboard::MarketingDashboard;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use crate::models::{
    campaign::{CampaignListQuery, CampaignListResponse, CampaignResponse, CreateCampaignRequest},
    lead::{CreateLeadRequest, LeadListQuery, LeadListResponse, LeadResponse},
    portal::PortalResponse,
    workflow::{WorkflowListQuery, WorkflowListResponse},
};

/// Errors returned by the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// The server answered with a non-success status.
    ///
    /// `message` is the server's error message when the body carried one.
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Typed client for `/api/{subdomain}/...`.
#[derive(Debug, Clone)]
pub struct MarketingClient {
    http: reqwest::Client,
    base_url: Url,
    subdomain: String,
}

impl MarketingClient {
    /// Create a client for `subdomain` on the server at `base_url`.
    ///
    /// ```
    /// use agency_portal_server::client::MarketingClient;
    ///
    /// let client = MarketingClient::new("http://localhost:3000", "acme").unwrap();
    /// assert_eq!(client.subdomain(), "acme");
    /// ```
    pub fn new(base_url: &str, subdomain: impl Into<String>) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join replaces the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            subdomain: subdomain.into(),
        })
    }

    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self
            .base_url
            .join(&format!("api/{}/{}", self.subdomain, path))?)
    }

    pub async fn list_campaigns(
        &self,
        query: &CampaignListQuery,
    ) -> Result<CampaignListResponse, ClientError> {
        let response = self
            .http
            .get(self.endpoint("marketing/campaigns")?)
            .query(query)
            .send()
            .await?;

        read_json(response).await
    }

    pub async fn list_leads(&self, query: &LeadListQuery) -> Result<LeadListResponse, ClientError> {
        let response = self
            .http
            .get(self.endpoint("marketing/leads")?)
            .query(query)
            .send()
            .await?;

        read_json(response).await
    }

    pub async fn list_workflows(
        &self,
        query: &WorkflowListQuery,
    ) -> Result<WorkflowListResponse, ClientError> {
        let response = self
            .http
            .get(self.endpoint("workflows")?)
            .query(query)
            .send()
            .await?;

        read_json(response).await
    }

    /// Create a campaign. Invalid input is rejected without a request.
    pub async fn create_campaign(
        &self,
        request: &CreateCampaignRequest,
    ) -> Result<CampaignResponse, ClientError> {
        request.validate().map_err(ClientError::Validation)?;

        let response = self
            .http
            .post(self.endpoint("marketing/campaigns")?)
            .json(request)
            .send()
            .await?;

        read_json(response).await
    }

    /// Create a lead. Invalid input is rejected without a request.
    pub async fn create_lead(&self, request: &CreateLeadRequest) -> Result<LeadResponse, ClientError> {
        request.validate().map_err(ClientError::Validation)?;

        let response = self
            .http
            .post(self.endpoint("marketing/leads")?)
            .json(request)
            .send()
            .await?;

        read_json(response).await
    }

    pub async fn delete_campaign(&self, campaign_id: Uuid) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.endpoint(&format!("marketing/campaigns/{campaign_id}"))?)
            .send()
            .await?;

        check_status(response).await.map(|_| ())
    }

    pub async fn delete_lead(&self, lead_id: Uuid) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.endpoint(&format!("marketing/leads/{lead_id}"))?)
            .send()
            .await?;

        check_status(response).await.map(|_| ())
    }

    pub async fn student_portal(&self, student_id: Uuid) -> Result<PortalResponse, ClientError> {
        let response = self
            .http
            .get(self.endpoint("student/portal")?)
            .query(&[("studentId", student_id.to_string())])
            .send()
            .await?;

        read_json(response).await
    }
}

/// Pass successful responses through, turn the rest into `ClientError::Api`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| {
            value["error"]["message"]
                .as_str()
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("Request failed with status {status}"));

    tracing::debug!(%status, %message, "api request failed");

    Err(ClientError::Api { status, message })
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let response = check_status(response).await?;
    Ok(response.json::<T>().await?)
}
