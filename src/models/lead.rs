//! Lead data models and API request/response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::pagination::Pagination;

/// Pipeline status of a lead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Nurturing,
    Converted,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "NEW",
            LeadStatus::Contacted => "CONTACTED",
            LeadStatus::Qualified => "QUALIFIED",
            LeadStatus::Nurturing => "NURTURING",
            LeadStatus::Converted => "CONVERTED",
            LeadStatus::Lost => "LOST",
        }
    }
}

/// Represents a lead record from the database, joined with its campaign name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Lead {
    pub id: Uuid,
    pub agency_id: Uuid,
    pub campaign_id: Option<Uuid>,
    pub campaign_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: String,
    pub status: String,
    pub converted: bool,
    pub converted_at: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
    pub custom_fields: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CampaignRef {
    pub id: Uuid,
    pub name: String,
}

/// Lead as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadResponse {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: String,
    pub status: String,
    pub converted: bool,
    pub converted_at: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
    pub custom_fields: Option<serde_json::Value>,
    pub campaign: Option<CampaignRef>,
    pub created_at: DateTime<Utc>,
}

impl From<Lead> for LeadResponse {
    fn from(lead: Lead) -> Self {
        let campaign = match (lead.campaign_id, lead.campaign_name) {
            (Some(id), Some(name)) => Some(CampaignRef { id, name }),
            _ => None,
        };

        Self {
            id: lead.id,
            first_name: lead.first_name,
            last_name: lead.last_name,
            email: lead.email,
            phone: lead.phone,
            source: lead.source,
            status: lead.status,
            converted: lead.converted,
            converted_at: lead.converted_at,
            assigned_to: lead.assigned_to,
            custom_fields: lead.custom_fields,
            campaign,
            created_at: lead.created_at,
        }
    }
}

/// Request body for creating a lead.
///
/// Blank strings are treated as absent, so a form that submits `"email": ""`
/// behaves as if the field was omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<Uuid>,
}

/// Trim a submitted value, dropping it when nothing is left.
pub fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl CreateLeadRequest {
    pub fn validate(&self) -> Result<(), String> {
        let email = non_blank(&self.email);
        if email.is_none() && non_blank(&self.phone).is_none() {
            return Err("Email or phone is required".to_string());
        }
        if email.is_some_and(|email| !email.contains('@')) {
            return Err("Email address is invalid".to_string());
        }
        Ok(())
    }

    /// Source recorded for the lead, `Manual` unless one was given.
    pub fn source_or_default(&self) -> String {
        non_blank(&self.source).unwrap_or_else(|| "Manual".to_string())
    }
}

/// Query parameters of `GET /api/{subdomain}/marketing/leads`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadListResponse {
    pub leads: Vec<LeadResponse>,
    pub pagination: Pagination,
}
