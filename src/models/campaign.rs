//! Campaign data models and API request/response types.
//!
//! This module defines:
//! - `Campaign`: Database entity joined with its linked workflow name
//! - `CampaignMetrics`: Funnel rates derived from the stored counters
//! - Request, query and response types for the campaign endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::pagination::Pagination;

/// Marketing channel of a campaign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignType {
    #[default]
    Email,
    Sms,
    SocialMedia,
    GoogleAds,
    FacebookAds,
    Content,
    Webinar,
    Event,
}

impl CampaignType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignType::Email => "EMAIL",
            CampaignType::Sms => "SMS",
            CampaignType::SocialMedia => "SOCIAL_MEDIA",
            CampaignType::GoogleAds => "GOOGLE_ADS",
            CampaignType::FacebookAds => "FACEBOOK_ADS",
            CampaignType::Content => "CONTENT",
            CampaignType::Webinar => "WEBINAR",
            CampaignType::Event => "EVENT",
        }
    }
}

/// Lifecycle status of a campaign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Scheduled,
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "DRAFT",
            CampaignStatus::Scheduled => "SCHEDULED",
            CampaignStatus::Active => "ACTIVE",
            CampaignStatus::Paused => "PAUSED",
            CampaignStatus::Completed => "COMPLETED",
            CampaignStatus::Cancelled => "CANCELLED",
        }
    }
}

/// Represents a campaign record from the database.
///
/// Rows are always selected with a `LEFT JOIN` on `workflows`, which fills
/// `workflow_name` when a workflow is linked.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Campaign {
    pub id: Uuid,

    /// Owning agency. Every campaign query filters on this column.
    pub agency_id: Uuid,

    pub workflow_id: Option<Uuid>,
    pub workflow_name: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub campaign_type: String,
    pub status: String,

    // Funnel counters
    pub sent_count: i64,
    pub delivered_count: i64,
    pub opened_count: i64,
    pub clicked_count: i64,
    pub conversion_count: i64,

    /// Budget in cents, if one was set
    pub budget_cents: Option<i64>,
    pub spent_cents: i64,

    pub target_audience: Option<serde_json::Value>,
    pub content: Option<serde_json::Value>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Funnel rates for a campaign, in percent.
///
/// Each rate divides by the previous funnel stage and is 0 when that stage
/// is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignMetrics {
    /// opened / delivered
    pub open_rate: f64,
    /// clicked / opened
    pub click_rate: f64,
    /// converted / clicked
    pub conversion_rate: f64,
}

impl CampaignMetrics {
    pub fn from_counts(delivered: i64, opened: i64, clicked: i64, converted: i64) -> Self {
        Self {
            open_rate: percentage(opened, delivered),
            click_rate: percentage(clicked, opened),
            conversion_rate: percentage(converted, clicked),
        }
    }
}

fn percentage(part: i64, whole: i64) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64 * 100.0
    } else {
        0.0
    }
}

impl Campaign {
    pub fn metrics(&self) -> CampaignMetrics {
        CampaignMetrics::from_counts(
            self.delivered_count,
            self.opened_count,
            self.clicked_count,
            self.conversion_count,
        )
    }
}

/// Minimal reference to a linked workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkflowRef {
    pub id: Uuid,
    pub name: String,
}

/// Campaign as returned by the API.
///
/// The internal `agency_id` is never exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub campaign_type: String,
    pub status: String,
    pub sent_count: i64,
    pub delivered_count: i64,
    pub opened_count: i64,
    pub clicked_count: i64,
    pub conversion_count: i64,
    pub budget_cents: Option<i64>,
    pub spent_cents: i64,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub workflow: Option<WorkflowRef>,
    pub target_audience: Option<serde_json::Value>,
    pub content: Option<serde_json::Value>,
    pub metrics: CampaignMetrics,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Campaign> for CampaignResponse {
    fn from(campaign: Campaign) -> Self {
        let metrics = campaign.metrics();
        let workflow = match (campaign.workflow_id, campaign.workflow_name) {
            (Some(id), Some(name)) => Some(WorkflowRef { id, name }),
            _ => None,
        };

        Self {
            id: campaign.id,
            name: campaign.name,
            description: campaign.description,
            campaign_type: campaign.campaign_type,
            status: campaign.status,
            sent_count: campaign.sent_count,
            delivered_count: campaign.delivered_count,
            opened_count: campaign.opened_count,
            clicked_count: campaign.clicked_count,
            conversion_count: campaign.conversion_count,
            budget_cents: campaign.budget_cents,
            spent_cents: campaign.spent_cents,
            scheduled_at: campaign.scheduled_at,
            started_at: campaign.started_at,
            completed_at: campaign.completed_at,
            workflow,
            target_audience: campaign.target_audience,
            content: campaign.content,
            metrics,
            created_at: campaign.created_at,
            updated_at: campaign.updated_at,
        }
    }
}

/// Request body for creating a campaign.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "Autumn intake",
///   "type": "EMAIL",
///   "budgetCents": 150000,
///   "workflowId": "550e8400-e29b-41d4-a716-446655440000",
///   "scheduledAt": "2025-09-01T09:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub campaign_type: CampaignType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl CreateCampaignRequest {
    /// Check the rules that do not need the database.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Campaign name is required".to_string());
        }
        if self.budget_cents.is_some_and(|budget| budget < 0) {
            return Err("Budget must not be negative".to_string());
        }
        Ok(())
    }

    /// Status a newly created campaign starts in.
    pub fn initial_status(&self) -> CampaignStatus {
        if self.scheduled_at.is_some() {
            CampaignStatus::Scheduled
        } else {
            CampaignStatus::Draft
        }
    }
}

/// Query parameters of `GET /api/{subdomain}/marketing/campaigns`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CampaignStatus>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub campaign_type: Option<CampaignType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignListResponse {
    pub campaigns: Vec<CampaignResponse>,
    pub pagination: Pagination,
}
