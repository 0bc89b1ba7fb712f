//! Tenant page routes.
//!
//! `acme.localhost/marketing` reaches these handlers as `/acme/marketing`
//! after the subdomain rewrite. They share tenant resolution with the API.

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    middleware::tenant::TenantContext,
    models::{
        campaign::{CampaignListQuery, CampaignResponse},
        pagination::PageRequest,
    },
    services::{
        analytics::{DashboardStats, LeadFunnel},
        campaign_service, lead_service,
    },
};

/// Campaigns shown on the marketing overview.
const RECENT_CAMPAIGN_LIMIT: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencySummary {
    pub id: Uuid,
    pub name: String,
    pub subdomain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingOverview {
    pub agency: AgencySummary,
    pub stats: DashboardStats,
    pub funnel: LeadFunnel,
    pub recent_campaigns: Vec<CampaignResponse>,
}

impl From<&TenantContext> for AgencySummary {
    fn from(tenant: &TenantContext) -> Self {
        Self {
            id: tenant.agency_id,
            name: tenant.name.clone(),
            subdomain: tenant.subdomain.clone(),
        }
    }
}

/// `GET /{subdomain}` - the resolved agency.
pub async fn show_agency(Extension(tenant): Extension<TenantContext>) -> Json<AgencySummary> {
    Json(AgencySummary::from(&tenant))
}

/// `GET /{subdomain}/marketing` - headline stats, lead funnel and the most
/// recent campaigns.
pub async fn marketing_overview(
    State(pool): State<DbPool>,
    Extension(tenant): Extension<TenantContext>,
) -> Result<Json<MarketingOverview>, AppError> {
    let agency_id = tenant.agency_id;
    let recent_page = PageRequest::new(Some(1), Some(RECENT_CAMPAIGN_LIMIT));
    let recent_query = CampaignListQuery::default();

    let (statuses, lead_rows, (recent, _)) = tokio::try_join!(
        campaign_service::campaign_statuses(&pool, agency_id),
        lead_service::lead_funnel_rows(&pool, agency_id),
        campaign_service::list_campaigns(&pool, agency_id, &recent_query, recent_page),
    )?;

    let funnel = LeadFunnel::from_leads(
        lead_rows
            .iter()
            .map(|(status, converted)| (status.as_str(), *converted)),
    );
    let stats = DashboardStats::compute(statuses.iter().map(String::as_str), &funnel);

    Ok(Json(MarketingOverview {
        agency: AgencySummary::from(&tenant),
        stats,
        funnel,
        recent_campaigns: recent.into_iter().map(CampaignResponse::from).collect(),
    }))
}
