//! Campaign HTTP handlers.
//!
//! This module implements the campaign endpoints of the marketing API:
//! - GET /api/{subdomain}/marketing/campaigns - List campaigns (filtered, paged)
//! - POST /api/{subdomain}/marketing/campaigns - Create campaign
//! - GET /api/{subdomain}/marketing/campaigns/{id} - Get one campaign
//! - DELETE /api/{subdomain}/marketing/campaigns/{id} - Delete campaign

use axum::{Extension, Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    handlers::extract::{ApiJson, ApiPath, ApiQuery},
    middleware::tenant::TenantContext,
    models::{
        campaign::{CampaignListQuery, CampaignListResponse, CampaignResponse, CreateCampaignRequest},
        pagination::{PageRequest, Pagination},
    },
    services::campaign_service,
};

/// List campaigns of the tenant.
///
/// # Query Parameters
///
/// - `status` - optional campaign status filter (e.g. `ACTIVE`)
/// - `type` - optional campaign type filter (e.g. `EMAIL`)
/// - `page` / `limit` - paging, defaults 1 / 10, limit capped at 100
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "campaigns": [ { "id": "...", "name": "Spring intake", "metrics": { ... } } ],
///   "pagination": { "page": 1, "limit": 10, "total": 1, "pages": 1 }
/// }
/// ```
pub async fn list_campaigns(
    State(pool): State<DbPool>,
    Extension(tenant): Extension<TenantContext>,
    ApiQuery(query): ApiQuery<CampaignListQuery>,
) -> Result<Json<CampaignListResponse>, AppError> {
    let page = PageRequest::new(query.page, query.limit);

    let (campaigns, total) =
        campaign_service::list_campaigns(&pool, tenant.agency_id, &query, page).await?;

    Ok(Json(CampaignListResponse {
        campaigns: campaigns.into_iter().map(CampaignResponse::from).collect(),
        pagination: Pagination::new(page, total),
    }))
}

/// Create a campaign for the tenant.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Spring intake",
///   "type": "EMAIL",
///   "budgetCents": 50000,
///   "workflowId": "550e8400-e29b-41d4-a716-446655440000"
/// }
/// ```
///
/// # Response
///
/// - **201 Created**: the created campaign
/// - **400**: blank name or negative budget
/// - **404**: workflow does not belong to this agency
pub async fn create_campaign(
    State(pool): State<DbPool>,
    Extension(tenant): Extension<TenantContext>,
    ApiJson(request): ApiJson<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<CampaignResponse>), AppError> {
    let campaign = campaign_service::create_campaign(&pool, tenant.agency_id, request).await?;

    Ok((StatusCode::CREATED, Json(campaign.into())))
}

/// Get one campaign. Campaigns of other agencies are reported as not found.
pub async fn get_campaign(
    State(pool): State<DbPool>,
    Extension(tenant): Extension<TenantContext>,
    ApiPath((_, campaign_id)): ApiPath<(String, Uuid)>,
) -> Result<Json<CampaignResponse>, AppError> {
    let campaign = campaign_service::get_campaign(&pool, tenant.agency_id, campaign_id).await?;

    Ok(Json(campaign.into()))
}

/// Delete a campaign.
///
/// # Response
///
/// - **204 No Content**: deleted
/// - **404**: no such campaign under this agency
pub async fn delete_campaign(
    State(pool): State<DbPool>,
    Extension(tenant): Extension<TenantContext>,
    ApiPath((_, campaign_id)): ApiPath<(String, Uuid)>,
) -> Result<StatusCode, AppError> {
    campaign_service::delete_campaign(&pool, tenant.agency_id, campaign_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
