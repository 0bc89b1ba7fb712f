//! Lead HTTP handlers.
//!
//! - GET /api/{subdomain}/marketing/leads - List leads (filtered, paged)
//! - POST /api/{subdomain}/marketing/leads - Create lead
//! - GET /api/{subdomain}/marketing/leads/{id} - Get one lead
//! - DELETE /api/{subdomain}/marketing/leads/{id} - Delete lead

use axum::{Extension, Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    handlers::extract::{ApiJson, ApiPath, ApiQuery},
    middleware::tenant::TenantContext,
    models::{
        lead::{CreateLeadRequest, LeadListQuery, LeadListResponse, LeadResponse},
        pagination::{PageRequest, Pagination},
    },
    services::lead_service,
};

/// List leads of the tenant, optionally filtered by `status` and `campaignId`.
pub async fn list_leads(
    State(pool): State<DbPool>,
    Extension(tenant): Extension<TenantContext>,
    ApiQuery(query): ApiQuery<LeadListQuery>,
) -> Result<Json<LeadListResponse>, AppError> {
    let page = PageRequest::new(query.page, query.limit);

    let (leads, total) = lead_service::list_leads(&pool, tenant.agency_id, &query, page).await?;

    Ok(Json(LeadListResponse {
        leads: leads.into_iter().map(LeadResponse::from).collect(),
        pagination: Pagination::new(page, total),
    }))
}

/// Create a lead.
///
/// # Request Body
///
/// ```json
/// {
///   "firstName": "Ana",
///   "email": "ana@example.com",
///   "status": "NEW",
///   "campaignId": "550e8400-e29b-41d4-a716-446655440000"
/// }
/// ```
///
/// # Response
///
/// - **201 Created**: the created lead
/// - **400**: neither email nor phone, or malformed email
/// - **404**: campaign does not belong to this agency
pub async fn create_lead(
    State(pool): State<DbPool>,
    Extension(tenant): Extension<TenantContext>,
    ApiJson(request): ApiJson<CreateLeadRequest>,
) -> Result<(StatusCode, Json<LeadResponse>), AppError> {
    let lead = lead_service::create_lead(&pool, tenant.agency_id, request).await?;

    Ok((StatusCode::CREATED, Json(lead.into())))
}

pub async fn get_lead(
    State(pool): State<DbPool>,
    Extension(tenant): Extension<TenantContext>,
    ApiPath((_, lead_id)): ApiPath<(String, Uuid)>,
) -> Result<Json<LeadResponse>, AppError> {
    let lead = lead_service::get_lead(&pool, tenant.agency_id, lead_id).await?;

    Ok(Json(lead.into()))
}

pub async fn delete_lead(
    State(pool): State<DbPool>,
    Extension(tenant): Extension<TenantContext>,
    ApiPath((_, lead_id)): ApiPath<(String, Uuid)>,
) -> Result<StatusCode, AppError> {
    lead_service::delete_lead(&pool, tenant.agency_id, lead_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
