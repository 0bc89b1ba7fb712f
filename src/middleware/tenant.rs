//! Tenant resolution middleware.
//!
//! This middleware runs on every tenant-scoped route to:
//! 1. Read the `{subdomain}` path parameter
//! 2. Look up the agency registered under it
//! 3. Inject a [`TenantContext`] into the request
//! 4. Reject unknown tenants with HTTP 404

use std::collections::HashMap;

use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{db::DbPool, error::AppError, models::agency::Agency};

/// Tenant attached to a request after resolution.
///
/// Handlers extract it with `Extension<TenantContext>` and bind `agency_id`
/// into every query they run.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub agency_id: Uuid,
    pub subdomain: String,
    pub name: String,
}

impl From<Agency> for TenantContext {
    fn from(agency: Agency) -> Self {
        Self {
            agency_id: agency.id,
            subdomain: agency.subdomain,
            name: agency.name,
        }
    }
}

/// Resolve the agency named by the `{subdomain}` path parameter.
///
/// # Returns
///
/// - `Err(AppError::SubdomainRequired)` if the parameter is blank
/// - `Err(AppError::AgencyNotFound)` if no agency uses the subdomain
/// - the downstream response otherwise
pub async fn tenant_middleware(
    State(pool): State<DbPool>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let subdomain = params
        .get("subdomain")
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .ok_or(AppError::SubdomainRequired)?;

    let agency = sqlx::query_as::<_, Agency>(
        "SELECT id, name, subdomain, created_at FROM agencies WHERE subdomain = $1",
    )
    .bind(&subdomain)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| {
        tracing::warn!(%subdomain, "request for unknown agency");
        AppError::AgencyNotFound
    })?;

    request.extensions_mut().insert(TenantContext::from(agency));

    Ok(next.run(request).await)
}
