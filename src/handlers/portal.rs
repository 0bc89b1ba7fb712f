//! Student portal handler.

use axum::{Extension, Json, extract::State};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    handlers::extract::ApiQuery,
    middleware::tenant::TenantContext,
    models::portal::{PortalQuery, PortalResponse},
    services::portal_service,
};

/// Everything the student portal page shows for one student.
///
/// # Endpoint
///
/// `GET /api/{subdomain}/student/portal?studentId={uuid}`
///
/// # Response
///
/// - **200 OK**: student, stats, progress, activity, checklist, appointments,
///   tasks and notifications
/// - **400**: `studentId` missing (`student_id_required`) or not a UUID
///   (`invalid_request`)
/// - **404**: student not found under this agency
pub async fn student_portal(
    State(pool): State<DbPool>,
    Extension(tenant): Extension<TenantContext>,
    ApiQuery(query): ApiQuery<PortalQuery>,
) -> Result<Json<PortalResponse>, AppError> {
    let student_id = parse_student_id(query.student_id.as_deref())?;

    let portal = portal_service::load_portal(&pool, tenant.agency_id, student_id).await?;

    Ok(Json(portal))
}

fn parse_student_id(raw: Option<&str>) -> Result<Uuid, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(AppError::StudentIdRequired)?;

    Uuid::parse_str(raw).map_err(|_| AppError::InvalidRequest("Student ID is not a valid UUID".into()))
}
