//! Workflow HTTP handlers.
//!
//! - GET /api/{subdomain}/workflows - List workflows (filtered, paged)
//! - POST /api/{subdomain}/workflows - Create workflow
//!
//! Workflows are stored and listed only; nothing here executes them.

use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{
    db::DbPool,
    error::AppError,
    handlers::extract::{ApiJson, ApiQuery},
    middleware::tenant::TenantContext,
    models::{
        pagination::{PageRequest, Pagination},
        workflow::{
            CreateWorkflowRequest, Workflow, WorkflowListQuery, WorkflowListResponse,
            WorkflowResponse,
        },
    },
};

/// List workflows of the tenant.
///
/// # Query Parameters
///
/// - `category` - optional category filter (e.g. `LEAD_NURTURING`)
/// - `isActive` - optional `true` / `false`
/// - `page` / `limit` - paging, defaults 1 / 10
///
/// # Ordering
///
/// Workflows are returned newest first.
pub async fn list_workflows(
    State(pool): State<DbPool>,
    Extension(tenant): Extension<TenantContext>,
    ApiQuery(query): ApiQuery<WorkflowListQuery>,
) -> Result<Json<WorkflowListResponse>, AppError> {
    let page = PageRequest::new(query.page, query.limit);
    let category = query.category.map(|c| c.as_str());

    let rows = sqlx::query_as::<_, Workflow>(
        r#"
        SELECT * FROM workflows
        WHERE agency_id = $1
          AND ($2::text IS NULL OR category = $2)
          AND ($3::bool IS NULL OR is_active = $3)
        ORDER BY created_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(tenant.agency_id)
    .bind(category)
    .bind(query.is_active)
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(&pool);

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM workflows
        WHERE agency_id = $1
          AND ($2::text IS NULL OR category = $2)
          AND ($3::bool IS NULL OR is_active = $3)
        "#,
    )
    .bind(tenant.agency_id)
    .bind(category)
    .bind(query.is_active)
    .fetch_one(&pool);

    let (rows, total) = tokio::try_join!(rows, total)?;

    Ok(Json(WorkflowListResponse {
        workflows: rows.into_iter().map(Into::into).collect(),
        pagination: Pagination::new(page, total),
    }))
}

/// Create a workflow in DRAFT status.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Welcome series",
///   "category": "LEAD_NURTURING",
///   "nodes": [],
///   "edges": []
/// }
/// ```
///
/// # Response
///
/// - **201 Created**: the created workflow
/// - **400**: blank name, or nodes/edges that are not arrays
pub async fn create_workflow(
    State(pool): State<DbPool>,
    Extension(tenant): Extension<TenantContext>,
    ApiJson(request): ApiJson<CreateWorkflowRequest>,
) -> Result<(StatusCode, Json<WorkflowResponse>), AppError> {
    request.validate().map_err(AppError::InvalidRequest)?;

    let workflow = sqlx::query_as::<_, Workflow>(
        r#"
        INSERT INTO workflows (agency_id, name, description, category, status, nodes, edges)
        VALUES ($1, $2, $3, $4, 'DRAFT', $5, $6)
        RETURNING *
        "#,
    )
    .bind(tenant.agency_id)
    .bind(request.name.trim())
    .bind(request.description)
    .bind(request.category.as_str())
    .bind(request.nodes)
    .bind(request.edges)
    .fetch_one(&pool)
    .await?;

    tracing::info!(workflow_id = %workflow.id, agency_id = %tenant.agency_id, "workflow created");

    Ok((StatusCode::CREATED, Json(workflow.into())))
}
