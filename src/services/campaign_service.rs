//! Campaign service - tenant-scoped campaign persistence.
//!
//! Every statement binds the agency id. A campaign id that exists under
//! another agency behaves exactly like one that does not exist.

use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        campaign::{Campaign, CampaignListQuery, CreateCampaignRequest},
        pagination::PageRequest,
    },
};

/// Campaign columns plus the linked workflow's name.
const SELECT_CAMPAIGN: &str = r#"
    SELECT c.*, w.name AS workflow_name
    FROM campaigns c
    LEFT JOIN workflows w ON w.id = c.workflow_id
"#;

/// List campaigns for an agency, newest first.
///
/// # Returns
///
/// The requested page and the total number of matching campaigns.
pub async fn list_campaigns(
    pool: &DbPool,
    agency_id: Uuid,
    query: &CampaignListQuery,
    page: PageRequest,
) -> Result<(Vec<Campaign>, i64), AppError> {
    let status = query.status.map(|s| s.as_str());
    let campaign_type = query.campaign_type.map(|t| t.as_str());

    let sql = format!(
        r#"{SELECT_CAMPAIGN}
        WHERE c.agency_id = $1
          AND ($2::text IS NULL OR c.status = $2)
          AND ($3::text IS NULL OR c.campaign_type = $3)
        ORDER BY c.created_at DESC
        LIMIT $4 OFFSET $5"#
    );

    let rows = sqlx::query_as::<_, Campaign>(&sql)
        .bind(agency_id)
        .bind(status)
        .bind(campaign_type)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool);

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM campaigns c
        WHERE c.agency_id = $1
          AND ($2::text IS NULL OR c.status = $2)
          AND ($3::text IS NULL OR c.campaign_type = $3)
        "#,
    )
    .bind(agency_id)
    .bind(status)
    .bind(campaign_type)
    .fetch_one(pool);

    let (rows, total) = tokio::try_join!(rows, total)?;

    Ok((rows, total))
}

pub async fn get_campaign(
    pool: &DbPool,
    agency_id: Uuid,
    campaign_id: Uuid,
) -> Result<Campaign, AppError> {
    sqlx::query_as::<_, Campaign>(&format!(
        "{SELECT_CAMPAIGN} WHERE c.id = $1 AND c.agency_id = $2"
    ))
    .bind(campaign_id)
    .bind(agency_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::CampaignNotFound)
}

/// Create a campaign.
///
/// # Process
///
/// 1. Validate the request body
/// 2. Verify a linked workflow belongs to the same agency
/// 3. Insert and return the row joined with its workflow name
///
/// # Errors
///
/// - `InvalidRequest`: blank name or negative budget
/// - `WorkflowNotFound`: `workflow_id` is unknown to this agency
pub async fn create_campaign(
    pool: &DbPool,
    agency_id: Uuid,
    request: CreateCampaignRequest,
) -> Result<Campaign, AppError> {
    request.validate().map_err(AppError::InvalidRequest)?;

    if let Some(workflow_id) = request.workflow_id {
        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM workflows WHERE id = $1 AND agency_id = $2)",
        )
        .bind(workflow_id)
        .bind(agency_id)
        .fetch_one(pool)
        .await?;

        if !owned {
            return Err(AppError::WorkflowNotFound);
        }
    }

    let status = request.initial_status();

    let campaign = sqlx::query_as::<_, Campaign>(
        r#"
        WITH inserted AS (
            INSERT INTO campaigns (
                agency_id,
                workflow_id,
                name,
                description,
                campaign_type,
                status,
                budget_cents,
                target_audience,
                content,
                scheduled_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
        )
        SELECT c.*, w.name AS workflow_name
        FROM inserted c
        LEFT JOIN workflows w ON w.id = c.workflow_id
        "#,
    )
    .bind(agency_id)
    .bind(request.workflow_id)
    .bind(request.name.trim())
    .bind(request.description)
    .bind(request.campaign_type.as_str())
    .bind(status.as_str())
    .bind(request.budget_cents)
    .bind(request.target_audience)
    .bind(request.content)
    .bind(request.scheduled_at)
    .fetch_one(pool)
    .await?;

    tracing::info!(campaign_id = %campaign.id, %agency_id, "campaign created");

    Ok(campaign)
}

/// Delete a campaign owned by the agency.
///
/// Leads linked to the campaign keep existing with their link cleared.
pub async fn delete_campaign(
    pool: &DbPool,
    agency_id: Uuid,
    campaign_id: Uuid,
) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM campaigns WHERE id = $1 AND agency_id = $2")
        .bind(campaign_id)
        .bind(agency_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::CampaignNotFound);
    }

    tracing::info!(%campaign_id, %agency_id, "campaign deleted");

    Ok(())
}

/// Status of every campaign of the agency, for dashboard counters.
pub async fn campaign_statuses(pool: &DbPool, agency_id: Uuid) -> Result<Vec<String>, AppError> {
    let statuses = sqlx::query_scalar::<_, String>("SELECT status FROM campaigns WHERE agency_id = $1")
        .bind(agency_id)
        .fetch_all(pool)
        .await?;

    Ok(statuses)
}
