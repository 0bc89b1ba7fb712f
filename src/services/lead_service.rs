//! Lead service - tenant-scoped lead persistence.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        lead::{CreateLeadRequest, Lead, LeadListQuery, LeadStatus, non_blank},
        pagination::PageRequest,
    },
};

const SELECT_LEAD: &str = r#"
    SELECT l.*, c.name AS campaign_name
    FROM leads l
    LEFT JOIN campaigns c ON c.id = l.campaign_id
"#;

/// List leads for an agency, newest first, with the total match count.
pub async fn list_leads(
    pool: &DbPool,
    agency_id: Uuid,
    query: &LeadListQuery,
    page: PageRequest,
) -> Result<(Vec<Lead>, i64), AppError> {
    let status = query.status.map(|s| s.as_str());

    let sql = format!(
        r#"{SELECT_LEAD}
        WHERE l.agency_id = $1
          AND ($2::text IS NULL OR l.status = $2)
          AND ($3::uuid IS NULL OR l.campaign_id = $3)
        ORDER BY l.created_at DESC
        LIMIT $4 OFFSET $5"#
    );

    let rows = sqlx::query_as::<_, Lead>(&sql)
        .bind(agency_id)
        .bind(status)
        .bind(query.campaign_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool);

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM leads l
        WHERE l.agency_id = $1
          AND ($2::text IS NULL OR l.status = $2)
          AND ($3::uuid IS NULL OR l.campaign_id = $3)
        "#,
    )
    .bind(agency_id)
    .bind(status)
    .bind(query.campaign_id)
    .fetch_one(pool);

    let (rows, total) = tokio::try_join!(rows, total)?;

    Ok((rows, total))
}

pub async fn get_lead(pool: &DbPool, agency_id: Uuid, lead_id: Uuid) -> Result<Lead, AppError> {
    sqlx::query_as::<_, Lead>(&format!(
        "{SELECT_LEAD} WHERE l.id = $1 AND l.agency_id = $2"
    ))
    .bind(lead_id)
    .bind(agency_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::LeadNotFound)
}

/// Create a lead.
///
/// # Validation
///
/// - At least one of email or phone must be present
/// - A linked campaign must belong to the same agency
///
/// A lead created with status CONVERTED is marked converted immediately.
pub async fn create_lead(
    pool: &DbPool,
    agency_id: Uuid,
    request: CreateLeadRequest,
) -> Result<Lead, AppError> {
    request.validate().map_err(AppError::InvalidRequest)?;

    if let Some(campaign_id) = request.campaign_id {
        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM campaigns WHERE id = $1 AND agency_id = $2)",
        )
        .bind(campaign_id)
        .bind(agency_id)
        .fetch_one(pool)
        .await?;

        if !owned {
            return Err(AppError::CampaignNotFound);
        }
    }

    let converted = request.status == LeadStatus::Converted;
    let converted_at = converted.then(Utc::now);

    let lead = sqlx::query_as::<_, Lead>(
        r#"
        WITH inserted AS (
            INSERT INTO leads (
                agency_id,
                campaign_id,
                first_name,
                last_name,
                email,
                phone,
                source,
                status,
                converted,
                converted_at,
                assigned_to,
                custom_fields
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
        )
        SELECT l.*, c.name AS campaign_name
        FROM inserted l
        LEFT JOIN campaigns c ON c.id = l.campaign_id
        "#,
    )
    .bind(agency_id)
    .bind(request.campaign_id)
    .bind(non_blank(&request.first_name))
    .bind(non_blank(&request.last_name))
    .bind(non_blank(&request.email))
    .bind(non_blank(&request.phone))
    .bind(request.source_or_default())
    .bind(request.status.as_str())
    .bind(converted)
    .bind(converted_at)
    .bind(non_blank(&request.assigned_to))
    .bind(request.custom_fields)
    .fetch_one(pool)
    .await?;

    tracing::info!(lead_id = %lead.id, %agency_id, "lead created");

    Ok(lead)
}

pub async fn delete_lead(pool: &DbPool, agency_id: Uuid, lead_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM leads WHERE id = $1 AND agency_id = $2")
        .bind(lead_id)
        .bind(agency_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::LeadNotFound);
    }

    tracing::info!(%lead_id, %agency_id, "lead deleted");

    Ok(())
}

/// `(status, converted)` of every lead of the agency, for the funnel.
pub async fn lead_funnel_rows(
    pool: &DbPool,
    agency_id: Uuid,
) -> Result<Vec<(String, bool)>, AppError> {
    let rows = sqlx::query_as::<_, (String, bool)>(
        "SELECT status, converted FROM leads WHERE agency_id = $1",
    )
    .bind(agency_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
