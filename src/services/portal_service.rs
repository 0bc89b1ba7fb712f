//! Student portal service - aggregates one student's records.
//!
//! # Process
//!
//! 1. Load the student scoped to the agency (404 when absent)
//! 2. Load applications, documents, appointments, tasks, notifications and
//!    the three activity streams concurrently
//! 3. Derive stats, per-application progress, the merged activity feed and
//!    the document checklist from the loaded rows
//!
//! The derivation steps are plain functions over rows so they can be tested
//! without a database.

use std::cmp::Reverse;

use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        portal::{
            ActivityItem, ActivityKind, ApplicationProgress, ChecklistDocument, ChecklistStatus,
            DocumentChecklistItem, PortalResponse, PortalStats,
        },
        student::{
            ApplicationActivity, ApplicationWithProgress, Appointment, AppointmentActivity,
            Document, DocumentActivity, Notification, Student, Task,
        },
    },
};

/// Documents shown in the portal summary.
const RECENT_DOCUMENT_LIMIT: usize = 10;

/// Entries kept in the merged activity feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

/// Entries loaded from each activity stream before merging.
const ACTIVITY_STREAM_LIMIT: i64 = 5;

const ACTIVE_APPLICATION_STATUSES: [&str; 3] = ["PENDING", "UNDER_REVIEW", "IN_PROGRESS"];
const COMPLETED_APPLICATION_STATUSES: [&str; 2] = ["COMPLETED", "ACCEPTED"];
const PENDING_TASK_STATUSES: [&str; 2] = ["PENDING", "IN_PROGRESS"];

/// Document categories every student is checked against: `(type, label, required)`.
pub const REQUIRED_DOCUMENT_TYPES: [(&str, &str, bool); 5] = [
    ("IDENTITY", "Identity Document", true),
    ("ACADEMIC", "Academic Transcripts", true),
    ("FINANCIAL", "Financial Documents", true),
    ("VISA", "Visa Documents", false),
    ("MEDICAL", "Medical Documents", false),
];

/// Build the full portal view for one student of one agency.
///
/// # Errors
///
/// - `StudentNotFound`: no such student under this agency
/// - `Database`: any query failed
pub async fn load_portal(
    pool: &DbPool,
    agency_id: Uuid,
    student_id: Uuid,
) -> Result<PortalResponse, AppError> {
    let student = sqlx::query_as::<_, Student>(
        r#"
        SELECT id, agency_id, first_name, last_name, email, phone, avatar, status,
               current_education, nationality, date_of_birth
        FROM students
        WHERE id = $1 AND agency_id = $2
        "#,
    )
    .bind(student_id)
    .bind(agency_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::StudentNotFound)?;

    let (applications, documents, appointments, tasks, notifications, recent_activity) = tokio::try_join!(
        load_applications(pool, agency_id, student_id),
        load_documents(pool, agency_id, student_id),
        load_upcoming_appointments(pool, agency_id, student_id),
        load_pending_tasks(pool, agency_id, student_id),
        load_unread_notifications(pool, agency_id, student_id),
        load_recent_activity(pool, agency_id, student_id),
    )?;

    let required_documents = build_document_checklist(&documents);

    let recent_documents = &documents[..documents.len().min(RECENT_DOCUMENT_LIMIT)];
    let stats = compute_stats(
        &applications,
        recent_documents,
        &tasks,
        appointments.len(),
        notifications.len(),
    );

    tracing::debug!(%student_id, %agency_id, "student portal assembled");

    Ok(PortalResponse {
        student,
        stats,
        application_progress: application_progress(&applications),
        recent_activity,
        required_documents,
        upcoming_appointments: appointments,
        pending_tasks: tasks,
        unread_notifications: notifications,
    })
}

async fn load_applications(
    pool: &DbPool,
    agency_id: Uuid,
    student_id: Uuid,
) -> Result<Vec<ApplicationWithProgress>, sqlx::Error> {
    // The first pipeline entry (oldest) drives the progress view
    sqlx::query_as::<_, ApplicationWithProgress>(
        r#"
        SELECT a.id, a.status, u.name AS university_name,
               pe.current_stage, pe.progress,
               a.created_at, a.updated_at
        FROM applications a
        JOIN universities u ON u.id = a.university_id
        LEFT JOIN LATERAL (
            SELECT current_stage, progress
            FROM pipeline_entries
            WHERE application_id = a.id
            ORDER BY created_at ASC
            LIMIT 1
        ) pe ON TRUE
        WHERE a.student_id = $1 AND a.agency_id = $2
        ORDER BY a.created_at DESC
        "#,
    )
    .bind(student_id)
    .bind(agency_id)
    .fetch_all(pool)
    .await
}

/// All of the student's documents, newest first.
async fn load_documents(
    pool: &DbPool,
    agency_id: Uuid,
    student_id: Uuid,
) -> Result<Vec<Document>, sqlx::Error> {
    sqlx::query_as::<_, Document>(
        r#"
        SELECT id, student_id, application_id, name, file_name, document_type, is_verified, created_at
        FROM documents
        WHERE student_id = $1 AND agency_id = $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(student_id)
    .bind(agency_id)
    .fetch_all(pool)
    .await
}

async fn load_upcoming_appointments(
    pool: &DbPool,
    agency_id: Uuid,
    student_id: Uuid,
) -> Result<Vec<Appointment>, sqlx::Error> {
    sqlx::query_as::<_, Appointment>(
        r#"
        SELECT id, student_id, title, status, start_time, end_time, created_at, updated_at
        FROM appointments
        WHERE student_id = $1 AND agency_id = $2
          AND start_time >= NOW()
          AND status IN ('SCHEDULED', 'CONFIRMED')
        ORDER BY start_time ASC
        LIMIT 5
        "#,
    )
    .bind(student_id)
    .bind(agency_id)
    .fetch_all(pool)
    .await
}

async fn load_pending_tasks(
    pool: &DbPool,
    agency_id: Uuid,
    student_id: Uuid,
) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        r#"
        SELECT id, student_id, title, description, status, priority, due_date, created_at
        FROM tasks
        WHERE student_id = $1 AND agency_id = $2
          AND status IN ('PENDING', 'IN_PROGRESS')
        ORDER BY due_date ASC
        LIMIT 10
        "#,
    )
    .bind(student_id)
    .bind(agency_id)
    .fetch_all(pool)
    .await
}

async fn load_unread_notifications(
    pool: &DbPool,
    agency_id: Uuid,
    student_id: Uuid,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, student_id, title, message, notification_type, status, created_at
        FROM notifications
        WHERE student_id = $1 AND agency_id = $2
          AND status = 'PENDING'
        ORDER BY created_at DESC
        LIMIT 10
        "#,
    )
    .bind(student_id)
    .bind(agency_id)
    .fetch_all(pool)
    .await
}

/// Fetch the three activity streams concurrently and merge them.
async fn load_recent_activity(
    pool: &DbPool,
    agency_id: Uuid,
    student_id: Uuid,
) -> Result<Vec<ActivityItem>, sqlx::Error> {
    let applications = sqlx::query_as::<_, ApplicationActivity>(
        r#"
        SELECT a.id, a.status, u.name AS university_name, a.updated_at
        FROM applications a
        JOIN universities u ON u.id = a.university_id
        WHERE a.student_id = $1 AND a.agency_id = $2
        ORDER BY a.updated_at DESC
        LIMIT $3
        "#,
    )
    .bind(student_id)
    .bind(agency_id)
    .bind(ACTIVITY_STREAM_LIMIT)
    .fetch_all(pool);

    let documents = sqlx::query_as::<_, DocumentActivity>(
        r#"
        SELECT da.action, d.name AS document_name, d.document_type, da.created_at
        FROM document_activities da
        JOIN documents d ON d.id = da.document_id
        WHERE d.student_id = $1 AND d.agency_id = $2
        ORDER BY da.created_at DESC
        LIMIT $3
        "#,
    )
    .bind(student_id)
    .bind(agency_id)
    .bind(ACTIVITY_STREAM_LIMIT)
    .fetch_all(pool);

    let appointments = sqlx::query_as::<_, AppointmentActivity>(
        r#"
        SELECT title, status, start_time, end_time
        FROM appointments
        WHERE student_id = $1 AND agency_id = $2
        ORDER BY updated_at DESC
        LIMIT $3
        "#,
    )
    .bind(student_id)
    .bind(agency_id)
    .bind(ACTIVITY_STREAM_LIMIT)
    .fetch_all(pool);

    let (applications, documents, appointments) =
        tokio::try_join!(applications, documents, appointments)?;

    Ok(merge_recent_activity(applications, documents, appointments))
}

/// Summary counters over the already-loaded collections.
pub fn compute_stats(
    applications: &[ApplicationWithProgress],
    documents: &[Document],
    tasks: &[Task],
    upcoming_appointments: usize,
    unread_notifications: usize,
) -> PortalStats {
    let count_apps = |statuses: &[&str]| {
        applications
            .iter()
            .filter(|app| statuses.contains(&app.status.as_str()))
            .count()
    };

    PortalStats {
        total_applications: applications.len(),
        active_applications: count_apps(&ACTIVE_APPLICATION_STATUSES),
        completed_applications: count_apps(&COMPLETED_APPLICATION_STATUSES),
        total_documents: documents.len(),
        verified_documents: documents.iter().filter(|doc| doc.is_verified).count(),
        pending_tasks: tasks
            .iter()
            .filter(|task| PENDING_TASK_STATUSES.contains(&task.status.as_str()))
            .count(),
        upcoming_appointments,
        unread_notifications,
    }
}

/// Per-application progress derived from the first pipeline entry.
pub fn application_progress(applications: &[ApplicationWithProgress]) -> Vec<ApplicationProgress> {
    applications
        .iter()
        .map(|app| ApplicationProgress {
            id: app.id,
            university_name: app.university_name.clone(),
            status: app.status.clone(),
            progress: (app.progress.unwrap_or(0.0) * 100.0).round() as i64,
            current_stage: app
                .current_stage
                .clone()
                .unwrap_or_else(|| "Not Started".to_string()),
            last_updated: app.updated_at,
        })
        .collect()
}

/// Merge the three activity streams into one feed.
///
/// The result is ordered by timestamp, newest first, and holds at most
/// [`RECENT_ACTIVITY_LIMIT`] entries. Entries with equal timestamps keep
/// application, document, appointment order.
pub fn merge_recent_activity(
    applications: Vec<ApplicationActivity>,
    documents: Vec<DocumentActivity>,
    appointments: Vec<AppointmentActivity>,
) -> Vec<ActivityItem> {
    let applications = applications.into_iter().map(|app| ActivityItem {
        id: format!("app_{}", app.id),
        kind: ActivityKind::Application,
        action: "STATUS_UPDATE".to_string(),
        title: format!("Application to {}", app.university_name),
        description: format!("Status updated to {}", app.status),
        timestamp: app.updated_at,
        icon: "university".to_string(),
    });

    let documents = documents.into_iter().map(|doc| ActivityItem {
        id: format!("doc_{}", doc.created_at.timestamp_millis()),
        kind: ActivityKind::Document,
        title: format!("{}: {}", doc.action.to_lowercase(), doc.document_name),
        action: doc.action,
        description: format!("{} document", doc.document_type),
        timestamp: doc.created_at,
        icon: "document".to_string(),
    });

    let appointments = appointments.into_iter().map(|apt| ActivityItem {
        id: format!("apt_{}", apt.start_time.timestamp_millis()),
        kind: ActivityKind::Appointment,
        action: "SCHEDULED".to_string(),
        title: apt.title,
        description: format!("Scheduled for {}", apt.start_time.format("%Y-%m-%d %H:%M UTC")),
        timestamp: apt.start_time,
        icon: "calendar".to_string(),
    });

    let mut feed: Vec<ActivityItem> = applications.chain(documents).chain(appointments).collect();

    // sort_by_key is stable, so ties keep stream order
    feed.sort_by_key(|item| Reverse(item.timestamp));
    feed.truncate(RECENT_ACTIVITY_LIMIT);

    feed
}

/// Group documents into the fixed checklist categories.
pub fn build_document_checklist(documents: &[Document]) -> Vec<DocumentChecklistItem> {
    REQUIRED_DOCUMENT_TYPES
        .iter()
        .map(|&(document_type, name, required)| {
            let of_type: Vec<&Document> = documents
                .iter()
                .filter(|doc| doc.document_type == document_type)
                .collect();

            let uploaded_count = of_type.len();
            let verified_count = of_type.iter().filter(|doc| doc.is_verified).count();

            DocumentChecklistItem {
                document_type: document_type.to_string(),
                name: name.to_string(),
                required,
                uploaded_count,
                verified_count,
                status: ChecklistStatus::from_counts(uploaded_count, verified_count),
                documents: of_type
                    .into_iter()
                    .map(|doc| ChecklistDocument {
                        id: doc.id,
                        name: doc.name.clone(),
                        file_name: doc.file_name.clone(),
                        is_verified: doc.is_verified,
                        uploaded_at: doc.created_at,
                    })
                    .collect(),
            }
        })
        .collect()
}
