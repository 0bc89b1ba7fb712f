//! Student records and the rows the portal loads for one student.
//!
//! Every row here is read through a query that binds both the student id and
//! the owning agency id.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a student record from the `students` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    #[serde(skip)]
    pub agency_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub status: String,
    pub current_education: Option<String>,
    pub nationality: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Application joined with its university and first pipeline entry.
///
/// `current_stage` and `progress` are `None` when no pipeline entry exists.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApplicationWithProgress {
    pub id: Uuid,
    pub status: String,
    pub university_name: String,
    pub current_stage: Option<String>,
    pub progress: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub student_id: Uuid,
    pub application_id: Option<Uuid>,
    pub name: String,
    pub file_name: String,
    #[serde(rename = "type")]
    pub document_type: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub title: String,
    pub status: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub student_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub student_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Latest status change of an application, feeding the activity stream.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApplicationActivity {
    pub id: Uuid,
    pub status: String,
    pub university_name: String,
    pub updated_at: DateTime<Utc>,
}

/// Action recorded against one of the student's documents.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentActivity {
    pub action: String,
    pub document_name: String,
    pub document_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppointmentActivity {
    pub title: String,
    pub status: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}
