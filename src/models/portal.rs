//! Student portal request and response types.
//!
//! # Response shape
//!
//! ```json
//! {
//!   "student": { "id": "...", "firstName": "Ana", ... },
//!   "stats": { "totalApplications": 3, ... },
//!   "applicationProgress": [ ... ],
//!   "recentActivity": [ ... ],
//!   "requiredDocuments": [ ... ],
//!   "upcomingAppointments": [ ... ],
//!   "pendingTasks": [ ... ],
//!   "unreadNotifications": [ ... ]
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::student::{Appointment, Notification, Student, Task};

/// Query string of `GET /api/{subdomain}/student/portal`.
///
/// Kept as a raw string so a missing id and a malformed id produce
/// different errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalQuery {
    pub student_id: Option<String>,
}

/// Summary counters computed over the loaded collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalStats {
    pub total_applications: usize,
    pub active_applications: usize,
    pub completed_applications: usize,
    pub total_documents: usize,
    pub verified_documents: usize,
    pub pending_tasks: usize,
    pub upcoming_appointments: usize,
    pub unread_notifications: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationProgress {
    pub id: Uuid,
    pub university_name: String,
    pub status: String,
    /// Whole percent, 0..=100
    pub progress: i64,
    pub current_stage: String,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    Application,
    Document,
    Appointment,
}

/// One entry of the merged recent-activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub action: String,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChecklistStatus {
    Missing,
    Partial,
    Completed,
}

impl ChecklistStatus {
    /// MISSING with nothing uploaded, COMPLETED once every upload is
    /// verified, PARTIAL in between.
    pub fn from_counts(uploaded: usize, verified: usize) -> Self {
        if uploaded == 0 {
            ChecklistStatus::Missing
        } else if verified == uploaded {
            ChecklistStatus::Completed
        } else {
            ChecklistStatus::Partial
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistDocument {
    pub id: Uuid,
    pub name: String,
    pub file_name: String,
    pub is_verified: bool,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentChecklistItem {
    #[serde(rename = "type")]
    pub document_type: String,
    pub name: String,
    pub required: bool,
    pub uploaded_count: usize,
    pub verified_count: usize,
    pub status: ChecklistStatus,
    pub documents: Vec<ChecklistDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalResponse {
    pub student: Student,
    pub stats: PortalStats,
    pub application_progress: Vec<ApplicationProgress>,
    pub recent_activity: Vec<ActivityItem>,
    pub required_documents: Vec<DocumentChecklistItem>,
    pub upcoming_appointments: Vec<Appointment>,
    pub pending_tasks: Vec<Task>,
    pub unread_notifications: Vec<Notification>,
}
