//! Agency (tenant) model.
//!
//! Agencies are addressed by subdomain and own every other record, directly
//! or transitively.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an agency record from the `agencies` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agency {
    pub id: Uuid,
    pub name: String,
    /// Unique subdomain label used to address the tenant
    pub subdomain: String,
    pub created_at: DateTime<Utc>,
}
