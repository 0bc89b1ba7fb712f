//! Data models representing database entities and API payloads.
//!
//! Row structs (`sqlx::FromRow`) mirror the tables in `migrations/`.
//! Response structs are what the API serializes, using camelCase keys.

/// Tenant root model
pub mod agency;
/// Marketing campaigns and their funnel metrics
pub mod campaign;
/// Leads captured by marketing
pub mod lead;
/// Shared list paging parameters
pub mod pagination;
/// Student portal response types
pub mod portal;
/// Student and the records it owns
pub mod student;
/// Automation workflows
pub mod workflow;
