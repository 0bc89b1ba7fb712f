//! Automation workflow models.
//!
//! The node/edge graph is stored as JSON and passed through untouched; this
//! service never executes workflows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::pagination::Pagination;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowCategory {
    #[default]
    General,
    LeadNurturing,
    StudentOnboarding,
    FollowUp,
    Notification,
    Integration,
}

impl WorkflowCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowCategory::General => "GENERAL",
            WorkflowCategory::LeadNurturing => "LEAD_NURTURING",
            WorkflowCategory::StudentOnboarding => "STUDENT_ONBOARDING",
            WorkflowCategory::FollowUp => "FOLLOW_UP",
            WorkflowCategory::Notification => "NOTIFICATION",
            WorkflowCategory::Integration => "INTEGRATION",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Workflow {
    pub id: Uuid,
    pub agency_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub status: String,
    pub is_active: bool,
    pub execution_count: i64,
    pub last_executed_at: Option<DateTime<Utc>>,
    pub nodes: serde_json::Value,
    pub edges: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub status: String,
    pub is_active: bool,
    pub execution_count: i64,
    pub last_executed_at: Option<DateTime<Utc>>,
    pub nodes: serde_json::Value,
    pub edges: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<Workflow> for WorkflowResponse {
    fn from(workflow: Workflow) -> Self {
        Self {
            id: workflow.id,
            name: workflow.name,
            description: workflow.description,
            category: workflow.category,
            status: workflow.status,
            is_active: workflow.is_active,
            execution_count: workflow.execution_count,
            last_executed_at: workflow.last_executed_at,
            nodes: workflow.nodes,
            edges: workflow.edges,
            created_at: workflow.created_at,
        }
    }
}

fn empty_graph() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkflowRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub category: WorkflowCategory,
    #[serde(default = "empty_graph")]
    pub nodes: serde_json::Value,
    #[serde(default = "empty_graph")]
    pub edges: serde_json::Value,
}

impl CreateWorkflowRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Workflow name is required".to_string());
        }
        if !self.nodes.is_array() || !self.edges.is_array() {
            return Err("Workflow nodes and edges must be arrays".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<WorkflowCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowListResponse {
    pub workflows: Vec<WorkflowResponse>,
    pub pagination: Pagination,
}
