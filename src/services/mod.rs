//! Business logic services.
//!
//! Services hold the tenant-scoped queries and the rules around them, so
//! handlers stay thin. Every function takes the agency id explicitly.

pub mod analytics;
pub mod campaign_service;
pub mod lead_service;
pub mod portal_service;
