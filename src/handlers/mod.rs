//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives the resolved tenant and request data (JSON body, query, path)
//! 2. Delegates to a service or runs a tenant-scoped query
//! 3. Returns a JSON response or an `AppError`

/// Campaign endpoints under `/api/{subdomain}/marketing/campaigns`
pub mod campaigns;
/// Tenant page routes reached through the subdomain rewrite
pub mod dashboard;
/// Extractors whose rejections use the JSON error body
pub mod extract;
pub mod health;
/// Lead endpoints under `/api/{subdomain}/marketing/leads`
pub mod leads;
/// Student portal aggregate
pub mod portal;
/// Workflow endpoints under `/api/{subdomain}/workflows`
pub mod workflows;
