//! HTTP middleware components.
//!
//! - `subdomain` wraps the whole router and rewrites tenant hosts onto paths
//! - `tenant` runs after routing and resolves the agency for the request

pub mod subdomain;
pub mod tenant;
