//! Agency Portal Server
//!
//! Multi-tenant backend for study-abroad agencies. Each agency is a tenant
//! addressed by its subdomain; every record is scoped to one agency.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries, embedded migrations)
//! - **Tenancy**: `{tenant}.localhost` hosts are rewritten onto `/{tenant}/...`
//!   paths, then `{subdomain}` path segments are resolved to an agency
//! - **Format**: JSON requests/responses with camelCase keys
//!
//! The [`client`] module holds the HTTP client and page state used by the
//! CRM marketing dashboard.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{
    Router, middleware as axum_middleware,
    routing::get,
};
use tower::Layer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::DbPool,
    middleware::{
        subdomain::{SubdomainRules, subdomain_rewrite},
        tenant::tenant_middleware,
    },
};

/// Build the routed application without the subdomain rewrite.
///
/// Every route carrying a `{subdomain}` segment runs tenant resolution after
/// routing; `/health` does not.
pub fn router(pool: DbPool) -> Router {
    let tenant_routes = Router::new()
        // Marketing API
        .route(
            "/api/{subdomain}/marketing/campaigns",
            get(handlers::campaigns::list_campaigns).post(handlers::campaigns::create_campaign),
        )
        .route(
            "/api/{subdomain}/marketing/campaigns/{id}",
            get(handlers::campaigns::get_campaign).delete(handlers::campaigns::delete_campaign),
        )
        .route(
            "/api/{subdomain}/marketing/leads",
            get(handlers::leads::list_leads).post(handlers::leads::create_lead),
        )
        .route(
            "/api/{subdomain}/marketing/leads/{id}",
            get(handlers::leads::get_lead).delete(handlers::leads::delete_lead),
        )
        .route(
            "/api/{subdomain}/workflows",
            get(handlers::workflows::list_workflows).post(handlers::workflows::create_workflow),
        )
        // Student portal
        .route(
            "/api/{subdomain}/student/portal",
            get(handlers::portal::student_portal),
        )
        // Tenant pages reached through the rewrite
        .route("/{subdomain}", get(handlers::dashboard::show_agency))
        .route(
            "/{subdomain}/marketing",
            get(handlers::dashboard::marketing_overview),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            pool.clone(),
            tenant_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(tenant_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(pool)
}

/// Build the full application: the subdomain rewrite wrapped around
/// [`router`].
///
/// The rewrite has to run before routing, so it wraps the finished router
/// as a service instead of being added with `Router::layer`.
pub fn app(pool: DbPool, rules: SubdomainRules) -> Router {
    let rewrite = axum_middleware::from_fn_with_state(rules, subdomain_rewrite);

    Router::new().fallback_service(rewrite.layer(router(pool)))
}
