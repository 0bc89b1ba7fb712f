//! Subdomain rewrite middleware.
//!
//! Maps `{tenant}.localhost` hosts onto `/{tenant}/...` paths so a single
//! router can serve every agency. This layer has to wrap the whole router:
//! it changes the URI, and routing must see the rewritten path.
//!
//! No tenant registry is consulted here. Unknown labels are rewritten like
//! any other and rejected later by tenant resolution with a 404.

use axum::{
    extract::{Request, State},
    http::{Uri, header},
    middleware::Next,
    response::Response,
};

/// Path prefixes that are never rewritten.
const EXCLUDED_PREFIXES: [&str; 3] = ["/api/", "/_next/", "/static/"];

/// Exact paths that are never rewritten.
const EXCLUDED_PATHS: [&str; 1] = ["/signup/success"];

/// Labels that address the platform itself rather than a tenant.
const RESERVED_LABELS: [&str; 2] = ["localhost", "www"];

/// Labels of this length or shorter are ignored.
const MAX_IGNORED_LABEL_LEN: usize = 2;

/// Rewrite rules shared with the middleware through axum state.
#[derive(Debug, Clone)]
pub struct SubdomainRules {
    /// Host fragment that enables rewriting, e.g. `localhost`
    host_marker: String,
}

impl SubdomainRules {
    pub fn new(host_marker: impl Into<String>) -> Self {
        Self {
            host_marker: host_marker.into(),
        }
    }

    /// Compute the rewritten path for a request, or `None` to leave it alone.
    ///
    /// # Examples
    ///
    /// ```
    /// use agency_portal_server::middleware::subdomain::SubdomainRules;
    ///
    /// let rules = SubdomainRules::new("localhost");
    /// assert_eq!(
    ///     rules.rewrite_path("acme.localhost:3000", "/marketing").as_deref(),
    ///     Some("/acme/marketing")
    /// );
    /// assert_eq!(rules.rewrite_path("acme.localhost:3000", "/api/acme/workflows"), None);
    /// ```
    pub fn rewrite_path(&self, host: &str, path: &str) -> Option<String> {
        if !host.contains(&self.host_marker) || is_excluded(path) {
            return None;
        }

        let hostname = host.split(':').next().unwrap_or_default();
        let label = hostname.split('.').next().unwrap_or_default().to_lowercase();

        if RESERVED_LABELS.contains(&label.as_str()) || label.len() <= MAX_IGNORED_LABEL_LEN {
            return None;
        }

        if path == "/" || path.is_empty() {
            Some(format!("/{label}"))
        } else {
            Some(format!("/{label}{path}"))
        }
    }
}

fn is_excluded(path: &str) -> bool {
    EXCLUDED_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
        || EXCLUDED_PATHS.contains(&path)
        || path.contains('.')
}

/// Rewrite the request URI according to [`SubdomainRules`].
///
/// The query string is preserved. Requests that do not qualify pass through
/// untouched.
pub async fn subdomain_rewrite(
    State(rules): State<SubdomainRules>,
    mut request: Request,
    next: Next,
) -> Response {
    let rewritten = {
        let host = request
            .headers()
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .or_else(|| request.uri().host())
            .unwrap_or_default();

        rules
            .rewrite_path(host, request.uri().path())
            .map(|path| match request.uri().query() {
                Some(query) => format!("{path}?{query}"),
                None => path,
            })
    };

    if let Some(path_and_query) = rewritten {
        match path_and_query.parse::<Uri>() {
            Ok(uri) => {
                tracing::debug!(from = %request.uri(), to = %uri, "rewriting tenant request");
                *request.uri_mut() = uri;
            }
            Err(err) => {
                tracing::warn!(error = %err, "rewritten tenant path is not a valid URI");
            }
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> SubdomainRules {
        SubdomainRules::new("localhost")
    }

    #[test]
    fn prefixes_path_with_tenant_label() {
        assert_eq!(
            rules().rewrite_path("acme.localhost:3000", "/marketing"),
            Some("/acme/marketing".to_string())
        );
    }

    #[test]
    fn root_path_maps_to_tenant_root() {
        assert_eq!(
            rules().rewrite_path("acme.localhost", "/"),
            Some("/acme".to_string())
        );
    }

    #[test]
    fn hosts_without_marker_pass_through() {
        assert_eq!(rules().rewrite_path("acme.example.com", "/marketing"), None);
    }

    #[test]
    fn excluded_paths_pass_through() {
        let rules = rules();

        assert_eq!(rules.rewrite_path("acme.localhost", "/api/acme/workflows"), None);
        assert_eq!(rules.rewrite_path("acme.localhost", "/_next/chunk"), None);
        assert_eq!(rules.rewrite_path("acme.localhost", "/static/app.css"), None);
        assert_eq!(rules.rewrite_path("acme.localhost", "/favicon.ico"), None);
        assert_eq!(rules.rewrite_path("acme.localhost", "/signup/success"), None);
    }

    #[test]
    fn reserved_and_short_labels_pass_through() {
        let rules = rules();

        // The port is dropped before the first label is read, so this is the
        // reserved platform host `localhost`, not a tenant named `localhost:3000`
        assert_eq!(rules.rewrite_path("localhost:3000", "/marketing"), None);
        assert_eq!(rules.rewrite_path("www.localhost", "/marketing"), None);
        assert_eq!(rules.rewrite_path("ab.localhost", "/marketing"), None);
        assert_eq!(
            rules.rewrite_path("abc.localhost", "/marketing"),
            Some("/abc/marketing".to_string())
        );
    }

    #[test]
    fn label_is_lowercased() {
        assert_eq!(
            rules().rewrite_path("ACME.localhost", "/marketing"),
            Some("/acme/marketing".to_string())
        );
    }

    #[test]
    fn custom_marker_is_honoured() {
        let rules = SubdomainRules::new("lvh.me");

        assert_eq!(
            rules.rewrite_path("acme.lvh.me:8080", "/marketing"),
            Some("/acme/marketing".to_string())
        );
        assert_eq!(rules.rewrite_path("acme.localhost", "/marketing"), None);
    }
}
