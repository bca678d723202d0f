use http::Method;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::endpoint::EndpointSignature;
use crate::registry::EndpointRegistry;

/// Maximum number of path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the request hot path.
///
/// Names come from the static signature table, so they are shared as
/// `Arc<str>`; values are per-request data copied out of the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Reserved query key carrying the anti-forgery token. Extracted on every
/// resolution as a side channel, independent of the declared parameter list.
pub const XSRF_TOKEN_PARAM: &str = "xsrft";

/// Result of successfully matching a request to a registered endpoint.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched signature (shared with the registry).
    pub endpoint: Arc<EndpointSignature>,
    /// Path parameter values in declared order. A variable-length endpoint
    /// repeats the trailing parameter name, one entry per absorbed segment.
    pub path_params: ParamVec,
    /// Declared query parameters in declared order; absent ones bind to the
    /// empty string.
    pub query_params: ParamVec,
    /// Anti-forgery token, if the request carried one.
    pub xsrf_token: Option<String>,
}

impl RouteMatch {
    /// Get a path parameter by name. Last write wins when a name repeats.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name. Last write wins when a name repeats.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values bound to a path parameter, in path order. This is how the
    /// trailing variable-length parameter is read.
    #[must_use]
    pub fn path_param_values(&self, name: &str) -> Vec<&str> {
        self.path_params
            .iter()
            .filter(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// Resolves `(method, path, query)` tuples against a sealed registry.
#[derive(Clone)]
pub struct Router {
    registry: Arc<EndpointRegistry>,
}

impl Router {
    #[must_use]
    pub fn new(registry: Arc<EndpointRegistry>) -> Self {
        Self { registry }
    }

    /// Find the unique endpoint matching an already-decoded path, binding
    /// path and declared query parameters.
    ///
    /// Candidates are scanned in registration order and the first full match
    /// wins. Query values never influence which endpoint matches.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str, query: &str) -> Option<RouteMatch> {
        debug!(method = %method, path = path, "Route match attempt");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        for endpoint in self.registry.endpoints() {
            if endpoint.method != *method || !shape_matches(endpoint, &segments) {
                continue;
            }
            let path_params = bind_path_params(endpoint, &segments);
            let (query_params, xsrf_token) = bind_query_params(endpoint, query);
            info!(
                method = %method,
                path = path,
                signature = %endpoint.signature,
                service = %endpoint.service_name,
                handler_index = endpoint.handler_index,
                "Route matched"
            );
            return Some(RouteMatch {
                endpoint: endpoint.clone(),
                path_params,
                query_params,
                xsrf_token,
            });
        }

        warn!(method = %method, path = path, "No route matched");
        None
    }
}

/// Whether the request's segments fit a signature's segment classes.
fn shape_matches(endpoint: &EndpointSignature, segments: &[&str]) -> bool {
    if endpoint.variable_length {
        // The trailing slot needs at least one segment.
        if segments.len() < endpoint.static_segments.len() + 1 {
            return false;
        }
    } else if segments.len() != endpoint.segment_count {
        return false;
    }
    endpoint
        .static_segments
        .iter()
        .all(|(position, literal)| segments.get(*position).is_some_and(|s| *s == literal.as_str()))
}

fn bind_path_params(endpoint: &EndpointSignature, segments: &[&str]) -> ParamVec {
    let mut params = ParamVec::new();
    if endpoint.variable_length {
        if let Some(trailing) = endpoint.params.last() {
            let name: Arc<str> = Arc::from(trailing.name.as_str());
            for value in &segments[trailing.position..] {
                params.push((name.clone(), (*value).to_string()));
            }
        }
    } else {
        for param in &endpoint.params {
            params.push((
                Arc::from(param.name.as_str()),
                segments[param.position].to_string(),
            ));
        }
    }
    params
}

fn bind_query_params(endpoint: &EndpointSignature, query: &str) -> (ParamVec, Option<String>) {
    let pairs = parse_query_pairs(query);
    let mut params = ParamVec::new();
    for param in &endpoint.query_params {
        // Unknown keys are ignored; a missing declared parameter binds to
        // the empty string rather than failing.
        let value = pairs
            .iter()
            .rfind(|(k, _)| *k == param.name)
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        params.push((Arc::from(param.name.as_str()), value));
    }
    let xsrf_token = pairs
        .iter()
        .rfind(|(k, _)| k == XSRF_TOKEN_PARAM)
        .map(|(_, v)| v.clone());
    (params, xsrf_token)
}

/// Split an already-decoded query string into ordered name/value pairs.
fn parse_query_pairs(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => (name.to_string(), value.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}
