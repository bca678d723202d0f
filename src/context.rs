//! Per-request state bridging resolution, handler invocation, and response
//! finalization, plus the [`RestStatus`] outcome type consumed by the
//! response state machine.

use serde::Serialize;
use std::fmt;

use crate::router::{ParamVec, RouteMatch};

/// Outcome of resolution or handler execution: either success (200) or a
/// specific failure with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestStatus {
    pub code: u16,
    /// Surfaced to the client as the response body on non-200 outcomes.
    pub reason: String,
}

impl RestStatus {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            code: 200,
            reason: String::new(),
        }
    }

    #[must_use]
    pub fn new(code: u16, reason: &str) -> Self {
        Self {
            code,
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == 200
    }
}

impl fmt::Display for RestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

/// Mutable per-request scratch state.
///
/// Created fresh by the serving entry point after resolution, handed to the
/// handler, then consumed by the response state machine. Owned exclusively by
/// one request for its entire lifetime; never shared across requests.
///
/// `response_code == 0` means "unset, use the method default". The flags
/// mirror what the handler has already done so the state machine does not
/// repeat it: once `body_written` is true no further header or status
/// mutation is permitted.
#[derive(Debug)]
pub struct RequestContext {
    pub path_params: ParamVec,
    pub query_params: ParamVec,
    /// Anti-forgery token extracted during resolution.
    pub xsrf_token: Option<String>,
    /// Explicit response code chosen by the handler; 0 = unset.
    pub response_code: u16,
    /// Handler requested that the default payload write be skipped entirely.
    pub override_default_write: bool,
    content_type: Option<String>,
    body_written: bool,
    raw_body: Vec<u8>,
}

impl RequestContext {
    /// Build the context for one resolved request.
    #[must_use]
    pub fn new(route_match: &RouteMatch) -> Self {
        Self {
            path_params: route_match.path_params.clone(),
            query_params: route_match.query_params.clone(),
            xsrf_token: route_match.xsrf_token.clone(),
            response_code: 0,
            override_default_write: false,
            content_type: None,
            body_written: false,
            raw_body: Vec::new(),
        }
    }

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

    /// All values bound to a path parameter, in path order.
    #[must_use]
    pub fn path_param_values(&self, name: &str) -> Vec<&str> {
        self.path_params
            .iter()
            .filter(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Choose an explicit response code instead of the method default.
    pub fn set_response_code(&mut self, code: u16) {
        self.response_code = code;
    }

    /// Set the response content type, suppressing the service-level
    /// `produces` fallback.
    pub fn set_content_type(&mut self, mime: &str) {
        self.content_type = Some(mime.to_string());
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    #[must_use]
    pub fn content_type_set(&self) -> bool {
        self.content_type.is_some()
    }

    /// Append raw body bytes. Marks the body as written: the state machine
    /// will flush these bytes and will no longer emit headers or an explicit
    /// status for this response.
    pub fn write_body(&mut self, bytes: &[u8]) {
        self.raw_body.extend_from_slice(bytes);
        self.body_written = true;
    }

    #[must_use]
    pub fn body_written(&self) -> bool {
        self.body_written
    }

    #[must_use]
    pub fn raw_body(&self) -> &[u8] {
        &self.raw_body
    }
}
