use http::Method;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::response::{finalize_response, ResponseSink};
use crate::context::{RequestContext, RestStatus};
use crate::dispatcher::{Dispatcher, Handler};
use crate::endpoint::{EndpointDescriptor, ServiceDescriptor};
use crate::marshal::{Marshaller, MarshallerRegistry};
use crate::registry::{EndpointRegistry, RegistrationError, RegistryBuilder};
use crate::router::Router;

/// Client-facing body for a request URI that could not be decoded.
pub const BAD_REQUEST_BODY: &str = "Client sent bad request.";

/// Client-facing body when no registered endpoint matches.
pub const NOT_FOUND_BODY: &str = "The resource in the requested path could not be found.";

/// Error raised while percent-decoding a request URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriDecodeError {
    /// A `%` not followed by two hex digits.
    InvalidEscape { position: usize },
    /// The decoded bytes are not valid UTF-8.
    InvalidUtf8,
}

impl fmt::Display for UriDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UriDecodeError::InvalidEscape { position } => {
                write!(f, "invalid percent-escape at byte {}", position)
            }
            UriDecodeError::InvalidUtf8 => write!(f, "decoded URI is not valid UTF-8"),
        }
    }
}

impl std::error::Error for UriDecodeError {}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Strictly percent-decode a full request URI, `+` included.
///
/// Unlike lenient decoders that pass malformed escapes through, a `%` not
/// followed by two hex digits is an error: the serving entry point must
/// answer 400 before any endpoint matching happens. Decoding is applied at
/// the whole-URI level, before the path is split from the query string.
pub fn unescape_uri(raw: &str) -> Result<String, UriDecodeError> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                if i + 2 >= bytes.len() {
                    return Err(UriDecodeError::InvalidEscape { position: i });
                }
                match (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => out.push((hi << 4) | lo),
                    _ => return Err(UriDecodeError::InvalidEscape { position: i }),
                }
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|_| UriDecodeError::InvalidUtf8)
}

/// Aggregates all registration surfaces for the startup phase.
///
/// Sealing produces an immutable [`RestService`]; there is no way to
/// register anything once serving has begun.
pub struct RestServiceBuilder {
    registry: RegistryBuilder,
    dispatcher: Dispatcher,
    marshallers: MarshallerRegistry,
}

impl RestServiceBuilder {
    /// Create a builder. The JSON marshaller is already registered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: RegistryBuilder::new(),
            dispatcher: Dispatcher::new(),
            marshallers: MarshallerRegistry::new(),
        }
    }

    /// Register a service at the root path.
    pub fn register_service(&mut self, descriptor: ServiceDescriptor) -> String {
        self.registry.register_service(descriptor)
    }

    /// Register a service under a path root; idempotent by name.
    pub fn register_service_on_path(
        &mut self,
        root: &str,
        descriptor: ServiceDescriptor,
    ) -> String {
        self.registry.register_service_on_path(root, descriptor)
    }

    /// Register an endpoint for a previously registered service.
    pub fn register_endpoint(
        &mut self,
        service: &str,
        descriptor: EndpointDescriptor,
    ) -> Result<(), RegistrationError> {
        self.registry.register_endpoint(service, descriptor)
    }

    /// Register a payload marshaller; the last registration for a MIME type
    /// wins.
    pub fn register_marshaller(&mut self, mime: &str, marshaller: Arc<dyn Marshaller>) {
        self.marshallers.register(mime, marshaller);
    }

    /// Register a handler capability under `(service, index)`.
    pub fn register_handler(&mut self, service: &str, index: usize, handler: Arc<dyn Handler>) {
        self.dispatcher.register_handler(service, index, handler);
    }

    /// Seal every registry and produce the serving facade.
    #[must_use]
    pub fn seal(self) -> RestService {
        let registry = Arc::new(self.registry.seal());
        let router = Router::new(registry.clone());
        RestService {
            registry,
            router,
            dispatcher: self.dispatcher,
            marshallers: self.marshallers,
        }
    }
}

impl Default for RestServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The serving facade: resolves requests against the sealed registry,
/// invokes handlers, and drives the response state machine.
pub struct RestService {
    registry: Arc<EndpointRegistry>,
    router: Router,
    dispatcher: Dispatcher,
    marshallers: MarshallerRegistry,
}

impl RestService {
    /// Serve one request.
    ///
    /// Decodes the full URI, resolves the endpoint, dispatches to the
    /// handler, and finalizes the response through `sink`. All failure paths
    /// are terminal and logged server-side; the client-facing body is a
    /// short generic message except for an explicit handler status, whose
    /// reason is intentionally surfaced.
    pub fn serve(&self, method: &str, request_uri: &str, sink: &mut dyn ResponseSink) {
        info!(method = method, uri = request_uri, "Serving URL");

        let decoded = match unescape_uri(request_uri) {
            Ok(decoded) => decoded,
            Err(err) => {
                error!(uri = request_uri, error = %err, "Could not decode request URI");
                sink.status_code(400);
                sink.write_body(BAD_REQUEST_BODY.as_bytes());
                return;
            }
        };
        let method = match Method::from_bytes(method.as_bytes()) {
            Ok(method) => method,
            Err(_) => {
                error!(method = method, uri = request_uri, "Invalid request method");
                sink.status_code(400);
                sink.write_body(BAD_REQUEST_BODY.as_bytes());
                return;
            }
        };

        let (path, query) = match decoded.split_once('?') {
            Some((path, query)) => (path, query),
            None => (decoded.as_str(), ""),
        };

        let Some(route_match) = self.router.resolve(&method, path, query) else {
            warn!(path = %decoded, "Could not serve page");
            sink.status_code(404);
            sink.write_body(NOT_FOUND_BODY.as_bytes());
            return;
        };

        let service = self.registry.service(&route_match.endpoint.service_name);
        let mut ctx = RequestContext::new(&route_match);
        let (value, mut status) = self.dispatcher.dispatch(&route_match, &mut ctx);

        let mut payload = Vec::new();
        if status.is_ok() {
            if let Some(value) = value {
                match self
                    .marshallers
                    .get_or_json(&service.produces)
                    .encode(&value)
                {
                    Ok(bytes) => payload = bytes,
                    Err(err) => {
                        error!(
                            service = %service.name,
                            error = %err,
                            "Failed to encode response payload"
                        );
                        status = RestStatus::new(500, "Failed to encode response payload.");
                    }
                }
            }
        }

        finalize_response(
            sink,
            &ctx,
            &route_match.endpoint,
            &service,
            &status,
            &payload,
            path,
        );
    }

    /// The sealed endpoint registry backing this service.
    #[must_use]
    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }
}
