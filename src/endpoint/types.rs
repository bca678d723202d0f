use http::Method;
use std::collections::HashMap;

use crate::marshal::APPLICATION_JSON;

/// A single declared path or query parameter.
///
/// Identity is `(name, position)` within one signature. For path parameters
/// the position is the zero-based segment index in the full (root-prefixed)
/// path; for query parameters it is the declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub position: usize,
}

/// Declared shape of an endpoint's input or output payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// A single value (scalar or struct-like object).
    Scalar,
    /// An ordered collection; decodes from a JSON array.
    List,
    /// A keyed collection; decodes from a JSON object.
    Map,
}

impl std::fmt::Display for PayloadShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PayloadShape::Scalar => "Scalar",
            PayloadShape::List => "List",
            PayloadShape::Map => "Map",
        };
        write!(f, "{}", s)
    }
}

/// Immutable descriptor of one registered route.
///
/// Built once at registration time from a parsed path template and frozen
/// thereafter. Invariants:
///
/// - fixed-length: `static_segments.len() + params.len() == segment_count`
/// - variable-length: exactly one parameter, and every segment after the last
///   static segment binds to it
#[derive(Debug, Clone)]
pub struct EndpointSignature {
    /// Name of the owning service.
    pub service_name: String,
    pub method: Method,
    /// The template as registered, without the service root.
    pub template: String,
    /// Literal path components keyed by segment position.
    pub static_segments: HashMap<usize, String>,
    /// Declared path parameters in template order.
    pub params: Vec<Param>,
    /// Declared query parameters in template order.
    pub query_params: Vec<Param>,
    /// Whether the trailing parameter absorbs all remaining segments.
    pub variable_length: bool,
    pub input_shape: PayloadShape,
    pub output_shape: PayloadShape,
    /// Index used to look up the underlying handler within its service.
    pub handler_index: usize,
    /// Canonical signature string: `/`-joined segment classes with `{}` for a
    /// parameter slot and `{...}` for the trailing variable slot.
    pub signature: String,
    /// Total number of path segments in the full template.
    pub segment_count: usize,
}

impl EndpointSignature {
    /// Key under which this signature is stored in the endpoint registry.
    #[must_use]
    pub fn registry_key(&self) -> String {
        format!("{}:{}", self.method, self.signature)
    }
}

/// Service-level metadata shared by every endpoint of a registered service.
///
/// One instance per registered service root; created at registration and
/// read-only afterward. `produces` drives the GET content-type fallback in
/// the response state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceMeta {
    pub name: String,
    pub consumes: String,
    pub produces: String,
    pub root: String,
    pub realm: String,
}

/// Descriptor supplied when registering a service.
///
/// Consumed/produced MIME types default to JSON.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub name: String,
    pub consumes: String,
    pub produces: String,
    pub realm: String,
}

impl ServiceDescriptor {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            consumes: APPLICATION_JSON.to_string(),
            produces: APPLICATION_JSON.to_string(),
            realm: String::new(),
        }
    }

    #[must_use]
    pub fn produces(mut self, mime: &str) -> Self {
        self.produces = mime.to_string();
        self
    }

    #[must_use]
    pub fn consumes(mut self, mime: &str) -> Self {
        self.consumes = mime.to_string();
        self
    }

    #[must_use]
    pub fn realm(mut self, realm: &str) -> Self {
        self.realm = realm.to_string();
        self
    }
}

/// Descriptor supplied when registering an endpoint.
#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    pub method: Method,
    /// Path template relative to the service root, e.g. `/orders/{id}?{limit}`.
    pub template: String,
    pub input_shape: PayloadShape,
    pub output_shape: PayloadShape,
    /// Index of the handler within the owning service.
    pub handler_index: usize,
}

impl EndpointDescriptor {
    #[must_use]
    pub fn new(method: Method, template: &str) -> Self {
        Self {
            method,
            template: template.to_string(),
            input_shape: PayloadShape::Scalar,
            output_shape: PayloadShape::Scalar,
            handler_index: 0,
        }
    }

    #[must_use]
    pub fn input_shape(mut self, shape: PayloadShape) -> Self {
        self.input_shape = shape;
        self
    }

    #[must_use]
    pub fn output_shape(mut self, shape: PayloadShape) -> Self {
        self.output_shape = shape;
        self
    }

    #[must_use]
    pub fn handler_index(mut self, index: usize) -> Self {
        self.handler_index = index;
        self
    }
}
