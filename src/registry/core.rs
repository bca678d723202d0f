use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::endpoint::{
    parse_template, EndpointDescriptor, EndpointSignature, ServiceDescriptor, ServiceMeta,
    TemplateError,
};

/// Error raised during endpoint registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The named service was never registered.
    UnknownService { service: String },
    /// An endpoint with the same `METHOD:canonical-signature` key already
    /// exists. Two templates whose segment classes coincide (e.g.
    /// `/orders/{id}` and `/orders/{name}`) collide here.
    DuplicateEndpoint { key: String },
    /// The path template could not be parsed.
    InvalidTemplate(TemplateError),
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::UnknownService { service } => {
                write!(f, "service '{}' is not registered", service)
            }
            RegistrationError::DuplicateEndpoint { key } => {
                write!(f, "an endpoint is already registered under '{}'", key)
            }
            RegistrationError::InvalidTemplate(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for RegistrationError {}

impl From<TemplateError> for RegistrationError {
    fn from(err: TemplateError) -> Self {
        RegistrationError::InvalidTemplate(err)
    }
}

/// Collapse `"/"` to the empty root; otherwise trim slashes and re-prefix
/// exactly one leading slash.
fn normalize_root(root: &str) -> String {
    let trimmed = root.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Mutable registry used during the registration phase.
pub struct RegistryBuilder {
    services: HashMap<String, ServiceMeta>,
    endpoints: Vec<Arc<EndpointSignature>>,
    keys: HashMap<String, usize>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
            endpoints: Vec::new(),
            keys: HashMap::new(),
        }
    }

    /// Register a service at the root path.
    pub fn register_service(&mut self, descriptor: ServiceDescriptor) -> String {
        self.register_service_on_path("", descriptor)
    }

    /// Register a service under a path root and return its name.
    ///
    /// Idempotent by name: registering the same service name twice returns
    /// the existing name without creating a duplicate entry.
    pub fn register_service_on_path(
        &mut self,
        root: &str,
        descriptor: ServiceDescriptor,
    ) -> String {
        let name = descriptor.name.clone();
        if self.services.contains_key(&name) {
            return name;
        }
        let root = normalize_root(root);
        info!(service = %name, root = %root, "Service registered");
        self.services.insert(
            name.clone(),
            ServiceMeta {
                name: name.clone(),
                consumes: descriptor.consumes,
                produces: descriptor.produces,
                root,
                realm: descriptor.realm,
            },
        );
        name
    }

    /// Register an endpoint for a previously registered service.
    ///
    /// The template is parsed into its segment classes and the endpoint is
    /// stored under `METHOD:canonical-signature`. A duplicate key is
    /// rejected.
    pub fn register_endpoint(
        &mut self,
        service: &str,
        descriptor: EndpointDescriptor,
    ) -> Result<(), RegistrationError> {
        let meta = self
            .services
            .get(service)
            .ok_or_else(|| RegistrationError::UnknownService {
                service: service.to_string(),
            })?;
        let parsed = parse_template(&meta.root, &descriptor.template)?;
        let signature = EndpointSignature {
            service_name: service.to_string(),
            method: descriptor.method,
            template: descriptor.template,
            static_segments: parsed.static_segments,
            params: parsed.params,
            query_params: parsed.query_params,
            variable_length: parsed.variable_length,
            input_shape: descriptor.input_shape,
            output_shape: descriptor.output_shape,
            handler_index: descriptor.handler_index,
            signature: parsed.signature,
            segment_count: parsed.segment_count,
        };
        let key = signature.registry_key();
        if self.keys.contains_key(&key) {
            return Err(RegistrationError::DuplicateEndpoint { key });
        }
        debug!(
            key = %key,
            service = service,
            handler_index = signature.handler_index,
            "Endpoint registered"
        );
        self.keys.insert(key, self.endpoints.len());
        self.endpoints.push(Arc::new(signature));
        Ok(())
    }

    /// Freeze the registry for the serving lifetime.
    #[must_use]
    pub fn seal(self) -> EndpointRegistry {
        info!(
            endpoint_count = self.endpoints.len(),
            service_count = self.services.len(),
            "Endpoint registry sealed"
        );
        EndpointRegistry {
            services: self.services,
            endpoints: self.endpoints,
            keys: self.keys,
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable endpoint store shared for the serving lifetime.
pub struct EndpointRegistry {
    services: HashMap<String, ServiceMeta>,
    endpoints: Vec<Arc<EndpointSignature>>,
    keys: HashMap<String, usize>,
}

impl EndpointRegistry {
    /// Service metadata by name. Returns zero-value metadata if the name was
    /// never registered; this is a pure read that never fails.
    #[must_use]
    pub fn service(&self, name: &str) -> ServiceMeta {
        self.services.get(name).cloned().unwrap_or_default()
    }

    /// All registered endpoints in registration order.
    #[must_use]
    pub fn endpoints(&self) -> &[Arc<EndpointSignature>] {
        &self.endpoints
    }

    /// Exact lookup by method and canonical signature string.
    #[must_use]
    pub fn endpoint(&self, method: &http::Method, signature: &str) -> Option<&Arc<EndpointSignature>> {
        self.keys
            .get(&format!("{}:{}", method, signature))
            .map(|idx| &self.endpoints[*idx])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::EndpointDescriptor;
    use http::Method;

    #[test]
    fn normalizes_roots() {
        assert_eq!(normalize_root("/"), "");
        assert_eq!(normalize_root(""), "");
        assert_eq!(normalize_root("store"), "/store");
        assert_eq!(normalize_root("/store/"), "/store");
        assert_eq!(normalize_root("//store/v1//"), "/store/v1");
    }

    #[test]
    fn service_registration_is_idempotent_by_name() {
        let mut builder = RegistryBuilder::new();
        let first = builder.register_service_on_path("/a", ServiceDescriptor::new("Svc"));
        let second = builder.register_service_on_path("/b", ServiceDescriptor::new("Svc"));
        assert_eq!(first, second);
        let registry = builder.seal();
        // The first registration wins; the second did not overwrite the root.
        assert_eq!(registry.service("Svc").root, "/a");
    }

    #[test]
    fn unknown_service_lookup_returns_zero_value() {
        let registry = RegistryBuilder::new().seal();
        assert_eq!(registry.service("nope"), ServiceMeta::default());
    }

    #[test]
    fn duplicate_canonical_signature_is_rejected() {
        let mut builder = RegistryBuilder::new();
        let svc = builder.register_service(ServiceDescriptor::new("Svc"));
        builder
            .register_endpoint(&svc, EndpointDescriptor::new(Method::GET, "/orders/{id}"))
            .unwrap();
        // Different parameter name, same segment classes.
        let err = builder
            .register_endpoint(&svc, EndpointDescriptor::new(Method::GET, "/orders/{name}"))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateEndpoint { .. }));
        // A different method under the same template is fine.
        builder
            .register_endpoint(&svc, EndpointDescriptor::new(Method::PUT, "/orders/{id}"))
            .unwrap();
    }

    #[test]
    fn endpoint_requires_registered_service() {
        let mut builder = RegistryBuilder::new();
        let err = builder
            .register_endpoint("ghost", EndpointDescriptor::new(Method::GET, "/x"))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::UnknownService { .. }));
    }

    #[test]
    fn sealed_registry_preserves_registration_order() {
        let mut builder = RegistryBuilder::new();
        let svc = builder.register_service(ServiceDescriptor::new("Svc"));
        builder
            .register_endpoint(&svc, EndpointDescriptor::new(Method::GET, "/a/{x}"))
            .unwrap();
        builder
            .register_endpoint(&svc, EndpointDescriptor::new(Method::GET, "/a/b"))
            .unwrap();
        let registry = builder.seal();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.endpoints()[0].signature, "/a/{}");
        assert_eq!(registry.endpoints()[1].signature, "/a/b");
    }
}
