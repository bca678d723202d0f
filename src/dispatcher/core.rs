use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::context::{RequestContext, RestStatus};
use crate::router::RouteMatch;

/// Capability interface for application handlers.
///
/// The handler reads its arguments from the context, may set an explicit
/// response code or content type on it, and returns the payload value
/// (marshalled downstream) together with a [`RestStatus`] outcome.
pub trait Handler: Send + Sync {
    fn invoke(&self, ctx: &mut RequestContext) -> (Option<Value>, RestStatus);
}

impl<F> Handler for F
where
    F: Fn(&mut RequestContext) -> (Option<Value>, RestStatus) + Send + Sync,
{
    fn invoke(&self, ctx: &mut RequestContext) -> (Option<Value>, RestStatus) {
        self(ctx)
    }
}

/// Routes resolved requests to registered handler capabilities.
///
/// Handlers are keyed by the owning service name and the signature's handler
/// index, mirroring how endpoint signatures refer to their implementation.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<(String, usize), Arc<dyn Handler>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under `(service, index)`.
    ///
    /// Re-registering the same key replaces the previous handler.
    pub fn register_handler(&mut self, service: &str, index: usize, handler: Arc<dyn Handler>) {
        let key = (service.to_string(), index);
        if self.handlers.insert(key, handler).is_some() {
            warn!(
                service = service,
                handler_index = index,
                "Replaced existing handler"
            );
        } else {
            debug!(
                service = service,
                handler_index = index,
                total_handlers = self.handlers.len(),
                "Handler registered"
            );
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Invoke the handler for a resolved endpoint, populating the context.
    ///
    /// A missing handler is reported as a 500 [`RestStatus`] rather than a
    /// panic; registration mistakes surface at the first request against the
    /// affected endpoint.
    #[must_use]
    pub fn dispatch(
        &self,
        route_match: &RouteMatch,
        ctx: &mut RequestContext,
    ) -> (Option<Value>, RestStatus) {
        let endpoint = &route_match.endpoint;
        let key = (endpoint.service_name.clone(), endpoint.handler_index);
        let Some(handler) = self.handlers.get(&key) else {
            error!(
                service = %endpoint.service_name,
                handler_index = endpoint.handler_index,
                "Handler not found - CRITICAL"
            );
            return (
                None,
                RestStatus::new(500, "Handler not registered for resolved endpoint."),
            );
        };

        info!(
            service = %endpoint.service_name,
            handler_index = endpoint.handler_index,
            signature = %endpoint.signature,
            "Request dispatched to handler"
        );
        let (value, status) = handler.invoke(ctx);
        debug!(
            service = %endpoint.service_name,
            handler_index = endpoint.handler_index,
            status = status.code,
            "Handler returned"
        );
        (value, status)
    }
}
