//! # restmux
//!
//! **restmux** is a REST endpoint multiplexer: it turns application-defined
//! handler capabilities into HTTP-addressable endpoints, resolves incoming
//! requests to exactly one registered endpoint, extracts path and query
//! parameters, and finalizes the response envelope according to HTTP-method
//! conventions.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`endpoint`]** - Endpoint signatures, parameter model, and path-template parsing
//! - **[`registry`]** - Two-phase endpoint registry (open for registration, sealed for serving)
//! - **[`router`]** - Path matching and route resolution over the sealed registry
//! - **[`dispatcher`]** - Handler capability trait and per-request dispatch
//! - **[`marshal`]** - Pluggable payload marshallers keyed by MIME type
//! - **[`context`]** - Per-request state bridging resolution, invocation, and finalization
//! - **[`server`]** - Response state machine and the serving entry point
//!
//! ## Request Handling Flow
//!
//! A request enters through [`server::RestService::serve`]:
//!
//! 1. The full request URI is percent-decoded; a malformed escape is answered
//!    with `400` before any matching happens.
//! 2. The router scans the sealed registry in registration order and binds
//!    path segments and declared query parameters; no match is a `404`.
//! 3. The dispatcher invokes the handler registered under the endpoint's
//!    service name and handler index, which populates the request context.
//! 4. The response state machine writes content-type, status, and body to the
//!    caller-supplied sink in HTTP wire order, applying per-method defaults
//!    (`202` for POST, `200` otherwise).
//!
//! ## Quick Start
//!
//! ```no_run
//! use restmux::context::{RequestContext, RestStatus};
//! use restmux::endpoint::{EndpointDescriptor, ServiceDescriptor};
//! use restmux::server::{BufferedResponse, RestServiceBuilder};
//! use http::Method;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = RestServiceBuilder::new();
//! let svc = builder.register_service_on_path("/store", ServiceDescriptor::new("OrderService"));
//! builder.register_endpoint(&svc, EndpointDescriptor::new(Method::GET, "/orders/{id}"))?;
//! builder.register_handler(&svc, 0, Arc::new(|ctx: &mut RequestContext| {
//!     let id = ctx.get_path_param("id").unwrap_or_default().to_string();
//!     (Some(serde_json::json!({ "id": id })), RestStatus::ok())
//! }));
//! let service = builder.seal();
//!
//! // The sink is supplied by the surrounding transport layer.
//! let mut sink = BufferedResponse::default();
//! service.serve("GET", "/store/orders/42?verbose=1", &mut sink);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency Model
//!
//! restmux performs no internal threading and no I/O. Registries are populated
//! during a single-threaded registration phase and sealed before serving; the
//! sealed registry is immutable and safely shared across request tasks. The
//! per-request context is owned by one request for its entire lifetime.

pub mod context;
pub mod dispatcher;
pub mod endpoint;
pub mod marshal;
pub mod registry;
pub mod router;
pub mod server;

pub use context::{RequestContext, RestStatus};
pub use dispatcher::{Dispatcher, Handler};
pub use endpoint::{
    EndpointDescriptor, EndpointSignature, Param, PayloadShape, ServiceDescriptor, ServiceMeta,
};
pub use marshal::{JsonMarshaller, MarshalError, Marshaller, MarshallerRegistry, APPLICATION_JSON};
pub use registry::{EndpointRegistry, RegistrationError, RegistryBuilder};
pub use router::{ParamVec, RouteMatch, Router};
pub use server::{
    BufferedResponse, ResponseSink, RestService, RestServiceBuilder, BAD_REQUEST_BODY,
    NOT_FOUND_BODY,
};
