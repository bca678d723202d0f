#![allow(dead_code)]

use restmux::context::{RequestContext, RestStatus};
use restmux::endpoint::{EndpointDescriptor, PayloadShape, ServiceDescriptor};
use restmux::server::{ResponseSink, RestService, RestServiceBuilder};
use http::Method;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One write call observed by the sink, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Header(String, String),
    Status(u16),
    Body(Vec<u8>),
}

/// A sink that records every call for asserting wire order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn status(&self) -> Option<u16> {
        self.events.iter().find_map(|e| match e {
            SinkEvent::Status(code) => Some(*code),
            _ => None,
        })
    }

    pub fn body_string(&self) -> String {
        let bytes: Vec<u8> = self
            .events
            .iter()
            .flat_map(|e| match e {
                SinkEvent::Body(bytes) => bytes.clone(),
                _ => Vec::new(),
            })
            .collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl ResponseSink for RecordingSink {
    fn header(&mut self, name: &str, value: &str) {
        self.events
            .push(SinkEvent::Header(name.to_string(), value.to_string()));
    }

    fn status_code(&mut self, code: u16) {
        self.events.push(SinkEvent::Status(code));
    }

    fn write_body(&mut self, bytes: &[u8]) {
        self.events.push(SinkEvent::Body(bytes.to_vec()));
    }
}

/// Number of handler invocations across a fixture service, for asserting
/// that failure paths never reach a handler.
pub type HandlerHits = Arc<AtomicUsize>;

/// Build the store fixture used across the integration tests:
///
/// - `OrderService` on `/store`: GET/PUT/DELETE `/orders/{id}`,
///   POST `/orders`, GET `/search?{q}&{limit}`
/// - `FileService` at the root: GET `/files/{path...}`
pub fn build_store_service() -> (RestService, HandlerHits) {
    init_tracing();
    let hits: HandlerHits = Arc::new(AtomicUsize::new(0));
    let mut builder = RestServiceBuilder::new();

    let orders =
        builder.register_service_on_path("/store", ServiceDescriptor::new("OrderService"));
    builder
        .register_endpoint(
            &orders,
            EndpointDescriptor::new(Method::GET, "/orders/{id}").handler_index(0),
        )
        .unwrap();
    builder
        .register_endpoint(
            &orders,
            EndpointDescriptor::new(Method::PUT, "/orders/{id}").handler_index(1),
        )
        .unwrap();
    builder
        .register_endpoint(
            &orders,
            EndpointDescriptor::new(Method::DELETE, "/orders/{id}").handler_index(2),
        )
        .unwrap();
    builder
        .register_endpoint(
            &orders,
            EndpointDescriptor::new(Method::POST, "/orders").handler_index(3),
        )
        .unwrap();
    builder
        .register_endpoint(
            &orders,
            EndpointDescriptor::new(Method::GET, "/search?{q}&{limit}").handler_index(4),
        )
        .unwrap();

    let counted = |hits: &HandlerHits| {
        let hits = hits.clone();
        move || hits.fetch_add(1, Ordering::SeqCst)
    };

    let tick = counted(&hits);
    builder.register_handler(
        &orders,
        0,
        Arc::new(move |ctx: &mut RequestContext| {
            tick();
            let id = ctx.get_path_param("id").unwrap_or_default().to_string();
            (Some(json!({ "id": id })), RestStatus::ok())
        }),
    );
    let tick = counted(&hits);
    builder.register_handler(
        &orders,
        1,
        Arc::new(move |_ctx: &mut RequestContext| {
            tick();
            (None, RestStatus::ok())
        }),
    );
    let tick = counted(&hits);
    builder.register_handler(
        &orders,
        2,
        Arc::new(move |_ctx: &mut RequestContext| {
            tick();
            (None, RestStatus::ok())
        }),
    );
    let tick = counted(&hits);
    builder.register_handler(
        &orders,
        3,
        Arc::new(move |_ctx: &mut RequestContext| {
            tick();
            (None, RestStatus::ok())
        }),
    );
    let tick = counted(&hits);
    builder.register_handler(
        &orders,
        4,
        Arc::new(move |ctx: &mut RequestContext| {
            tick();
            let q = ctx.get_query_param("q").unwrap_or_default().to_string();
            let limit = ctx.get_query_param("limit").unwrap_or_default().to_string();
            (Some(json!({ "q": q, "limit": limit })), RestStatus::ok())
        }),
    );

    let files = builder.register_service(ServiceDescriptor::new("FileService"));
    builder
        .register_endpoint(
            &files,
            EndpointDescriptor::new(Method::GET, "/files/{path...}")
                .output_shape(PayloadShape::List)
                .handler_index(0),
        )
        .unwrap();
    let tick = counted(&hits);
    builder.register_handler(
        &files,
        0,
        Arc::new(move |ctx: &mut RequestContext| {
            tick();
            let parts: Vec<String> = ctx
                .path_param_values("path")
                .into_iter()
                .map(str::to_string)
                .collect();
            (Some(json!(parts)), RestStatus::ok())
        }),
    );

    (builder.seal(), hits)
}
