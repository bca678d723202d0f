use http::Method;
use tracing::error;

use crate::context::{RequestContext, RestStatus};
use crate::endpoint::{EndpointSignature, ServiceMeta};

/// Minimal response surface the state machine drives.
///
/// Implementations must honor HTTP wire order: headers and status are
/// written before body bytes, and the state machine calls them in that
/// order. A sink that receives body bytes without a prior status should
/// treat the response as an implicit 200.
pub trait ResponseSink {
    fn header(&mut self, name: &str, value: &str);
    fn status_code(&mut self, code: u16);
    fn write_body(&mut self, bytes: &[u8]);
}

/// An in-memory [`ResponseSink`] that buffers the finalized response.
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<u16>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl BufferedResponse {
    /// The written status code; body bytes without an explicit status imply
    /// 200.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status.unwrap_or(200)
    }

    /// Get a written header by name (case-insensitive).
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl ResponseSink for BufferedResponse {
    fn header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn status_code(&mut self, code: u16) {
        self.status = Some(code);
    }

    fn write_body(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }
}

/// Reason phrase for common status codes.
#[must_use]
pub fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

/// Default response code when the handler does not set one explicitly:
/// 202 for POST, 200 for GET, PUT, DELETE, HEAD, OPTIONS and any
/// unrecognized method.
#[must_use]
pub fn default_response_code(method: &Method) -> u16 {
    if *method == Method::POST {
        202
    } else {
        200
    }
}

fn write_content_type(sink: &mut dyn ResponseSink, ctx: &RequestContext, service: &ServiceMeta) {
    match ctx.content_type() {
        Some(mime) => sink.header("Content-Type", mime),
        None => sink.header("Content-Type", &service.produces),
    }
}

/// Finalize one response: decide status code, content-type header, and body
/// writes from the populated context and the endpoint's method.
///
/// Evaluated once per request. A non-200 [`RestStatus`] short-circuits: its
/// code is written and its reason becomes the body, without consulting the
/// context or method rules. Otherwise GET responses fall back to the owning
/// service's `produces` MIME type when the handler did not set a
/// content-type, and flush the marshalled payload unless the handler asked
/// to override the default write; the other methods only ever write a
/// status (plus whatever raw bytes the handler produced itself).
pub fn finalize_response(
    sink: &mut dyn ResponseSink,
    ctx: &RequestContext,
    endpoint: &EndpointSignature,
    service: &ServiceMeta,
    status: &RestStatus,
    payload: &[u8],
    raw_path: &str,
) {
    if !status.is_ok() {
        error!(
            code = status.code,
            reason = %status.reason,
            path = raw_path,
            "Problem with request"
        );
        sink.status_code(status.code);
        sink.write_body(status.reason.as_bytes());
        return;
    }

    if endpoint.method == Method::GET {
        if ctx.response_code == 0 {
            write_content_type(sink, ctx, service);
            sink.status_code(default_response_code(&endpoint.method));
        } else if !ctx.body_written() {
            write_content_type(sink, ctx, service);
            sink.status_code(ctx.response_code);
        }
        if ctx.body_written() {
            sink.write_body(ctx.raw_body());
        }
        if !ctx.override_default_write {
            sink.write_body(payload);
        }
    } else {
        // POST, PUT, DELETE, HEAD, OPTIONS and extension methods: no
        // payload is forced; the handler's own bytes are flushed as-is.
        if ctx.response_code == 0 {
            if let Some(mime) = ctx.content_type() {
                sink.header("Content-Type", mime);
            }
            sink.status_code(default_response_code(&endpoint.method));
        } else if !ctx.body_written() {
            if let Some(mime) = ctx.content_type() {
                sink.header("Content-Type", mime);
            }
            sink.status_code(ctx.response_code);
        }
        if ctx.body_written() {
            sink.write_body(ctx.raw_body());
        }
    }
}
