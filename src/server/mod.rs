//! # Server Module
//!
//! The serving entry point and the response state machine. This module does
//! not implement transport: the surrounding network layer parses HTTP and
//! hands [`RestService::serve`] a method, the full request URI, and a
//! [`ResponseSink`] to drive. The state machine guarantees HTTP wire order:
//! content-type and status are written before any body bytes.

mod response;
mod service;

pub use response::{
    default_response_code, finalize_response, status_reason, BufferedResponse, ResponseSink,
};
pub use service::{
    unescape_uri, RestService, RestServiceBuilder, UriDecodeError, BAD_REQUEST_BODY,
    NOT_FOUND_BODY,
};
