//! # Endpoint Module
//!
//! Typed descriptions of registered endpoints: the parameter model, declared
//! payload shapes, service-level metadata, and the immutable
//! [`EndpointSignature`] built by parsing a path template at registration
//! time.
//!
//! A template uses `{name}` placeholders for single path parameters and a
//! trailing `{name...}` placeholder for a variable-length slot that absorbs
//! all remaining path segments. Query parameters are declared after a `?`:
//!
//! ```text
//! /orders/{id}
//! /orders/{id}/items/{item}
//! /files/{path...}
//! /search?{q}&{limit}
//! ```

mod build;
mod types;

pub use build::TemplateError;
pub(crate) use build::parse_template;
pub use types::{
    EndpointDescriptor, EndpointSignature, Param, PayloadShape, ServiceDescriptor, ServiceMeta,
};
