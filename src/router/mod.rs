//! # Router Module
//!
//! Path matching and route resolution over a sealed [`EndpointRegistry`].
//!
//! The router scans registered endpoint signatures in registration order and
//! returns the first whose segment classes match the request: static segments
//! must match literally at their positions, fixed-length signatures must
//! match the segment count exactly, and a variable-length signature binds
//! every segment from its parameter position onward to the trailing
//! parameter. Scanning in registration order makes the tie-break between
//! overlapping shapes (e.g. `/a/{x}` vs `/a/b`) deterministic: the first
//! registered endpoint wins.
//!
//! The router never decodes percent-escapes; the serving entry point decodes
//! the whole request URI before resolution.
//!
//! [`EndpointRegistry`]: crate::registry::EndpointRegistry

mod core;

pub use core::{ParamVec, RouteMatch, Router, MAX_INLINE_PARAMS, XSRF_TOKEN_PARAM};
