use std::collections::HashMap;
use std::fmt;

use super::types::Param;

/// Error raised while parsing an endpoint path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A `{}` or `{...}` placeholder with no name.
    EmptyParamName { template: String },
    /// The same parameter name declared twice in one template.
    DuplicateParamName { template: String, name: String },
    /// A `{name...}` slot that is not the final path segment.
    VariableSlotNotLast { template: String },
    /// A `{name...}` slot combined with other path parameters.
    ///
    /// Every segment after the last static segment belongs to the single
    /// trailing variable-length parameter, so no other slot can coexist.
    VariableSlotNotAlone { template: String },
    /// A query declaration that is not of the form `{name}`.
    MalformedQueryDeclaration { template: String, declaration: String },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::EmptyParamName { template } => {
                write!(f, "template '{}': parameter placeholder has no name", template)
            }
            TemplateError::DuplicateParamName { template, name } => {
                write!(
                    f,
                    "template '{}': parameter '{}' declared more than once",
                    template, name
                )
            }
            TemplateError::VariableSlotNotLast { template } => {
                write!(
                    f,
                    "template '{}': variable-length slot must be the final path segment",
                    template
                )
            }
            TemplateError::VariableSlotNotAlone { template } => {
                write!(
                    f,
                    "template '{}': variable-length slot cannot be combined with other path parameters",
                    template
                )
            }
            TemplateError::MalformedQueryDeclaration { template, declaration } => {
                write!(
                    f,
                    "template '{}': query declaration '{}' must be of the form {{name}}",
                    template, declaration
                )
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// Segment classes and parameter slots extracted from one path template.
#[derive(Debug, Clone)]
pub(crate) struct ParsedTemplate {
    pub static_segments: HashMap<usize, String>,
    pub params: Vec<Param>,
    pub query_params: Vec<Param>,
    pub variable_length: bool,
    pub signature: String,
    pub segment_count: usize,
}

/// Parse a path template against a normalized service root.
///
/// The canonical signature string is derived at the same time: literal text
/// for static segments, `{}` for a parameter slot, `{...}` for the trailing
/// variable-length slot. Two templates with the same canonical string are the
/// same route shape as far as the registry is concerned.
pub(crate) fn parse_template(root: &str, template: &str) -> Result<ParsedTemplate, TemplateError> {
    let (path_part, query_part) = match template.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (template, None),
    };

    let full = format!("{}/{}", root, path_part.trim_start_matches('/'));
    let segments: Vec<&str> = full.split('/').filter(|s| !s.is_empty()).collect();

    let mut static_segments = HashMap::new();
    let mut params: Vec<Param> = Vec::new();
    let mut canonical: Vec<String> = Vec::with_capacity(segments.len());
    let mut variable_length = false;

    for (position, segment) in segments.iter().enumerate() {
        if variable_length {
            // Something follows the {name...} slot.
            return Err(TemplateError::VariableSlotNotLast {
                template: template.to_string(),
            });
        }
        if segment.starts_with('{') && segment.ends_with('}') {
            let inner = &segment[1..segment.len() - 1];
            let (name, is_variable) = match inner.strip_suffix("...") {
                Some(stripped) => (stripped, true),
                None => (inner, false),
            };
            if name.is_empty() {
                return Err(TemplateError::EmptyParamName {
                    template: template.to_string(),
                });
            }
            if params.iter().any(|p| p.name == name) {
                return Err(TemplateError::DuplicateParamName {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }
            if is_variable && !params.is_empty() {
                return Err(TemplateError::VariableSlotNotAlone {
                    template: template.to_string(),
                });
            }
            variable_length = is_variable;
            params.push(Param {
                name: name.to_string(),
                position,
            });
            canonical.push(if is_variable { "{...}" } else { "{}" }.to_string());
        } else {
            static_segments.insert(position, segment.to_string());
            canonical.push(segment.to_string());
        }
    }

    let mut query_params: Vec<Param> = Vec::new();
    if let Some(query) = query_part {
        for (position, declaration) in query.split('&').enumerate() {
            let declaration = declaration.trim();
            let name = declaration
                .strip_prefix('{')
                .and_then(|d| d.strip_suffix('}'))
                .filter(|n| !n.is_empty() && !n.ends_with("..."))
                .ok_or_else(|| TemplateError::MalformedQueryDeclaration {
                    template: template.to_string(),
                    declaration: declaration.to_string(),
                })?;
            if query_params.iter().any(|p| p.name == name) {
                return Err(TemplateError::DuplicateParamName {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }
            query_params.push(Param {
                name: name.to_string(),
                position,
            });
        }
    }

    let signature = if canonical.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", canonical.join("/"))
    };

    Ok(ParsedTemplate {
        static_segments,
        params,
        query_params,
        variable_length,
        segment_count: segments.len(),
        signature,
    })
}
