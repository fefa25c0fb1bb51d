//! Route extraction from annotated handler functions.
//!
//! Every `fn` carrying doc comments is a candidate handler. Its directive lines
//! (`@Summary`, `@Router`, `@Param`, ...) are parsed by [`annotations`] into a [`RouteDoc`];
//! categories the directives leave empty are then filled by [`inference`] from the shape of
//! the function body.
//!
//! # Example
//!
//! ```no_run
//! use openapi_from_annotations::conventions::Conventions;
//! use openapi_from_annotations::extractor::{AnnotationExtractor, RouteExtractor};
//! use openapi_from_annotations::parser::AstParser;
//! use std::path::Path;
//!
//! let parsed = AstParser::parse_file(Path::new("src/handlers.rs")).unwrap();
//! let extractor = AnnotationExtractor::new(Conventions::default());
//! let routes = extractor.extract_routes(&[parsed]);
//! println!("Found {} routes", routes.len());
//! ```

pub mod annotations;
pub mod inference;

use crate::conventions::Conventions;
use crate::parser::ParsedFile;
use indexmap::IndexMap;
use log::debug;
use std::fmt;

/// Media type used when a directive does not name one.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Trait for extracting route records from parsed Rust files.
pub trait RouteExtractor {
    /// Extracts all route records from parsed Rust files, in source order.
    fn extract_routes(&self, parsed_files: &[ParsedFile]) -> Vec<RouteDoc>;
}

/// Everything known about one documented handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteDoc {
    /// Name of the handler function, used as the operation id
    pub handler_name: String,
    pub summary: String,
    pub description: String,
    /// HTTP method as written in the `@Router` directive, brackets stripped
    pub method: String,
    /// Path with `{name}` placeholders
    pub path: String,
    pub tags: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<RequestBody>,
    /// Status code -> response. A later directive for the same code replaces the earlier one.
    pub responses: IndexMap<String, ResponseDoc>,
    /// Response headers, each tagged with the status code it belongs to
    pub headers: Vec<Header>,
    pub security: Vec<SecurityRequirement>,
    pub deprecated: bool,
}

impl RouteDoc {
    /// Create an empty record for the named handler
    pub fn new(handler_name: impl Into<String>) -> Self {
        Self {
            handler_name: handler_name.into(),
            ..Default::default()
        }
    }

    /// A route is only usable once both `@Router` halves are known.
    pub fn is_routable(&self) -> bool {
        !self.path.is_empty() && !self.method.is_empty()
    }
}

/// A request parameter declared by `@Param` or inferred from an accessor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    /// Primitive schema type name (`string`, `integer`, ...)
    pub schema_type: String,
    pub description: String,
}

impl Parameter {
    /// Create a new Parameter
    pub fn new(
        name: impl Into<String>,
        location: ParameterLocation,
        schema_type: impl Into<String>,
        required: bool,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            required,
            schema_type: schema_type.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// The location where a parameter value is carried in an HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    /// Path segment (e.g., `/users/{id}`)
    Path,
    /// Query string (e.g., `?page=1`)
    Query,
    /// HTTP header
    Header,
    /// Cookie
    Cookie,
}

impl ParameterLocation {
    /// Parse the location token of a `@Param` directive
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body declared by `@RequestBody` or inferred from a body-binding call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    pub model: String,
    pub required: bool,
    pub media_type: String,
    pub description: String,
}

impl RequestBody {
    /// A JSON body of the given model
    pub fn json(model: impl Into<String>, required: bool) -> Self {
        Self {
            model: model.into(),
            required,
            media_type: JSON_MEDIA_TYPE.to_string(),
            description: String::new(),
        }
    }
}

/// One entry of a route's responses map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDoc {
    /// Model name; empty for responses without a body schema
    pub model: String,
    pub media_type: String,
    pub description: String,
}

impl ResponseDoc {
    pub fn new(model: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            media_type: JSON_MEDIA_TYPE.to_string(),
            description: description.into(),
        }
    }
}

/// A response header scoped to one status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub status_code: String,
    pub name: String,
    pub schema_type: String,
    pub required: bool,
    pub description: String,
}

/// A security scheme a route requires, optionally bound to a custom header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRequirement {
    pub scheme: String,
    pub header: Option<String>,
}

impl SecurityRequirement {
    /// Parses `Name`, `Name[Header]` or `Name:Header`.
    ///
    /// Returns `None` when no scheme name is present.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        let (scheme, header) = if let Some((scheme, rest)) = text.split_once('[') {
            (scheme, Some(rest.trim_end_matches(']')))
        } else if let Some((scheme, header)) = text.split_once(':') {
            (scheme, Some(header))
        } else {
            (text, None)
        };

        let scheme = scheme.trim();
        if scheme.is_empty() {
            return None;
        }

        let header = header
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string);

        Some(Self {
            scheme: scheme.to_string(),
            header,
        })
    }
}

/// HTTP methods that have an operation slot in a path item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    /// Parse a method name case-insensitively
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_lowercase().as_str() {
            "get" => Some(Self::Get),
            "post" => Some(Self::Post),
            "put" => Some(Self::Put),
            "delete" => Some(Self::Delete),
            "patch" => Some(Self::Patch),
            "options" => Some(Self::Options),
            "head" => Some(Self::Head),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert positional path markers (`:id`, `*rest`) to OpenAPI `{id}` placeholders.
///
/// Already-named placeholders are left untouched.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if let Some(name) = segment.strip_prefix(':').or_else(|| segment.strip_prefix('*')) {
                if !name.is_empty() {
                    return format!("{{{}}}", name);
                }
            }
            segment.to_string()
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Extracts routes from the doc comments of every function in the parsed files.
pub struct AnnotationExtractor {
    conventions: Conventions,
}

impl AnnotationExtractor {
    pub fn new(conventions: Conventions) -> Self {
        Self { conventions }
    }

    fn collect_items<'a>(&self, items: &'a [syn::Item], out: &mut Vec<HandlerFn<'a>>) {
        for item in items {
            match item {
                syn::Item::Fn(item_fn) => out.push(HandlerFn {
                    attrs: &item_fn.attrs,
                    sig: &item_fn.sig,
                    body: Some(&item_fn.block),
                }),
                syn::Item::Impl(item_impl) => {
                    for impl_item in &item_impl.items {
                        if let syn::ImplItem::Fn(method) = impl_item {
                            out.push(HandlerFn {
                                attrs: &method.attrs,
                                sig: &method.sig,
                                body: Some(&method.block),
                            });
                        }
                    }
                }
                syn::Item::Trait(item_trait) => {
                    for trait_item in &item_trait.items {
                        if let syn::TraitItem::Fn(method) = trait_item {
                            out.push(HandlerFn {
                                attrs: &method.attrs,
                                sig: &method.sig,
                                body: method.default.as_ref(),
                            });
                        }
                    }
                }
                syn::Item::Mod(item_mod) if !is_cfg_test(&item_mod.attrs) => {
                    if let Some((_, nested)) = &item_mod.content {
                        self.collect_items(nested, out);
                    }
                }
                _ => {}
            }
        }
    }

    fn extract_handler(&self, handler: &HandlerFn<'_>) -> Option<RouteDoc> {
        let lines = annotations::doc_lines(handler.attrs);
        if lines.is_empty() {
            return None;
        }

        let name = handler.sig.ident.to_string();
        let mut route = annotations::parse_directives(&name, &lines);

        if !route.is_routable() {
            debug!("Skipping {}: no complete @Router directive", name);
            return None;
        }

        if let Some(body) = handler.body {
            inference::CodeShapeInference::new(&self.conventions).apply(&mut route, handler.sig, body);
        }

        Some(route)
    }
}

impl Default for AnnotationExtractor {
    fn default() -> Self {
        Self::new(Conventions::default())
    }
}

impl RouteExtractor for AnnotationExtractor {
    fn extract_routes(&self, parsed_files: &[ParsedFile]) -> Vec<RouteDoc> {
        let mut routes = Vec::new();

        for parsed_file in parsed_files {
            let mut handlers = Vec::new();
            self.collect_items(&parsed_file.syntax_tree.items, &mut handlers);

            for handler in &handlers {
                if let Some(route) = self.extract_handler(handler) {
                    debug!(
                        "Extracted route {} {} from {}",
                        route.method,
                        route.path,
                        parsed_file.path.display()
                    );
                    routes.push(route);
                }
            }
        }

        routes
    }
}

/// A function-like declaration that may carry directives
struct HandlerFn<'a> {
    attrs: &'a [syn::Attribute],
    sig: &'a syn::Signature,
    body: Option<&'a syn::Block>,
}

pub(crate) fn is_cfg_test(attrs: &[syn::Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && attr
                .parse_args::<syn::Ident>()
                .map(|ident| ident == "test")
                .unwrap_or(false)
    })
}
