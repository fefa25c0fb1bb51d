use crate::extractor::{normalize_path, HttpMethod, ParameterLocation, RouteDoc, JSON_MEDIA_TYPE};
use crate::metadata::GlobalMetadata;
use crate::registry::ModelRegistry;
use crate::schema_generator::{Schema, SchemaGenerator};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// OpenAPI document builder
///
/// Routes are added one at a time; problems that only affect part of a route are
/// recorded as [`Diagnostic`]s and the rest of the route is still emitted.
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    /// Paths collection (normalized path -> PathItem), in first-seen order
    paths: IndexMap<String, PathItem>,
    /// Security schemes referenced by any operation
    security_schemes: IndexMap<String, SecurityScheme>,
    diagnostics: Vec<Diagnostic>,
}

/// A recoverable problem found while assembling the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A request or response model is not in the registry
    MissingModel { handler: String, model: String },
    /// A path parameter whose `{name}` does not occur in the path
    UnmatchedPathParameter {
        handler: String,
        path: String,
        parameter: String,
    },
    /// A method without an operation slot
    UnsupportedMethod { handler: String, method: String },
    /// A second operation for the same path and method replaced the first
    DuplicateOperation {
        handler: String,
        path: String,
        method: HttpMethod,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingModel { handler, model } => {
                write!(f, "{}: model {} not found in registry", handler, model)
            }
            Diagnostic::UnmatchedPathParameter {
                handler,
                path,
                parameter,
            } => write!(
                f,
                "{}: path param '{}' not found in route path '{}', skipping",
                handler, parameter, path
            ),
            Diagnostic::UnsupportedMethod { handler, method } => {
                write!(f, "{}: unsupported HTTP method '{}', route skipped", handler, method)
            }
            Diagnostic::DuplicateOperation {
                handler,
                path,
                method,
            } => write!(
                f,
                "{}: replaces an existing {} operation on {}",
                handler, method, path
            ),
        }
    }
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

impl PathItem {
    /// The operation slot for `method`
    pub fn slot(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
        }
    }

    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
        }
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Parameters (path, query, header, cookie)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Status code -> response
    pub responses: IndexMap<String, Response>,
    /// One single-entry map per required scheme
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<IndexMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub deprecated: bool,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Parameter location (path, query, header, cookie)
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    pub schema: Schema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    /// Content types and their schemas
    pub content: IndexMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Schema,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, HeaderObject>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

/// OpenAPI Header object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    pub schema: Schema,
}

/// OpenAPI Security Scheme object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(rename = "bearerFormat", skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    /// Header name, for `apiKey` schemes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl SecurityScheme {
    /// HTTP bearer authentication with JWT tokens
    pub fn bearer_jwt() -> Self {
        Self {
            scheme_type: "http".to_string(),
            scheme: Some("bearer".to_string()),
            bearer_format: Some("JWT".to_string()),
            name: None,
            location: None,
        }
    }

    /// An API key carried in the named request header.
    ///
    /// Replaces the bearer scheme whenever a requirement names a header.
    pub fn api_key_header(header: &str) -> Self {
        Self {
            scheme_type: "apiKey".to_string(),
            scheme: None,
            bearer_format: None,
            name: Some(header.to_string()),
            location: Some("header".to_string()),
        }
    }
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Components {
    /// Schema definitions
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Schema>,
    #[serde(
        rename = "securitySchemes",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    pub info: Info,
    /// Normalized path -> operations
    pub paths: IndexMap<String, PathItem>,
    /// Components (schemas, security schemes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: Info {
                title: "Generated API".to_string(),
                version: "1.0.0".to_string(),
                description: None,
            },
            paths: IndexMap::new(),
            security_schemes: IndexMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Apply global metadata; empty fields keep their defaults
    pub fn with_metadata(mut self, metadata: &GlobalMetadata) -> Self {
        if !metadata.title.is_empty() {
            self.info.title = metadata.title.clone();
        }
        if !metadata.version.is_empty() {
            self.info.version = metadata.version.clone();
        }
        if !metadata.description.is_empty() {
            self.info.description = Some(metadata.description.clone());
        }
        self
    }

    /// Every recoverable problem recorded so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Add a route to the OpenAPI document
    pub fn add_route(
        &mut self,
        route: &RouteDoc,
        registry: &ModelRegistry,
        schema_gen: &mut SchemaGenerator,
    ) {
        let Some(method) = HttpMethod::parse(&route.method) else {
            self.report(Diagnostic::UnsupportedMethod {
                handler: route.handler_name.clone(),
                method: route.method.clone(),
            });
            return;
        };

        let path = normalize_path(&route.path);
        debug!("Adding route: {} {}", method, path);

        let parameters = self.build_parameters(route, &path);
        let request_body = self.build_request_body(route, registry, schema_gen);
        let responses = self.build_responses(route, registry, schema_gen);
        let security = self.build_security(route);

        let operation = Operation {
            summary: non_empty(&route.summary),
            description: non_empty(&route.description),
            operation_id: non_empty(&route.handler_name),
            tags: route.tags.clone(),
            parameters,
            request_body,
            responses,
            security,
            deprecated: route.deprecated,
        };

        let replaced = self
            .paths
            .entry(path.clone())
            .or_default()
            .slot(method)
            .replace(operation)
            .is_some();

        if replaced {
            self.report(Diagnostic::DuplicateOperation {
                handler: route.handler_name.clone(),
                path,
                method,
            });
        }
    }

    /// Parameters deduplicated by (location, name), first occurrence wins
    fn build_parameters(&mut self, route: &RouteDoc, path: &str) -> Vec<Parameter> {
        let mut seen = HashSet::new();
        let mut parameters = Vec::new();

        for param in &route.parameters {
            if !seen.insert((param.location, param.name.clone())) {
                debug!("Skipping duplicate parameter {}:{}", param.location, param.name);
                continue;
            }

            if param.location == ParameterLocation::Path
                && !path.contains(&format!("{{{}}}", param.name))
            {
                self.report(Diagnostic::UnmatchedPathParameter {
                    handler: route.handler_name.clone(),
                    path: path.to_string(),
                    parameter: param.name.clone(),
                });
                continue;
            }

            parameters.push(Parameter {
                name: param.name.clone(),
                location: param.location.to_string(),
                required: param.required,
                schema: Schema::primitive(&param.schema_type),
                description: non_empty(&param.description),
            });
        }

        parameters
    }

    /// Resolve `model` in the registry, registering its schema; `None` when missing
    fn model_schema(
        &mut self,
        route: &RouteDoc,
        model: &str,
        registry: &ModelRegistry,
        schema_gen: &mut SchemaGenerator,
    ) -> Option<Schema> {
        match registry.get(model) {
            Some(shape) => Some(schema_gen.register_model(model, shape)),
            None => {
                self.report(Diagnostic::MissingModel {
                    handler: route.handler_name.clone(),
                    model: model.to_string(),
                });
                None
            }
        }
    }

    fn build_request_body(
        &mut self,
        route: &RouteDoc,
        registry: &ModelRegistry,
        schema_gen: &mut SchemaGenerator,
    ) -> Option<RequestBody> {
        let body = route.request_body.as_ref()?;
        let schema = self.model_schema(route, &body.model, registry, schema_gen)?;

        let mut content = IndexMap::new();
        content.insert(media_type_or_json(&body.media_type), MediaType { schema });

        Some(RequestBody {
            description: non_empty(&body.description),
            required: body.required,
            content,
        })
    }

    fn build_responses(
        &mut self,
        route: &RouteDoc,
        registry: &ModelRegistry,
        schema_gen: &mut SchemaGenerator,
    ) -> IndexMap<String, Response> {
        let mut responses = IndexMap::new();

        for (status_code, doc) in &route.responses {
            let mut content = IndexMap::new();
            if !doc.model.is_empty() {
                let Some(schema) = self.model_schema(route, &doc.model, registry, schema_gen) else {
                    continue;
                };
                content.insert(media_type_or_json(&doc.media_type), MediaType { schema });
            }

            let headers = route
                .headers
                .iter()
                .filter(|header| &header.status_code == status_code)
                .map(|header| {
                    (
                        header.name.clone(),
                        HeaderObject {
                            description: non_empty(&header.description),
                            required: header.required,
                            schema: Schema::primitive(&header.schema_type),
                        },
                    )
                })
                .collect();

            let description = if doc.description.is_empty() {
                "Response".to_string()
            } else {
                doc.description.clone()
            };

            responses.insert(
                status_code.clone(),
                Response {
                    description,
                    headers,
                    content,
                },
            );
        }

        if responses.is_empty() {
            responses.insert(
                "200".to_string(),
                Response {
                    description: "OK".to_string(),
                    headers: IndexMap::new(),
                    content: IndexMap::new(),
                },
            );
        }

        responses
    }

    /// Distinct scheme names in route order; new names are added to components
    fn build_security(&mut self, route: &RouteDoc) -> Vec<IndexMap<String, Vec<String>>> {
        let mut seen = HashSet::new();
        let mut security = Vec::new();

        for requirement in &route.security {
            if !seen.insert(requirement.scheme.as_str()) {
                continue;
            }

            if !self.security_schemes.contains_key(&requirement.scheme) {
                let scheme = match &requirement.header {
                    Some(header) => SecurityScheme::api_key_header(header),
                    None => SecurityScheme::bearer_jwt(),
                };
                debug!("Adding security scheme {}", requirement.scheme);
                self.security_schemes.insert(requirement.scheme.clone(), scheme);
            }

            let mut entry = IndexMap::new();
            entry.insert(requirement.scheme.clone(), Vec::new());
            security.push(entry);
        }

        security
    }

    /// Build the final OpenAPI document
    pub fn build(self, schema_gen: SchemaGenerator) -> OpenApiDocument {
        debug!("Building final OpenAPI document");

        let schemas = schema_gen.into_schemas();
        let components = if schemas.is_empty() && self.security_schemes.is_empty() {
            None
        } else {
            Some(Components {
                schemas,
                security_schemes: self.security_schemes,
            })
        };

        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: self.info,
            paths: self.paths,
            components,
        }
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn media_type_or_json(media_type: &str) -> String {
    if media_type.is_empty() {
        JSON_MEDIA_TYPE.to_string()
    } else {
        media_type.to_string()
    }
}
