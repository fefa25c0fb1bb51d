//! OpenAPI from Annotations - OpenAPI 3.0 documents from directive comments in Rust services.
//!
//! Handler functions are documented with directive lines in their doc comments:
//!
//! ```text
//! /// @Summary Create widget
//! /// @Tags widgets
//! /// @RequestBody {object} Widget true "payload"
//! /// @Success 201 {object} Widget "Created"
//! /// @Security BearerAuth
//! /// @Router /widgets [post]
//! pub async fn create_widget(ctx: &mut Context) { ... }
//! ```
//!
//! Whatever the directives leave out (parameters, response headers, request body,
//! responses) is inferred from how the body uses its request context, e.g.
//! `ctx.param("id")` or `ctx.json(200, resp)`. Model names are resolved through a
//! [`registry::ModelRegistry`] filled by the caller before generation.
//!
//! # Architecture
//!
//! 1. [`metadata`] - Reads title, version and description from an entry file
//! 2. [`scanner`] - Recursively scans a source tree for non-test Rust files
//! 3. [`parser`] - Parses Rust source files into syntax trees
//! 4. [`extractor`] - Parses directives and infers missing route metadata
//! 5. [`registry`], [`reflect`], [`type_resolver`] - Model names and their static shapes
//! 6. [`schema_generator`] - Converts model shapes to component schemas
//! 7. [`openapi_builder`] - Assembles the document and records diagnostics
//! 8. [`serializer`], [`viewer`] - JSON/YAML output and the Swagger UI page
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_annotations::{generate, GenerateOptions};
//! use openapi_from_annotations::reflect::{FieldShape, Shape};
//! use openapi_from_annotations::registry::ModelRegistry;
//! use openapi_from_annotations::serializer::serialize_json;
//!
//! let mut registry = ModelRegistry::new();
//! registry.register_shape(
//!     "Widget",
//!     Shape::structure("Widget", || vec![FieldShape::new("name", Shape::String).rename("name")]),
//! );
//!
//! let options = GenerateOptions::new("./my-service/src").with_entry("./my-service/src/main.rs");
//! let generation = generate(&options, &registry).unwrap();
//!
//! for diagnostic in &generation.diagnostics {
//!     eprintln!("warning: {}", diagnostic);
//! }
//! println!("{}", serialize_json(&generation.document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod conventions;
pub mod error;
pub mod extractor;
pub mod metadata;
pub mod openapi_builder;
pub mod parser;
pub mod reflect;
pub mod registry;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
pub mod type_resolver;
pub mod viewer;

use conventions::Conventions;
use extractor::{AnnotationExtractor, RouteDoc, RouteExtractor};
use log::{debug, info};
use metadata::GlobalMetadata;
use openapi_builder::{Diagnostic, OpenApiBuilder, OpenApiDocument};
use parser::AstParser;
use registry::ModelRegistry;
use scanner::FileScanner;
use schema_generator::SchemaGenerator;
use std::path::PathBuf;
use type_resolver::TypeResolver;

/// Inputs of one generation run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Directory scanned for handler files
    pub root: PathBuf,
    /// File whose leading comments carry `@GlobalTitle` and friends
    pub entry: Option<PathBuf>,
    /// Accessor names recognised by inference
    pub conventions: Conventions,
    /// Also register every struct defined in the scanned sources
    pub derive_models: bool,
}

impl GenerateOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entry: None,
            conventions: Conventions::default(),
            derive_models: false,
        }
    }

    pub fn with_entry(mut self, entry: impl Into<PathBuf>) -> Self {
        self.entry = Some(entry.into());
        self
    }

    pub fn with_conventions(mut self, conventions: Conventions) -> Self {
        self.conventions = conventions;
        self
    }

    pub fn with_derived_models(mut self, derive_models: bool) -> Self {
        self.derive_models = derive_models;
        self
    }
}

/// Result of a generation run
#[derive(Debug, Clone)]
pub struct Generation {
    pub document: OpenApiDocument,
    /// Recoverable problems, in the order they were found
    pub diagnostics: Vec<Diagnostic>,
    /// The route records the document was built from
    pub routes: Vec<RouteDoc>,
}

/// Scan, extract, infer and assemble one document.
///
/// # Errors
///
/// Fails on the first filesystem error while scanning or reading, and on the first
/// source file that does not parse. Everything else is reported in
/// [`Generation::diagnostics`].
pub fn generate(options: &GenerateOptions, registry: &ModelRegistry) -> error::Result<Generation> {
    let metadata = options
        .entry
        .as_deref()
        .map(GlobalMetadata::read)
        .unwrap_or_default();

    let scan_result = FileScanner::new(options.root.clone()).scan()?;
    info!(
        "Found {} Rust files ({} test files skipped)",
        scan_result.rust_files.len(),
        scan_result.skipped_tests.len()
    );

    let parsed_files = AstParser::parse_files(&scan_result.rust_files)?;

    let extractor = AnnotationExtractor::new(options.conventions.clone());
    let routes = extractor.extract_routes(&parsed_files);
    info!("Extracted {} routes", routes.len());

    let derived;
    let registry = if options.derive_models {
        let mut merged = registry.clone();
        merged.extend_from(&TypeResolver::new(&parsed_files));
        derived = merged;
        &derived
    } else {
        registry
    };

    let mut schema_gen = SchemaGenerator::new();
    let mut builder = OpenApiBuilder::new().with_metadata(&metadata);
    for route in &routes {
        builder.add_route(route, registry, &mut schema_gen);
    }

    let diagnostics = builder.diagnostics().to_vec();
    let document = builder.build(schema_gen);
    debug!(
        "Built document with {} paths and {} diagnostics",
        document.paths.len(),
        diagnostics.len()
    );

    Ok(Generation {
        document,
        diagnostics,
        routes,
    })
}
