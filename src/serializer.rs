//! Encoding of generated documents as JSON or YAML, and writing them to disk.
//!
//! JSON is the primary format: it is what the viewer page loads from
//! [`SPEC_SUB_PATH`](crate::viewer::SPEC_SUB_PATH).

use crate::openapi_builder::OpenApiDocument;
use anyhow::{Context, Result};
use clap::ValueEnum;
use log::debug;
use std::fmt;
use std::fs;
use std::path::Path;

/// Output encoding of the generated document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML
    #[value(alias = "yml")]
    Yaml,
}

impl OutputFormat {
    /// Conventional file extension for the format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Serializes a document in the requested format.
pub fn serialize(doc: &OpenApiDocument, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serialize_json(doc),
        OutputFormat::Yaml => serialize_yaml(doc),
    }
}

/// Serializes an OpenAPI document to YAML format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize OpenAPI document to YAML")
}

/// Serializes an OpenAPI document to JSON format with pretty printing.
///
/// # Example
///
/// ```
/// use openapi_from_annotations::openapi_builder::OpenApiBuilder;
/// use openapi_from_annotations::schema_generator::SchemaGenerator;
/// use openapi_from_annotations::serializer::serialize_json;
///
/// let doc = OpenApiBuilder::new().build(SchemaGenerator::new());
/// let json = serialize_json(&doc).unwrap();
/// assert!(json.contains("\"openapi\": \"3.0.0\""));
/// ```
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize OpenAPI document to JSON")
}

/// Writes string content to a file, creating parent directories as needed.
///
/// # Arguments
///
/// * `content` - The string content to write
/// * `path` - The file path to write to
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi_builder::{Info, OpenApiBuilder};
    use crate::registry::ModelRegistry;
    use crate::schema_generator::SchemaGenerator;
    use crate::extractor::{RequestBody, RouteDoc};
    use crate::reflect::{FieldShape, Shape};
    use indexmap::IndexMap;
    use tempfile::TempDir;

    /// Helper function to create a minimal OpenAPI document for testing
    fn create_test_document() -> OpenApiDocument {
        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: Info {
                title: "Test API".to_string(),
                version: "1.0.0".to_string(),
                description: Some("A test API".to_string()),
            },
            paths: IndexMap::new(),
            components: None,
        }
    }

    fn create_widget_document() -> OpenApiDocument {
        let mut registry = ModelRegistry::new();
        registry.register_shape(
            "Widget",
            Shape::structure("Widget", || vec![FieldShape::new("name", Shape::String).rename("name")]),
        );

        let mut route = RouteDoc::new("create_widget");
        route.method = "post".to_string();
        route.path = "/widgets".to_string();
        route.request_body = Some(RequestBody::json("Widget", true));

        let mut schema_gen = SchemaGenerator::new();
        let mut builder = OpenApiBuilder::new();
        builder.add_route(&route, &registry, &mut schema_gen);
        builder.build(schema_gen)
    }

    #[test]
    fn test_output_format_names() {
        assert_eq!(OutputFormat::from_str("yml", true), Ok(OutputFormat::Yaml));
        assert!(OutputFormat::from_str("toml", true).is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Json);
        assert_eq!(OutputFormat::Yaml.to_string(), "yaml");
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_document()).unwrap();

        assert!(yaml.contains("openapi: 3.0.0"));
        assert!(yaml.contains("title: Test API"));
        assert!(yaml.contains("description: A test API"));
        assert!(yaml.contains("paths:"));
    }

    #[test]
    fn test_serialize_json() {
        let json = serialize(&create_test_document(), OutputFormat::Json).unwrap();

        // Pretty printed
        assert!(json.lines().count() > 5);

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["openapi"], "3.0.0");
        assert_eq!(parsed["info"]["title"], "Test API");
        assert!(parsed.get("components").is_none());
    }

    #[test]
    fn test_serialize_json_with_components() {
        let json = serialize_json(&create_widget_document()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed["paths"]["/widgets"]["post"]["requestBody"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/Widget"
        );
        assert_eq!(
            parsed["components"]["schemas"]["Widget"]["properties"]["name"]["type"],
            "string"
        );
    }

    #[test]
    fn test_serialize_yaml_with_components() {
        let yaml = serialize(&create_widget_document(), OutputFormat::Yaml).unwrap();

        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(
            parsed["components"]["schemas"]["Widget"]["type"].as_str(),
            Some("object")
        );
        assert_eq!(
            parsed["paths"]["/widgets"]["post"]["requestBody"]["content"]["application/json"]["schema"]["$ref"]
                .as_str(),
            Some("#/components/schemas/Widget")
        );
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("subdir").join("nested").join("openapi.json");

        write_to_file("test content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "test content");
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("openapi.yaml");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }
}
