use crate::reflect::{FieldShape, Shape, StructShape};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Prefix of every component schema reference
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Schema generator - converts registered model shapes to OpenAPI schemas
///
/// Every named struct reached while converting a model is stored once as a component
/// schema; all later uses of that name become `$ref` nodes.
pub struct SchemaGenerator {
    /// Component schemas in registration order
    schemas: IndexMap<String, Schema>,
    /// Names whose schema is currently being built
    registering: HashSet<String>,
}

/// OpenAPI Schema definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// The type of the schema (string, integer, object, array, ...)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Properties for object types
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Reference to a component schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Schema {
    /// A schema with only a type name
    pub fn primitive(schema_type: impl Into<String>) -> Self {
        Self {
            schema_type: Some(schema_type.into()),
            ..Default::default()
        }
    }

    /// A `$ref` to the named component schema
    pub fn reference(name: &str) -> Self {
        Self {
            reference: Some(format!("{}{}", SCHEMA_REF_PREFIX, name)),
            ..Default::default()
        }
    }

    pub fn array(items: Schema) -> Self {
        Self {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

impl SchemaGenerator {
    pub fn new() -> Self {
        debug!("Initializing SchemaGenerator");
        Self {
            schemas: IndexMap::new(),
            registering: HashSet::new(),
        }
    }

    /// Register `shape` as the component schema `name` and return a reference to it.
    ///
    /// The first registration of a name wins; asking again, or asking while the same name
    /// is still being built, only returns the reference.
    pub fn register_model(&mut self, name: &str, shape: &Shape) -> Schema {
        if self.schemas.contains_key(name) {
            debug!("Schema {} already registered", name);
            return Schema::reference(name);
        }
        if !self.registering.insert(name.to_string()) {
            debug!("Schema {} is being built, breaking cycle with a reference", name);
            return Schema::reference(name);
        }

        debug!("Generating schema for model: {}", name);
        let schema = self.definition(shape);
        self.registering.remove(name);
        self.schemas.entry(name.to_string()).or_insert(schema);

        Schema::reference(name)
    }

    /// The full (non-reference) schema for a top-level model shape
    fn definition(&mut self, shape: &Shape) -> Schema {
        match shape.unwrapped() {
            Shape::Struct(structure) => self.struct_schema(structure),
            other => self.generate_schema(other),
        }
    }

    fn struct_schema(&mut self, structure: &StructShape) -> Schema {
        let mut schema = Schema::primitive("object");

        for field in structure.fields() {
            let Some(name) = field.serialized_name() else {
                debug!("Skipping field {}.{}: no serialization name", structure.name, field.ident);
                continue;
            };
            let property = self
                .generate_schema(&field.shape)
                .with_description(extract_description(&field));
            schema.properties.insert(name.to_string(), property);
        }

        debug!(
            "Generated schema for {} with {} properties",
            structure.name,
            schema.properties.len()
        );
        schema
    }

    /// Schema for a shape used inside another schema
    ///
    /// Named structs are registered as components and referenced.
    pub fn generate_schema(&mut self, shape: &Shape) -> Schema {
        match shape.unwrapped() {
            Shape::Struct(structure) => {
                let name = structure.name.clone();
                self.register_model(&name, shape)
            }
            Shape::Seq(item) => Schema::array(self.generate_schema(item)),
            other => Schema::primitive(kind_name(other)),
        }
    }

    /// Component schemas generated so far
    pub fn schemas(&self) -> &IndexMap<String, Schema> {
        &self.schemas
    }

    pub fn into_schemas(self) -> IndexMap<String, Schema> {
        self.schemas
    }
}

impl Default for SchemaGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// OpenAPI type name of a shape, after indirection is removed
pub fn kind_name(shape: &Shape) -> &'static str {
    match shape.unwrapped() {
        Shape::String | Shape::Char => "string",
        Shape::Int | Shape::Uint => "integer",
        Shape::Float => "number",
        Shape::Bool => "boolean",
        Shape::Seq(_) => "array",
        Shape::Map(_) | Shape::Struct(_) => "object",
        Shape::Indirect(_) | Shape::Opaque(_) => "string",
    }
}

/// Text after `desc=` in the field's descriptor tag, surrounding quotes removed
fn extract_description(field: &FieldShape) -> Option<String> {
    let descriptor = field.descriptor.as_deref()?;
    let (_, description) = descriptor.split_once("desc=")?;
    let description = description.trim_matches('"');
    if description.is_empty() {
        None
    } else {
        Some(description.to_string())
    }
}
