use openapi_from_annotations::{
    conventions::Conventions,
    error::Error,
    extractor::HttpMethod,
    generate,
    openapi_builder::Diagnostic,
    reflect::{FieldShape, Reflect, Shape},
    registry::ModelRegistry,
    serializer::{serialize, OutputFormat},
    GenerateOptions,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Helper function to create a temporary test project
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn service_project() -> TempDir {
    create_test_project(vec![
        ("src/main.rs", include_str!("fixtures/annotated_service.rs")),
        ("src/handlers_test.rs", include_str!("fixtures/handlers_test.rs")),
    ])
}

fn generate_service(project: &TempDir) -> openapi_from_annotations::Generation {
    let options = GenerateOptions::new(project.path().join("src"))
        .with_entry(project.path().join("src/main.rs"))
        .with_derived_models(true);
    generate(&options, &ModelRegistry::new()).expect("generation should succeed")
}

fn to_json(generation: &openapi_from_annotations::Generation) -> Value {
    serde_json::to_value(&generation.document).unwrap()
}

struct Widget;

impl Reflect for Widget {
    fn shape() -> Shape {
        Shape::structure("Widget", || vec![FieldShape::of::<String>("name").rename("name")])
    }
}

#[test]
fn test_widget_end_to_end() {
    let project = create_test_project(vec![(
        "handlers.rs",
        r#"
        /// @Summary S
        /// @Router /widgets [post]
        /// @RequestBody {object} Widget true "payload"
        pub fn create_widget() {}
        "#,
    )]);
    let mut registry = ModelRegistry::new();
    registry.register_type::<Widget>("Widget");

    let generation = generate(&GenerateOptions::new(project.path()), &registry).unwrap();

    assert!(generation.diagnostics.is_empty());
    assert_eq!(generation.document.paths.len(), 1);
    let value = to_json(&generation);
    assert_eq!(
        value["paths"],
        json!({
            "/widgets": {
                "post": {
                    "summary": "S",
                    "operationId": "create_widget",
                    "requestBody": {
                        "description": "payload",
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {"$ref": "#/components/schemas/Widget"}
                            }
                        }
                    },
                    "responses": {"200": {"description": "OK"}}
                }
            }
        })
    );
    assert_eq!(
        value["components"],
        json!({
            "schemas": {
                "Widget": {"type": "object", "properties": {"name": {"type": "string"}}}
            }
        })
    );
}

#[test]
fn test_service_metadata_and_paths() {
    let project = service_project();

    let generation = generate_service(&project);

    let info = &generation.document.info;
    assert_eq!(info.title, "User Service API");
    assert_eq!(info.version, "1.2.0");
    assert_eq!(
        info.description.as_deref(),
        Some("Sample API for demonstrating generation.")
    );

    let paths: Vec<_> = generation.document.paths.keys().map(String::as_str).collect();
    assert_eq!(
        paths,
        vec!["/user/{id}", "/user", "/user/search", "/user/export", "/health"]
    );

    let user_item = &generation.document.paths["/user/{id}"];
    assert!(user_item.operation(HttpMethod::Get).is_some());
    assert!(user_item.operation(HttpMethod::Delete).is_some());
}

#[test]
fn test_service_annotated_operation() {
    let project = service_project();

    let value = to_json(&generate_service(&project));

    let get_user = &value["paths"]["/user/{id}"]["get"];
    assert_eq!(get_user["tags"], json!(["user"]));
    assert_eq!(get_user["description"], "Returns user data based on ID");
    assert_eq!(
        get_user["parameters"],
        json!([
            {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}, "description": "User ID"},
            {"name": "verbose", "in": "query", "required": false, "schema": {"type": "boolean"}, "description": "Verbose output"}
        ])
    );
    assert_eq!(
        get_user["responses"]["200"],
        json!({
            "description": "The user",
            "headers": {
                "X-RateLimit-Remaining": {
                    "description": "Remaining quota",
                    "required": true,
                    "schema": {"type": "integer"}
                }
            },
            "content": {
                "application/json": {"schema": {"$ref": "#/components/schemas/UserResponse"}}
            }
        })
    );
    assert_eq!(
        get_user["responses"]["404"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/ErrorResponse"
    );
    assert_eq!(get_user["security"], json!([{"BearerAuth": []}]));
}

#[test]
fn test_service_inferred_operations() {
    let project = service_project();

    let value = to_json(&generate_service(&project));

    let create_user = &value["paths"]["/user"]["post"];
    assert_eq!(create_user["tags"], json!(["user", "admin"]));
    assert_eq!(
        create_user["requestBody"],
        json!({
            "required": true,
            "content": {
                "application/json": {"schema": {"$ref": "#/components/schemas/CreateUserRequest"}}
            }
        })
    );
    assert_eq!(
        create_user["responses"]["201"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/UserResponse"
    );
    assert_eq!(create_user["responses"]["201"]["description"], "Response");
    assert_eq!(
        create_user["responses"]["400"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/ErrorResponse"
    );

    let search = &value["paths"]["/user/search"]["get"];
    assert_eq!(
        search["parameters"],
        json!([
            {"name": "name", "in": "query", "required": false, "schema": {"type": "string"}, "description": "Query parameter 'name'"},
            {"name": "X-Trace-ID", "in": "header", "required": false, "schema": {"type": "string"}, "description": "Header 'X-Trace-ID'"}
        ])
    );
    assert_eq!(
        search["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/SearchResults"
    );
}

#[test]
fn test_service_components() {
    let project = service_project();

    let value = to_json(&generate_service(&project));

    let schemas = &value["components"]["schemas"];
    assert_eq!(
        schemas["UserResponse"],
        json!({
            "type": "object",
            "properties": {
                "id": {"type": "string", "description": "Unique user ID"},
                "name": {"type": "string"},
                "address": {"$ref": "#/components/schemas/Address"}
            }
        })
    );
    assert_eq!(
        schemas["Address"],
        json!({
            "type": "object",
            "properties": {
                "city": {"type": "string", "description": "City name"},
                "zip_code": {"type": "integer"}
            }
        })
    );
    assert_eq!(
        schemas["SearchResults"]["properties"]["users"],
        json!({"type": "array", "items": {"$ref": "#/components/schemas/UserResponse"}})
    );
    assert!(schemas.get("ExportArchive").is_none());

    assert_eq!(
        value["components"]["securitySchemes"],
        json!({
            "BearerAuth": {"type": "http", "scheme": "bearer", "bearerFormat": "JWT"},
            "ApiKey": {"type": "apiKey", "name": "X-Api-Key", "in": "header"}
        })
    );
}

#[test]
fn test_service_diagnostics_and_fallbacks() {
    let project = service_project();

    let generation = generate_service(&project);

    assert_eq!(
        generation.diagnostics,
        vec![
            Diagnostic::UnmatchedPathParameter {
                handler: "delete_user".to_string(),
                path: "/user/{id}".to_string(),
                parameter: "org".to_string(),
            },
            Diagnostic::MissingModel {
                handler: "export_users".to_string(),
                model: "ExportArchive".to_string(),
            },
            Diagnostic::UnsupportedMethod {
                handler: "trace_debug".to_string(),
                method: "trace".to_string(),
            },
        ]
    );

    let value = to_json(&generation);
    let delete_user = &value["paths"]["/user/{id}"]["delete"];
    assert!(delete_user.get("parameters").is_none());
    assert_eq!(delete_user["deprecated"], true);
    assert_eq!(delete_user["responses"], json!({"204": {"description": "Deleted"}}));

    assert_eq!(
        value["paths"]["/user/export"]["get"]["responses"],
        json!({"200": {"description": "OK"}})
    );
    assert_eq!(
        value["paths"]["/health"]["get"]["responses"],
        json!({"200": {"description": "OK"}})
    );
}

#[test]
fn test_test_files_are_excluded() {
    let project = service_project();

    let generation = generate_service(&project);

    assert!(generation
        .routes
        .iter()
        .all(|route| route.handler_name != "from_test_file"));
    assert!(!generation.document.paths.contains_key("/from-test-file"));
}

#[test]
fn test_missing_model_without_derived_models() {
    let project = service_project();
    let options = GenerateOptions::new(project.path().join("src"));

    let generation = generate(&options, &ModelRegistry::new()).unwrap();

    assert!(generation
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::MissingModel { model, .. } if model == "UserResponse")));
    assert!(generation
        .document
        .components
        .as_ref()
        .map_or(true, |components| components.schemas.is_empty()));
    // Defaults apply without an entry file
    assert_eq!(generation.document.info.title, "Generated API");
}

#[test]
fn test_custom_conventions() {
    let project = create_test_project(vec![(
        "orders.rs",
        r#"
        pub struct NewOrder { pub sku: String, pub quantity: u32 }

        /// @Summary Place order
        /// @Router /shops/:shop/orders [post]
        pub fn place_order(req: &mut Request) {
            let shop = req.path_param("shop");
            let mut order: NewOrder = NewOrder::default();
            req.read_json(&mut order);
        }
        "#,
    )]);
    let conventions = Conventions {
        path_param: "path_param".to_string(),
        bind_body: "read_json".to_string(),
        ..Conventions::default()
    };
    let options = GenerateOptions::new(project.path())
        .with_conventions(conventions)
        .with_derived_models(true);

    let generation = generate(&options, &ModelRegistry::new()).unwrap();

    let value = to_json(&generation);
    let op = &value["paths"]["/shops/{shop}/orders"]["post"];
    assert_eq!(op["parameters"][0]["name"], "shop");
    assert_eq!(op["parameters"][0]["required"], true);
    assert_eq!(
        op["requestBody"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/NewOrder"
    );
}

#[test]
fn test_parse_error_is_fatal() {
    let project = create_test_project(vec![
        ("good.rs", "/// @Router /ok [get]\npub fn ok() {}\n"),
        ("broken.rs", "pub fn broken( {"),
    ]);

    let result = generate(&GenerateOptions::new(project.path()), &ModelRegistry::new());

    assert!(matches!(result, Err(Error::ParseError { .. })));
}

#[test]
fn test_missing_root_is_fatal() {
    let project = TempDir::new().unwrap();
    let options = GenerateOptions::new(project.path().join("does-not-exist"));

    let result = generate(&options, &ModelRegistry::new());

    assert!(matches!(result, Err(Error::WalkError(_))));
}

#[test]
fn test_yaml_and_json_agree() {
    let project = service_project();
    let generation = generate_service(&project);

    let json_text = serialize(&generation.document, OutputFormat::Json).unwrap();
    let yaml_text = serialize(&generation.document, OutputFormat::Yaml).unwrap();

    let from_json: Value = serde_json::from_str(&json_text).unwrap();
    let from_yaml: Value = serde_yaml::from_str(&yaml_text).unwrap();
    assert_eq!(from_json, from_yaml);
}
