use crate::conventions::Conventions;
use crate::registry::ModelRegistry;
use crate::serializer::{serialize, write_to_file, OutputFormat};
use crate::viewer::{render_viewer_page, spec_url};
use crate::{generate, GenerateOptions};
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;

/// OpenAPI from Annotations - Generate OpenAPI documents from directive comments in Rust services
#[derive(Parser, Debug)]
#[command(name = "openapi-from-annotations")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Directory containing the annotated handlers
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// File whose leading comments hold @GlobalTitle, @GlobalVersion and @GlobalDescription
    #[arg(short = 'e', long = "entry", value_name = "FILE")]
    pub entry: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Json)]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// YAML file overriding the accessor names used by inference
    #[arg(short = 'c', long = "conventions", value_name = "FILE")]
    pub conventions: Option<PathBuf>,

    /// Also write a Swagger UI page to this file
    #[arg(long = "viewer", value_name = "FILE")]
    pub viewer_path: Option<PathBuf>,

    /// Base path the service mounts the viewer under
    #[arg(long = "base-path", value_name = "PATH", default_value = "")]
    pub base_path: String,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.exists() {
        anyhow::bail!(
            "Project path does not exist: {}",
            args.project_path.display()
        );
    }

    if !args.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            args.project_path.display()
        );
    }

    if let Some(entry) = &args.entry {
        if !entry.is_file() {
            anyhow::bail!("Entry file does not exist: {}", entry.display());
        }
    }

    info!("Project path: {}", args.project_path.display());
    info!("Output format: {}", args.output_format);
    match &args.output_path {
        Some(output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }
    if let Some(entry) = &args.entry {
        info!("Entry file: {}", entry.display());
    }
    if let Some(conventions) = &args.conventions {
        info!("Conventions file: {}", conventions.display());
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting OpenAPI document generation...");

    let conventions = match &args.conventions {
        Some(path) => Conventions::from_yaml_file(path)?,
        None => Conventions::default(),
    };

    let mut options = GenerateOptions::new(args.project_path.clone())
        .with_conventions(conventions)
        .with_derived_models(true);
    if let Some(entry) = &args.entry {
        options = options.with_entry(entry.clone());
    }

    let generation = generate(&options, &ModelRegistry::new())
        .with_context(|| format!("Failed to generate from {}", args.project_path.display()))?;

    if generation.routes.is_empty() {
        warn!("No annotated routes found in the project");
    }

    info!("Serializing to {} format...", args.output_format);
    let content = serialize(&generation.document, args.output_format)?;

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    if let Some(viewer_path) = &args.viewer_path {
        let page = render_viewer_page(&spec_url(&args.base_path));
        write_to_file(&page, viewer_path)?;
        info!("Wrote viewer page to {}", viewer_path.display());
    }

    let schema_count = generation
        .document
        .components
        .as_ref()
        .map_or(0, |components| components.schemas.len());

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Routes found: {}", generation.routes.len());
    info!("  - Paths: {}", generation.document.paths.len());
    info!("  - Schemas: {}", schema_count);
    info!("  - Diagnostics: {}", generation.diagnostics.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args_for(project: &TempDir, extra: &[&str]) -> CliArgs {
        let mut argv = vec!["openapi-from-annotations", project.path().to_str().unwrap()];
        argv.extend_from_slice(extra);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn test_default_arguments() {
        let project = TempDir::new().unwrap();

        let args = args_for(&project, &[]);

        assert_eq!(args.output_format, OutputFormat::Json);
        assert!(args.output_path.is_none());
        assert!(args.entry.is_none());
        assert!(args.base_path.is_empty());
        assert!(!args.verbose);
    }

    #[test]
    fn test_yaml_alias_and_flags() {
        let project = TempDir::new().unwrap();

        let args = args_for(&project, &["-f", "yml", "-o", "out/openapi.yaml", "-v"]);

        assert_eq!(args.output_format, OutputFormat::Yaml);
        assert_eq!(args.output_path, Some(PathBuf::from("out/openapi.yaml")));
        assert!(args.verbose);
    }

    #[test]
    fn test_missing_project_path_is_rejected() {
        let project = TempDir::new().unwrap();
        let mut args = args_for(&project, &[]);
        args.project_path = project.path().join("missing");

        assert!(parse_args_from_parsed(args).is_err());
    }

    #[test]
    fn test_missing_entry_is_rejected() {
        let project = TempDir::new().unwrap();
        let args = args_for(&project, &["--entry", "/definitely/not/here.rs"]);

        assert!(parse_args_from_parsed(args).is_err());
    }

    #[test]
    fn test_run_writes_document_and_viewer() {
        let project = TempDir::new().unwrap();
        fs::write(
            project.path().join("handlers.rs"),
            r#"
            pub struct Widget { pub name: String }

            /// @Summary Create widget
            /// @RequestBody {object} Widget true "payload"
            /// @Router /widgets [post]
            pub fn create_widget() {}
            "#,
        )
        .unwrap();
        let out = TempDir::new().unwrap();
        let output = out.path().join("openapi.json");
        let viewer = out.path().join("swagger.html");

        let args = args_for(
            &project,
            &[
                "-o",
                output.to_str().unwrap(),
                "--viewer",
                viewer.to_str().unwrap(),
                "--base-path",
                "/api",
            ],
        );
        run(args).unwrap();

        let document: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(
            document["paths"]["/widgets"]["post"]["requestBody"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/Widget"
        );
        assert!(fs::read_to_string(&viewer)
            .unwrap()
            .contains("url: '/api/swagger/openapi.json',"));
    }
}
