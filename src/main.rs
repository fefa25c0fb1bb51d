//! OpenAPI from Annotations - command-line tool.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-annotations [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Generate JSON documentation with metadata from the entry file:
//! ```bash
//! openapi-from-annotations ./my-service/src -e ./my-service/src/main.rs -o openapi.json
//! ```
//!
//! Generate YAML and a Swagger UI page:
//! ```bash
//! openapi-from-annotations ./my-service/src -f yaml -o openapi.yaml --viewer swagger.html
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_annotations::cli;

fn main() -> Result<()> {
    // Parse first so the verbose flag can pick the log level
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI from Annotations starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
