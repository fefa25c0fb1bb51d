use crate::error::{Error, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// AST (Abstract Syntax Tree) parser for Rust source files.
///
/// The `AstParser` uses the `syn` crate to parse Rust source code into a syntax tree, which
/// is then walked for annotated handler functions and model definitions. Doc comments are
/// kept by `syn` as `#[doc = "..."]` attributes, so directive comments survive parsing.
///
/// # Example
///
/// ```no_run
/// use openapi_from_annotations::parser::AstParser;
/// use std::path::Path;
///
/// let parsed = AstParser::parse_file(Path::new("src/main.rs")).unwrap();
/// println!("Parsed {} items", parsed.syntax_tree.items.len());
/// ```
pub struct AstParser;

/// A successfully parsed Rust file with its abstract syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// The parsed abstract syntax tree
    pub syntax_tree: syn::File,
}

impl AstParser {
    /// Parses a single Rust source file into an AST.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid Rust syntax.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path).map_err(|source| Error::IoError {
            path: path.to_path_buf(),
            source,
        })?;

        let syntax_tree = Self::parse_source(path, &content)?;

        Ok(ParsedFile {
            path: path.to_path_buf(),
            syntax_tree,
        })
    }

    /// Parses source text that was already loaded, attributing errors to `path`.
    pub fn parse_source(path: &Path, content: &str) -> Result<syn::File> {
        syn::parse_file(content).map_err(|e| Error::ParseError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Parses multiple Rust source files, stopping at the first failure.
    pub fn parse_files(paths: &[PathBuf]) -> Result<Vec<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let parsed = paths
            .iter()
            .map(|path| Self::parse_file(path))
            .collect::<Result<Vec<_>>>()?;

        debug!("Parsing complete: {} files", parsed.len());
        Ok(parsed)
    }
}
