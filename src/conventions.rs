//! Method names recognised by code-shape inference.
//!
//! The defaults match a context object in the style of
//! `ctx.param("id")`, `ctx.bind_json(&mut req)` and `ctx.json(200, resp)`. Projects using
//! other names can override any of them from a YAML file:
//!
//! ```yaml
//! path_param: path_param
//! bind_body: read_json
//! ```

use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conventions {
    /// Reads a path segment: `ctx.param("id")`
    pub path_param: String,
    /// Reads a query value: `ctx.query("page")`
    pub query_param: String,
    /// Reads a request header: `ctx.get_header("X-Trace")`
    pub request_header: String,
    /// Sets a response header: `ctx.header("X-Rate", value)`
    pub response_header: String,
    /// Binds the request body into a local: `ctx.bind_json(&mut req)`
    pub bind_body: String,
    /// Writes a JSON response: `ctx.json(200, resp)`
    pub write_json: String,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            path_param: "param".to_string(),
            query_param: "query".to_string(),
            request_header: "get_header".to_string(),
            response_header: "header".to_string(),
            bind_body: "bind_json".to_string(),
            write_json: "json".to_string(),
        }
    }
}

impl Conventions {
    /// Loads conventions from a YAML file; keys left out keep their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::IoError {
            path: path.to_path_buf(),
            source,
        })?;

        let conventions: Self = serde_yaml::from_str(&content).map_err(|e| Error::ConfigError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!("Loaded conventions from {}: {:?}", path.display(), conventions);
        Ok(conventions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("conventions.yaml");
        fs::write(&path, "bind_body: read_json\nwrite_json: respond\n").unwrap();

        let conventions = Conventions::from_yaml_file(&path).unwrap();

        assert_eq!(conventions.bind_body, "read_json");
        assert_eq!(conventions.write_json, "respond");
        assert_eq!(conventions.path_param, "param");
        assert_eq!(conventions.request_header, "get_header");
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("conventions.yaml");
        fs::write(&path, "bind_body: [unclosed\n").unwrap();

        let err = Conventions::from_yaml_file(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigError { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();

        let err = Conventions::from_yaml_file(&temp_dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, Error::IoError { .. }));
    }
}
