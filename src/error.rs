use std::path::PathBuf;

/// Result type alias for the generation pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that abort generation.
///
/// Everything else (missing models, malformed directives, unmatched path
/// parameters) is recoverable and reported as a
/// [`Diagnostic`](crate::openapi_builder::Diagnostic) instead.
#[derive(Debug)]
pub enum Error {
    IoError { path: PathBuf, source: std::io::Error },
    WalkError(walkdir::Error),
    ParseError { file: PathBuf, message: String },
    ConfigError { path: PathBuf, message: String },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            Error::WalkError(e) => write!(f, "Failed to walk source tree: {}", e),
            Error::ParseError { file, message } => {
                write!(f, "Failed to parse Rust syntax in {}: {}", file.display(), message)
            }
            Error::ConfigError { path, message } => {
                write!(f, "Invalid conventions file {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError { source, .. } => Some(source),
            Error::WalkError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_names_file() {
        let err = Error::ParseError {
            file: PathBuf::from("src/handlers.rs"),
            message: "expected `;`".to_string(),
        };

        let text = err.to_string();
        assert!(text.contains("src/handlers.rs"));
        assert!(text.contains("expected `;`"));
    }

    #[test]
    fn test_io_error_exposes_source() {
        use std::error::Error as _;

        let err = Error::IoError {
            path: PathBuf::from("missing.rs"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };

        assert!(err.source().is_some());
        assert!(err.to_string().contains("missing.rs"));
    }
}
