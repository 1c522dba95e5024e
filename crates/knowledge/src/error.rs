use thiserror::Error;

pub type Result<T> = std::result::Result<T, KnowledgeError>;

#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("Missing {what}: {path}")]
    NotFound { what: &'static str, path: String },

    #[error("Missing template: {path}")]
    MissingTemplate { path: String },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl KnowledgeError {
    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Classifies an IO failure: a missing file becomes `NotFound`, everything else stays `Io`.
    pub(crate) fn from_io(what: &'static str, path: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound {
                what,
                path: path.to_string(),
            }
        } else {
            Self::Io {
                path: path.to_string(),
                source,
            }
        }
    }

    /// "The input was fine but the resource does not exist."
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::MissingTemplate { .. })
    }
}
