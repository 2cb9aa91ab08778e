use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures of a run, one variant per stage.
#[derive(Debug, Error)]
pub enum AppendError {
    #[error("failed to connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("failed to resolve layer {url}: {message}")]
    Resolve { url: String, message: String },

    #[error("input file '{}' does not exist", .0.display())]
    MissingInput(PathBuf),

    #[error("failed to read {}: {message}", .path.display())]
    ReadInput { path: PathBuf, message: String },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("failed to append features to {url}: {message}")]
    Upload { url: String, message: String },
}

impl AppendError {
    pub fn connect(url: &str, message: impl ToString) -> Self {
        AppendError::Connect {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub fn resolve(url: &str, message: impl ToString) -> Self {
        AppendError::Resolve {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub fn upload(url: &str, message: impl ToString) -> Self {
        AppendError::Upload {
            url: url.to_string(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppendError>;
