use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use crate::core::completion::CompletionError;
use crate::core::config::data::path_display;
use crate::core::config::ConfigError;

#[derive(Debug)]
pub enum StoreError {
    WorkspaceNotFound(String),
    ThreadNotFound(String),
    KnowledgeItemNotFound(String),
    /// The knowledge item exists but is not linked to the workspace.
    KnowledgeNotLinked(String),
    EmptyMessage,
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Serialize(serde_json::Error),
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    Location(ConfigError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::WorkspaceNotFound(key) => write!(f, "Workspace '{key}' not found"),
            StoreError::ThreadNotFound(key) => write!(f, "Thread '{key}' not found"),
            StoreError::KnowledgeItemNotFound(key) => {
                write!(f, "Knowledge item '{key}' not found")
            }
            StoreError::KnowledgeNotLinked(key) => write!(
                f,
                "Knowledge item '{key}' is not linked to this workspace"
            ),
            StoreError::EmptyMessage => write!(f, "Message is empty"),
            StoreError::Read { path, source } => write!(
                f,
                "Failed to read workspaces at {}: {}",
                path_display(path),
                source
            ),
            StoreError::Parse { path, source } => write!(
                f,
                "Failed to parse workspaces at {}: {}",
                path_display(path),
                source
            ),
            StoreError::Serialize(source) => write!(f, "Failed to serialize workspaces: {source}"),
            StoreError::Write { path, source } => {
                write!(f, "Failed to write {}: {}", path_display(path), source)
            }
            StoreError::Location(source) => write!(f, "{source}"),
        }
    }
}

impl StdError for StoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StoreError::Read { source, .. } | StoreError::Write { source, .. } => Some(source),
            StoreError::Parse { source, .. } | StoreError::Serialize(source) => Some(source),
            StoreError::Location(source) => Some(source),
            _ => None,
        }
    }
}

/// Failure of the whole send pipeline.
#[derive(Debug)]
pub enum SendError {
    Store(StoreError),
    Completion(CompletionError),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::Store(err) => write!(f, "{err}"),
            SendError::Completion(err) => write!(f, "{err}"),
        }
    }
}

impl StdError for SendError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SendError::Store(err) => Some(err),
            SendError::Completion(err) => Some(err),
        }
    }
}

impl From<StoreError> for SendError {
    fn from(err: StoreError) -> Self {
        SendError::Store(err)
    }
}

impl From<CompletionError> for SendError {
    fn from(err: CompletionError) -> Self {
        SendError::Completion(err)
    }
}
