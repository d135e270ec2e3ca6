// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Error kinds surfaced by the filtering pipeline and the reads store.

use thiserror::Error;

/// Errors returned by `exec_read_library_lc_filter` and by `ReadsStore`
/// implementations. Callers are expected to match on the variant rather
/// than on the message text.
#[derive(Debug, Error)]
pub enum LcError {
    /// The request was rejected before any read was fetched or persisted.
    #[error("{0}")]
    InvalidInput(String),

    /// The requested object (or its workspace) does not exist.
    #[error("No object with name {name} exists in workspace {workspace}")]
    NotFound { workspace: String, name: String },

    #[error("No workspace with name {workspace} exists")]
    WorkspaceNotFound { workspace: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Errors raised by the FASTQ/FASTA readers and writers.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LcError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        LcError::InvalidInput(msg.into())
    }

    pub(crate) fn not_found(workspace: impl Into<String>, name: impl Into<String>) -> Self {
        LcError::NotFound {
            workspace: workspace.into(),
            name: name.into(),
        }
    }

    pub(crate) fn workspace_not_found(workspace: impl Into<String>) -> Self {
        LcError::WorkspaceNotFound {
            workspace: workspace.into(),
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, LcError::InvalidInput(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LcError::NotFound { .. } | LcError::WorkspaceNotFound { .. })
    }
}
