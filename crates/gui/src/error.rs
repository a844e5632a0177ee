//! Error types for mesh loading, the render loop and configuration.
//!
//! Addressing mistakes on the part tree are not errors: accessors return
//! `None`, `false` or an empty column value instead.

use thiserror::Error;

/// Failure to turn a mesh file into [`MeshData`](crate::mesh::MeshData).
#[derive(Debug, Error)]
pub enum MeshLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Binary file shorter than its header claims.
    #[error("truncated mesh file: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },
    #[error("malformed mesh file at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("bad facet {index}: {reason}")]
    BadFacet { index: usize, reason: String },
    /// Buffers that do not describe whole vertices or triangles.
    #[error("inconsistent mesh data: {reason}")]
    Inconsistent { reason: String },
    /// File parsed but contained no triangles.
    #[error("mesh file contains no triangles")]
    Empty,
    #[error("part does not exist")]
    UnknownPart,
}

/// Render loop failures. Only ever fatal to the render thread.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render backend initialization failed: {0}")]
    InitFailed(String),
    #[error("render loop already started")]
    AlreadyStarted,
    #[error("render loop not started")]
    NotStarted,
    #[error("failed to spawn render thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("draw failed: {0}")]
    Draw(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}
