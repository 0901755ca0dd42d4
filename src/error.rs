// Typed errors for document edits, pattern generation, and loading, plus
// the diagnostics sink the document reports edits through.

use std::fmt;

/// Errors from structural edits on a `StrandDocument`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocError {
    DuplicateLayer(String),
    UnknownLayer(String),
    /// Masked strands derive their geometry; direct endpoint edits are
    /// refused rather than silently overwritten.
    NotEditable(String),
    /// An attached strand's start is pinned to its parent.
    PinnedStart(String),
    AttachmentCycle(String),
}

impl fmt::Display for DocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocError::DuplicateLayer(l) => write!(f, "layer name already in use: {l}"),
            DocError::UnknownLayer(l) => write!(f, "no strand with layer name: {l}"),
            DocError::NotEditable(l) => write!(f, "strand geometry is derived, not editable: {l}"),
            DocError::PinnedStart(l) => write!(f, "attached strand start is pinned to its parent: {l}"),
            DocError::AttachmentCycle(l) => write!(f, "attachment cycle detected at: {l}"),
        }
    }
}

impl std::error::Error for DocError {}

/// Errors from the MxN grid generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    InvalidGrid { m: u32, n: u32 },
    InvalidK { k: i32, min: i32, max: i32 },
    /// A document edit failed while assembling the pattern.
    Doc(DocError),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::InvalidGrid { m, n } => {
                write!(f, "grid dimensions must be at least 1x1: {m}x{n}")
            }
            PatternError::InvalidK { k, min, max } => {
                write!(f, "k = {k} outside the valid range [{min}, {max}]")
            }
            PatternError::Doc(e) => write!(f, "document edit failed during generation: {e}"),
        }
    }
}

impl std::error::Error for PatternError {}

impl From<DocError> for PatternError {
    fn from(e: DocError) -> PatternError {
        PatternError::Doc(e)
    }
}

/// Errors from deserializing a document. Loading is strict: a document that
/// parses but violates a structural rule is refused whole.
#[derive(Debug)]
pub enum LoadError {
    Json(serde_json::Error),
    CapsExceeded(String),
    OutOfBounds(String),
    DuplicateLayer(String),
    BrokenReference { layer: String, missing: String },
    /// A typed strand record lacks a reference field its type requires.
    MissingField { layer: String, field: &'static str },
    MissingHistoryStep(i64),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Json(e) => write!(f, "invalid json: {e}"),
            LoadError::CapsExceeded(what) => write!(f, "ingestion cap exceeded: {what}"),
            LoadError::OutOfBounds(what) => write!(f, "value out of accepted range: {what}"),
            LoadError::DuplicateLayer(l) => write!(f, "duplicate layer name: {l}"),
            LoadError::BrokenReference { layer, missing } => {
                write!(f, "strand {layer} references missing layer {missing}")
            }
            LoadError::MissingField { layer, field } => {
                write!(f, "strand {layer} is missing required field {field}")
            }
            LoadError::MissingHistoryStep(step) => {
                write!(f, "history has no state for current_step {step}")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> LoadError {
        LoadError::Json(e)
    }
}

/// Observer for document edits. The document itself stays silent; a host
/// that wants an edit log installs a sink and hears one event per applied
/// operation.
pub trait DiagSink {
    fn event(&self, op: &str, layer: &str, detail: &str);
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagSink for NullSink {
    fn event(&self, _op: &str, _layer: &str, _detail: &str) {}
}
