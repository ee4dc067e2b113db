//! Error types for the editor

use crate::atomic_change::KeyPath;
use diagrammer_grammar::{ElementId, ElementType, SchemaError};
use thiserror::Error;

pub type DiagramResult<T> = Result<T, DiagramError>;

/// Coarse classification of a [`DiagramError`], for callers that only need
/// to know which kind of rule was broken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    TypeMismatch,
    SchemaViolation,
    IntegrityViolation,
    InvalidState,
}

/// Failure to apply or invert an atomic change
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChangeError {
    #[error("Invalid change path: {0}")]
    InvalidPath(KeyPath),

    #[error("Nothing to delete at {0}")]
    MissingValue(KeyPath),

    #[error("Set change at {0} has no new value")]
    MissingNewValue(KeyPath),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ChangeError {
    fn from(e: serde_json::Error) -> Self {
        ChangeError::Serialization(e.to_string())
    }
}

/// Rejected diagram operation. Nothing is applied when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiagramError {
    #[error("element '{0}' does not exist")]
    NotFound(ElementId),

    #[error("element '{id}' does not have type {expected} (found {found})")]
    TypeMismatch {
        id: ElementId,
        expected: ElementType,
        found: ElementType,
    },

    #[error("element '{0}' already exists")]
    DuplicateId(ElementId),

    #[error("'{0}' is a word; words cannot be created, deleted or given properties")]
    WordNotEditable(ElementId),

    #[error("'{0}' is not a word of this diagram")]
    NotAWord(ElementId),

    #[error("{element_type} element does not have a '{property}' property")]
    UnknownProperty {
        element_type: ElementType,
        property: String,
    },

    #[error("{parent_type} element is not allowed to reference a {child_type} element via '{property}'")]
    DisallowedReference {
        parent_type: ElementType,
        property: String,
        child_type: ElementType,
    },

    #[error("'{property}' of a {element_type} element expected array, found a single reference")]
    ExpectedArray {
        element_type: ElementType,
        property: String,
    },

    #[error("'{property}' of a {element_type} element expected value, found an array")]
    ExpectedValue {
        element_type: ElementType,
        property: String,
    },

    #[error("current and new value of '{property}' on '{id}' cannot both be undefined")]
    BothUndefined { id: ElementId, property: String },

    #[error("'{parent}' already contains a reference to '{child}' in '{property}'")]
    AlreadyContains {
        parent: ElementId,
        property: String,
        child: ElementId,
    },

    #[error("'{parent}' already references '{child}' via '{property}'")]
    AlreadyReferences {
        parent: ElementId,
        property: String,
        child: ElementId,
    },

    #[error("'{parent}' does not contain a reference to '{child}' in '{property}'")]
    MissingArrayReference {
        parent: ElementId,
        property: String,
        child: ElementId,
    },

    #[error("'{parent}' contains multiple references to '{child}' in '{property}'")]
    MultipleReferences {
        parent: ElementId,
        property: String,
        child: ElementId,
    },

    #[error("'{parent}' does not reference '{child}' via '{property}'")]
    MissingReference {
        parent: ElementId,
        property: String,
        child: ElementId,
    },

    #[error("'{child}' is not referenced by '{parent}'")]
    NotReferencedBy { parent: ElementId, child: ElementId },

    #[error("'{child}' refers back to '{parent}', which does not reference it")]
    DanglingBackReference { parent: ElementId, child: ElementId },

    #[error("'{parent}' has more than 2 references to '{child}'")]
    TooManyReferences { parent: ElementId, child: ElementId },

    #[error("'{0}' cannot reference itself")]
    SelfReference(ElementId),

    #[error("referencing '{child}' from '{parent}' would create a cycle")]
    CycleDetected { parent: ElementId, child: ElementId },

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Change error: {0}")]
    Change(#[from] ChangeError),
}

impl DiagramError {
    pub fn kind(&self) -> ErrorKind {
        use DiagramError::*;

        match self {
            NotFound(_) | NotAWord(_) => ErrorKind::NotFound,
            TypeMismatch { .. } => ErrorKind::TypeMismatch,
            WordNotEditable(_)
            | UnknownProperty { .. }
            | DisallowedReference { .. }
            | ExpectedArray { .. }
            | ExpectedValue { .. }
            | Schema(_) => ErrorKind::SchemaViolation,
            DuplicateId(_)
            | AlreadyContains { .. }
            | AlreadyReferences { .. }
            | MissingArrayReference { .. }
            | MultipleReferences { .. }
            | MissingReference { .. }
            | NotReferencedBy { .. }
            | DanglingBackReference { .. }
            | TooManyReferences { .. }
            | SelfReference(_)
            | CycleDetected { .. } => ErrorKind::IntegrityViolation,
            BothUndefined { .. } | Change(_) => ErrorKind::InvalidState,
        }
    }
}

/// Failure of an undo/redo history operation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Child history is stale: its base no longer matches the parent's current state")]
    StaleChild,

    #[error("Change error: {0}")]
    Change(#[from] ChangeError),
}

impl HistoryError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidState
    }
}
