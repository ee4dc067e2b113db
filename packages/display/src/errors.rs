//! Error types for display projection

use diagrammer_editor::DiagramError;
use diagrammer_grammar::ElementId;
use thiserror::Error;

pub type DisplayResult<T> = Result<T, DisplayError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DisplayError {
    /// The word sits under no element within the active category
    #[error("no display ancestor found for word '{0}'")]
    NoDisplayAncestor(ElementId),

    #[error("ref chain of '{0}' loops back on itself")]
    Cycle(ElementId),

    #[error("Diagram error: {0}")]
    Diagram(#[from] DiagramError),
}
