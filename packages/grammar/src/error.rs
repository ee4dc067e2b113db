use crate::element_type::ElementType;
use thiserror::Error;

pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("{0} elements have no grammar definition")]
    NoDefinition(ElementType),

    #[error("Unknown element type: {0}")]
    UnknownType(String),

    #[error("Unknown display category: {0}")]
    UnknownCategory(String),

    #[error("{0} elements cannot be initialized as blank values")]
    NotInitializable(ElementType),

    #[error("Invalid {element_type} value: {message}")]
    InvalidValue {
        element_type: ElementType,
        message: String,
    },
}

impl SchemaError {
    pub fn invalid_value(element_type: ElementType, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            element_type,
            message: message.into(),
        }
    }
}
