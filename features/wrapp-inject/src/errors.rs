use std::any::TypeId;

use thiserror::Error;

use crate::types::{DynError, TypeKey};

/// Errors while selecting the constructor of a registration
#[derive(Error, Debug, Clone)]
pub enum SelectionError {
    /// More than one constructor satisfies the declared parameters
    #[error("The type '{type_key}' has multiple constructors {first}, {second}, etc. satisfying signature ( {signature} ). Unable to disambiguate.")]
    AmbiguousConstructor {
        type_key: TypeKey,
        first: String,
        second: String,
        matches: usize,
        signature: String,
    },
    /// No constructor satisfies the declared parameters
    #[error("The type '{type_key}' does not have a constructor that takes the parameters ( {signature} ).")]
    NoMatchingConstructor { type_key: TypeKey, signature: String },
    /// A preselected constructor belongs to a different type
    #[error("The constructor {constructor} can not build '{type_key}'")]
    ForeignConstructor {
        type_key: TypeKey,
        constructor: String,
    },
}

/// Errors while turning a selected constructor into a construction function
#[derive(Error, Debug, Clone)]
pub enum BuildError {
    #[error("No constructor was selected, did you call add_policies before building?")]
    NotSelected,
    /// The selected constructor is not part of its declaring type's constructor list
    #[error("The constructor {constructor} is not declared by '{origin}'")]
    UnknownConstructor { origin: TypeKey, constructor: String },
    /// The requested type is not a closed instantiation of the bound definition
    #[error("The type '{type_key}' is not closed from '{origin}'")]
    NotClosedFrom { type_key: TypeKey, origin: TypeKey },
    /// The closed type has no constructor at the recorded position
    #[error("The type '{type_key}' has no constructor at position {ordinal}")]
    ConstructorMissing { type_key: TypeKey, ordinal: usize },
    #[error("The constructor {constructor} takes {expected} arguments, but {actual} parameters were declared")]
    ArgumentCount {
        constructor: String,
        expected: usize,
        actual: usize,
    },
}

/// Failure while producing arguments for, or invoking, a constructor
#[derive(Error, Debug)]
#[error("Error creating type '{type_key}' - error: {source}")]
pub struct ConstructionError {
    pub type_key: TypeKey,
    #[source]
    pub source: DynError,
}
impl ConstructionError {
    pub fn new(type_key: TypeKey, source: impl Into<DynError>) -> Self {
        ConstructionError {
            type_key,
            source: source.into(),
        }
    }
}

/// Errors raised by constructor invokers while unpacking their arguments
#[derive(Error, Debug, Clone)]
pub enum InvokeError {
    #[error("The constructor {constructor} takes {expected} arguments but got {actual}")]
    ArgumentCount {
        constructor: String,
        expected: usize,
        actual: usize,
    },
    #[error("Argument {position} is missing")]
    MissingArgument { position: usize },
    #[error("Failed to downcast argument {position}, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        position: usize,
        required_type: &'static str,
        actual_type: TypeKey,
    },
}

/// Errors when storing or reading policies
#[derive(Error, Debug, Clone)]
pub enum PolicyError {
    /// A policy of this type is already stored
    #[error("A policy of type '{0}' is already registered")]
    AlreadyRegistered(&'static str),
    #[error("Stored policy could not be read as '{type_name}'")]
    DowncastFailed {
        type_id: TypeId,
        type_name: &'static str,
    },
}
