//! Error types for code generation.

use thiserror::Error;

/// Error type for code generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Document parse error.
    #[error("document parse error: {0}")]
    Parse(#[from] dbusproxy_schema::ParseError),

    /// Interface validation error.
    #[error("schema error: {0}")]
    Schema(#[from] dbusproxy_schema::SchemaError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Required configuration value missing.
    #[error("missing required parameter '{key}'")]
    MissingConfig {
        /// Option name.
        key: String,
    },

    /// Signature with no table entry and no matching declaration.
    #[error("don't know how to map type ({signature}, {annotation}) used by {location}")]
    UnresolvableType {
        /// Wire signature.
        signature: String,
        /// Semantic annotation, or `-` when absent.
        annotation: String,
        /// Interface and member using the type.
        location: String,
    },

    /// List annotation naming a type with no declared list form.
    #[error(
        "no array version of custom type '{element}' in the specification, but '{annotation}' is used by {location}"
    )]
    UnknownCustomList {
        /// Element type name.
        element: String,
        /// Full annotation.
        annotation: String,
        /// Interface and member using the type.
        location: String,
    },

    /// Declared list used with a signature that does not match it.
    #[error(
        "signature '{signature}' does not match declared list '{annotation}' (expected '{expected}') in {location}"
    )]
    SignatureMismatch {
        /// Signature found at the use site.
        signature: String,
        /// Annotation found at the use site.
        annotation: String,
        /// Signature implied by the declaration.
        expected: String,
        /// Interface and member using the type.
        location: String,
    },

    /// Two interface nodes derive the same proxy class name.
    #[error("interface nodes '{first}' and '{second}' both map to class '{class}'")]
    ClassNameCollision {
        /// Derived class name.
        class: String,
        /// First node name.
        first: String,
        /// Second node name.
        second: String,
    },

    /// Two arguments of one member end up with the same emitted name.
    #[error("duplicate argument name '{name}' in {location}")]
    DuplicateArgument {
        /// Emitted argument name.
        name: String,
        /// Interface and member holding the arguments.
        location: String,
    },
}

impl CodegenError {
    /// Creates a missing configuration error.
    pub fn missing_config(key: impl Into<String>) -> Self {
        Self::MissingConfig { key: key.into() }
    }

    /// Creates an unresolvable type error.
    pub fn unresolvable(
        signature: impl Into<String>,
        annotation: Option<&str>,
        location: impl Into<String>,
    ) -> Self {
        Self::UnresolvableType {
            signature: signature.into(),
            annotation: annotation.unwrap_or("-").to_string(),
            location: location.into(),
        }
    }
}
