//! Error types for sqlgraft

use thiserror::Error;

/// Result type alias for sqlgraft operations
pub type GraftResult<T> = Result<T, GraftError>;

/// Error types for query compilation and statement building
#[derive(Debug, Error)]
pub enum GraftError {
    /// Unknown entity, property, or navigation; or a property used in a
    /// role it is not declared for (selectable/filterable/sortable)
    #[error("Schema error at '{path}': {message}")]
    Schema { path: String, message: String },

    /// Invalid predicate AST (empty conjunction, empty path, type mismatch)
    #[error("Malformed filter: {0}")]
    MalformedFilter(String),

    /// Expand traversal deeper than the configured maximum
    #[error("Expand depth {depth} exceeds the configured maximum of {max}")]
    ExpandDepthExceeded { depth: usize, max: usize },

    /// The dialect lacks a requested capability (e.g. sequences)
    #[error("Dialect '{dialect}' does not support {feature}")]
    UnsupportedFeature { dialect: String, feature: String },

    /// Dialect name not present in the registry
    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),

    /// Two join paths were assigned the same alias. This is a bug in alias
    /// allocation, not bad input; the operation is aborted.
    #[error("Alias collision: '{alias}' assigned to both '{first}' and '{second}'")]
    AliasCollision {
        alias: String,
        first: String,
        second: String,
    },

    /// Clause ordering or identifier rendering violated a dialect rule.
    /// Indicates broken metadata or a builder bug; the operation is aborted.
    #[error("Dialect render error: {0}")]
    DialectRender(String),
}

impl GraftError {
    /// Create a schema error for a specific path
    pub fn schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a schema error for an unknown property
    pub fn unknown_property(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::Schema {
            message: format!("unknown property '{path}'"),
            path,
        }
    }

    /// Create a schema error for an unknown navigation segment
    pub fn unknown_navigation(path: impl Into<String>, segment: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            message: format!("unknown navigation '{}'", segment.into()),
        }
    }

    /// Create a malformed filter error
    pub fn malformed_filter(message: impl Into<String>) -> Self {
        Self::MalformedFilter(message.into())
    }

    /// Create an unsupported feature error
    pub fn unsupported(dialect: impl Into<String>, feature: impl Into<String>) -> Self {
        Self::UnsupportedFeature {
            dialect: dialect.into(),
            feature: feature.into(),
        }
    }

    /// Create a dialect render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::DialectRender(message.into())
    }

    /// Check if this is a schema error
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }

    /// Check if this is a malformed filter error
    pub fn is_malformed_filter(&self) -> bool {
        matches!(self, Self::MalformedFilter(_))
    }

    /// Check if this is an unsupported feature error
    pub fn is_unsupported_feature(&self) -> bool {
        matches!(self, Self::UnsupportedFeature { .. })
    }

    /// Check if this error reports an internal invariant violation rather
    /// than bad input. Internal errors abort the operation; they are never
    /// worth retrying with the same build of the library.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::AliasCollision { .. } | Self::DialectRender(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_names_the_path() {
        let err = GraftError::unknown_property("Orders/Nope");
        assert!(err.is_schema());
        assert!(err.to_string().contains("Orders/Nope"));
    }

    #[test]
    fn depth_error_reports_the_limit() {
        let err = GraftError::ExpandDepthExceeded { depth: 5, max: 4 };
        let text = err.to_string();
        assert!(text.contains('5'));
        assert!(text.contains('4'));
    }

    #[test]
    fn internal_classification() {
        assert!(GraftError::render("broke").is_internal());
        assert!(
            GraftError::AliasCollision {
                alias: "T1".into(),
                first: "A".into(),
                second: "B".into(),
            }
            .is_internal()
        );
        assert!(!GraftError::unknown_property("X").is_internal());
        assert!(!GraftError::UnknownDialect("nope".into()).is_internal());
    }
}
