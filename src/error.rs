use thiserror::Error;

/// Errors raised while assembling or querying a project context.
#[derive(Debug, Error)]
pub enum ContextError {
    /// One or more required fields were never supplied.
    #[error("missing required context fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("unknown context field `{0}`")]
    UnknownField(String),

    /// A timestamp did not parse as RFC 3339.
    #[error("invalid timestamp `{value}` from {source_name}: {source}")]
    InvalidTime {
        source_name: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

pub type Result<T> = std::result::Result<T, ContextError>;
