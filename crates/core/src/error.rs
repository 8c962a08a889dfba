use thiserror::Error;

/// Result type for docsearch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for docsearch operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input supplied by the caller (unknown facet, unknown sort field, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A document returned by the backend violates the expected shape
    #[error("Corrupted search document: {0}")]
    Corruption(String),

    /// Keep-alive duration could not be parsed
    #[error("Invalid keep-alive '{value}': {message}")]
    InvalidKeepAlive { value: String, message: String },

    /// Scroll token could not be decoded
    #[error("Invalid scroll cursor: {0}")]
    InvalidCursor(String),

    /// JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Creates a corruption error
    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }

    /// Creates a keep-alive parse error
    pub fn invalid_keep_alive(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidKeepAlive {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Creates a cursor decoding error
    pub fn invalid_cursor(msg: impl Into<String>) -> Self {
        Self::InvalidCursor(msg.into())
    }

    /// Adds context to any error
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::with_context(context, e))
    }
}
