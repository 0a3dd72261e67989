//! Redis sink errors

/// Failure of a single backend operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Could not connect, or the connection broke mid-command
    #[error("connection error: {0}")]
    Connection(String),

    /// The operation did not complete within its timeout
    #[error("operation timed out")]
    Timeout,

    /// The server answered with an error reply
    #[error("error reply: {0}")]
    Response(String),
}

impl BackendError {
    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a response error
    pub fn response(msg: impl Into<String>) -> Self {
        Self::Response(msg.into())
    }

    /// Whether retrying on a fresh connection may succeed
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout)
    }
}

/// Errors from the Redis sink
#[derive(Debug, thiserror::Error)]
pub enum RedisSinkError {
    /// Every attempt failed with a transient error
    #[error("delivery failed after {attempts} attempts: {last_error}")]
    DeliveryExhausted {
        attempts: u32,
        #[source]
        last_error: BackendError,
    },

    /// The server rejected the write
    #[error("write rejected: {0}")]
    Rejected(#[source] BackendError),

    /// Shutdown was requested while waiting to retry
    #[error("interrupted after {attempts} attempts")]
    Interrupted { attempts: u32 },

    /// Invalid sink configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl RedisSinkError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Number of backend attempts made before this error, when known
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::DeliveryExhausted { attempts, .. } | Self::Interrupted { attempts } => {
                Some(*attempts)
            }
            Self::Rejected(_) => Some(1),
            Self::Config(_) => None,
        }
    }
}
