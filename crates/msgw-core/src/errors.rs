/// Core error type for the gateway.
///
/// Adapter crates map their transport errors into `Messaging` so callers see one
/// error surface regardless of which provider handled the request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or missing required input. Always caller-fixable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("provider '{provider}' is not registered. Available providers: {}", known.join(", "))]
    UnknownProvider {
        provider: String,
        known: Vec<String>,
    },

    /// A recognized request shape that no provider path can deliver yet.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Opaque failure reported by a provider client. `code` is forwarded as-is.
    #[error("messaging error [{code}]: {message}")]
    Messaging { code: String, message: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn messaging(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Messaging {
            code: code.into(),
            message: message.into(),
        }
    }

    /// True for errors the caller can fix by changing the request.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::UnknownProvider { .. } | Self::UnsupportedOperation(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_lists_known_names() {
        let err = Error::UnknownProvider {
            provider: "unknown".to_string(),
            known: vec!["max".to_string(), "telegram".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("not registered"));
        assert!(msg.contains("max, telegram"));
        assert!(err.is_caller_error());
    }

    #[test]
    fn messaging_error_is_not_caller_error() {
        let err = Error::messaging("telegram_api", "Bad Request: chat not found");
        assert_eq!(
            err.to_string(),
            "messaging error [telegram_api]: Bad Request: chat not found"
        );
        assert!(!err.is_caller_error());
    }
}
