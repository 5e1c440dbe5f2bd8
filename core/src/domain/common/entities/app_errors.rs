use thiserror::Error;

/// Message shown for every failure that is not a server-reported error.
pub const NETWORK_ERROR_MESSAGE: &str = "网络错误，请检查网络连接后重试";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The service answered with an `error` field.
    #[error("{0}")]
    ServerError(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid clarification selection")]
    InvalidSelection,

    #[error("not found")]
    NotFound,

    #[error("a request is already in flight")]
    Busy,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("export failed: {0}")]
    ExportFailed(String),
}

impl CoreError {
    /// Text that may be shown to the user for this error.
    ///
    /// Only server-reported messages are surfaced verbatim; transport and
    /// decoding details stay in the logs.
    pub fn user_message(&self) -> &str {
        match self {
            CoreError::ServerError(message) => message,
            _ => NETWORK_ERROR_MESSAGE,
        }
    }

    pub fn is_semantic(&self) -> bool {
        matches!(self, CoreError::ServerError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_is_shown_verbatim() {
        let err = CoreError::ServerError("请输入饮食内容".to_string());
        assert_eq!(err.user_message(), "请输入饮食内容");
        assert!(err.is_semantic());
    }

    #[test]
    fn test_transport_detail_is_hidden() {
        let err = CoreError::Network("connection refused (os error 111)".to_string());
        assert_eq!(err.user_message(), NETWORK_ERROR_MESSAGE);
        assert!(!err.is_semantic());

        let err = CoreError::MalformedResponse("expected value at line 1".to_string());
        assert_eq!(err.user_message(), NETWORK_ERROR_MESSAGE);
    }
}
