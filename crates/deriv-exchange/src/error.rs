//! 시장 데이터 조회 에러 타입.

use thiserror::Error;

/// 캔들 소스 관련 에러.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 응답 전에 연결이 끊김
    #[error("Disconnected: {0}")]
    Disconnected(String),

    /// API가 돌려준 에러 객체
    #[error("API error {code}: {message}")]
    ApiError { code: String, message: String },

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    ParseError(String),

    /// WebSocket 프로토콜 에러
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl ExchangeError {
    /// 재시도 가능한 에러인지 확인.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExchangeError::NetworkError(_)
                | ExchangeError::Disconnected(_)
                | ExchangeError::Timeout(_)
                | ExchangeError::WebSocket(_)
        )
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::ParseError(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ExchangeError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;

        let message = err.to_string();
        match err {
            WsError::Io(_) => ExchangeError::NetworkError(message),
            WsError::ConnectionClosed | WsError::AlreadyClosed => {
                ExchangeError::Disconnected(message)
            }
            _ => ExchangeError::WebSocket(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ExchangeError::Timeout("30s".to_string()).is_retryable());
        assert!(ExchangeError::Disconnected("closed".to_string()).is_retryable());
        assert!(!ExchangeError::ParseError("bad".to_string()).is_retryable());
        assert!(!ExchangeError::ApiError {
            code: "InvalidSymbol".to_string(),
            message: "Symbol R_999 is invalid".to_string(),
        }
        .is_retryable());
    }

    #[test]
    fn test_from_serde_error() {
        let err: ExchangeError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, ExchangeError::ParseError(_)));
    }
}
