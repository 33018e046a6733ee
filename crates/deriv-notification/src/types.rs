//! 전달 trait 및 에러 정의.

use std::path::Path;

use async_trait::async_trait;
use deriv_core::RecipientKey;
use tracing::error;

/// 알림 작업용 Result 타입.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// 알림 에러.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("알림 전송 실패: {0}")]
    SendFailed(String),

    #[error("잘못된 설정: {0}")]
    InvalidConfig(String),

    #[error("요청 한도 초과: {0}초 후 재시도")]
    RateLimited(u64),

    #[error("네트워크 에러: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("직렬화 에러: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("파일 에러: {0}")]
    Io(#[from] std::io::Error),
}

/// 분석 결과를 수신자에게 전달하는 외부 협력자.
///
/// 전달은 fire-and-forget입니다. 실패는 구현체가 로그로 남기고 재시도하지 않습니다.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// 전달을 시도하고 결과를 반환합니다.
    async fn try_deliver(
        &self,
        recipient: &RecipientKey,
        text: &str,
        image: Option<&Path>,
    ) -> NotificationResult<()>;

    /// 전달기 이름을 반환합니다.
    fn name(&self) -> &str;

    /// 전달하고 실패는 로그만 남깁니다.
    async fn deliver(&self, recipient: &RecipientKey, text: &str, image: Option<&Path>) {
        if let Err(e) = self.try_deliver(recipient, text, image).await {
            error!(
                sink = self.name(),
                recipient = %recipient,
                error = %e,
                "메시지 전달 실패"
            );
        }
    }
}
