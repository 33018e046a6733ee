//! 시그널 봇 공통 에러 타입.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 캔들 데이터를 가져오지 못했거나 비어 있음
    #[error("데이터 없음: {0}")]
    DataUnavailable(String),

    /// 지표 값이 워밍업 구간에 있어 정의되지 않음
    #[error("지표 미정의: {0}")]
    IndicatorUndefined(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// 분석 경로에서 로컬로 복구 가능한 에러인지 확인합니다.
    ///
    /// 복구 가능한 에러는 중립(Hold) 시그널로 강등됩니다.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CoreError::DataUnavailable(_) | CoreError::IndicatorUndefined(_)
        )
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}
