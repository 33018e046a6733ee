//! 캔들 소스 trait 정의.

use async_trait::async_trait;
use deriv_core::{CandleSeries, Timeframe};

use crate::ExchangeError;

/// 캔들 조회 작업을 위한 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// 최근 캔들 윈도우를 제공하는 외부 데이터 소스.
///
/// 업스트림에 데이터가 없으면 에러가 아니라 빈 시리즈를 돌려줍니다.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// 소스 이름 반환.
    fn name(&self) -> &str;

    /// `symbol`의 최근 `count`개 캔들을 `timeframe` 단위로 조회.
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> ExchangeResult<CandleSeries>;
}
