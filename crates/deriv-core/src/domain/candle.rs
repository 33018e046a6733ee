//! 캔들 및 캔들 시리즈.
//!
//! - `Candle` - 한 구간의 OHLC 요약
//! - `CandleSeries` - 시간 오름차순으로 정렬된 캔들 윈도우

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// OHLC 캔들스틱 데이터.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// 캔들 시작 시간
    pub timestamp: DateTime<Utc>,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
}

impl Candle {
    /// 새 캔들을 생성합니다.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }
}

/// 시간 오름차순으로 정렬되고 타임스탬프가 중복되지 않는 캔들 시리즈.
///
/// 한 번의 분석 호출이 소유하며 생성 이후 변경되지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// 캔들 목록에서 시리즈를 생성합니다.
    ///
    /// 타임스탬프 기준으로 정렬하고, 같은 타임스탬프가 여러 번 나오면 마지막 캔들만 남깁니다.
    pub fn new(mut candles: Vec<Candle>) -> Self {
        // 안정 정렬이므로 같은 타임스탬프 안에서는 입력 순서가 유지된다
        candles.sort_by_key(|c| c.timestamp);

        let mut deduped: Vec<Candle> = Vec::with_capacity(candles.len());
        for candle in candles {
            match deduped.last_mut() {
                Some(last) if last.timestamp == candle.timestamp => *last = candle,
                _ => deduped.push(candle),
            }
        }

        Self { candles: deduped }
    }

    /// 빈 시리즈.
    pub fn empty() -> Self {
        Self::default()
    }

    /// 캔들 수.
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// 캔들 슬라이스.
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// 가장 최근 캔들.
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// 종가 목록.
    pub fn closes(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.close).collect()
    }
}

impl FromIterator<Candle> for CandleSeries {
    fn from_iter<I: IntoIterator<Item = Candle>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
