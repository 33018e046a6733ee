//! 지표 컬럼이 부착된 캔들 시리즈.
//!
//! 원본 `CandleSeries`는 그대로 두고, SMA_5 / SMA_10 / RSI / MACD / MACD_signal
//! 컬럼을 캔들과 같은 길이로 덧붙인 사본을 만듭니다.

use deriv_core::{Candle, CandleSeries};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::indicators::{IndicatorEngine, IndicatorResult, MacdParams, RsiParams, SmaParams};

/// 단기 SMA 윈도우.
pub const SMA_FAST: usize = 5;
/// 장기 SMA 윈도우.
pub const SMA_SLOW: usize = 10;

/// 지표 컬럼이 부착된 시리즈.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedSeries {
    series: CandleSeries,
    pub sma_5: Vec<Option<Decimal>>,
    pub sma_10: Vec<Option<Decimal>>,
    pub rsi: Vec<Option<Decimal>>,
    pub macd: Vec<Option<Decimal>>,
    pub macd_signal: Vec<Option<Decimal>>,
}

/// 가장 최근 캔들 시점의 지표 값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub close: Decimal,
    pub sma_5: Option<Decimal>,
    pub sma_10: Option<Decimal>,
    pub rsi: Option<Decimal>,
    pub macd: Option<Decimal>,
    pub macd_signal: Option<Decimal>,
}

impl EnrichedSeries {
    /// 원본 시리즈.
    pub fn series(&self) -> &CandleSeries {
        &self.series
    }

    pub fn candles(&self) -> &[Candle] {
        self.series.candles()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// 마지막 캔들의 지표 스냅샷. 빈 시리즈면 None.
    pub fn latest(&self) -> Option<IndicatorSnapshot> {
        let last = self.series.last()?;
        let idx = self.series.len() - 1;
        Some(IndicatorSnapshot {
            close: last.close,
            sma_5: column_at(&self.sma_5, idx),
            sma_10: column_at(&self.sma_10, idx),
            rsi: column_at(&self.rsi, idx),
            macd: column_at(&self.macd, idx),
            macd_signal: column_at(&self.macd_signal, idx),
        })
    }
}

fn column_at(column: &[Option<Decimal>], idx: usize) -> Option<Decimal> {
    column.get(idx).copied().flatten()
}

/// 시리즈에 지표 컬럼을 계산해 붙입니다.
///
/// 데이터가 부족한 지표는 전부 None인 컬럼이 됩니다.
pub fn enrich(series: &CandleSeries) -> EnrichedSeries {
    let engine = IndicatorEngine::new();
    let closes = series.closes();
    let len = closes.len();

    let sma_5 = or_undefined(
        "sma_5",
        engine.sma(&closes, SmaParams { period: SMA_FAST }),
        len,
    );
    let sma_10 = or_undefined(
        "sma_10",
        engine.sma(&closes, SmaParams { period: SMA_SLOW }),
        len,
    );
    let rsi = or_undefined("rsi", engine.rsi(&closes, RsiParams::default()), len);

    let (macd, macd_signal) = match engine.macd(&closes, MacdParams::default()) {
        Ok(values) => values.into_iter().map(|m| (m.macd, m.signal)).unzip(),
        Err(e) => {
            debug!(column = "macd", error = %e, "지표 미정의");
            (vec![None; len], vec![None; len])
        }
    };

    EnrichedSeries {
        series: series.clone(),
        sma_5,
        sma_10,
        rsi,
        macd,
        macd_signal,
    }
}

fn or_undefined(
    column: &'static str,
    result: IndicatorResult<Vec<Option<Decimal>>>,
    len: usize,
) -> Vec<Option<Decimal>> {
    match result {
        Ok(values) => values,
        Err(e) => {
            debug!(column, error = %e, "지표 미정의");
            vec![None; len]
        }
    }
}
