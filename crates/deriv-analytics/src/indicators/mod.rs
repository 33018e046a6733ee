//! 기술적 지표 모듈.
//!
//! # 지원 지표
//!
//! ## 추세 지표
//! - **SMA**: 단순 이동평균
//! - **EMA**: 지수 이동평균
//! - **MACD**: 이동평균 수렴/확산과 시그널 라인
//!
//! ## 모멘텀 지표
//! - **RSI**: 상대강도지수 (Wilder 평활)
//!
//! 모든 지표는 입력과 같은 길이의 벡터를 반환하며, 워밍업 구간은 `None`입니다.
//! `None`은 "아직 계산할 수 없음"을 뜻하며 0으로 취급하면 안 됩니다.

pub mod momentum;
pub mod trend;

use rust_decimal::Decimal;
use thiserror::Error;

pub use momentum::{MomentumCalculator, RsiParams};
pub use trend::{EmaParams, MacdParams, MacdResult, SmaParams, TrendIndicators};

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 계산 오류
    #[error("계산 오류: {0}")]
    CalculationError(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 통합 지표 엔진.
///
/// 상태가 없으므로 같은 입력에 대해 항상 같은 결과를 냅니다.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
}

impl IndicatorEngine {
    /// 새로운 지표 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 단순 이동평균 (SMA). 처음 period-1개는 None.
    pub fn sma(&self, prices: &[Decimal], params: SmaParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.trend.sma(prices, params)
    }

    /// 지수 이동평균 (EMA). 처음 period-1개는 None.
    pub fn ema(&self, prices: &[Decimal], params: EmaParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.trend.ema(prices, params)
    }

    /// MACD 라인, 시그널 라인, 히스토그램.
    pub fn macd(&self, prices: &[Decimal], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        self.trend.macd(prices, params)
    }

    /// RSI. 0-100 범위, 처음 period개는 None.
    pub fn rsi(&self, prices: &[Decimal], params: RsiParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.momentum.rsi(prices, params)
    }
}

/// 비조정(adjust=false) 지수 가중 평균.
///
/// 첫 번째 관측값으로 시작해 `y = alpha * x + (1 - alpha) * y_prev`로 갱신합니다.
/// 앞쪽의 `None`은 건너뛰며, 관측값이 `min_periods`개 모이기 전까지는 `None`을 냅니다.
pub(crate) fn ewm(values: &[Option<Decimal>], alpha: Decimal, min_periods: usize) -> Vec<Option<Decimal>> {
    let one_minus_alpha = Decimal::ONE - alpha;
    let mut result = Vec::with_capacity(values.len());
    let mut state: Option<Decimal> = None;
    let mut observations = 0usize;

    for value in values {
        if let Some(x) = value {
            state = Some(match state {
                None => *x,
                Some(prev) => (*x * alpha) + (prev * one_minus_alpha),
            });
            observations += 1;
        }

        if observations >= min_periods.max(1) {
            result.push(state);
        } else {
            result.push(None);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_prices() -> Vec<Decimal> {
        vec![
            dec!(100.0),
            dec!(102.0),
            dec!(101.0),
            dec!(103.0),
            dec!(105.0),
            dec!(104.0),
            dec!(106.0),
            dec!(108.0),
            dec!(107.0),
            dec!(109.0),
            dec!(111.0),
            dec!(110.0),
            dec!(112.0),
            dec!(114.0),
            dec!(113.0),
        ]
    }

    #[test]
    fn test_sma_calculation() {
        let engine = IndicatorEngine::new();
        let prices = sample_prices();

        let sma = engine.sma(&prices, SmaParams { period: 5 }).unwrap();

        // 처음 4개는 None (데이터 부족)
        assert!(sma[0].is_none());
        assert!(sma[3].is_none());
        assert_eq!(sma[4], Some(dec!(102.2)));
    }

    #[test]
    fn test_insufficient_data_error() {
        let engine = IndicatorEngine::new();
        let prices = vec![dec!(100.0), dec!(101.0)];

        let result = engine.sma(&prices, SmaParams { period: 20 });
        assert!(matches!(
            result,
            Err(IndicatorError::InsufficientData { required: 20, provided: 2 })
        ));
    }

    #[test]
    fn test_ewm_skips_leading_none() {
        let values = vec![None, None, Some(dec!(10)), Some(dec!(20)), Some(dec!(30))];
        let result = ewm(&values, dec!(0.5), 2);

        assert_eq!(result[0], None);
        assert_eq!(result[2], None);
        // 10 → 0.5*20 + 0.5*10 = 15 → 0.5*30 + 0.5*15 = 22.5
        assert_eq!(result[3], Some(dec!(15)));
        assert_eq!(result[4], Some(dec!(22.5)));
    }
}
