//! 추세 지표.
//!
//! - SMA: 롤링 평균
//! - EMA: span 기반 지수 평활 (alpha = 2 / (span + 1))
//! - MACD: EMA(fast) - EMA(slow) 와 그 EMA 시그널 라인

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ewm, IndicatorError, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 윈도우 크기.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 5 }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// span.
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 12 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA span (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA span (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 span (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// 한 시점의 MACD 값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    /// MACD 라인.
    pub macd: Option<Decimal>,
    /// 시그널 라인.
    pub signal: Option<Decimal>,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: Option<Decimal>,
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균.
    ///
    /// 인덱스 i (i >= period-1) 의 값은 `prices[i+1-period..=i]` 의 산술 평균입니다.
    pub fn sma(
        &self,
        prices: &[Decimal],
        params: SmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;
        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "SMA 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if prices.len() < period {
            return Err(IndicatorError::InsufficientData {
                required: period,
                provided: prices.len(),
            });
        }

        let divisor = Decimal::from(period);
        let mut window_sum = Decimal::ZERO;
        let mut result = Vec::with_capacity(prices.len());

        for (i, price) in prices.iter().enumerate() {
            window_sum += *price;
            if i >= period {
                window_sum -= prices[i - period];
            }

            if i + 1 >= period {
                result.push(Some(window_sum / divisor));
            } else {
                result.push(None);
            }
        }

        Ok(result)
    }

    /// 지수 이동평균.
    ///
    /// 첫 가격으로 시드하고 `EMA = k * P + (1 - k) * EMA_prev` (k = 2 / (span + 1)) 로 갱신합니다.
    /// span 개의 관측값이 쌓이기 전까지는 None.
    pub fn ema(
        &self,
        prices: &[Decimal],
        params: EmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;
        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "EMA 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if prices.len() < period {
            return Err(IndicatorError::InsufficientData {
                required: period,
                provided: prices.len(),
            });
        }

        let observed: Vec<Option<Decimal>> = prices.iter().copied().map(Some).collect();
        Ok(ewm(&observed, span_alpha(period), period))
    }

    /// MACD.
    ///
    /// 기본 파라미터에서 MACD 라인은 인덱스 25부터, 시그널 라인은 인덱스 33부터 정의됩니다.
    pub fn macd(&self, prices: &[Decimal], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        let MacdParams {
            fast_period,
            slow_period,
            signal_period,
        } = params;

        if fast_period == 0 || slow_period == 0 || signal_period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "MACD 기간은 모두 0보다 커야 합니다".to_string(),
            ));
        }
        if fast_period >= slow_period {
            return Err(IndicatorError::InvalidParameter(format!(
                "단기 기간({})은 장기 기간({})보다 작아야 합니다",
                fast_period, slow_period
            )));
        }
        if prices.len() < slow_period {
            return Err(IndicatorError::InsufficientData {
                required: slow_period,
                provided: prices.len(),
            });
        }

        let fast = self.ema(prices, EmaParams { period: fast_period })?;
        let slow = self.ema(prices, EmaParams { period: slow_period })?;

        let macd_line: Vec<Option<Decimal>> = fast
            .iter()
            .zip(slow.iter())
            .map(|(f, s)| match (f, s) {
                (Some(f), Some(s)) => Some(*f - *s),
                _ => None,
            })
            .collect();

        let signal_line = ewm(&macd_line, span_alpha(signal_period), signal_period);

        Ok(macd_line
            .into_iter()
            .zip(signal_line)
            .map(|(macd, signal)| MacdResult {
                macd,
                signal,
                histogram: match (macd, signal) {
                    (Some(m), Some(s)) => Some(m - s),
                    _ => None,
                },
            })
            .collect())
    }
}

fn span_alpha(span: usize) -> Decimal {
    Decimal::TWO / Decimal::from(span + 1)
}
