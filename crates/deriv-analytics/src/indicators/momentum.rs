//! 모멘텀 지표.
//!
//! - RSI (Wilder 평활, alpha = 1 / period)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{ewm, IndicatorError, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// 종가 차분에서 상승폭/하락폭을 분리하고 각각 alpha = 1/period 의 지수 평활을 적용합니다.
    /// `RSI = 100 - 100 / (1 + avg_gain / avg_loss)` 이며, 평균 하락폭이 0이면 100입니다.
    ///
    /// 첫 차분은 0으로 보고 평활에 포함합니다.
    ///
    /// # 반환
    /// 입력과 같은 길이. 처음 period - 1개는 None.
    pub fn rsi(&self, prices: &[Decimal], params: RsiParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "RSI 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if prices.len() < period {
            return Err(IndicatorError::InsufficientData {
                required: period,
                provided: prices.len(),
            });
        }

        let mut gains = Vec::with_capacity(prices.len());
        let mut losses = Vec::with_capacity(prices.len());
        gains.push(Some(Decimal::ZERO));
        losses.push(Some(Decimal::ZERO));
        for pair in prices.windows(2) {
            let change = pair[1] - pair[0];
            gains.push(Some(change.max(Decimal::ZERO)));
            losses.push(Some((-change).max(Decimal::ZERO)));
        }

        let alpha = Decimal::ONE / Decimal::from(period);
        let avg_gains = ewm(&gains, alpha, period);
        let avg_losses = ewm(&losses, alpha, period);

        let result = avg_gains
            .into_iter()
            .zip(avg_losses)
            .map(|(gain, loss)| match (gain, loss) {
                (Some(gain), Some(loss)) => Some(rsi_value(gain, loss)),
                _ => None,
            })
            .collect();

        Ok(result)
    }
}

fn rsi_value(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
    match avg_gain.checked_div(avg_loss) {
        Some(rs) => dec!(100) - dec!(100) / (Decimal::ONE + rs),
        None => dec!(100),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_warmup() {
        let calc = MomentumCalculator::new();
        let prices: Vec<Decimal> = (0..20)
            .map(|i| if i % 2 == 0 { dec!(100) } else { dec!(101) })
            .collect();

        let rsi = calc.rsi(&prices, RsiParams::default()).unwrap();
        assert_eq!(rsi.len(), 20);
        assert!(rsi[12].is_none());
        assert!(rsi[13].is_some());
    }

    #[test]
    fn test_rsi_all_gains_is_100() {
        let calc = MomentumCalculator::new();
        let prices: Vec<Decimal> = (0..20).map(|i| Decimal::from(100 + i)).collect();

        let rsi = calc.rsi(&prices, RsiParams::default()).unwrap();
        assert_eq!(rsi[19], Some(dec!(100)));
    }

    #[test]
    fn test_rsi_all_losses_is_0() {
        let calc = MomentumCalculator::new();
        let prices: Vec<Decimal> = (0..20).map(|i| Decimal::from(200 - i)).collect();

        let rsi = calc.rsi(&prices, RsiParams::default()).unwrap();
        assert_eq!(rsi[19], Some(Decimal::ZERO));
    }

    #[test]
    fn test_rsi_range() {
        let calc = MomentumCalculator::new();
        let prices = vec![
            dec!(44.34), dec!(44.09), dec!(44.15), dec!(43.61), dec!(44.33),
            dec!(44.83), dec!(45.10), dec!(45.42), dec!(45.84), dec!(46.08),
            dec!(45.89), dec!(46.03), dec!(45.61), dec!(46.28), dec!(46.28),
            dec!(46.00), dec!(46.03), dec!(46.41), dec!(46.22), dec!(45.64),
        ];

        let rsi = calc.rsi(&prices, RsiParams::default()).unwrap();
        for value in rsi.into_iter().flatten() {
            assert!(value >= Decimal::ZERO && value <= dec!(100));
        }
    }

    #[test]
    fn test_rsi_requires_period() {
        let calc = MomentumCalculator::new();
        let prices = vec![dec!(1); 13];
        let result = calc.rsi(&prices, RsiParams::default());
        assert!(matches!(
            result,
            Err(IndicatorError::InsufficientData { required: 14, provided: 13 })
        ));

        let prices = vec![dec!(1); 14];
        let rsi = calc.rsi(&prices, RsiParams::default()).unwrap();
        assert!(rsi[13].is_some());
    }

    /// 첫 차분을 0으로 시드한 평활 결과와 일치하는지 확인
    #[test]
    fn test_rsi_known_values() {
        let calc = MomentumCalculator::new();
        let prices: Vec<Decimal> = [
            100, 102, 101, 103, 105, 104, 106, 108, 107, 109,
            111, 110, 112, 114, 113, 115, 117, 116, 118, 120,
        ]
        .iter()
        .map(|v| Decimal::from(*v))
        .collect();

        let rsi = calc.rsi(&prices, RsiParams::default()).unwrap();
        let close_to = |value: Option<Decimal>, expected: Decimal| {
            (value.unwrap() - expected).abs() < dec!(0.001)
        };

        assert!(close_to(rsi[13], dec!(82.7466)));
        assert!(close_to(rsi[19], dec!(82.2656)));
    }
}
