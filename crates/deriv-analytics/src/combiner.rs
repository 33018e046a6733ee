//! 시그널 결합기.
//!
//! 1. 감지된 패턴의 신뢰도를 방향별로 합산해 패턴 추천을 만든다.
//! 2. SMA/MACD/RSI 교차 휴리스틱으로 지표 추천을 만든다.
//! 3. 패턴 추천이 Hold가 아니면 그것을, 아니면 지표 추천을 쓴다.

use deriv_core::{Direction, Recommendation, Signal};
use rust_decimal_macros::dec;

use crate::enrichment::IndicatorSnapshot;
use crate::patterns::PatternOutcome;

/// 방향별 신뢰도 합계.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PatternVote {
    pub buy_score: f64,
    pub sell_score: f64,
}

impl PatternVote {
    /// 감지된 패턴만 집계합니다.
    pub fn tally(outcomes: &[PatternOutcome]) -> Self {
        outcomes
            .iter()
            .filter_map(PatternOutcome::detection)
            .fold(Self::default(), |mut vote, detection| {
                match detection.direction {
                    Direction::Buy => vote.buy_score += detection.confidence,
                    Direction::Sell => vote.sell_score += detection.confidence,
                }
                vote
            })
    }

    /// 동점이면 Hold.
    pub fn recommendation(&self) -> Recommendation {
        if self.buy_score > self.sell_score {
            Recommendation::Buy
        } else if self.sell_score > self.buy_score {
            Recommendation::Sell
        } else {
            Recommendation::Hold
        }
    }
}

/// 최근 캔들 기준 지표 교차 추천.
///
/// 필요한 값 중 하나라도 미정의면 Hold.
pub fn indicator_recommendation(snapshot: &IndicatorSnapshot) -> Recommendation {
    let (Some(sma_5), Some(sma_10), Some(macd), Some(signal), Some(rsi)) = (
        snapshot.sma_5,
        snapshot.sma_10,
        snapshot.macd,
        snapshot.macd_signal,
        snapshot.rsi,
    ) else {
        return Recommendation::Hold;
    };

    if sma_5 > sma_10 && macd > signal && rsi < dec!(70) {
        Recommendation::Buy
    } else if sma_5 < sma_10 && macd < signal && rsi > dec!(30) {
        Recommendation::Sell
    } else {
        Recommendation::Hold
    }
}

/// 패턴 결과와 지표 스냅샷을 최종 시그널로 결합합니다.
pub fn combine(outcomes: &[PatternOutcome], snapshot: Option<&IndicatorSnapshot>) -> Signal {
    let pattern_rec = PatternVote::tally(outcomes).recommendation();

    let recommendation = match pattern_rec {
        Recommendation::Hold => snapshot
            .map(indicator_recommendation)
            .unwrap_or(Recommendation::Hold),
        decided => decided,
    };

    let patterns = outcomes
        .iter()
        .filter_map(PatternOutcome::detection)
        .map(|d| d.name.clone())
        .collect();

    Signal::new(recommendation, patterns)
}
