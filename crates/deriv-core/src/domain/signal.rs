//! 매매 추천, 패턴 감지 결과, 최종 시그널.
//!
//! - `Recommendation` - Buy/Sell/Hold 추천
//! - `Direction` - 패턴이 가리키는 방향
//! - `PatternDetection` - 개별 패턴 감지기의 출력
//! - `Signal` - 한 번의 분석 결과

use serde::{Deserialize, Serialize};
use std::fmt;

/// 최종 매매 추천.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Recommendation {
    /// 매수
    Buy,
    /// 매도
    Sell,
    /// 관망
    #[default]
    Hold,
}

impl Recommendation {
    /// 메시지에 쓰는 상태 이모지.
    pub fn emoji(&self) -> &'static str {
        match self {
            Recommendation::Buy => "🟢",
            Recommendation::Sell => "🔴",
            Recommendation::Hold => "⚪",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Buy => write!(f, "Buy"),
            Recommendation::Sell => write!(f, "Sell"),
            Recommendation::Hold => write!(f, "Hold"),
        }
    }
}

/// 패턴이 가리키는 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
}

/// 패턴 감지기 하나의 출력.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternDetection {
    /// 패턴 이름 (예: "Double Top")
    pub name: String,
    /// 감지 여부
    pub detected: bool,
    /// 방향성
    pub direction: Direction,
    /// 신뢰도 (0.0, 1.0]
    pub confidence: f64,
}

impl PatternDetection {
    /// 감지된 패턴을 생성합니다.
    pub fn detected(name: impl Into<String>, direction: Direction, confidence: f64) -> Self {
        Self {
            name: name.into(),
            detected: true,
            direction,
            confidence,
        }
    }
}

/// 한 번의 분석이 만든 최종 시그널.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Signal {
    /// 최종 추천
    pub recommendation: Recommendation,
    /// 기여한(감지된) 패턴 이름들, 감지기 평가 순서
    pub patterns: Vec<String>,
}

impl Signal {
    /// 새 시그널을 생성합니다.
    pub fn new(recommendation: Recommendation, patterns: Vec<String>) -> Self {
        Self {
            recommendation,
            patterns,
        }
    }

    /// 중립 시그널 (Hold, 패턴 없음).
    pub fn neutral() -> Self {
        Self::default()
    }

    /// 표시용 패턴 라벨. 감지된 패턴이 없으면 "None".
    pub fn pattern_label(&self) -> String {
        if self.patterns.is_empty() {
            "None".to_string()
        } else {
            self.patterns.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_label() {
        assert_eq!(Signal::neutral().pattern_label(), "None");

        let signal = Signal::new(
            Recommendation::Sell,
            vec!["Double Top".to_string(), "Head and Shoulders".to_string()],
        );
        assert_eq!(signal.pattern_label(), "Double Top, Head and Shoulders");
    }

    #[test]
    fn test_recommendation_emoji() {
        assert_eq!(Recommendation::Buy.emoji(), "🟢");
        assert_eq!(Recommendation::Sell.emoji(), "🔴");
        assert_eq!(Recommendation::Hold.emoji(), "⚪");
    }
}
