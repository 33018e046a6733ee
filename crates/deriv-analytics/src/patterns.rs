//! 규칙 기반 차트 패턴 감지기.
//!
//! 각 감지기는 최근 N개 종가만 보는 독립 순수 함수이며, 서로의 결과를 보지 않습니다.
//! 윈도우보다 짧은 시리즈는 오류 없이 "미감지"로 처리합니다.

use deriv_core::{Direction, PatternDetection};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 더블 탑/바텀 윈도우 (최근 종가 수).
pub const DOUBLE_WINDOW: usize = 20;
/// 헤드 앤 숄더 윈도우.
pub const HEAD_SHOULDERS_WINDOW: usize = 30;

/// 두 고점(저점)의 상대 차이 허용치.
pub const DOUBLE_TOLERANCE: Decimal = dec!(0.01);
/// 양 어깨의 상대 차이 허용치.
pub const SHOULDER_TOLERANCE: Decimal = dec!(0.05);

pub const DOUBLE_CONFIDENCE: f64 = 0.7;
pub const HEAD_SHOULDERS_CONFIDENCE: f64 = 0.8;

pub const DOUBLE_TOP: &str = "Double Top";
pub const DOUBLE_BOTTOM: &str = "Double Bottom";
pub const HEAD_AND_SHOULDERS: &str = "Head and Shoulders";

/// 감지기 하나의 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternOutcome {
    Detected(PatternDetection),
    NotDetected { name: &'static str },
}

impl PatternOutcome {
    pub fn name(&self) -> &str {
        match self {
            PatternOutcome::Detected(detection) => &detection.name,
            PatternOutcome::NotDetected { name } => name,
        }
    }

    pub fn is_detected(&self) -> bool {
        matches!(self, PatternOutcome::Detected(_))
    }

    pub fn detection(&self) -> Option<&PatternDetection> {
        match self {
            PatternOutcome::Detected(detection) => Some(detection),
            PatternOutcome::NotDetected { .. } => None,
        }
    }

    fn from_condition(
        name: &'static str,
        condition: bool,
        direction: Direction,
        confidence: f64,
    ) -> Self {
        if condition {
            PatternOutcome::Detected(PatternDetection::detected(name, direction, confidence))
        } else {
            PatternOutcome::NotDetected { name }
        }
    }
}

/// 모든 감지기를 더블 탑, 더블 바텀, 헤드 앤 숄더 순서로 평가합니다.
pub fn detect_patterns(closes: &[Decimal]) -> Vec<PatternOutcome> {
    vec![
        double_top(closes),
        double_bottom(closes),
        head_and_shoulders(closes),
    ]
}

/// 더블 탑: 최근 20개 종가를 두 구간으로 나눈 최고가가 1% 이내. 매도.
pub fn double_top(closes: &[Decimal]) -> PatternOutcome {
    let condition = trailing(closes, DOUBLE_WINDOW)
        .map(|window| {
            let (first, second) = window.split_at(DOUBLE_WINDOW / 2);
            match (max_of(first), max_of(second)) {
                (Some(max1), Some(max2)) => within(max1, max2, DOUBLE_TOLERANCE),
                _ => false,
            }
        })
        .unwrap_or(false);

    PatternOutcome::from_condition(DOUBLE_TOP, condition, Direction::Sell, DOUBLE_CONFIDENCE)
}

/// 더블 바텀: 최근 20개 종가를 두 구간으로 나눈 최저가가 1% 이내. 매수.
pub fn double_bottom(closes: &[Decimal]) -> PatternOutcome {
    let condition = trailing(closes, DOUBLE_WINDOW)
        .map(|window| {
            let (first, second) = window.split_at(DOUBLE_WINDOW / 2);
            match (min_of(first), min_of(second)) {
                (Some(min1), Some(min2)) => within(min1, min2, DOUBLE_TOLERANCE),
                _ => false,
            }
        })
        .unwrap_or(false);

    PatternOutcome::from_condition(DOUBLE_BOTTOM, condition, Direction::Buy, DOUBLE_CONFIDENCE)
}

/// 헤드 앤 숄더: 최근 30개 종가를 세 구간으로 나눈 최고가가
/// 가운데 > 양쪽 이고 양 어깨가 5% 이내. 매도.
pub fn head_and_shoulders(closes: &[Decimal]) -> PatternOutcome {
    let condition = trailing(closes, HEAD_SHOULDERS_WINDOW)
        .map(|window| {
            let third = HEAD_SHOULDERS_WINDOW / 3;
            let left = max_of(&window[..third]);
            let head = max_of(&window[third..2 * third]);
            let right = max_of(&window[2 * third..]);

            match (left, head, right) {
                (Some(left), Some(head), Some(right)) => {
                    head > left && head > right && within(left, right, SHOULDER_TOLERANCE)
                }
                _ => false,
            }
        })
        .unwrap_or(false);

    PatternOutcome::from_condition(
        HEAD_AND_SHOULDERS,
        condition,
        Direction::Sell,
        HEAD_SHOULDERS_CONFIDENCE,
    )
}

fn trailing(closes: &[Decimal], window: usize) -> Option<&[Decimal]> {
    if closes.len() < window {
        return None;
    }
    Some(&closes[closes.len() - window..])
}

fn max_of(values: &[Decimal]) -> Option<Decimal> {
    values.iter().copied().max()
}

fn min_of(values: &[Decimal]) -> Option<Decimal> {
    values.iter().copied().min()
}

/// `|reference - other| / reference < tolerance`.
///
/// 기준값이 0 이하이면 비율이 의미가 없으므로 미감지.
fn within(reference: Decimal, other: Decimal, tolerance: Decimal) -> bool {
    if reference <= Decimal::ZERO {
        return false;
    }
    (reference - other)
        .abs()
        .checked_div(reference)
        .map(|ratio| ratio < tolerance)
        .unwrap_or(false)
}
