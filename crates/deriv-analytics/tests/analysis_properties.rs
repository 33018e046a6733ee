//! 분석 파이프라인 속성 테스트 (proptest)

use chrono::{TimeZone, Utc};
use deriv_analytics::patterns::{DOUBLE_WINDOW, HEAD_SHOULDERS_WINDOW};
use deriv_analytics::{analyze_series, detect_patterns};
use deriv_core::{Candle, CandleSeries};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn series_of(closes: &[Decimal]) -> CandleSeries {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            let ts = Utc.timestamp_opt(1_700_000_000 + i as i64 * 300, 0).unwrap();
            Candle::new(ts, *close, *close, *close, *close)
        })
        .collect()
}

/// 양수 가격 (소수 둘째 자리)
fn price() -> impl Strategy<Value = Decimal> {
    (1_000i64..500_000).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #[test]
    fn short_series_never_detects_double_patterns(
        closes in prop::collection::vec(price(), 0..DOUBLE_WINDOW)
    ) {
        let outcomes = detect_patterns(&closes);
        prop_assert!(outcomes.iter().all(|o| !o.is_detected()));
    }

    #[test]
    fn short_series_never_detects_head_and_shoulders(
        closes in prop::collection::vec(price(), 0..HEAD_SHOULDERS_WINDOW)
    ) {
        let outcomes = detect_patterns(&closes);
        prop_assert!(!outcomes[2].is_detected());
    }

    #[test]
    fn analysis_is_deterministic(
        closes in prop::collection::vec(price(), 0..120)
    ) {
        let series = series_of(&closes);

        let first = analyze_series(&series);
        let second = analyze_series(&series);

        prop_assert_eq!(&first.signal, &second.signal);
        prop_assert_eq!(&first.detections, &second.detections);
        prop_assert_eq!(first.series.latest(), second.series.latest());
    }
}
