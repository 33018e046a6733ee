//! 분석 파이프라인 진입점.
//!
//! 지표 부착 → 패턴 감지 → 시그널 결합을 한 번에 수행합니다.
//! 어떤 실패도 호출자에게 전파하지 않고 중립(Hold) 시그널로 강등합니다.

use deriv_core::{CandleSeries, CoreError, CoreResult, Signal};
use tracing::{debug, error};

use crate::combiner::combine;
use crate::enrichment::{enrich, EnrichedSeries};
use crate::patterns::{detect_patterns, PatternOutcome};

/// 한 번의 분석 결과.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub series: EnrichedSeries,
    pub detections: Vec<PatternOutcome>,
    pub signal: Signal,
}

impl AnalysisOutcome {
    fn neutral(series: EnrichedSeries) -> Self {
        Self {
            series,
            detections: Vec::new(),
            signal: Signal::neutral(),
        }
    }

    /// 감지된 패턴 수.
    pub fn detected_count(&self) -> usize {
        self.detections.iter().filter(|o| o.is_detected()).count()
    }
}

/// 캔들 시리즈를 분석해 시그널을 만듭니다. 실패하지 않습니다.
///
/// 빈 시리즈나 내부 오류는 Hold / "None" 시그널이 됩니다.
pub fn analyze_series(series: &CandleSeries) -> AnalysisOutcome {
    let enriched = enrich(series);

    match run_pipeline(&enriched) {
        Ok((detections, signal)) => {
            debug!(
                candles = enriched.len(),
                signal = %signal.recommendation,
                patterns = %signal.pattern_label(),
                "분석 완료"
            );
            AnalysisOutcome {
                series: enriched,
                detections,
                signal,
            }
        }
        Err(e) => {
            if e.is_recoverable() {
                debug!(error = %e, "분석 불가, 중립 시그널 반환");
            } else {
                error!(error = %e, "분석 실패, 중립 시그널 반환");
            }
            AnalysisOutcome::neutral(enriched)
        }
    }
}

fn run_pipeline(enriched: &EnrichedSeries) -> CoreResult<(Vec<PatternOutcome>, Signal)> {
    let snapshot = enriched
        .latest()
        .ok_or_else(|| CoreError::DataUnavailable("빈 캔들 시리즈".to_string()))?;

    let closes = enriched.series().closes();
    let detections = detect_patterns(&closes);
    let signal = combine(&detections, Some(&snapshot));

    Ok((detections, signal))
}
