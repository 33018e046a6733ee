//! # Deriv Analytics
//!
//! 캔들 시리즈에서 매매 시그널을 도출하는 순수 분석 파이프라인.
//!
//! 지표 엔진 → 패턴 감지기 → 시그널 결합기 순서로 동작하며,
//! 모든 단계는 입력 시리즈만으로 결정되는 순수 함수입니다.

pub mod analyzer;
pub mod combiner;
pub mod enrichment;
pub mod indicators;
pub mod patterns;

pub use analyzer::{analyze_series, AnalysisOutcome};
pub use combiner::{combine, indicator_recommendation, PatternVote};
pub use enrichment::{enrich, EnrichedSeries, IndicatorSnapshot};
pub use indicators::{IndicatorEngine, IndicatorError, IndicatorResult};
pub use patterns::{detect_patterns, PatternOutcome};
