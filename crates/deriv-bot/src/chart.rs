//! 차트 렌더러 인터페이스.

use std::path::PathBuf;

use deriv_analytics::EnrichedSeries;

/// 지표가 부착된 시리즈를 이미지 파일로 그리는 외부 협력자.
///
/// `None`은 "차트 없음"이며 호출자는 텍스트만 전달합니다.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, series: &EnrichedSeries, symbol: &str) -> Option<PathBuf>;
}

/// 차트를 만들지 않는 렌더러.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoChartRenderer;

impl ChartRenderer for NoChartRenderer {
    fn render(&self, _series: &EnrichedSeries, _symbol: &str) -> Option<PathBuf> {
        None
    }
}
