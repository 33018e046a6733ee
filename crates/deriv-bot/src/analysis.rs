//! 분석 서비스.
//!
//! 캔들 조회 → 분석 파이프라인 → 차트 → 메시지 포맷까지 한 번에 수행합니다.
//! 조회 실패나 빈 시리즈는 중립 시그널과 실패 메시지로 강등되며 에러를 반환하지 않습니다.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local};
use deriv_analytics::{analyze_series, EnrichedSeries, IndicatorSnapshot};
use deriv_core::{AnalysisSettings, Recommendation, Signal, Timeframe};
use deriv_exchange::CandleSource;
use rust_decimal::Decimal;
use tracing::{info, warn, Instrument};

use crate::chart::ChartRenderer;

/// 한 번의 온디맨드 분석 결과.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub symbol: String,
    pub timeframe: Timeframe,
    /// 조회 실패 시 None
    pub series: Option<EnrichedSeries>,
    pub signal: Signal,
    pub chart: Option<PathBuf>,
    /// HTML 메시지
    pub message: String,
    pub generated_at: DateTime<Local>,
}

impl AnalysisReport {
    /// 데이터를 받아 분석했는지 여부.
    pub fn has_data(&self) -> bool {
        self.series.is_some()
    }

    /// 마지막 캔들의 지표 값.
    pub fn snapshot(&self) -> Option<IndicatorSnapshot> {
        self.series.as_ref().and_then(EnrichedSeries::latest)
    }

    fn failed(symbol: &str, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.to_string(),
            timeframe,
            series: None,
            signal: Signal::neutral(),
            chart: None,
            message: format!("❌ Failed to fetch data for {} ({})", symbol, timeframe),
            generated_at: Local::now(),
        }
    }
}

/// 멀티 타임프레임 리포트.
#[derive(Debug, Clone)]
pub struct MultiTimeframeReport {
    pub symbol: String,
    pub entries: Vec<AnalysisReport>,
    pub overall: Recommendation,
    pub chart: Option<PathBuf>,
    pub message: String,
}

/// 분석 서비스.
pub struct AnalysisService {
    source: Arc<dyn CandleSource>,
    renderer: Arc<dyn ChartRenderer>,
    settings: AnalysisSettings,
}

impl AnalysisService {
    pub fn new(
        source: Arc<dyn CandleSource>,
        renderer: Arc<dyn ChartRenderer>,
        settings: AnalysisSettings,
    ) -> Self {
        Self {
            source,
            renderer,
            settings,
        }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// 심볼 하나를 분석합니다. 실패하지 않습니다.
    pub async fn analyze(&self, symbol: &str, timeframe: Timeframe, count: usize) -> AnalysisReport {
        self.analyze_with(symbol, timeframe, count, true)
            .instrument(deriv_core::analysis_span!("analyze", symbol, timeframe))
            .await
    }

    async fn analyze_with(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
        render_chart: bool,
    ) -> AnalysisReport {
        let series = match self.source.fetch(symbol, timeframe, count).await {
            Ok(series) if series.is_empty() => {
                warn!(symbol, timeframe = %timeframe, "빈 캔들 시리즈");
                return AnalysisReport::failed(symbol, timeframe);
            }
            Ok(series) => series,
            Err(e) => {
                warn!(symbol, timeframe = %timeframe, error = %e, "캔들 조회 실패");
                return AnalysisReport::failed(symbol, timeframe);
            }
        };

        let outcome = analyze_series(&series);
        let chart = if render_chart {
            self.renderer.render(&outcome.series, symbol)
        } else {
            None
        };

        let generated_at = Local::now();
        let message = format_signal_message(
            symbol,
            &outcome.signal,
            outcome.series.latest().as_ref(),
            &generated_at,
        );

        info!(
            symbol,
            timeframe = %timeframe,
            signal = %outcome.signal.recommendation,
            patterns = %outcome.signal.pattern_label(),
            "분석 완료"
        );

        AnalysisReport {
            symbol: symbol.to_string(),
            timeframe,
            series: Some(outcome.series),
            signal: outcome.signal,
            chart,
            message,
            generated_at,
        }
    }

    /// 설정된 리포트 타임프레임 전체를 분석하고 종합 판단을 붙입니다.
    pub async fn multi_timeframe_report(&self, symbol: &str) -> MultiTimeframeReport {
        let count = self.settings.candle_count;
        let chart_timeframe = self.settings.report_chart_timeframe;

        let mut entries = Vec::with_capacity(self.settings.report_timeframes.len());
        for timeframe in &self.settings.report_timeframes {
            let report = self
                .analyze_with(symbol, *timeframe, count, false)
                .instrument(deriv_core::analysis_span!("report", symbol, timeframe))
                .await;
            entries.push(report);
        }

        let chart = match entries
            .iter()
            .find(|r| r.timeframe == chart_timeframe)
            .and_then(|r| r.series.as_ref())
        {
            Some(series) => self.renderer.render(series, symbol),
            None if !self.settings.report_timeframes.contains(&chart_timeframe) => {
                self.analyze_with(symbol, chart_timeframe, count, true)
                    .await
                    .chart
            }
            None => None,
        };

        let overall = overall_recommendation(&entries);
        let message = format_multi_timeframe(symbol, &entries, overall, &Local::now());

        MultiTimeframeReport {
            symbol: symbol.to_string(),
            entries,
            overall,
            chart,
            message,
        }
    }
}

/// Buy/Sell 개수를 비교합니다. 조회 실패한 타임프레임은 세지 않습니다.
fn overall_recommendation(entries: &[AnalysisReport]) -> Recommendation {
    let (buys, sells) = entries
        .iter()
        .filter(|r| r.has_data())
        .fold((0usize, 0usize), |(b, s), r| match r.signal.recommendation {
            Recommendation::Buy => (b + 1, s),
            Recommendation::Sell => (b, s + 1),
            Recommendation::Hold => (b, s),
        });

    if buys > sells {
        Recommendation::Buy
    } else if sells > buys {
        Recommendation::Sell
    } else {
        Recommendation::Hold
    }
}

/// 소수 둘째 자리 표시. 미정의는 N/A.
fn fmt2(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!("{:.2}", v.round_dp(2)),
        None => "N/A".to_string(),
    }
}

fn clock(at: &DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}

/// 온디맨드 시그널 메시지 (HTML).
pub fn format_signal_message(
    symbol: &str,
    signal: &Signal,
    snapshot: Option<&IndicatorSnapshot>,
    at: &DateTime<Local>,
) -> String {
    let price = snapshot.map(|s| s.close);
    format!(
        "📊 <b>{symbol}</b> Signal: <b>{}</b>\n\
         🧠 Pattern: <b>{}</b>\n\
         💰 Price: {}\n\
         📈 RSI: {}\n\
         📉 MACD: {} | Signal: {}\n\
         🕒 {}",
        signal.recommendation,
        signal.pattern_label(),
        fmt2(price),
        fmt2(snapshot.and_then(|s| s.rsi)),
        fmt2(snapshot.and_then(|s| s.macd)),
        fmt2(snapshot.and_then(|s| s.macd_signal)),
        clock(at),
    )
}

/// 자동 분석 푸시 메시지 (HTML).
pub fn format_auto_update(report: &AnalysisReport) -> String {
    if !report.has_data() {
        return format!("❌ Failed to fetch data for {} analysis", report.symbol);
    }

    let snapshot = report.snapshot();
    let rec = report.signal.recommendation;
    format!(
        "🔄 <b>{} AUTOMATIC UPDATE</b> 🔄\n\n\
         {} <b>Signal: {}</b>\n\
         🧠 Patterns: {}\n\
         💰 Price: {}\n\
         📈 RSI: {}\n\
         📉 MACD: {} | Signal: {}\n\
         🕒 {}",
        report.symbol,
        rec.emoji(),
        rec,
        report.signal.pattern_label(),
        fmt2(snapshot.map(|s| s.close)),
        fmt2(snapshot.and_then(|s| s.rsi)),
        fmt2(snapshot.and_then(|s| s.macd)),
        fmt2(snapshot.and_then(|s| s.macd_signal)),
        clock(&report.generated_at),
    )
}

fn format_timeframe_block(report: &AnalysisReport) -> String {
    if !report.has_data() {
        return format!("❌ Failed to fetch data for {} timeframe\n", report.timeframe);
    }

    let snapshot = report.snapshot();
    let rec = report.signal.recommendation;
    format!(
        "{} <b>{}</b>: {}\n  • Patterns: {}\n  • RSI: {}\n  • MACD: {} | Signal: {}\n",
        rec.emoji(),
        report.timeframe,
        rec,
        report.signal.pattern_label(),
        fmt2(snapshot.and_then(|s| s.rsi)),
        fmt2(snapshot.and_then(|s| s.macd)),
        fmt2(snapshot.and_then(|s| s.macd_signal)),
    )
}

fn format_multi_timeframe(
    symbol: &str,
    entries: &[AnalysisReport],
    overall: Recommendation,
    at: &DateTime<Local>,
) -> String {
    let overall_line = match overall {
        Recommendation::Buy => "🟢 <b>OVERALL: BUY (LONG)</b>",
        Recommendation::Sell => "🔴 <b>OVERALL: SELL (SHORT)</b>",
        Recommendation::Hold => "⚪ <b>OVERALL: NEUTRAL</b>",
    };

    let blocks: Vec<String> = entries.iter().map(format_timeframe_block).collect();

    format!(
        "📊 <b>{symbol} ANALYSIS</b> 📊\n\n\
         {overall_line}\n\n\
         <b>TIMEFRAME ANALYSIS:</b>\n\
         {}\n\
         🕒 {}",
        blocks.join("\n"),
        clock(at),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap()
    }

    #[test]
    fn test_signal_message_layout() {
        let signal = Signal::new(Recommendation::Sell, vec!["Double Top".to_string()]);
        let snapshot = IndicatorSnapshot {
            close: dec!(102.456),
            sma_5: None,
            sma_10: None,
            rsi: Some(dec!(55.5)),
            macd: Some(dec!(-1.234)),
            macd_signal: Some(dec!(-0.5)),
        };

        let message = format_signal_message("R_75", &signal, Some(&snapshot), &at());
        let lines: Vec<&str> = message.lines().collect();

        assert_eq!(lines[0], "📊 <b>R_75</b> Signal: <b>Sell</b>");
        assert_eq!(lines[1], "🧠 Pattern: <b>Double Top</b>");
        assert_eq!(lines[2], "💰 Price: 102.46");
        assert_eq!(lines[3], "📈 RSI: 55.50");
        assert_eq!(lines[4], "📉 MACD: -1.23 | Signal: -0.50");
        assert_eq!(lines[5], "🕒 09:05:07");
    }

    #[test]
    fn test_undefined_values_print_na() {
        let message = format_signal_message("R_10", &Signal::neutral(), None, &at());
        assert!(message.contains("Signal: <b>Hold</b>"));
        assert!(message.contains("Pattern: <b>None</b>"));
        assert!(message.contains("RSI: N/A"));
        assert!(message.contains("MACD: N/A | Signal: N/A"));
    }

    #[test]
    fn test_auto_update_for_failed_report() {
        let report = AnalysisReport::failed("R_75", Timeframe::H1);
        assert_eq!(
            format_auto_update(&report),
            "❌ Failed to fetch data for R_75 analysis"
        );
        assert!(report.message.contains("Failed to fetch data"));
    }

    #[test]
    fn test_overall_ignores_failed_timeframes() {
        let mut buy = AnalysisReport::failed("R_75", Timeframe::M5);
        buy.series = Some(deriv_analytics::enrich(&deriv_core::CandleSeries::empty()));
        buy.signal = Signal::new(Recommendation::Buy, vec![]);

        let failed = AnalysisReport::failed("R_75", Timeframe::M15);

        assert_eq!(
            overall_recommendation(&[buy.clone(), failed.clone()]),
            Recommendation::Buy
        );
        assert_eq!(overall_recommendation(&[failed]), Recommendation::Hold);
    }
}
