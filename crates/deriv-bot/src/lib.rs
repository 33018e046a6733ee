//! # Deriv Bot
//!
//! 분석 서비스와 자동 분석 스케줄러, 텔레그램 명령어 핸들러.
//!
//! 제어 흐름: 캔들 소스 → 분석 파이프라인 → {명령어 응답 | 스케줄러 푸시} → 전달기

pub mod analysis;
pub mod chart;
pub mod handler;
pub mod scheduler;

pub use analysis::{
    format_auto_update, format_signal_message, AnalysisReport, AnalysisService,
    MultiTimeframeReport,
};
pub use chart::{ChartRenderer, NoChartRenderer};
pub use handler::SignalBotHandler;
pub use scheduler::{
    AnalysisTarget, AutoAnalysisScheduler, AutoAnalysisTask, ScheduledAnalysis, ScheduledJob,
    MAX_INTERVAL_MINUTES,
};
