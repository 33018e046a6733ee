//! 설정 관리.
//!
//! 시작 시 한 번 로드한 `AppConfig`를 각 컴포넌트의 생성자에 넘깁니다.
//! 우선순위: 기본값 < TOML 파일 < `DERIV__` 접두사 환경 변수.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::types::Timeframe;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Deriv API 설정
    pub deriv: DerivSettings,
    /// 분석 설정
    pub analysis: AnalysisSettings,
    /// 자동 분석 스케줄러 설정
    pub scheduler: SchedulerSettings,
    /// 텔레그램 설정
    pub telegram: TelegramSettings,
    /// 차트 설정
    pub chart: ChartSettings,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// Deriv API 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DerivSettings {
    /// 애플리케이션 ID
    pub app_id: String,
    /// WebSocket 엔드포인트
    pub ws_url: String,
    /// 캔들 조회 타임아웃 (초)
    pub fetch_timeout_secs: u64,
}

impl Default for DerivSettings {
    fn default() -> Self {
        Self {
            app_id: "1089".to_string(),
            ws_url: "wss://ws.derivws.com/websockets/v3".to_string(),
            fetch_timeout_secs: 30,
        }
    }
}

impl DerivSettings {
    /// 조회 타임아웃을 Duration으로 반환.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// 분석 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// 기본 심볼
    pub default_symbol: String,
    /// `/signal`에 쓰는 기본 타임프레임
    pub default_timeframe: Timeframe,
    /// 조회할 캔들 수
    pub candle_count: usize,
    /// 분석 가능한 심볼 목록
    pub symbols: Vec<String>,
    /// 사용 가능한 타임프레임 목록
    pub timeframes: Vec<Timeframe>,
    /// 다중 타임프레임 리포트에 포함할 타임프레임
    pub report_timeframes: Vec<Timeframe>,
    /// 다중 타임프레임 리포트의 차트 타임프레임
    pub report_chart_timeframe: Timeframe,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            default_symbol: "R_75".to_string(),
            default_timeframe: Timeframe::M5,
            candle_count: 100,
            symbols: [
                "R_10", "R_25", "R_50", "R_75", "R_100", "BOOM500", "BOOM1000", "CRASH500",
                "CRASH1000", "RDBEAR", "RDBULL",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            timeframes: Timeframe::ALL.to_vec(),
            report_timeframes: vec![Timeframe::M5, Timeframe::M15, Timeframe::H1, Timeframe::H4],
            report_chart_timeframe: Timeframe::H1,
        }
    }
}

impl AnalysisSettings {
    /// 지원 심볼인지 확인합니다 (대소문자 무시).
    pub fn find_symbol(&self, symbol: &str) -> Option<&str> {
        let upper = symbol.to_uppercase();
        self.symbols
            .iter()
            .find(|s| **s == upper)
            .map(String::as_str)
    }

    /// 지원 타임프레임인지 확인하고 파싱합니다.
    pub fn find_timeframe(&self, label: &str) -> Option<Timeframe> {
        label
            .parse::<Timeframe>()
            .ok()
            .filter(|tf| self.timeframes.contains(tf))
    }
}

/// 자동 분석 스케줄러 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// 인자가 없을 때의 기본 주기 (분)
    pub default_interval_minutes: u64,
    /// 최소 주기 (분)
    pub min_interval_minutes: u64,
    /// 예약 후 첫 실행까지 대기 (초)
    pub first_delay_secs: u64,
    /// 자동 분석 대상 심볼
    pub symbol: String,
    /// 자동 분석 대상 타임프레임
    pub timeframe: Timeframe,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            default_interval_minutes: 15,
            min_interval_minutes: 5,
            first_delay_secs: 10,
            symbol: "R_75".to_string(),
            timeframe: Timeframe::H1,
        }
    }
}

impl SchedulerSettings {
    /// 첫 실행 지연을 Duration으로 반환.
    pub fn first_delay(&self) -> Duration {
        Duration::from_secs(self.first_delay_secs)
    }
}

/// 텔레그램 설정.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelegramSettings {
    /// @BotFather에서 받은 봇 토큰
    pub bot_token: String,
    /// Bot API 기본 URL
    pub api_base_url: String,
    /// 파싱 모드 (HTML 또는 MarkdownV2)
    pub parse_mode: String,
    /// long polling 타임아웃 (초)
    pub poll_timeout_secs: u64,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base_url: "https://api.telegram.org".to_string(),
            parse_mode: "HTML".to_string(),
            poll_timeout_secs: 30,
        }
    }
}

// 토큰이 로그에 남지 않도록 직접 구현
impl fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("bot_token", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("parse_mode", &self.parse_mode)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

/// 차트 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartSettings {
    /// 차트 생성 활성화 여부
    pub enabled: bool,
    /// 차트 이미지 경로
    pub output_path: PathBuf,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            output_path: PathBuf::from("static/chart.png"),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일(선택)과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("DERIV")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("analysis.symbols")
                    .with_list_parse_key("analysis.timeframes")
                    .with_list_parse_key("analysis.report_timeframes")
                    .try_parsing(true),
            )
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> CoreResult<Self> {
        Self::load("config/default.toml")
    }

    /// 설정 값 사이의 제약을 검증합니다.
    pub fn validate(&self) -> CoreResult<()> {
        let scheduler = &self.scheduler;
        if scheduler.min_interval_minutes == 0 {
            return Err(CoreError::Config(
                "scheduler.min_interval_minutes는 1 이상이어야 합니다".to_string(),
            ));
        }
        if scheduler.default_interval_minutes < scheduler.min_interval_minutes {
            return Err(CoreError::Config(format!(
                "scheduler.default_interval_minutes({})가 최소 주기({})보다 작습니다",
                scheduler.default_interval_minutes, scheduler.min_interval_minutes
            )));
        }
        if self.analysis.candle_count == 0 {
            return Err(CoreError::Config(
                "analysis.candle_count는 1 이상이어야 합니다".to_string(),
            ));
        }
        if self.analysis.symbols.is_empty() {
            return Err(CoreError::Config("analysis.symbols가 비어 있습니다".to_string()));
        }
        Ok(())
    }
}
