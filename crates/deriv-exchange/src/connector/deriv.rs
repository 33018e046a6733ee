//! Deriv WebSocket API 커넥터.
//!
//! 요청마다 새 연결을 열고 `ticks_history` 캔들 요청 하나를 보낸 뒤,
//! 같은 `req_id`의 응답을 받으면 연결을 닫습니다.
//!
//! # 요청 형식
//!
//! ```json
//! {"ticks_history": "R_75", "adjust_start_time": 1, "count": 100,
//!  "end": "latest", "granularity": 300, "style": "candles", "req_id": 1}
//! ```

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use deriv_core::{Candle, CandleSeries, DerivSettings, Timeframe};
use futures::{SinkExt, StreamExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, info, warn};

use crate::traits::{CandleSource, ExchangeResult};
use crate::ExchangeError;

// ============================================================================
// 설정
// ============================================================================

/// Deriv 커넥터 설정.
#[derive(Debug, Clone)]
pub struct DerivConfig {
    /// WebSocket 엔드포인트 (쿼리 제외)
    pub ws_url: String,
    /// 애플리케이션 ID
    pub app_id: String,
    /// 연결부터 응답까지 전체 조회 타임아웃
    pub fetch_timeout: Duration,
}

impl DerivConfig {
    /// `app_id` 쿼리가 붙은 접속 URL.
    pub fn endpoint(&self) -> String {
        format!("{}?app_id={}", self.ws_url, self.app_id)
    }
}

impl Default for DerivConfig {
    fn default() -> Self {
        Self::from(&DerivSettings::default())
    }
}

impl From<&DerivSettings> for DerivConfig {
    fn from(settings: &DerivSettings) -> Self {
        Self {
            ws_url: settings.ws_url.clone(),
            app_id: settings.app_id.clone(),
            fetch_timeout: settings.fetch_timeout(),
        }
    }
}

// ============================================================================
// 메시지 타입
// ============================================================================

/// 캔들 히스토리 요청.
#[derive(Debug, Serialize)]
struct TicksHistoryRequest<'a> {
    ticks_history: &'a str,
    adjust_start_time: u8,
    count: usize,
    end: &'static str,
    granularity: u32,
    style: &'static str,
    req_id: u64,
}

/// Deriv 응답 봉투. 필요한 필드만 읽습니다.
#[derive(Debug, Deserialize)]
struct DerivReply {
    #[serde(default)]
    msg_type: Option<String>,
    #[serde(default)]
    req_id: Option<u64>,
    #[serde(default)]
    error: Option<DerivApiError>,
    #[serde(default)]
    candles: Option<Vec<RawCandle>>,
}

#[derive(Debug, Deserialize)]
struct DerivApiError {
    code: String,
    message: String,
}

/// 응답의 캔들 하나. 가격은 JSON 숫자 또는 문자열.
#[derive(Debug, Deserialize)]
struct RawCandle {
    epoch: i64,
    open: serde_json::Value,
    high: serde_json::Value,
    low: serde_json::Value,
    close: serde_json::Value,
}

impl RawCandle {
    fn into_candle(self) -> ExchangeResult<Candle> {
        let timestamp = Utc
            .timestamp_opt(self.epoch, 0)
            .single()
            .ok_or_else(|| ExchangeError::ParseError(format!("잘못된 epoch: {}", self.epoch)))?;

        Ok(Candle::new(
            timestamp,
            price(&self.open)?,
            price(&self.high)?,
            price(&self.low)?,
            price(&self.close)?,
        ))
    }
}

fn price(value: &serde_json::Value) -> ExchangeResult<Decimal> {
    let text = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => {
            return Err(ExchangeError::ParseError(format!(
                "가격 형식이 아님: {}",
                other
            )))
        }
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| ExchangeError::ParseError(format!("가격 파싱 실패 {}: {}", text, e)))
}

/// 텍스트 프레임 하나를 해석합니다.
///
/// - 다른 요청의 응답이나 관련 없는 메시지: `Ok(None)`
/// - 에러 객체: `Err(ApiError)`
/// - 캔들 응답: `Ok(Some(series))`, 빈 배열이면 빈 시리즈
fn parse_reply(text: &str, expected_req_id: u64) -> ExchangeResult<Option<CandleSeries>> {
    let reply: DerivReply = serde_json::from_str(text)?;

    if matches!(reply.req_id, Some(id) if id != expected_req_id) {
        return Ok(None);
    }

    if let Some(error) = reply.error {
        return Err(ExchangeError::ApiError {
            code: error.code,
            message: error.message,
        });
    }

    if reply.msg_type.as_deref() != Some("candles") {
        return Ok(None);
    }

    let candles = reply
        .candles
        .unwrap_or_default()
        .into_iter()
        .map(RawCandle::into_candle)
        .collect::<ExchangeResult<Vec<_>>>()?;

    Ok(Some(CandleSeries::new(candles)))
}

// ============================================================================
// 클라이언트
// ============================================================================

/// Deriv 캔들 소스.
#[derive(Debug)]
pub struct DerivClient {
    config: DerivConfig,
    next_req_id: AtomicU64,
}

impl DerivClient {
    /// 새 클라이언트를 생성합니다. 연결은 조회 시점에 엽니다.
    pub fn new(config: DerivConfig) -> Self {
        Self {
            config,
            next_req_id: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &DerivConfig {
        &self.config
    }

    async fn request_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
        req_id: u64,
    ) -> ExchangeResult<CandleSeries> {
        let (mut ws, _) = connect_async(self.config.endpoint()).await?;

        let request = TicksHistoryRequest {
            ticks_history: symbol,
            adjust_start_time: 1,
            count,
            end: "latest",
            granularity: timeframe.granularity_secs(),
            style: "candles",
            req_id,
        };
        let json = serde_json::to_string(&request)?;
        ws.send(Message::Text(json.into())).await?;

        while let Some(frame) = ws.next().await {
            match frame? {
                Message::Text(text) => {
                    if let Some(series) = parse_reply(&text, req_id)? {
                        if let Err(e) = ws.close(None).await {
                            debug!(error = %e, "WebSocket 종료 실패");
                        }
                        return Ok(series);
                    }
                }
                Message::Ping(data) => {
                    ws.send(Message::Pong(data)).await?;
                }
                Message::Close(frame) => {
                    return Err(ExchangeError::Disconnected(format!(
                        "응답 전에 연결 종료: {:?}",
                        frame
                    )));
                }
                _ => {}
            }
        }

        Err(ExchangeError::Disconnected(
            "응답 전에 스트림 종료".to_string(),
        ))
    }
}

#[async_trait]
impl CandleSource for DerivClient {
    fn name(&self) -> &str {
        "deriv"
    }

    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> ExchangeResult<CandleSeries> {
        let req_id = self.next_req_id.fetch_add(1, Ordering::Relaxed);
        debug!(symbol, timeframe = %timeframe, count, req_id, "캔들 요청");

        let result = tokio::time::timeout(
            self.config.fetch_timeout,
            self.request_candles(symbol, timeframe, count, req_id),
        )
        .await
        .map_err(|_| {
            ExchangeError::Timeout(format!(
                "{} {} 캔들 조회가 {:?} 안에 끝나지 않음",
                symbol, timeframe, self.config.fetch_timeout
            ))
        })?;

        match &result {
            Ok(series) => info!(symbol, timeframe = %timeframe, candles = series.len(), "캔들 조회 완료"),
            Err(e) => warn!(symbol, timeframe = %timeframe, error = %e, "캔들 조회 실패"),
        }

        result
    }
}
