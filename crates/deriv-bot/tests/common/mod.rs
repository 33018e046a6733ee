//! 통합 테스트 공용 목(mock) 구현.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use deriv_analytics::EnrichedSeries;
use deriv_bot::ChartRenderer;
use deriv_core::{Candle, CandleSeries, RecipientKey, Timeframe};
use deriv_exchange::{CandleSource, ExchangeError, ExchangeResult};
use deriv_notification::{DeliverySink, NotificationResult};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 1분 간격 캔들 시리즈 (OHLC 모두 종가)
pub fn series_of(closes: &[Decimal]) -> CandleSeries {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            let ts = Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap();
            Candle::new(ts, *close, *close, *close, *close)
        })
        .collect()
}

/// 더블 탑만 감지되는 종가 (매도)
pub fn double_top_closes() -> Vec<Decimal> {
    vec![
        dec!(100), dec!(101), dec!(99), dec!(100), dec!(102),
        dec!(98), dec!(97), dec!(96), dec!(95), dec!(94),
        dec!(96), dec!(98), dec!(100), dec!(102.5), dec!(101),
        dec!(99), dec!(100), dec!(101), dec!(100), dec!(99),
    ]
}

/// 더블 바텀만 감지되는 종가 (매수). 더블 탑 시퀀스를 200 기준으로 뒤집음
pub fn double_bottom_closes() -> Vec<Decimal> {
    double_top_closes()
        .into_iter()
        .map(|c| dec!(200) - c)
        .collect()
}

/// 타임프레임별로 준비된 응답을 돌려주는 캔들 소스.
///
/// 등록되지 않은 타임프레임은 타임아웃 에러.
#[derive(Default)]
pub struct MockSource {
    responses: HashMap<Timeframe, Vec<Decimal>>,
    pub calls: Mutex<Vec<(String, Timeframe, usize)>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, timeframe: Timeframe, closes: Vec<Decimal>) -> Self {
        self.responses.insert(timeframe, closes);
        self
    }

    pub fn calls(&self) -> Vec<(String, Timeframe, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CandleSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> ExchangeResult<CandleSeries> {
        self.calls
            .lock()
            .unwrap()
            .push((symbol.to_string(), timeframe, count));
        match self.responses.get(&timeframe) {
            Some(closes) => Ok(series_of(closes)),
            None => Err(ExchangeError::Timeout("no data".to_string())),
        }
    }
}

/// 호출 횟수를 세고 고정 경로를 돌려주는 렌더러.
#[derive(Default)]
pub struct CountingRenderer {
    pub calls: AtomicUsize,
}

impl CountingRenderer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ChartRenderer for CountingRenderer {
    fn render(&self, _series: &EnrichedSeries, symbol: &str) -> Option<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Some(PathBuf::from(format!("charts/{}.png", symbol)))
    }
}

/// 전달 내용을 기록하는 싱크.
#[derive(Default)]
pub struct RecordingSink {
    pub messages: Mutex<Vec<(RecipientKey, String, Option<PathBuf>)>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<(RecipientKey, String, Option<PathBuf>)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliverySink for RecordingSink {
    async fn try_deliver(
        &self,
        recipient: &RecipientKey,
        text: &str,
        image: Option<&Path>,
    ) -> NotificationResult<()> {
        self.messages.lock().unwrap().push((
            *recipient,
            text.to_string(),
            image.map(Path::to_path_buf),
        ));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
