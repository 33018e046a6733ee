//! Deriv 캔들 집계 단위(granularity)를 나타내는 타임프레임.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::CoreError;

/// 캔들스틱 타임프레임.
///
/// Deriv `ticks_history` API가 허용하는 granularity 중 봇이 노출하는 값들입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timeframe {
    /// 1분봉
    M1,
    /// 5분봉
    M5,
    /// 15분봉
    M15,
    /// 30분봉
    M30,
    /// 1시간봉
    H1,
    /// 4시간봉
    H4,
    /// 일봉
    D1,
}

impl Timeframe {
    /// 지원하는 모든 타임프레임 (짧은 순).
    pub const ALL: [Timeframe; 7] = [
        Timeframe::M1,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
    ];

    /// 초 단위 granularity.
    pub fn granularity_secs(&self) -> u32 {
        match self {
            Timeframe::M1 => 60,
            Timeframe::M5 => 300,
            Timeframe::M15 => 900,
            Timeframe::M30 => 1800,
            Timeframe::H1 => 3600,
            Timeframe::H4 => 14400,
            Timeframe::D1 => 86400,
        }
    }

    /// 이 타임프레임의 기간을 반환합니다.
    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.granularity_secs()))
    }

    /// 초 단위 granularity에서 타임프레임을 찾습니다.
    pub fn from_granularity(secs: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|tf| tf.granularity_secs() == secs)
    }

    /// 사용자에게 보여주는 라벨 ("1m", "1h" 등).
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|tf| tf.label() == lowered)
            .ok_or_else(|| CoreError::InvalidInput(format!("알 수 없는 타임프레임: {}", s)))
    }
}

impl TryFrom<String> for Timeframe {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_granularity() {
        assert_eq!(Timeframe::M5.granularity_secs(), 300);
        assert_eq!(Timeframe::H1.granularity_secs(), 3600);
        assert_eq!(Timeframe::from_granularity(14400), Some(Timeframe::H4));
        assert_eq!(Timeframe::from_granularity(120), None);
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("15m".parse::<Timeframe>().unwrap(), Timeframe::M15);
        assert_eq!("1H".parse::<Timeframe>().unwrap(), Timeframe::H1);
        assert!("2h".parse::<Timeframe>().is_err());
        assert_eq!(Timeframe::D1.to_string(), "1d");
    }

    #[test]
    fn test_serde_as_label() {
        let json = serde_json::to_string(&Timeframe::H4).unwrap();
        assert_eq!(json, "\"4h\"");
        let parsed: Timeframe = serde_json::from_str("\"30m\"").unwrap();
        assert_eq!(parsed, Timeframe::M30);
    }
}
