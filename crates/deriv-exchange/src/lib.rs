//! Deriv 시장 데이터 연결.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - `CandleSource` trait: 캔들 윈도우 조회 인터페이스
//! - Deriv WebSocket 커넥터 (`ticks_history`, `style = candles`)

pub mod connector;
pub mod error;
pub mod traits;

pub use connector::{DerivClient, DerivConfig};
pub use error::*;
pub use traits::*;
