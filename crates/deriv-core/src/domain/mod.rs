//! 시그널 분석을 위한 도메인 모델.

mod candle;
mod signal;

pub use candle::*;
pub use signal::*;
