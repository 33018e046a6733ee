//! 시스템 전반에서 사용되는 공통 타입.

mod recipient;
mod timeframe;

pub use recipient::*;
pub use timeframe::*;
