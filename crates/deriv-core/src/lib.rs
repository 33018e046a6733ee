//! # Deriv Core
//!
//! 시그널 봇 전반에서 사용하는 핵심 도메인 모델과 공통 인프라를 제공합니다.
//!
//! - 캔들 및 캔들 시리즈
//! - 매매 추천(Buy/Sell/Hold), 패턴 감지 결과, 최종 시그널
//! - 타임프레임(Deriv granularity) 및 수신자 키
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
