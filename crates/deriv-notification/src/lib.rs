//! # Deriv Notification
//!
//! 시그널 전달 서비스.
//!
//! - `DeliverySink`: 수신자에게 텍스트와 선택적 차트 이미지를 전달하는 인터페이스
//! - `TelegramSender`: Telegram Bot API 구현 (sendMessage / sendPhoto)
//!
//! # 텔레그램 봇 명령어
//!
//! `TelegramBotHandler`가 long polling으로 다음 명령어를 받아 처리합니다:
//! - `/start`, `/help` - 안내
//! - `/symbols`, `/timeframes` - 지원 목록
//! - `/signal <symbol>` - 기본 타임프레임 분석
//! - `/analyze <symbol> <timeframe>` - 지정 타임프레임 분석
//! - `/r75` - R_75 멀티 타임프레임 리포트
//! - `/auto_start [minutes]`, `/auto_stop` - 자동 분석 예약/해제

pub mod bot_handler;
pub mod telegram;
pub mod types;

pub use bot_handler::*;
pub use telegram::*;
pub use types::*;
