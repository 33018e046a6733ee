//! 텔레그램 봇 명령어 핸들러.
//!
//! long polling으로 업데이트를 수신하고, 명령어를 파싱해 `BotCommandHandler`에 넘긴 뒤
//! 응답을 텍스트 또는 사진으로 돌려보냅니다.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use deriv_core::RecipientKey;
use serde::Deserialize;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::telegram::{ApiResponse, TelegramSender};
use crate::types::{NotificationError, NotificationResult};

/// 핸들러 오류 시 사용자에게 보내는 문구.
pub const GENERIC_APOLOGY: &str =
    "Sorry, an error occurred while processing your request. Please try again later.";

/// 개별 업데이트.
#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    message: Option<TelegramMessage>,
}

/// 메시지 정보.
#[derive(Debug, Deserialize)]
struct TelegramMessage {
    from: Option<TelegramUser>,
    chat: TelegramChat,
    text: Option<String>,
}

/// 사용자 정보.
#[derive(Debug, Deserialize)]
struct TelegramUser {
    first_name: Option<String>,
}

/// 채팅 정보.
#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

/// 봇 명령어 타입.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// 환영 메시지
    Start,
    /// 도움말
    Help,
    /// 지원 심볼 목록
    Symbols,
    /// 지원 타임프레임 목록
    Timeframes,
    /// 기본 타임프레임 분석
    Signal { symbol: Option<String> },
    /// 지정 타임프레임 분석
    Analyze {
        symbol: Option<String>,
        timeframe: Option<String>,
    },
    /// R_75 멀티 타임프레임 리포트
    R75,
    /// 자동 분석 시작. 숫자가 아닌 인자는 None
    AutoStart { interval: Option<u64> },
    /// 자동 분석 중지
    AutoStop,
    /// 알 수 없는 명령어
    Unknown(String),
}

impl BotCommand {
    /// 텍스트에서 명령어 파싱.
    ///
    /// 명령어 이름은 대소문자를 구분하지 않고 `@botname` 접미사는 무시합니다.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();

        // /명령어 형식 확인
        let Some(body) = text.strip_prefix('/') else {
            return BotCommand::Unknown(text.to_string());
        };

        let mut parts = body.split_whitespace();
        let command = parts
            .next()
            .map(|c| c.split('@').next().unwrap_or(c).to_lowercase());
        let args: Vec<&str> = parts.collect();
        let arg = |i: usize| args.get(i).map(|s| s.to_string());

        match command.as_deref() {
            Some("start") => BotCommand::Start,
            Some("help") => BotCommand::Help,
            Some("symbols") => BotCommand::Symbols,
            Some("timeframes") => BotCommand::Timeframes,
            Some("signal") => BotCommand::Signal { symbol: arg(0) },
            Some("analyze") => BotCommand::Analyze {
                symbol: arg(0),
                timeframe: arg(1),
            },
            Some("r75") => BotCommand::R75,
            Some("auto_start") => BotCommand::AutoStart {
                // 음수는 0으로 보내 스케줄러의 최소값 보정을 받게 함
                interval: args
                    .first()
                    .and_then(|s| s.parse::<i64>().ok())
                    .map(|v| v.max(0) as u64),
            },
            Some("auto_stop") => BotCommand::AutoStop,
            _ => BotCommand::Unknown(text.to_string()),
        }
    }
}

/// 명령어를 보낸 채팅 정보.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    pub chat: RecipientKey,
    pub first_name: Option<String>,
}

impl CommandContext {
    pub fn new(chat: impl Into<RecipientKey>) -> Self {
        Self {
            chat: chat.into(),
            first_name: None,
        }
    }
}

/// 명령어 응답 데이터.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    /// 응답 텍스트
    pub text: String,
    /// 파싱 모드 (None이면 일반 텍스트)
    pub parse_mode: Option<String>,
    /// 함께 보낼 사진 경로
    pub photo: Option<PathBuf>,
}

impl CommandResponse {
    /// HTML 형식 응답 생성.
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: Some("HTML".to_string()),
            photo: None,
        }
    }

    /// 일반 텍스트 응답 생성.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: None,
            photo: None,
        }
    }

    /// 사진을 첨부합니다. 파일이 없으면 전송 시 텍스트로 대체됩니다.
    pub fn with_photo(mut self, photo: Option<PathBuf>) -> Self {
        self.photo = photo;
        self
    }
}

/// 봇 명령어 핸들러 trait.
///
/// 각 명령어의 실제 로직을 구현합니다.
#[async_trait]
pub trait BotCommandHandler: Send + Sync {
    async fn handle_start(&self, ctx: &CommandContext) -> NotificationResult<CommandResponse>;

    async fn handle_help(&self, ctx: &CommandContext) -> NotificationResult<CommandResponse>;

    async fn handle_symbols(&self, ctx: &CommandContext) -> NotificationResult<CommandResponse>;

    async fn handle_timeframes(&self, ctx: &CommandContext)
        -> NotificationResult<CommandResponse>;

    /// 기본 타임프레임 분석.
    async fn handle_signal(
        &self,
        ctx: &CommandContext,
        symbol: Option<&str>,
    ) -> NotificationResult<CommandResponse>;

    /// 지정 타임프레임 분석.
    async fn handle_analyze(
        &self,
        ctx: &CommandContext,
        symbol: Option<&str>,
        timeframe: Option<&str>,
    ) -> NotificationResult<CommandResponse>;

    /// 멀티 타임프레임 리포트.
    async fn handle_r75(&self, ctx: &CommandContext) -> NotificationResult<CommandResponse>;

    /// 자동 분석 시작.
    async fn handle_auto_start(
        &self,
        ctx: &CommandContext,
        interval: Option<u64>,
    ) -> NotificationResult<CommandResponse>;

    /// 자동 분석 중지.
    async fn handle_auto_stop(&self, ctx: &CommandContext) -> NotificationResult<CommandResponse>;

    /// 오래 걸리는 명령어를 처리하기 전에 먼저 보낼 안내 문구.
    fn pending_notice(&self, _command: &BotCommand) -> Option<String> {
        None
    }
}

/// 명령어를 핸들러 메서드로 분배합니다. 알 수 없는 명령어는 응답하지 않습니다.
pub async fn dispatch_command<H: BotCommandHandler + ?Sized>(
    handler: &H,
    ctx: &CommandContext,
    command: BotCommand,
) -> NotificationResult<Option<CommandResponse>> {
    let response = match command {
        BotCommand::Start => handler.handle_start(ctx).await?,
        BotCommand::Help => handler.handle_help(ctx).await?,
        BotCommand::Symbols => handler.handle_symbols(ctx).await?,
        BotCommand::Timeframes => handler.handle_timeframes(ctx).await?,
        BotCommand::Signal { symbol } => handler.handle_signal(ctx, symbol.as_deref()).await?,
        BotCommand::Analyze { symbol, timeframe } => {
            handler
                .handle_analyze(ctx, symbol.as_deref(), timeframe.as_deref())
                .await?
        }
        BotCommand::R75 => handler.handle_r75(ctx).await?,
        BotCommand::AutoStart { interval } => handler.handle_auto_start(ctx, interval).await?,
        BotCommand::AutoStop => handler.handle_auto_stop(ctx).await?,
        BotCommand::Unknown(text) => {
            debug!(chat = %ctx.chat, text = %text, "알 수 없는 명령어 무시");
            return Ok(None);
        }
    };
    Ok(Some(response))
}

/// 텔레그램 봇 핸들러.
///
/// Long polling으로 업데이트를 수신하고 명령어마다 별도 태스크에서 처리합니다.
pub struct TelegramBotHandler<H: BotCommandHandler + 'static> {
    sender: Arc<TelegramSender>,
    handler: Arc<H>,
    last_update_id: RwLock<i64>,
}

impl<H: BotCommandHandler + 'static> TelegramBotHandler<H> {
    /// 새 봇 핸들러 생성.
    pub fn new(sender: Arc<TelegramSender>, handler: Arc<H>) -> Self {
        Self {
            sender,
            handler,
            last_update_id: RwLock::new(0),
        }
    }

    /// 봇 폴링 시작.
    ///
    /// `shutdown`이 취소될 때까지 업데이트를 수신합니다.
    pub async fn start_polling(&self, shutdown: CancellationToken) {
        info!("텔레그램 봇 폴링 시작");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("텔레그램 봇 폴링 종료");
                    break;
                }
                result = self.poll_updates() => {
                    match result {
                        Ok(updates) => {
                            for update in updates {
                                self.spawn_update(update);
                            }
                        }
                        Err(e) => {
                            error!("업데이트 폴링 실패: {}", e);
                            // 에러 발생 시 잠시 대기
                            tokio::select! {
                                _ = shutdown.cancelled() => {}
                                _ = tokio::time::sleep(Duration::from_secs(5)) => {}
                            }
                        }
                    }
                }
            }
        }
    }

    fn spawn_update(&self, update: TelegramUpdate) {
        let sender = Arc::clone(&self.sender);
        let handler = Arc::clone(&self.handler);
        tokio::spawn(async move {
            if let Err(e) = process_update(&sender, handler.as_ref(), update).await {
                error!("업데이트 처리 실패: {}", e);
            }
        });
    }

    /// 업데이트 폴링.
    async fn poll_updates(&self) -> NotificationResult<Vec<TelegramUpdate>> {
        let last_id = *self.last_update_id.read().await;
        let config = self.sender.config();

        let params = serde_json::json!({
            "offset": last_id + 1,
            "timeout": config.poll_timeout.as_secs(),
            "allowed_updates": ["message"],
        });

        let response = self
            .sender
            .client()
            .post(config.method_url("getUpdates"))
            .json(&params)
            .timeout(config.poll_timeout + Duration::from_secs(5))
            .send()
            .await?;

        let updates: ApiResponse<Vec<TelegramUpdate>> = response
            .json()
            .await
            .map_err(|e| NotificationError::SendFailed(e.to_string()))?;

        if !updates.ok {
            return Err(NotificationError::SendFailed(
                updates
                    .description
                    .unwrap_or_else(|| "텔레그램 API 응답 실패".to_string()),
            ));
        }

        let result = updates.result.unwrap_or_default();

        // 마지막 업데이트 ID 갱신
        if let Some(last) = result.last() {
            *self.last_update_id.write().await = last.update_id;
        }

        Ok(result)
    }
}

/// 개별 업데이트 처리.
async fn process_update<H: BotCommandHandler + ?Sized>(
    sender: &TelegramSender,
    handler: &H,
    update: TelegramUpdate,
) -> NotificationResult<()> {
    let Some(message) = update.message else {
        return Ok(());
    };
    let Some(text) = message.text else {
        return Ok(());
    };
    if !text.trim_start().starts_with('/') {
        return Ok(());
    }

    let ctx = CommandContext {
        chat: RecipientKey::from(message.chat.id),
        first_name: message.from.and_then(|u| u.first_name),
    };

    debug!(chat = %ctx.chat, text = %text, "명령어 수신");

    let command = BotCommand::parse(&text);

    if let Some(notice) = handler.pending_notice(&command) {
        sender.send_message(&ctx.chat, &notice, None).await?;
    }

    match dispatch_command(handler, &ctx, command).await {
        Ok(Some(response)) => send_response(sender, &ctx.chat, &response).await,
        Ok(None) => Ok(()),
        Err(e) => {
            error!(chat = %ctx.chat, error = %e, "명령어 처리 실패");
            sender.send_message(&ctx.chat, GENERIC_APOLOGY, None).await
        }
    }
}

/// 응답 전송. 사진 파일이 있으면 캡션으로, 없으면 텍스트로 보냅니다.
async fn send_response(
    sender: &TelegramSender,
    chat: &RecipientKey,
    response: &CommandResponse,
) -> NotificationResult<()> {
    let parse_mode = response.parse_mode.as_deref();

    if let Some(photo) = &response.photo {
        if tokio::fs::try_exists(photo).await.unwrap_or(false) {
            return sender.send_photo(chat, photo, &response.text, parse_mode).await;
        }
        warn!(photo = %photo.display(), "차트 파일 없음, 텍스트로 전송");
    }

    sender.send_message(chat, &response.text, parse_mode).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(BotCommand::parse("/start"), BotCommand::Start);
        assert_eq!(BotCommand::parse("/help"), BotCommand::Help);
        assert_eq!(BotCommand::parse("  /symbols  "), BotCommand::Symbols);
        assert_eq!(BotCommand::parse("/timeframes"), BotCommand::Timeframes);
        assert_eq!(BotCommand::parse("/r75"), BotCommand::R75);
        assert_eq!(BotCommand::parse("/auto_stop"), BotCommand::AutoStop);
    }

    #[test]
    fn test_parse_case_and_bot_suffix() {
        assert_eq!(BotCommand::parse("/HELP"), BotCommand::Help);
        assert_eq!(BotCommand::parse("/r75@DerivSignalBot"), BotCommand::R75);
        assert_eq!(
            BotCommand::parse("/Signal@DerivSignalBot r_75"),
            BotCommand::Signal {
                symbol: Some("r_75".to_string())
            }
        );
    }

    #[test]
    fn test_parse_signal_command() {
        assert_eq!(
            BotCommand::parse("/signal"),
            BotCommand::Signal { symbol: None }
        );
        assert_eq!(
            BotCommand::parse("/signal R_75"),
            BotCommand::Signal {
                symbol: Some("R_75".to_string())
            }
        );
    }

    #[test]
    fn test_parse_analyze_command() {
        assert_eq!(
            BotCommand::parse("/analyze R_75 1h"),
            BotCommand::Analyze {
                symbol: Some("R_75".to_string()),
                timeframe: Some("1h".to_string()),
            }
        );
        assert_eq!(
            BotCommand::parse("/analyze R_75"),
            BotCommand::Analyze {
                symbol: Some("R_75".to_string()),
                timeframe: None,
            }
        );
    }

    #[test]
    fn test_parse_auto_start_command() {
        assert_eq!(
            BotCommand::parse("/auto_start"),
            BotCommand::AutoStart { interval: None }
        );
        assert_eq!(
            BotCommand::parse("/auto_start 30"),
            BotCommand::AutoStart { interval: Some(30) }
        );
        assert_eq!(
            BotCommand::parse("/auto_start soon"),
            BotCommand::AutoStart { interval: None }
        );
        assert_eq!(
            BotCommand::parse("/auto_start -3"),
            BotCommand::AutoStart { interval: Some(0) }
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        assert!(matches!(
            BotCommand::parse("/unknown"),
            BotCommand::Unknown(_)
        ));
        assert!(matches!(
            BotCommand::parse("not a command"),
            BotCommand::Unknown(_)
        ));
    }

    #[test]
    fn test_parse_update_payload() {
        let body = r#"{
            "ok": true,
            "result": [{
                "update_id": 42,
                "message": {
                    "message_id": 7,
                    "from": {"id": 99, "is_bot": false, "first_name": "Alex"},
                    "chat": {"id": -100123, "type": "group"},
                    "date": 1700000000,
                    "text": "/r75"
                }
            }]
        }"#;

        let updates: ApiResponse<Vec<TelegramUpdate>> = serde_json::from_str(body).unwrap();
        let update = &updates.result.unwrap()[0];
        assert_eq!(update.update_id, 42);
        let message = update.message.as_ref().unwrap();
        assert_eq!(message.chat.id, -100123);
        assert_eq!(
            message.from.as_ref().unwrap().first_name.as_deref(),
            Some("Alex")
        );
    }
}
