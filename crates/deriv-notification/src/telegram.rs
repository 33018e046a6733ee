//! 텔레그램 전달 서비스.
//!
//! Telegram Bot API를 통해 분석 결과 텍스트와 차트 이미지를 전송합니다.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use deriv_core::{RecipientKey, TelegramSettings};
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::types::{DeliverySink, NotificationError, NotificationResult};

/// 사진 캡션 최대 길이 (Bot API 제한).
const CAPTION_LIMIT: usize = 1024;

/// 텔레그램 전송 설정.
#[derive(Debug)]
pub struct TelegramConfig {
    /// @BotFather에서 받은 봇 토큰
    pub bot_token: SecretString,
    /// Bot API 기본 URL
    pub api_base_url: String,
    /// 파싱 모드 (HTML 또는 MarkdownV2)
    pub parse_mode: String,
    /// getUpdates long polling 타임아웃
    pub poll_timeout: Duration,
}

impl TelegramConfig {
    /// 새 텔레그램 설정을 생성합니다.
    pub fn new(bot_token: impl Into<String>) -> Self {
        let defaults = TelegramSettings::default();
        let token: String = bot_token.into();
        Self {
            bot_token: SecretString::new(token.into_boxed_str()),
            api_base_url: defaults.api_base_url,
            parse_mode: defaults.parse_mode,
            poll_timeout: Duration::from_secs(defaults.poll_timeout_secs),
        }
    }

    /// 애플리케이션 설정에서 생성합니다. 토큰이 비어 있으면 에러.
    pub fn from_settings(settings: &TelegramSettings) -> NotificationResult<Self> {
        if settings.bot_token.trim().is_empty() {
            return Err(NotificationError::InvalidConfig(
                "텔레그램 봇 토큰이 설정되지 않았습니다 (DERIV__TELEGRAM__BOT_TOKEN)".to_string(),
            ));
        }

        Ok(Self {
            bot_token: SecretString::new(settings.bot_token.trim().to_string().into_boxed_str()),
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            parse_mode: settings.parse_mode.clone(),
            poll_timeout: Duration::from_secs(settings.poll_timeout_secs),
        })
    }

    /// API 기본 URL을 교체합니다.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bot API 메서드 URL.
    pub(crate) fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base_url,
            self.bot_token.expose_secret(),
            method
        )
    }
}

/// Bot API 공통 응답 봉투.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseParameters {
    #[serde(default)]
    pub retry_after: Option<u64>,
}

/// 텔레그램 전송기.
pub struct TelegramSender {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramSender {
    /// 새 텔레그램 전송기를 생성합니다.
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// 텍스트 메시지를 전송합니다.
    ///
    /// `parse_mode`가 None이면 일반 텍스트로 보냅니다.
    pub async fn send_message(
        &self,
        recipient: &RecipientKey,
        text: &str,
        parse_mode: Option<&str>,
    ) -> NotificationResult<()> {
        let mut params = serde_json::json!({
            "chat_id": recipient.chat_id(),
            "text": text,
            "disable_web_page_preview": true,
        });
        if let Some(mode) = parse_mode {
            params["parse_mode"] = serde_json::Value::from(mode);
        }

        debug!(recipient = %recipient, "텔레그램 메시지 전송");

        let response = self
            .client
            .post(self.config.method_url("sendMessage"))
            .json(&params)
            .send()
            .await?;

        Self::check_response(response).await?;
        info!(recipient = %recipient, "텔레그램 메시지 전송 완료");
        Ok(())
    }

    /// 사진을 캡션과 함께 전송합니다.
    pub async fn send_photo(
        &self,
        recipient: &RecipientKey,
        photo: &Path,
        caption: &str,
        parse_mode: Option<&str>,
    ) -> NotificationResult<()> {
        let bytes = tokio::fs::read(photo).await?;
        let file_name = photo
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "chart.png".to_string());

        let mut form = Form::new()
            .text("chat_id", recipient.chat_id().to_string())
            .text("caption", truncate_caption(caption))
            .part("photo", Part::bytes(bytes).file_name(file_name));
        if let Some(mode) = parse_mode {
            form = form.text("parse_mode", mode.to_string());
        }

        debug!(recipient = %recipient, photo = %photo.display(), "텔레그램 사진 전송");

        let response = self
            .client
            .post(self.config.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await?;

        Self::check_response(response).await?;
        info!(recipient = %recipient, "텔레그램 사진 전송 완료");
        Ok(())
    }

    /// HTTP 상태와 `ok` 필드를 확인합니다.
    async fn check_response(response: reqwest::Response) -> NotificationResult<()> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body).ok();

        // 요청 한도 제한 확인
        if status.as_u16() == 429 {
            let retry_after = parsed
                .as_ref()
                .and_then(|r| r.parameters.as_ref())
                .and_then(|p| p.retry_after)
                .unwrap_or(60);
            warn!(retry_after, "Telegram rate limited");
            return Err(NotificationError::RateLimited(retry_after));
        }

        match parsed {
            Some(api) if status.is_success() && api.ok => Ok(()),
            Some(api) => {
                let description = api.description.unwrap_or_else(|| body.clone());
                error!("텔레그램 전송 실패: {} - {}", status, description);
                Err(NotificationError::SendFailed(format!(
                    "HTTP {}: {}",
                    status, description
                )))
            }
            None => {
                error!("텔레그램 전송 실패: {} - {}", status, body);
                Err(NotificationError::SendFailed(format!(
                    "HTTP {}: {}",
                    status, body
                )))
            }
        }
    }
}

fn truncate_caption(caption: &str) -> String {
    if caption.chars().count() <= CAPTION_LIMIT {
        caption.to_string()
    } else {
        caption.chars().take(CAPTION_LIMIT).collect()
    }
}

#[async_trait]
impl DeliverySink for TelegramSender {
    async fn try_deliver(
        &self,
        recipient: &RecipientKey,
        text: &str,
        image: Option<&Path>,
    ) -> NotificationResult<()> {
        let parse_mode = Some(self.config.parse_mode.as_str());

        match image {
            Some(path) if tokio::fs::try_exists(path).await.unwrap_or(false) => {
                self.send_photo(recipient, path, text, parse_mode).await
            }
            _ => self.send_message(recipient, text, parse_mode).await,
        }
    }

    fn name(&self) -> &str {
        "telegram"
    }
}
