//! Deriv 시그널 봇 실행 파일.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use deriv_bot::{
    AnalysisService, AnalysisTarget, AutoAnalysisScheduler, NoChartRenderer, ScheduledAnalysis,
    SignalBotHandler,
};
use deriv_core::{init_logging, AppConfig};
use deriv_exchange::{CandleSource, DerivClient, DerivConfig};
use deriv_notification::{DeliverySink, TelegramBotHandler, TelegramConfig, TelegramSender};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "deriv-bot")]
#[command(about = "Deriv synthetic index signal bot for Telegram", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, default_value = "config/default.toml")]
    config: PathBuf,

    /// 로그 레벨 (trace, debug, info, warn, error). 설정 파일 값을 덮어씀
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // .env는 없어도 됨
    let _ = dotenvy::dotenv();

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("설정 로드 실패: {}", cli.config.display()))?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    init_logging(&config.logging)?;

    info!(config = %cli.config.display(), "Deriv 시그널 봇 시작");

    let source: Arc<dyn CandleSource> =
        Arc::new(DerivClient::new(DerivConfig::from(&config.deriv)));

    if config.chart.enabled {
        warn!("차트 렌더러가 구성되지 않아 텍스트만 전송합니다");
    }
    let renderer = Arc::new(NoChartRenderer);

    let telegram = TelegramConfig::from_settings(&config.telegram)
        .context("텔레그램 봇 토큰이 필요합니다 (DERIV__TELEGRAM__BOT_TOKEN)")?;
    let sender = Arc::new(TelegramSender::new(telegram));

    let analysis = Arc::new(AnalysisService::new(
        source,
        renderer,
        config.analysis.clone(),
    ));

    let target = AnalysisTarget {
        symbol: config.scheduler.symbol.clone(),
        timeframe: config.scheduler.timeframe,
        count: config.analysis.candle_count,
    };
    let sink: Arc<dyn DeliverySink> = sender.clone();
    let task = Arc::new(ScheduledAnalysis::new(Arc::clone(&analysis), sink));
    let scheduler = Arc::new(AutoAnalysisScheduler::new(
        config.scheduler.clone(),
        target,
        task,
    ));

    let handler = Arc::new(SignalBotHandler::new(analysis, Arc::clone(&scheduler)));
    let bot = TelegramBotHandler::new(sender, handler);

    let shutdown_token = CancellationToken::new();
    let polling_token = shutdown_token.clone();
    let polling = tokio::spawn(async move {
        bot.start_polling(polling_token).await;
    });

    shutdown_signal(shutdown_token).await;

    if let Err(e) = polling.await {
        error!(error = %e, "폴링 태스크 비정상 종료");
    }
    scheduler.shutdown().await;

    info!("Deriv 시그널 봇 종료");
    Ok(())
}

/// Ctrl+C 또는 SIGTERM을 받으면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C 핸들러 설치 실패");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "SIGTERM 핸들러 설치 실패");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Ctrl+C 수신, 종료를 시작합니다");
        }
        _ = terminate => {
            warn!("SIGTERM 수신, 종료를 시작합니다");
        }
    }

    shutdown_token.cancel();
}
