//! 명령어 핸들러 테스트

mod common;

use std::sync::Arc;

use common::{double_top_closes, CountingRenderer, MockSource};
use deriv_bot::{
    AnalysisService, AnalysisTarget, AutoAnalysisScheduler, ScheduledAnalysis, SignalBotHandler,
    MAX_INTERVAL_MINUTES,
};
use deriv_core::{AnalysisSettings, RecipientKey, SchedulerSettings, Timeframe};
use deriv_notification::{dispatch_command, BotCommand, BotCommandHandler, CommandContext};

struct Fixture {
    source: Arc<MockSource>,
    scheduler: Arc<AutoAnalysisScheduler>,
    handler: SignalBotHandler,
}

fn fixture() -> Fixture {
    let source = Arc::new(
        MockSource::new()
            .with(Timeframe::M5, double_top_closes())
            .with(Timeframe::H1, double_top_closes()),
    );
    let analysis = Arc::new(AnalysisService::new(
        source.clone(),
        Arc::new(CountingRenderer::default()),
        AnalysisSettings::default(),
    ));
    let sink = Arc::new(common::RecordingSink::default());
    let scheduler = Arc::new(AutoAnalysisScheduler::new(
        SchedulerSettings::default(),
        AnalysisTarget {
            symbol: "R_75".to_string(),
            timeframe: Timeframe::H1,
            count: 100,
        },
        Arc::new(ScheduledAnalysis::new(analysis.clone(), sink)),
    ));
    let handler = SignalBotHandler::new(analysis, scheduler.clone());
    Fixture {
        source,
        scheduler,
        handler,
    }
}

async fn reply(fixture: &Fixture, text: &str) -> String {
    let ctx = CommandContext::new(42_i64);
    dispatch_command(&fixture.handler, &ctx, BotCommand::parse(text))
        .await
        .unwrap()
        .map(|r| r.text)
        .unwrap_or_default()
}

#[tokio::test]
async fn start_greets_by_first_name() {
    let fixture = fixture();
    let ctx = CommandContext {
        first_name: Some("Alex".to_string()),
        ..CommandContext::new(42_i64)
    };

    let response = fixture.handler.handle_start(&ctx).await.unwrap();

    assert!(response.text.starts_with("👋 Hello Alex!"));
    assert!(response.parse_mode.is_none());
}

#[tokio::test]
async fn help_mentions_default_interval() {
    let fixture = fixture();
    let text = reply(&fixture, "/help").await;

    assert!(text.contains("<b>Deriv Trading Signal Bot Help</b>"));
    assert!(text.contains("default: 15"));
    assert!(text.contains("/analyze &lt;symbol&gt; &lt;timeframe&gt;"));
}

#[tokio::test]
async fn symbols_and_timeframes_list_configuration() {
    let fixture = fixture();

    let symbols = reply(&fixture, "/symbols").await;
    assert!(symbols.starts_with("📈 <b>Available Symbols:</b>\n\n"));
    assert!(symbols.contains("• R_75\n"));
    assert!(symbols.contains("• CRASH1000\n"));

    let timeframes = reply(&fixture, "/timeframes").await;
    assert!(timeframes.contains("• 1m\n"));
    assert!(timeframes.contains("• 1d\n"));
}

#[tokio::test]
async fn signal_guidance_replies() {
    let fixture = fixture();

    assert_eq!(
        reply(&fixture, "/signal").await,
        "Please specify a symbol. Example: /signal R_75"
    );
    assert_eq!(
        reply(&fixture, "/signal xyz").await,
        "Symbol XYZ not found. Use /symbols to see available options."
    );
    assert!(fixture.source.calls().is_empty());
}

#[tokio::test]
async fn signal_uses_default_timeframe() {
    let fixture = fixture();

    let ctx = CommandContext::new(42_i64);
    let response = dispatch_command(&fixture.handler, &ctx, BotCommand::parse("/signal r_75"))
        .await
        .unwrap()
        .unwrap();

    assert!(response.text.contains("<b>R_75</b> Signal: <b>Sell</b>"));
    assert_eq!(response.parse_mode.as_deref(), Some("HTML"));
    assert!(response.photo.is_some());
    assert_eq!(
        fixture.source.calls(),
        vec![("R_75".to_string(), Timeframe::M5, 100)]
    );
}

#[tokio::test]
async fn analyze_guidance_replies() {
    let fixture = fixture();

    assert_eq!(
        reply(&fixture, "/analyze R_75").await,
        "Please specify both symbol and timeframe. Example: /analyze R_75 1h"
    );
    assert_eq!(
        reply(&fixture, "/analyze R_75 2h").await,
        "Timeframe 2h not found. Use /timeframes to see available options."
    );
    assert_eq!(
        reply(&fixture, "/analyze ABC 1h").await,
        "Symbol ABC not found. Use /symbols to see available options."
    );

    let text = reply(&fixture, "/analyze R_75 1h").await;
    assert!(text.contains("Signal: <b>Sell</b>"));
    assert_eq!(
        fixture.source.calls(),
        vec![("R_75".to_string(), Timeframe::H1, 100)]
    );
}

#[tokio::test]
async fn r75_report() {
    let fixture = fixture();
    let text = reply(&fixture, "/r75").await;

    assert!(text.starts_with("📊 <b>R_75 ANALYSIS</b> 📊"));
    assert!(text.contains("❌ Failed to fetch data for 15m timeframe"));
    assert!(text.contains("❌ Failed to fetch data for 4h timeframe"));
    assert!(text.contains("🔴 <b>OVERALL: SELL (SHORT)</b>"));
}

#[tokio::test]
async fn auto_start_and_stop() {
    let fixture = fixture();

    assert_eq!(
        reply(&fixture, "/auto_start 2").await,
        "✅ Automatic R_75 analysis started. You will receive updates every 5 minutes."
    );
    assert_eq!(
        fixture.scheduler.job(RecipientKey(42)).await.unwrap().interval_minutes,
        5
    );

    assert_eq!(
        reply(&fixture, "/auto_start abc").await,
        "✅ Automatic R_75 analysis started. You will receive updates every 15 minutes."
    );
    assert_eq!(fixture.scheduler.active_jobs().await, 1);

    assert_eq!(
        reply(&fixture, "/auto_stop").await,
        "✅ Automatic R_75 analysis stopped."
    );
    assert!(fixture.scheduler.job(RecipientKey(42)).await.is_none());

    // 예약이 없어도 같은 확인 메시지
    assert_eq!(
        reply(&fixture, "/auto_stop").await,
        "✅ Automatic R_75 analysis stopped."
    );
}

#[tokio::test]
async fn auto_start_with_huge_interval_is_capped() {
    let fixture = fixture();

    let text = reply(&fixture, "/auto_start 9223372036854775807").await;

    assert_eq!(
        text,
        format!(
            "✅ Automatic R_75 analysis started. You will receive updates every {} minutes.",
            MAX_INTERVAL_MINUTES
        )
    );
    assert_eq!(
        fixture.scheduler.job(RecipientKey(42)).await.unwrap().interval_minutes,
        MAX_INTERVAL_MINUTES
    );
}

#[tokio::test]
async fn pending_notices_only_for_valid_long_commands() {
    let fixture = fixture();
    let handler = &fixture.handler;

    assert_eq!(
        handler.pending_notice(&BotCommand::parse("/signal r_75")),
        Some("Analyzing R_75... Please wait.".to_string())
    );
    assert_eq!(
        handler.pending_notice(&BotCommand::parse("/analyze R_75 1h")),
        Some("Analyzing R_75 on 1h timeframe... Please wait.".to_string())
    );
    assert_eq!(
        handler.pending_notice(&BotCommand::parse("/r75")),
        Some("Analyzing R_75 with pattern recognition... Please wait.".to_string())
    );
    assert_eq!(handler.pending_notice(&BotCommand::parse("/signal")), None);
    assert_eq!(handler.pending_notice(&BotCommand::parse("/signal xyz")), None);
    assert_eq!(handler.pending_notice(&BotCommand::parse("/help")), None);
}

#[tokio::test]
async fn unknown_command_is_ignored() {
    let fixture = fixture();
    let ctx = CommandContext::new(42_i64);

    let response = dispatch_command(&fixture.handler, &ctx, BotCommand::parse("/foo"))
        .await
        .unwrap();
    assert!(response.is_none());
}
