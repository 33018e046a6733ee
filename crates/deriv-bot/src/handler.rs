//! 텔레그램 명령어 핸들러 구현.

use std::sync::Arc;

use async_trait::async_trait;
use deriv_notification::{
    BotCommand, BotCommandHandler, CommandContext, CommandResponse, NotificationResult,
};

use crate::analysis::AnalysisService;
use crate::scheduler::AutoAnalysisScheduler;

/// 분석 서비스와 스케줄러에 연결된 명령어 핸들러.
pub struct SignalBotHandler {
    analysis: Arc<AnalysisService>,
    scheduler: Arc<AutoAnalysisScheduler>,
}

impl SignalBotHandler {
    pub fn new(analysis: Arc<AnalysisService>, scheduler: Arc<AutoAnalysisScheduler>) -> Self {
        Self {
            analysis,
            scheduler,
        }
    }

    fn help_text(&self) -> String {
        format!(
            "🤖 <b>Deriv Trading Signal Bot Help</b>\n\n\
             <b>Available Commands:</b>\n\
             /signal &lt;symbol&gt; - Get trading signals (e.g., /signal R_75)\n\
             /symbols - List all available symbols\n\
             /timeframes - List available timeframes\n\
             /analyze &lt;symbol&gt; &lt;timeframe&gt; - Detailed analysis (e.g., /analyze R_75 1h)\n\
             /r75 - Comprehensive R_75 analysis across multiple timeframes\n\
             /auto_start [interval] - Start automatic R_75 analysis (interval in minutes, default: {})\n\
             /auto_stop - Stop automatic R_75 analysis\n\
             /help - Show this help message\n\n\
             For any issues or feedback, please contact the administrator.",
            self.scheduler.settings().default_interval_minutes
        )
    }

    fn report_symbol(&self) -> &str {
        &self.scheduler.target().symbol
    }
}

fn symbol_not_found(symbol: &str) -> CommandResponse {
    CommandResponse::plain(format!(
        "Symbol {} not found. Use /symbols to see available options.",
        symbol.to_uppercase()
    ))
}

#[async_trait]
impl BotCommandHandler for SignalBotHandler {
    async fn handle_start(&self, ctx: &CommandContext) -> NotificationResult<CommandResponse> {
        let name = ctx.first_name.as_deref().unwrap_or("there");
        Ok(CommandResponse::plain(format!(
            "👋 Hello {name}!\n\n\
             Welcome to the Deriv Trading Signal Bot. I can help you analyze trading signals for various assets.\n\n\
             Available commands:\n\
             /signal <symbol> - Get trading signals for a specific symbol\n\
             /symbols - List all available symbols\n\
             /timeframes - List available timeframes\n\
             /help - Show this help message"
        )))
    }

    async fn handle_help(&self, _ctx: &CommandContext) -> NotificationResult<CommandResponse> {
        Ok(CommandResponse::html(self.help_text()))
    }

    async fn handle_symbols(&self, _ctx: &CommandContext) -> NotificationResult<CommandResponse> {
        let mut text = String::from("📈 <b>Available Symbols:</b>\n\n");
        for symbol in &self.analysis.settings().symbols {
            text.push_str(&format!("• {}\n", symbol));
        }
        text.push_str("\nUse /signal &lt;symbol&gt; to get trading signals.");
        Ok(CommandResponse::html(text))
    }

    async fn handle_timeframes(
        &self,
        _ctx: &CommandContext,
    ) -> NotificationResult<CommandResponse> {
        let mut text = String::from("⏱️ <b>Available Timeframes:</b>\n\n");
        for timeframe in &self.analysis.settings().timeframes {
            text.push_str(&format!("• {}\n", timeframe));
        }
        text.push_str("\nUse /analyze &lt;symbol&gt; &lt;timeframe&gt; for detailed analysis.");
        Ok(CommandResponse::html(text))
    }

    async fn handle_signal(
        &self,
        _ctx: &CommandContext,
        symbol: Option<&str>,
    ) -> NotificationResult<CommandResponse> {
        let Some(requested) = symbol else {
            return Ok(CommandResponse::plain(
                "Please specify a symbol. Example: /signal R_75",
            ));
        };
        let settings = self.analysis.settings();
        let Some(symbol) = settings.find_symbol(requested) else {
            return Ok(symbol_not_found(requested));
        };

        let report = self
            .analysis
            .analyze(symbol, settings.default_timeframe, settings.candle_count)
            .await;
        Ok(CommandResponse::html(report.message).with_photo(report.chart))
    }

    async fn handle_analyze(
        &self,
        _ctx: &CommandContext,
        symbol: Option<&str>,
        timeframe: Option<&str>,
    ) -> NotificationResult<CommandResponse> {
        let (Some(requested), Some(label)) = (symbol, timeframe) else {
            return Ok(CommandResponse::plain(
                "Please specify both symbol and timeframe. Example: /analyze R_75 1h",
            ));
        };
        let settings = self.analysis.settings();
        let Some(symbol) = settings.find_symbol(requested) else {
            return Ok(symbol_not_found(requested));
        };
        let Some(timeframe) = settings.find_timeframe(label) else {
            return Ok(CommandResponse::plain(format!(
                "Timeframe {} not found. Use /timeframes to see available options.",
                label
            )));
        };

        let report = self
            .analysis
            .analyze(symbol, timeframe, settings.candle_count)
            .await;
        Ok(CommandResponse::html(report.message).with_photo(report.chart))
    }

    async fn handle_r75(&self, _ctx: &CommandContext) -> NotificationResult<CommandResponse> {
        let report = self
            .analysis
            .multi_timeframe_report(self.report_symbol())
            .await;
        Ok(CommandResponse::html(report.message).with_photo(report.chart))
    }

    async fn handle_auto_start(
        &self,
        ctx: &CommandContext,
        interval: Option<u64>,
    ) -> NotificationResult<CommandResponse> {
        let minutes = self.scheduler.start(ctx.chat, interval).await;
        Ok(CommandResponse::plain(format!(
            "✅ Automatic {} analysis started. You will receive updates every {} minutes.",
            self.report_symbol(),
            minutes
        )))
    }

    async fn handle_auto_stop(&self, ctx: &CommandContext) -> NotificationResult<CommandResponse> {
        self.scheduler.stop(ctx.chat).await;
        Ok(CommandResponse::plain(format!(
            "✅ Automatic {} analysis stopped.",
            self.report_symbol()
        )))
    }

    fn pending_notice(&self, command: &BotCommand) -> Option<String> {
        let settings = self.analysis.settings();
        match command {
            BotCommand::Signal {
                symbol: Some(requested),
            } => settings
                .find_symbol(requested)
                .map(|symbol| format!("Analyzing {}... Please wait.", symbol)),
            BotCommand::Analyze {
                symbol: Some(requested),
                timeframe: Some(label),
            } => {
                let symbol = settings.find_symbol(requested)?;
                let timeframe = settings.find_timeframe(label)?;
                Some(format!(
                    "Analyzing {} on {} timeframe... Please wait.",
                    symbol, timeframe
                ))
            }
            BotCommand::R75 => Some(format!(
                "Analyzing {} with pattern recognition... Please wait.",
                self.report_symbol()
            )),
            _ => None,
        }
    }
}
