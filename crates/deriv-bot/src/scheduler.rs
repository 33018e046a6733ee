//! 자동 분석 스케줄러.
//!
//! 수신자마다 최대 하나의 반복 작업을 유지합니다. 작업은 예약 후
//! `first_delay`가 지나면 처음 실행되고 이후 `interval`마다 반복됩니다.
//! 작업 실행이 실패해도 예약은 유지됩니다.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use deriv_core::{RecipientKey, SchedulerSettings, Timeframe};
use deriv_notification::DeliverySink;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::analysis::{format_auto_update, AnalysisService};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// 허용하는 최대 주기 (분). 7일.
pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// 자동 분석 대상.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTarget {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub count: usize,
}

/// 예약된 작업 상태.
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    pub recipient: RecipientKey,
    pub interval_minutes: u64,
    pub interval: Duration,
    pub next_fire: Instant,
    pub target: AnalysisTarget,
    /// 지금까지 실행된 횟수
    pub fires: u64,
    pub cancelled: bool,
}

/// 작업 한 번의 실행 내용.
#[async_trait]
pub trait AutoAnalysisTask: Send + Sync {
    async fn run(&self, recipient: RecipientKey, target: &AnalysisTarget);
}

/// 분석 후 전달기로 푸시하는 기본 작업.
pub struct ScheduledAnalysis {
    service: Arc<AnalysisService>,
    sink: Arc<dyn DeliverySink>,
}

impl ScheduledAnalysis {
    pub fn new(service: Arc<AnalysisService>, sink: Arc<dyn DeliverySink>) -> Self {
        Self { service, sink }
    }
}

#[async_trait]
impl AutoAnalysisTask for ScheduledAnalysis {
    async fn run(&self, recipient: RecipientKey, target: &AnalysisTarget) {
        let report = self
            .service
            .analyze(&target.symbol, target.timeframe, target.count)
            .await;
        let text = format_auto_update(&report);
        self.sink
            .deliver(&recipient, &text, report.chart.as_deref())
            .await;
    }
}

struct JobHandle {
    job: Arc<RwLock<ScheduledJob>>,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// 수신자별 반복 분석 스케줄러.
pub struct AutoAnalysisScheduler {
    settings: SchedulerSettings,
    target: AnalysisTarget,
    task: Arc<dyn AutoAnalysisTask>,
    jobs: Mutex<HashMap<RecipientKey, JobHandle>>,
    shutdown: CancellationToken,
}

impl AutoAnalysisScheduler {
    pub fn new(
        settings: SchedulerSettings,
        target: AnalysisTarget,
        task: Arc<dyn AutoAnalysisTask>,
    ) -> Self {
        Self {
            settings,
            target,
            task,
            jobs: Mutex::new(HashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    pub fn target(&self) -> &AnalysisTarget {
        &self.target
    }

    /// 요청 주기를 실제 주기(분)로 정규화합니다.
    ///
    /// 최소 주기 이상, [`MAX_INTERVAL_MINUTES`] 이하로 보정됩니다.
    pub fn effective_interval(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.settings.default_interval_minutes)
            .max(self.settings.min_interval_minutes)
            .clamp(1, MAX_INTERVAL_MINUTES)
    }

    /// 작업을 예약합니다. 기존 작업은 취소 후 교체됩니다.
    ///
    /// 실제 적용된 주기(분)를 반환합니다.
    pub async fn start(&self, recipient: RecipientKey, interval_minutes: Option<u64>) -> u64 {
        let minutes = self.effective_interval(interval_minutes);
        let interval = Duration::from_secs(minutes.saturating_mul(60));

        let mut jobs = self.jobs.lock().await;
        if let Some(previous) = jobs.remove(&recipient) {
            previous.token.cancel();
            previous.job.write().await.cancelled = true;
            debug!(recipient = %recipient, "기존 자동 분석 작업 교체");
        }

        let job = Arc::new(RwLock::new(ScheduledJob {
            recipient,
            interval_minutes: minutes,
            interval,
            next_fire: Instant::now() + self.settings.first_delay(),
            target: self.target.clone(),
            fires: 0,
            cancelled: false,
        }));
        let token = self.shutdown.child_token();
        let handle = tokio::spawn(run_job(
            Arc::clone(&job),
            Arc::clone(&self.task),
            token.clone(),
        ));

        jobs.insert(recipient, JobHandle { job, token, handle });
        info!(recipient = %recipient, interval_minutes = minutes, "자동 분석 시작");
        minutes
    }

    /// 작업을 해제합니다. 작업이 있었으면 true.
    pub async fn stop(&self, recipient: RecipientKey) -> bool {
        let removed = self.jobs.lock().await.remove(&recipient);
        match removed {
            Some(entry) => {
                entry.token.cancel();
                entry.job.write().await.cancelled = true;
                info!(recipient = %recipient, "자동 분석 중지");
                true
            }
            None => false,
        }
    }

    /// 수신자의 작업 상태 스냅샷.
    pub async fn job(&self, recipient: RecipientKey) -> Option<ScheduledJob> {
        let job = {
            let jobs = self.jobs.lock().await;
            jobs.get(&recipient).map(|entry| Arc::clone(&entry.job))
        }?;
        let snapshot = job.read().await.clone();
        Some(snapshot)
    }

    pub async fn active_jobs(&self) -> usize {
        self.jobs.lock().await.len()
    }

    /// 모든 작업을 취소하고 종료를 기다립니다.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let handles: Vec<JoinHandle<()>> = self
            .jobs
            .lock()
            .await
            .drain()
            .map(|(_, entry)| entry.handle)
            .collect();

        let count = handles.len();
        let wait_all = wait_jobs(handles);
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, wait_all).await.is_err() {
            warn!(jobs = count, "자동 분석 작업 종료 대기 시간 초과");
        } else {
            info!(jobs = count, "자동 분석 스케줄러 종료");
        }
    }
}

async fn wait_jobs(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        if let Err(e) = handle.await {
            warn!(error = %e, "자동 분석 작업 비정상 종료");
        }
    }
}

async fn run_job(
    job: Arc<RwLock<ScheduledJob>>,
    task: Arc<dyn AutoAnalysisTask>,
    token: CancellationToken,
) {
    loop {
        let next_fire = job.read().await.next_fire;

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = tokio::time::sleep_until(next_fire) => {}
        }

        let (recipient, target) = {
            let state = job.read().await;
            (state.recipient, state.target.clone())
        };
        debug!(recipient = %recipient, symbol = %target.symbol, "자동 분석 실행");
        task.run(recipient, &target).await;

        let mut state = job.write().await;
        state.fires += 1;
        // 실행이 주기보다 길었으면 밀린 회차는 건너뜀
        let now = Instant::now();
        let interval = state.interval;
        while state.next_fire <= now {
            state.next_fire += interval;
        }
    }

    job.write().await.cancelled = true;
}
