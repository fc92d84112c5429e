//! 评测结果轮询循环 - 流程层
//!
//! ## 职责
//!
//! 持有所有未完成的提交，按固定间隔查询它们的最新状态并交付给调用方，
//! 拿到终态后移除。
//!
//! ## 约定
//!
//! - 下一轮只在本轮所有提交处理完后才开始计时，评测机慢时轮询自然变慢
//! - 同一轮内的交付顺序为登记顺序
//! - 暂时性查询失败静默重试，不通知调用方；永久失败或连续失败次数达到上限时
//!   交付一次 `JudgementFailed` 并移除
//! - 调用方丢弃句柄即视为取消，下一轮移除
//! - 同一运行编号重复登记时追加订阅者，不会丢弃先前的订阅者

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::FetchError;
use crate::models::{JudgeResult, JudgeStatus, RunId};
use crate::services::ResultSource;
use crate::workflow::tracking::ResultSink;

/// 轮询参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// 一轮结束到下一轮开始的间隔
    pub interval: Duration,
    /// 同一轮中同时进行的查询数
    pub max_in_flight: usize,
    /// 连续暂时性失败的上限
    pub max_consecutive_failures: u32,
}

impl PollSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.poll_interval(),
            max_in_flight: config.max_in_flight_fetches.max(1),
            max_consecutive_failures: config.max_consecutive_failures.max(1),
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// 一个未完成的提交
#[derive(Debug)]
pub struct PendingEntry {
    pub run_id: RunId,
    sinks: Vec<ResultSink>,
    consecutive_failures: u32,
    last_status: Option<JudgeStatus>,
    registered_at: DateTime<Local>,
}

impl PendingEntry {
    fn new(run_id: RunId, sink: ResultSink) -> Self {
        Self {
            run_id,
            sinks: vec![sink],
            consecutive_failures: 0,
            last_status: None,
            registered_at: Local::now(),
        }
    }

    fn progress(&self, result: &JudgeResult) {
        for sink in &self.sinks {
            sink.progress(result.clone());
        }
    }

    fn finish(self, result: JudgeResult) {
        for sink in self.sinks {
            sink.finish(result.clone());
        }
    }

    fn elapsed_secs(&self) -> i64 {
        (Local::now() - self.registered_at).num_seconds()
    }
}

struct Registration {
    run_id: RunId,
    sink: ResultSink,
}

/// 登记入口，可以克隆后交给多个提交方
#[derive(Debug, Clone)]
pub struct Registrar {
    tx: mpsc::UnboundedSender<Registration>,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("run_id", &self.run_id)
            .finish()
    }
}

impl Registrar {
    /// 登记一个运行编号
    ///
    /// 轮询循环已停止时原样退回 sink，由调用方自行交付失败结果。
    pub fn register(&self, run_id: RunId, sink: ResultSink) -> Result<(), ResultSink> {
        self.tx
            .send(Registration { run_id, sink })
            .map_err(|e| e.0.sink)
    }
}

/// 单轮统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// 本轮查询的提交数
    pub polled: usize,
    /// 本轮交付终态并移除的提交数
    pub completed: usize,
    /// 本轮查询失败的次数
    pub failed: usize,
}

/// 轮询循环
pub struct PollLoop<S: ResultSource + ?Sized> {
    source: Arc<S>,
    settings: PollSettings,
    pending: Vec<PendingEntry>,
    registrations: mpsc::UnboundedReceiver<Registration>,
    registrations_closed: bool,
}

impl<S: ResultSource + ?Sized> PollLoop<S> {
    pub fn new(source: Arc<S>, settings: PollSettings) -> (Self, Registrar) {
        let (tx, rx) = mpsc::unbounded_channel();
        let poll_loop = Self {
            source,
            settings,
            pending: Vec::new(),
            registrations: rx,
            registrations_closed: false,
        };
        (poll_loop, Registrar { tx })
    }

    /// 未完成的提交数
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, run_id: RunId) -> bool {
        self.pending.iter().any(|e| e.run_id == run_id)
    }

    /// 收取所有已到达的登记，返回收取数量
    pub fn drain_registrations(&mut self) -> usize {
        let mut received = 0;
        loop {
            match self.registrations.try_recv() {
                Ok(Registration { run_id, sink }) => {
                    received += 1;
                    match self.pending.iter_mut().find(|e| e.run_id == run_id) {
                        Some(entry) => {
                            warn!("运行编号 {} 重复登记，追加订阅者", run_id);
                            entry.sinks.push(sink);
                        }
                        None => {
                            debug!("登记运行编号 {}", run_id);
                            self.pending.push(PendingEntry::new(run_id, sink));
                        }
                    }
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.registrations_closed = true;
                    break;
                }
            }
        }
        received
    }

    /// 执行一轮轮询
    pub async fn tick(&mut self) -> TickStats {
        self.drain_registrations();
        self.retire_abandoned();

        let run_ids: Vec<RunId> = self.pending.iter().map(|e| e.run_id).collect();
        let source = Arc::clone(&self.source);

        // buffered 保持输入顺序，交付顺序即登记顺序
        let outcomes: Vec<(RunId, Result<JudgeResult, FetchError>)> = stream::iter(run_ids)
            .map(|run_id| {
                let source = Arc::clone(&source);
                async move { (run_id, source.fetch(run_id).await) }
            })
            .buffered(self.settings.max_in_flight)
            .collect()
            .await;

        let mut stats = TickStats {
            polled: outcomes.len(),
            ..Default::default()
        };
        for (run_id, outcome) in outcomes {
            self.apply(run_id, outcome, &mut stats);
        }
        stats
    }

    /// 持续轮询，直到 `shutdown` 完成，或者不会再有新的登记且没有未完成的提交
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        info!("🔄 轮询循环启动 (间隔 {:?})", self.settings.interval);

        loop {
            let stats = self.tick().await;
            if stats.polled > 0 {
                debug!(
                    "本轮查询 {} 个提交，完成 {}，失败 {}，剩余 {}",
                    stats.polled,
                    stats.completed,
                    stats.failed,
                    self.pending.len()
                );
            }

            if self.registrations_closed && self.pending.is_empty() {
                info!("没有待跟踪的提交，轮询循环结束");
                break;
            }

            tokio::select! {
                _ = &mut shutdown => {
                    info!("轮询循环收到停止信号，放弃 {} 个未完成的提交", self.pending.len());
                    break;
                }
                _ = sleep(self.settings.interval) => {}
            }
        }
    }

    fn retire_abandoned(&mut self) {
        self.pending.retain_mut(|entry| {
            entry.sinks.retain(|sink| !sink.is_abandoned());
            if entry.sinks.is_empty() {
                info!("提交 {} 已被调用方放弃，停止跟踪", entry.run_id);
                false
            } else {
                true
            }
        });
    }

    fn apply(
        &mut self,
        run_id: RunId,
        outcome: Result<JudgeResult, FetchError>,
        stats: &mut TickStats,
    ) {
        let Some(index) = self.pending.iter().position(|e| e.run_id == run_id) else {
            return;
        };

        match outcome {
            Ok(result) if result.is_terminal() => {
                let entry = self.pending.remove(index);
                info!(
                    "✅ 提交 {} 评测完成: {} (耗时 {} 秒)",
                    run_id,
                    result,
                    entry.elapsed_secs()
                );
                entry.finish(result);
                stats.completed += 1;
            }
            Ok(result) => {
                let entry = &mut self.pending[index];
                entry.consecutive_failures = 0;
                if entry.last_status != Some(result.status) {
                    debug!("提交 {} 状态: {:?}", run_id, result.status);
                    entry.last_status = Some(result.status);
                    entry.progress(&result);
                }
            }
            Err(e) => {
                stats.failed += 1;
                let entry = &mut self.pending[index];
                entry.consecutive_failures += 1;

                let exhausted =
                    entry.consecutive_failures >= self.settings.max_consecutive_failures;
                if e.is_transient() && !exhausted {
                    warn!(
                        "提交 {} 查询失败 ({}/{})，下一轮重试: {}",
                        run_id,
                        entry.consecutive_failures,
                        self.settings.max_consecutive_failures,
                        e
                    );
                    return;
                }

                error!("❌ 提交 {} 查询失败，停止跟踪: {}", run_id, e);
                let entry = self.pending.remove(index);
                entry.finish(JudgeResult::failed(e.to_string()));
                stats.completed += 1;
            }
        }
    }
}
