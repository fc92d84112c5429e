//! 单次提交的结果通道
//!
//! 中间状态走无界 `mpsc`，终态走 `oneshot`。`ResultSink::finish` 消耗 sink 本身，
//! 所以同一次提交不可能交付两次终态。

use tokio::sync::{mpsc, oneshot};

use crate::models::JudgeResult;

/// 创建一对结果通道
pub fn submission_channel() -> (ResultSink, SubmissionHandle) {
    let (progress_tx, progress_rx) = mpsc::unbounded_channel();
    let (outcome_tx, outcome_rx) = oneshot::channel();
    (
        ResultSink {
            progress: progress_tx,
            outcome: outcome_tx,
        },
        SubmissionHandle {
            progress: progress_rx,
            outcome: outcome_rx,
        },
    )
}

/// 结果发送端，由轮询循环持有
#[derive(Debug)]
pub struct ResultSink {
    progress: mpsc::UnboundedSender<JudgeResult>,
    outcome: oneshot::Sender<JudgeResult>,
}

impl ResultSink {
    /// 交付中间状态
    pub fn progress(&self, result: JudgeResult) {
        // 调用方已放弃时忽略
        let _ = self.progress.send(result);
    }

    /// 交付终态
    pub fn finish(self, result: JudgeResult) {
        let _ = self.outcome.send(result);
    }

    /// 调用方已丢弃句柄
    pub fn is_abandoned(&self) -> bool {
        self.outcome.is_closed()
    }
}

/// 结果接收端，交给调用方
#[derive(Debug)]
pub struct SubmissionHandle {
    progress: mpsc::UnboundedReceiver<JudgeResult>,
    outcome: oneshot::Receiver<JudgeResult>,
}

impl SubmissionHandle {
    /// 下一条中间状态；终态交付后返回 `None`
    pub async fn next_update(&mut self) -> Option<JudgeResult> {
        self.progress.recv().await
    }

    /// 等待终态
    ///
    /// 发送端在交付前被丢弃（轮询循环已停止）时返回 `JudgementFailed`。
    pub async fn wait(self) -> JudgeResult {
        self.outcome
            .await
            .unwrap_or_else(|_| JudgeResult::failed("Tracking stopped"))
    }

    /// 以回调形式接收全部结果：先是中间状态，最后恰好一次终态
    pub async fn forward(mut self, mut on_update: impl FnMut(JudgeResult)) {
        while let Some(update) = self.progress.recv().await {
            on_update(update);
        }
        on_update(self.wait().await);
    }
}
