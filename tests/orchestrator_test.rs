mod common;

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use common::{detail, test_config, FakeJudge};
use uoj_remote_judge::services::{DirectoryResolver, ResultFetcher, MAX_SOURCE_SIZE};
use uoj_remote_judge::{
    JudgeStatus, Orchestrator, PollLoop, Problem, RunId, Solution, SubmissionHandle,
};

struct Harness {
    judge: FakeJudge,
    orchestrator: Orchestrator,
    poll_loop: PollLoop<ResultFetcher>,
    sources: TempDir,
}

impl Harness {
    fn new(judge: FakeJudge) -> Self {
        let (orchestrator, poll_loop) =
            Orchestrator::with_driver(Arc::new(judge.clone()), Arc::new(test_config()));
        Self {
            judge,
            orchestrator,
            poll_loop,
            sources: tempfile::tempdir().unwrap(),
        }
    }

    fn write_source(&self, name: &str, len: u64) {
        let file = std::fs::File::create(self.sources.path().join(name)).unwrap();
        file.set_len(len).unwrap();
    }

    async fn submit(&self, problem: &str, language: &str, file: &str) -> SubmissionHandle {
        let resolver = DirectoryResolver::new(self.sources.path());
        self.orchestrator
            .handle(&Problem::new(problem), &Solution::new(language, file), &resolver)
            .await
    }

    fn assert_contexts_released(&self) {
        assert_eq!(self.judge.opened(), self.judge.closed());
    }
}

async fn failure_text(handle: SubmissionHandle) -> String {
    let result = handle.wait().await;
    assert_eq!(result.status, JudgeStatus::JudgementFailed);
    result.details.error.unwrap_or_default()
}

#[tokio::test]
async fn test_java_submitted_with_judge_label_and_registered() {
    let mut h = Harness::new(FakeJudge::new());
    h.write_source("Main.java", 128);
    let run_id = h.judge.next_run_id();

    let _handle = h.submit("1", "java", "Main.java").await;

    let submitted = h.judge.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].language, "Java8");
    assert_eq!(submitted[0].source_len, 128);
    assert!(submitted[0].url.ends_with("problem/1"));

    assert_eq!(h.poll_loop.drain_registrations(), 1);
    assert!(h.poll_loop.is_pending(RunId(run_id)));
    h.assert_contexts_released();
}

#[tokio::test]
async fn test_unknown_language_rejected_without_tracking() {
    let mut h = Harness::new(FakeJudge::new());
    h.write_source("main.pas", 16);

    let handle = h.submit("1", "pascal", "main.pas").await;

    assert_eq!(failure_text(handle).await, "Language rejected");
    assert!(h.judge.submitted().is_empty());
    assert_eq!(h.poll_loop.drain_registrations(), 0);
    assert_eq!(h.poll_loop.pending_len(), 0);
    h.assert_contexts_released();
}

#[tokio::test]
async fn test_source_size_ceiling() {
    let mut h = Harness::new(FakeJudge::new());
    h.write_source("exact.cpp", MAX_SOURCE_SIZE);
    h.write_source("over.cpp", MAX_SOURCE_SIZE + 1);

    let _accepted = h.submit("1", "cpp11", "exact.cpp").await;
    let rejected = h.submit("1", "cpp11", "over.cpp").await;

    assert_eq!(failure_text(rejected).await, "File is too big");
    assert_eq!(h.judge.submitted().len(), 1);
    assert_eq!(h.judge.submitted()[0].language, "C++11");
    assert_eq!(h.poll_loop.drain_registrations(), 1);
}

#[tokio::test]
async fn test_login_failure_reported() {
    let mut h = Harness::new(FakeJudge::new().reject_login());
    h.write_source("main.c", 16);

    let handle = h.submit("1", "c", "main.c").await;

    assert_eq!(failure_text(handle).await, "Login failed");
    assert!(!h.judge.is_logged_in());
    assert!(h.judge.submitted().is_empty());
    assert_eq!(h.poll_loop.drain_registrations(), 0);
    h.assert_contexts_released();
}

#[tokio::test]
async fn test_invalid_requests_rejected_before_touching_judge() {
    let h = Harness::new(FakeJudge::new());
    h.write_source("main.c", 16);

    let bad_problem = h.submit("1/../2", "c", "main.c").await;
    assert_eq!(failure_text(bad_problem).await, "Invalid problem");

    let bad_solution = h.submit("1", "", "main.c").await;
    assert_eq!(failure_text(bad_solution).await, "Invalid solution");

    assert_eq!(h.judge.opened(), 0);
}

#[tokio::test]
async fn test_malformed_json_request_rejected() {
    let h = Harness::new(FakeJudge::new());
    let resolver = DirectoryResolver::new(h.sources.path());

    let handle = h
        .orchestrator
        .handle_raw(&json!({ "id": "1" }), &json!({ "language": "c" }), &resolver)
        .await;

    assert_eq!(failure_text(handle).await, "Invalid solution");
    assert_eq!(h.judge.opened(), 0);
}

#[tokio::test]
async fn test_missing_source_file_reported_as_invalid_solution() {
    let mut h = Harness::new(FakeJudge::new());

    let handle = h.submit("1", "c", "missing.c").await;

    assert_eq!(failure_text(handle).await, "Invalid solution");
    assert!(h.judge.submitted().is_empty());
    assert_eq!(h.poll_loop.drain_registrations(), 0);
}

#[tokio::test]
async fn test_run_listed_under_other_user_not_claimed() {
    let mut h = Harness::new(FakeJudge::new().list_submissions_as("bob"));
    h.write_source("main.py", 16);

    let handle = h.submit("1", "python3", "main.py").await;

    assert_eq!(failure_text(handle).await, "Invalid solution");
    assert_eq!(h.judge.submitted().len(), 1);
    assert_eq!(h.poll_loop.drain_registrations(), 0);
    h.assert_contexts_released();
}

#[tokio::test]
async fn test_session_reused_across_submissions() {
    let mut h = Harness::new(FakeJudge::new());
    h.write_source("main.c", 16);

    let _first = h.submit("1", "c", "main.c").await;
    let opened_after_first = h.judge.opened();
    let _second = h.submit("2", "c", "main.c").await;

    // 第二次提交不再登录、探活，只打开提交页
    assert_eq!(h.judge.opened() - opened_after_first, 1);
    assert_eq!(h.poll_loop.drain_registrations(), 2);
    assert_eq!(h.poll_loop.pending_len(), 2);
}

#[tokio::test]
async fn test_expired_session_relogged_in_after_failed_submit() {
    let mut h = Harness::new(FakeJudge::new());
    h.write_source("main.c", 16);

    let _first = h.submit("1", "c", "main.c").await;
    assert_eq!(h.judge.logins(), 1);

    h.judge.expire_session();
    let failed = h.submit("2", "c", "main.c").await;
    assert_eq!(failure_text(failed).await, "Invalid solution");
    assert_eq!(h.judge.logins(), 1);

    let _third = h.submit("3", "c", "main.c").await;
    assert_eq!(h.judge.logins(), 2);
    assert!(h.judge.is_logged_in());

    let submitted = h.judge.submitted();
    assert_eq!(submitted.len(), 2);
    assert!(submitted[1].url.ends_with("problem/3"));
    assert_eq!(h.poll_loop.drain_registrations(), 2);
    h.assert_contexts_released();
}

#[tokio::test]
async fn test_submission_tracked_to_terminal_result() {
    let mut h = Harness::new(FakeJudge::new());
    h.write_source("main.cpp", 64);
    let run_id = h.judge.next_run_id();
    h.judge.script_run(
        run_id,
        vec![detail("Waiting"), detail("Judging"), detail("Judging"), detail("100")],
    );

    let handle = h.submit("1", "cpp98", "main.cpp").await;
    assert_eq!(h.judge.submitted()[0].language, "C++");

    for _ in 0..4 {
        h.poll_loop.tick().await;
    }
    assert_eq!(h.poll_loop.pending_len(), 0);

    let mut updates = Vec::new();
    handle.forward(|r| updates.push(r)).await;
    let statuses: Vec<JudgeStatus> = updates.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            JudgeStatus::WaitingJudge,
            JudgeStatus::Judging,
            JudgeStatus::Accepted
        ]
    );

    let last = updates.last().unwrap();
    assert_eq!(last.score, 100);
    assert_eq!(last.details.time.as_deref(), Some("15ms"));
    assert_eq!(last.details.memory.as_deref(), Some("1024kb"));
    h.assert_contexts_released();
}

#[tokio::test]
async fn test_unknown_run_stops_tracking() {
    let mut h = Harness::new(FakeJudge::new());
    h.write_source("main.c", 16);

    // 没有为该运行编号准备详情页，查询返回 404
    let handle = h.submit("1", "c", "main.c").await;
    let stats = h.poll_loop.tick().await;

    assert_eq!(stats.failed, 1);
    assert_eq!(h.poll_loop.pending_len(), 0);
    assert!(failure_text(handle).await.contains("not found"));
}
