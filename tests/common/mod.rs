//! 测试用的假评测机
//!
//! 按脚本内容分派页面行为，不需要真实浏览器。

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

use uoj_remote_judge::error::DriverError;
use uoj_remote_judge::infrastructure::scripts;
use uoj_remote_judge::infrastructure::{BrowsingContext, PageResponse, WebDriver};
use uoj_remote_judge::Config;

pub const USERNAME: &str = "alice";

pub fn test_config() -> Config {
    Config {
        username: USERNAME.to_string(),
        password: "secret".to_string(),
        ..Config::default()
    }
}

/// 一次提交的记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub url: String,
    pub language: String,
    pub source_len: usize,
}

#[derive(Default)]
struct JudgeState {
    accept_login: bool,
    logged_in: bool,
    logins: usize,
    /// 新提交在列表中显示的用户名
    listed_user: String,
    next_run_id: u64,
    listing: Vec<JsonValue>,
    submitted: Vec<Submitted>,
    details: HashMap<u64, VecDeque<JsonValue>>,
    opened: usize,
    closed: usize,
}

/// 假评测机，同时实现 `WebDriver`
#[derive(Clone)]
pub struct FakeJudge {
    state: Arc<Mutex<JudgeState>>,
}

impl FakeJudge {
    pub fn new() -> Self {
        let state = JudgeState {
            accept_login: true,
            listed_user: USERNAME.to_string(),
            next_run_id: 1000,
            listing: vec![
                json!({ "class": "info", "cells": ["ID", "Problem", "Submitter", "Result"] }),
                json!({ "class": null, "cells": ["#999", "#1", "bob", "100"] }),
            ],
            ..JudgeState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn reject_login(self) -> Self {
        self.state.lock().unwrap().accept_login = false;
        self
    }

    /// 新提交在列表中记在别的用户名下
    pub fn list_submissions_as(self, user: &str) -> Self {
        self.state.lock().unwrap().listed_user = user.to_string();
        self
    }

    /// 依次返回的详情页内容，最后一条会一直保持
    pub fn script_run(&self, run_id: u64, pages: Vec<JsonValue>) {
        self.state
            .lock()
            .unwrap()
            .details
            .insert(run_id, pages.into());
    }

    pub fn next_run_id(&self) -> u64 {
        self.state.lock().unwrap().next_run_id
    }

    pub fn submitted(&self) -> Vec<Submitted> {
        self.state.lock().unwrap().submitted.clone()
    }

    /// 模拟登录过期
    pub fn expire_session(&self) {
        self.state.lock().unwrap().logged_in = false;
    }

    pub fn logins(&self) -> usize {
        self.state.lock().unwrap().logins
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.lock().unwrap().logged_in
    }

    pub fn opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    pub fn closed(&self) -> usize {
        self.state.lock().unwrap().closed
    }
}

/// 详情页字段
pub fn detail(result: &str) -> JsonValue {
    json!({ "status": result, "score": result, "time": "15ms", "memory": "1024kb" })
}

#[async_trait]
impl WebDriver for FakeJudge {
    async fn open_context(&self) -> Result<Box<dyn BrowsingContext>, DriverError> {
        self.state.lock().unwrap().opened += 1;
        Ok(Box::new(FakeContext {
            state: Arc::clone(&self.state),
            url: "about:blank".to_string(),
        }))
    }
}

struct FakeContext {
    state: Arc<Mutex<JudgeState>>,
    url: String,
}

impl FakeContext {
    fn run_id_in_url(&self) -> Option<u64> {
        self.url
            .split_once("submission/")
            .and_then(|(_, id)| id.parse().ok())
    }
}

#[async_trait]
impl BrowsingContext for FakeContext {
    async fn goto(&mut self, url: &str) -> Result<PageResponse, DriverError> {
        self.url = url.to_string();
        let state = self.state.lock().unwrap();

        if url.ends_with("user/msg") {
            let body = if state.logged_in {
                "<a href=\"/user/msg\">私信</a>"
            } else {
                "<form id=\"form-login\"></form>"
            };
            return Ok(PageResponse {
                status: 200,
                body: body.to_string(),
            });
        }

        if let Some(run_id) = self.run_id_in_url() {
            let status = if state.details.contains_key(&run_id) {
                200
            } else {
                404
            };
            return Ok(PageResponse {
                status,
                body: String::new(),
            });
        }

        Ok(PageResponse {
            status: 200,
            body: String::new(),
        })
    }

    async fn evaluate(
        &self,
        script: &str,
        args: Vec<JsonValue>,
    ) -> Result<JsonValue, DriverError> {
        let mut state = self.state.lock().unwrap();

        if script == scripts::LOGIN_FORM {
            state.logins += 1;
            if state.accept_login {
                state.logged_in = true;
            }
            return Ok(json!(true));
        }

        if script == scripts::SUBMIT_FORM {
            // 未登录时题目页没有提交表单
            if !state.logged_in {
                return Ok(json!(false));
            }
            let language = args.first().and_then(JsonValue::as_str).unwrap_or_default();
            let source = args.get(1).and_then(JsonValue::as_str).unwrap_or_default();
            let record = Submitted {
                url: self.url.clone(),
                language: language.to_string(),
                source_len: source.len(),
            };
            state.submitted.push(record);

            let run_id = state.next_run_id;
            state.next_run_id += 1;
            let row = json!({
                "class": null,
                "cells": [format!("#{}", run_id), "#1", state.listed_user.clone(), "Waiting"],
            });
            // 表头之后，最新的在最上方
            state.listing.insert(1, row);
            return Ok(json!(true));
        }

        if script == scripts::RESULTS_LISTING {
            return Ok(JsonValue::Array(state.listing.clone()));
        }

        if script == scripts::SUBMISSION_DETAIL {
            let run_id = self
                .run_id_in_url()
                .ok_or_else(|| DriverError::ScriptFailed("not a submission page".into()))?;
            let pages = state
                .details
                .get_mut(&run_id)
                .ok_or_else(|| DriverError::ScriptFailed("no detail table".into()))?;
            let page = if pages.len() > 1 {
                pages.pop_front()
            } else {
                pages.front().cloned()
            };
            return Ok(page.unwrap_or(JsonValue::Null));
        }

        Err(DriverError::ScriptFailed("unknown script".into()))
    }

    async fn wait_for_navigation(&self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), DriverError> {
        self.state.lock().unwrap().closed += 1;
        Ok(())
    }
}
