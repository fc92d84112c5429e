//! UOJ 页面脚本
//!
//! 评测机页面结构相关的选择器全部集中在这里。
//! 每个脚本都是一个 JS 函数表达式，由 [`BrowsingContext::evaluate`] 带参数调用。
//!
//! [`BrowsingContext::evaluate`]: crate::infrastructure::BrowsingContext::evaluate

/// 登录页：填写账号密码并点击登录。找不到表单时返回 `false`。
pub const LOGIN_FORM: &str = r##"
(username, password) => {
    const usr = document.querySelector("#input-username");
    const pwd = document.querySelector("#input-password");
    const btn = document.querySelector("#button-submit");
    if (!usr || !pwd || !btn) {
        return false;
    }
    usr.value = username;
    pwd.value = password;
    btn.click();
    return true;
}
"##;

/// 题目页：展开提交表单，选择语言、填入代码并提交。任一控件缺失时返回 `false`。
pub const SUBMIT_FORM: &str = r##"
(lang, sourcecode) => {
    const submitTab = document.querySelector("body > div.container.theme-showcase > div.uoj-content > ul > li:nth-child(2) > a");
    if (!submitTab) {
        return false;
    }
    submitTab.click();
    const langEle = document.querySelector("#input-answer_answer_language");
    const codeEle = document.querySelector("#input-answer_answer_editor");
    const btn = document.querySelector("#button-submit-answer");
    if (!langEle || !codeEle || !btn) {
        return false;
    }
    langEle.value = lang;
    codeEle.value = sourcecode;
    btn.click();
    return true;
}
"##;

/// 提交记录列表：按页面顺序（最新在前）返回每一行的 class 和各列文本
pub const RESULTS_LISTING: &str = r##"
() => {
    const tbody = document.querySelector("body > div > div.uoj-content > div.table-responsive > table > tbody");
    if (!tbody) {
        return [];
    }
    return Array.from(tbody.children).map((tr) => ({
        class: tr.getAttribute("class"),
        cells: Array.from(tr.children).map((td) => td.textContent.trim()),
    }));
}
"##;

/// 提交详情：结果列、用时、内存。缺失的字段为 `null`。
///
/// UOJ 的结果列要么是分数，要么是状态文本，所以 `status` 和 `score` 取自同一列。
pub const SUBMISSION_DETAIL: &str = r##"
() => {
    const row = "body > div > div.uoj-content > div.table-responsive > table > tbody > tr";
    const text = (n) => {
        const ele = document.querySelector(`${row} > td:nth-child(${n})`);
        return ele ? ele.textContent.trim() : null;
    };
    const result = text(4);
    return {
        status: result,
        score: result,
        memory: text(5),
        time: text(6),
    };
}
"##;
