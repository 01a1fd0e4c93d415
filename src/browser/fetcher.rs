//! 页面抓取器
//!
//! 把"某个标识符的统计页"物化为不可变的 `DocumentSnapshot`。
//! 编排层只依赖 `DocumentSource` 契约，测试可以注入桩实现

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult, BrowserError, FetchError};
use crate::infrastructure::JsExecutor;
use crate::models::{DocumentSnapshot, RawDocument};

/// 渲染契约：标识符 → 文档快照
///
/// 失败必须可区分：非 2xx 状态（`FetchError::NotOk`）与
/// 超时（`FetchError::Timeout`）
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_document(&self, value: &str) -> AppResult<DocumentSnapshot>;
}

/// 把 body 树序列化为传输结构的注入脚本
///
/// 只取元素节点；text 为节点的直接文本（不含后代），折叠空白。
/// 深度上限防御病态嵌套的页面
const SNAPSHOT_JS: &str = r#"
(() => {
    const MAX_DEPTH = 40;
    const serialize = (el, depth) => {
        if (depth > MAX_DEPTH) return null;
        let text = '';
        for (const child of el.childNodes) {
            if (child.nodeType === Node.TEXT_NODE) text += child.textContent;
        }
        const children = [];
        for (const child of el.children) {
            const s = serialize(child, depth + 1);
            if (s) children.push(s);
        }
        return {
            tag: el.tagName.toLowerCase(),
            text: text.replace(/\s+/g, ' ').trim(),
            children,
        };
    };
    return {
        title: document.title,
        root: serialize(document.body, 0),
    };
})()
"#;

/// 读取导航响应状态码（Navigation Timing API；不支持时返回 0）
const STATUS_JS: &str = r#"
(() => {
    const nav = performance.getEntriesByType('navigation')[0];
    return (nav && nav.responseStatus) || 0;
})()
"#;

/// 基于 chromiumoxide 的页面抓取器
///
/// 同一个 page 在一次运行内对所有标识符复用
pub struct PageFetcher {
    executor: JsExecutor,
    profile_url_base: String,
    navigation_timeout_ms: u64,
    render_wait_ms: u64,
}

impl PageFetcher {
    pub fn new(executor: JsExecutor, config: &Config) -> Self {
        Self {
            executor,
            profile_url_base: config.profile_url_base.clone(),
            navigation_timeout_ms: config.navigation_timeout_ms,
            render_wait_ms: config.render_wait_ms,
        }
    }

    fn profile_url(&self, value: &str) -> String {
        format!("{}/{}", self.profile_url_base.trim_end_matches('/'), value)
    }

    /// 导航 + 渲染等待，整体受时间预算约束
    async fn navigate(&self, url: &str) -> AppResult<()> {
        let budget = Duration::from_millis(self.navigation_timeout_ms);
        let result = timeout(budget, async {
            self.executor.goto(url).await?;
            // 统计站点是客户端渲染的，load 事件后还要等一会儿
            tokio::time::sleep(Duration::from_millis(self.render_wait_ms)).await;
            Ok::<_, anyhow::Error>(())
        })
        .await;

        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(AppError::Browser(BrowserError::NavigationFailed {
                url: url.to_string(),
                source: e.into(),
            })),
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                budget_ms: self.navigation_timeout_ms,
            }
            .into()),
        }
    }

    /// 检查导航响应状态（0 表示浏览器未提供，视为可用）
    async fn check_status(&self, url: &str) -> AppResult<()> {
        let status: u16 = self
            .executor
            .eval_as(STATUS_JS)
            .await
            .map_err(|e| AppError::Browser(BrowserError::ScriptExecutionFailed { source: e.into() }))?;

        debug!("导航状态码: {} ({})", status, url);
        if status >= 400 {
            return Err(FetchError::NotOk {
                url: url.to_string(),
                status,
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentSource for PageFetcher {
    async fn fetch_document(&self, value: &str) -> AppResult<DocumentSnapshot> {
        let url = self.profile_url(value);
        debug!("抓取页面: {}", url);

        self.navigate(&url).await?;
        self.check_status(&url).await?;

        let raw: RawDocument = self
            .executor
            .eval_as(SNAPSHOT_JS)
            .await
            .map_err(|e| AppError::Browser(BrowserError::ScriptExecutionFailed { source: e.into() }))?;

        let doc = DocumentSnapshot::from_raw(raw);
        debug!("快照节点数: {}", doc.len());
        Ok(doc)
    }
}
