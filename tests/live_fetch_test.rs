//! 需要真实浏览器与外网的集成测试
//!
//! 默认忽略，需要手动运行：cargo test -- --ignored

use cs_stats_scraper::browser::{launch_headless_browser, DocumentSource, PageFetcher};
use cs_stats_scraper::config::Config;
use cs_stats_scraper::infrastructure::JsExecutor;

#[tokio::test]
#[ignore]
async fn test_browser_launch_and_close() {
    let _ = tracing_subscriber::fmt::try_init();

    let result = launch_headless_browser().await;
    assert!(result.is_ok(), "应该能够启动无头浏览器");

    let (mut browser, _page) = result.unwrap();
    let _ = browser.close().await;
}

#[tokio::test]
#[ignore]
async fn test_fetch_live_profile() {
    let _ = tracing_subscriber::fmt::try_init();

    let config = Config::load();

    let (mut browser, page) = launch_headless_browser()
        .await
        .expect("启动无头浏览器失败");
    let fetcher = PageFetcher::new(JsExecutor::new(page), &config);

    // 注意：请替换为实际存在的玩家标识符
    let doc = fetcher
        .fetch_document("76561197960287930")
        .await
        .expect("抓取页面失败");

    println!("快照节点数: {}", doc.len());
    println!("页面标题: {}", doc.title());
    assert!(!doc.is_empty(), "页面快照不应为空");

    let _ = browser.close().await;
}
