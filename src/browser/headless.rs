use anyhow::Result;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// 启动无头浏览器并创建空白页面
pub async fn launch_headless_browser() -> Result<(Browser, Page)> {
    info!("🚀 启动无头浏览器...");

    // 配置无头浏览器
    let config = BrowserConfig::builder()
        .new_headless_mode()
        .args(vec![
            "--disable-gpu",             // 部分平台的无头模式必须禁用 GPU
            "--no-sandbox",              // 禁用沙盒，防止权限问题导致的崩溃
            "--disable-dev-shm-usage",   // 防止共享内存不足
            "--remote-debugging-port=0", // 让浏览器自动选择端口
        ])
        .build()
        .map_err(|e| {
            error!("配置无头浏览器失败: {}", e);
            anyhow::anyhow!("配置无头浏览器失败: {}", e)
        })?;

    // 启动浏览器
    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动无头浏览器失败: {}", e);
        anyhow::anyhow!("启动无头浏览器失败: {}", e)
    })?;
    debug!("无头浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        anyhow::anyhow!("创建页面失败: {}", e)
    })?;

    info!("✅ 无头浏览器就绪");
    Ok((browser, page))
}
