use anyhow::Result;
use cs_stats_scraper::config::Config;
use cs_stats_scraper::{console, storage, utils};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    utils::logging::init();

    // 加载配置
    let config = Config::load();

    // 打开数据库并进入命令控制台
    let pool = storage::init_db(&config.database_path).await?;
    console::run(config, pool).await?;

    Ok(())
}
