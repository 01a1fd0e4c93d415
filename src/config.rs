use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 每批处理的标识符数量
    pub batch_size: usize,
    /// 批内条目之间的间隔（毫秒），限制对外部站点的请求速率
    pub item_delay_ms: u64,
    /// 相邻批次之间的间隔（毫秒），比条目间隔短
    pub batch_delay_ms: u64,
    /// 玩家页面 URL 前缀，标识符拼接在其后
    pub profile_url_base: String,
    /// 页面导航 + 渲染等待的总时间预算（毫秒）
    pub navigation_timeout_ms: u64,
    /// 导航完成后等待客户端渲染的时间（毫秒）
    pub render_wait_ms: u64,
    /// 是否启动无头浏览器（false 时连接已运行的浏览器调试端口）
    pub use_headless: bool,
    /// 浏览器调试端口（连接模式）
    pub browser_debug_port: u16,
    /// SQLite 数据库文件路径
    pub database_path: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: 10,
            item_delay_ms: 2500,
            batch_delay_ms: 1000,
            profile_url_base: "https://csstats.gg/player".to_string(),
            navigation_timeout_ms: 30_000,
            render_wait_ms: 2000,
            use_headless: true,
            browser_debug_port: 2001,
            database_path: "stats.db".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：config.toml（如果存在）→ 环境变量覆盖 → 默认值兜底
    pub fn load() -> Self {
        let base = Self::from_file("config.toml").unwrap_or_default();
        base.with_env_overrides()
    }

    /// 从 TOML 配置文件加载
    pub fn from_file(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return None;
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => Some(config),
                Err(e) => {
                    warn!("配置文件解析失败 ({}): {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                warn!("读取配置文件失败 ({}): {}", path.display(), e);
                None
            }
        }
    }

    /// 从环境变量加载（以 self 作为默认值）
    pub fn with_env_overrides(self) -> Self {
        Self {
            batch_size: env_parse("BATCH_SIZE", self.batch_size),
            item_delay_ms: env_parse("ITEM_DELAY_MS", self.item_delay_ms),
            batch_delay_ms: env_parse("BATCH_DELAY_MS", self.batch_delay_ms),
            profile_url_base: std::env::var("PROFILE_URL_BASE").unwrap_or(self.profile_url_base),
            navigation_timeout_ms: env_parse("NAVIGATION_TIMEOUT_MS", self.navigation_timeout_ms),
            render_wait_ms: env_parse("RENDER_WAIT_MS", self.render_wait_ms),
            use_headless: env_parse("USE_HEADLESS", self.use_headless),
            browser_debug_port: env_parse("BROWSER_DEBUG_PORT", self.browser_debug_port),
            database_path: std::env::var("DATABASE_PATH").unwrap_or(self.database_path),
            verbose_logging: env_parse("VERBOSE_LOGGING", self.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
        }
    }

    /// 拼接某个标识符的页面 URL
    pub fn profile_url(&self, value: &str) -> String {
        format!("{}/{}", self.profile_url_base.trim_end_matches('/'), value)
    }
}

fn env_parse<T: std::str::FromStr>(var_name: &str, default: T) -> T {
    std::env::var(var_name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
