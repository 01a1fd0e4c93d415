use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 浏览器相关错误
    Browser(BrowserError),
    /// 页面抓取错误（传输层）
    Fetch(FetchError),
    /// 数据提取错误（语义层）
    Extraction(ExtractionError),
    /// 存储层错误
    Storage(StorageError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Browser(e) => write!(f, "浏览器错误: {}", e),
            AppError::Fetch(e) => write!(f, "抓取错误: {}", e),
            AppError::Extraction(e) => write!(f, "提取错误: {}", e),
            AppError::Storage(e) => write!(f, "存储错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Browser(e) => Some(e),
            AppError::Fetch(e) => Some(e),
            AppError::Extraction(e) => Some(e),
            AppError::Storage(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 浏览器相关错误
#[derive(Debug)]
pub enum BrowserError {
    /// 连接浏览器失败
    ConnectionFailed {
        port: u16,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 启动无头浏览器失败
    LaunchFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 创建页面失败
    PageCreationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 导航失败
    NavigationFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 执行脚本失败
    ScriptExecutionFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::ConnectionFailed { port, source } => {
                write!(f, "无法连接到浏览器 (端口: {}): {}", port, source)
            }
            BrowserError::LaunchFailed { source } => {
                write!(f, "启动无头浏览器失败: {}", source)
            }
            BrowserError::PageCreationFailed { source } => {
                write!(f, "创建页面失败: {}", source)
            }
            BrowserError::NavigationFailed { url, source } => {
                write!(f, "导航到 {} 失败: {}", url, source)
            }
            BrowserError::ScriptExecutionFailed { source } => {
                write!(f, "执行脚本失败: {}", source)
            }
        }
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrowserError::ConnectionFailed { source, .. }
            | BrowserError::LaunchFailed { source }
            | BrowserError::PageCreationFailed { source }
            | BrowserError::NavigationFailed { source, .. }
            | BrowserError::ScriptExecutionFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 页面抓取错误
///
/// 与 `ExtractionError` 区分：这里是传输层失败（HTTP 状态、超时），
/// 页面内容是否可用由提取层判断
#[derive(Debug)]
pub enum FetchError {
    /// 页面返回非 2xx 状态码
    NotOk { url: String, status: u16 },
    /// 导航/等待超出时间预算
    Timeout { url: String, budget_ms: u64 },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::NotOk { url, status } => {
                write!(f, "页面返回异常状态码 {} ({})", status, url)
            }
            FetchError::Timeout { url, budget_ms } => {
                write!(f, "页面加载超时 (预算: {}ms, {})", budget_ms, url)
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// 数据提取错误
#[derive(Debug)]
pub enum ExtractionError {
    /// 页面中没有任何可识别的统计字段
    NoDataFound,
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionError::NoDataFound => {
                write!(f, "页面中未找到任何统计数据")
            }
        }
    }
}

impl std::error::Error for ExtractionError {}

/// 存储层错误
#[derive(Debug)]
pub enum StorageError {
    /// 打开数据库失败
    OpenFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// SQL 执行失败
    QueryFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 标识符不存在
    IdentifierNotFound { value: String },
    /// 非法的状态转换
    IllegalTransition {
        value: String,
        from: String,
        to: String,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::OpenFailed { path, source } => {
                write!(f, "打开数据库失败 ({}): {}", path, source)
            }
            StorageError::QueryFailed { source } => {
                write!(f, "SQL 执行失败: {}", source)
            }
            StorageError::IdentifierNotFound { value } => {
                write!(f, "标识符不存在: {}", value)
            }
            StorageError::IllegalTransition { value, from, to } => {
                write!(f, "非法的状态转换 ({}): {} -> {}", value, from, to)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::OpenFailed { source, .. } | StorageError::QueryFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 环境变量解析失败
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件解析失败
    FileParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EnvVarParseFailed {
                var_name,
                value,
                expected_type,
            } => {
                write!(
                    f,
                    "环境变量 {} 解析失败: 值 '{}' 无法转换为 {}",
                    var_name, value, expected_type
                )
            }
            ConfigError::FileParseFailed { path, source } => {
                write!(f, "配置文件解析失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(StorageError::QueryFailed {
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Other(format!("JSON 解析失败: {}", err))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::FileParseFailed {
            path: String::new(), // TOML 错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Other(format!("IO 错误: {}", err))
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::Fetch(err)
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        AppError::Extraction(err)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err)
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 是否为"页面无数据"失败
    pub fn is_no_data(&self) -> bool {
        matches!(self, AppError::Extraction(ExtractionError::NoDataFound))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
