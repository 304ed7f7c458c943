//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// 上游 HTTP 请求配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// 默认 User-Agent，部分站点会拒绝脚本客户端
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 临时图片目录配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// 本地存放目录
    #[serde(default = "default_artifact_root")]
    pub root: String,
    /// 对外暴露的 URL 前缀
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
    /// 对外可访问的站点地址（LINE 平台从这里抓图）
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// 释放后延迟删除的秒数
    #[serde(default = "default_cleanup_delay")]
    pub cleanup_delay_secs: u64,
}

/// 上游数据源地址
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// 原物料走势 JS，`{code}` 替换为原物料代码
    #[serde(default = "default_commodity_series_url")]
    pub commodity_series_url: String,
    /// 原物料最新价格页面
    #[serde(default = "default_commodity_quote_url")]
    pub commodity_quote_url: String,
    /// 页面中行情表格的位置（按文档顺序计数）
    #[serde(default = "default_quote_table_index")]
    pub commodity_quote_table_index: usize,
    /// 证交所每日收盘行情
    #[serde(default = "default_stock_day_all_url")]
    pub stock_day_all_url: String,
    /// 公司新闻页面，`{id}` 替换为股票代码
    #[serde(default = "default_news_url")]
    pub news_url: String,
    /// 新闻站点 Referer，同时作为相对链接的基准地址
    #[serde(default = "default_news_referer")]
    pub news_referer: String,
}

/// 绘图配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// JPEG 压缩质量（1-100），刻意压低以减少传输体积
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// 字体文件路径，为空则自动查找系统字体
    #[serde(default)]
    pub font_path: Option<String>,
}

/// 产业分析/产业新闻文本文件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryConfig {
    #[serde(default = "default_industry_analysis_path")]
    pub analysis_path: String,
    #[serde(default = "default_industry_news_path")]
    pub news_path: String,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub artifact: ArtifactConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub industry: IndustryConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_timeout() -> u64 { 10 }
fn default_connect_timeout() -> u64 { 5 }
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/86.0.4240.198 Safari/537.36".to_string()
}
fn default_log_level() -> String { "info".to_string() }
fn default_artifact_root() -> String { "static".to_string() }
fn default_url_prefix() -> String { "/static".to_string() }
fn default_public_base_url() -> String { "http://localhost:8080".to_string() }
fn default_cleanup_delay() -> u64 { 60 }
fn default_commodity_series_url() -> String {
    "http://www.stockq.org/commodity/js/{code}_sma.js".to_string()
}
fn default_commodity_quote_url() -> String {
    "http://www.stockq.org/market/commodity.php".to_string()
}
fn default_quote_table_index() -> usize { 7 }
fn default_stock_day_all_url() -> String {
    "http://www.twse.com.tw/exchangeReport/STOCK_DAY_ALL?response=json".to_string()
}
fn default_news_url() -> String {
    "https://pchome.megatime.com.tw/stock/sid{id}.html".to_string()
}
fn default_news_referer() -> String { "https://pchome.megatime.com.tw".to_string() }
fn default_jpeg_quality() -> u8 { 5 }
fn default_industry_analysis_path() -> String { "industry_analysis.json".to_string() }
fn default_industry_news_path() -> String { "industry_news.json".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            root: default_artifact_root(),
            url_prefix: default_url_prefix(),
            public_base_url: default_public_base_url(),
            cleanup_delay_secs: default_cleanup_delay(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            commodity_series_url: default_commodity_series_url(),
            commodity_quote_url: default_commodity_quote_url(),
            commodity_quote_table_index: default_quote_table_index(),
            stock_day_all_url: default_stock_day_all_url(),
            news_url: default_news_url(),
            news_referer: default_news_referer(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
            font_path: None,
        }
    }
}

impl Default for IndustryConfig {
    fn default() -> Self {
        Self {
            analysis_path: default_industry_analysis_path(),
            news_path: default_industry_news_path(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl ArtifactConfig {
    pub fn cleanup_delay(&self) -> Duration {
        Duration::from_secs(self.cleanup_delay_secs)
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先 `FINBOT_CONFIG` 指定的文件，其次默认路径，失败则使用默认值
    ///
    /// 此时日志尚未初始化（日志级别来自配置），加载过程记录在 `ConfigLoad` 中，
    /// 由调用方在初始化日志后输出
    pub fn load() -> ConfigLoad {
        let mut config_paths = vec!["config.json".to_string(), "config/config.json".to_string()];
        if let Ok(path) = std::env::var("FINBOT_CONFIG") {
            config_paths.insert(0, path);
        }
        Self::load_from(&config_paths)
    }

    /// 依序尝试候选路径，第一个能解析的文件生效
    pub fn load_from(config_paths: &[String]) -> ConfigLoad {
        let mut failures = Vec::new();

        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        return ConfigLoad {
                            config,
                            source: Some(path.clone()),
                            failures,
                        };
                    }
                    Err(e) => failures.push(format!("加载配置文件 {} 失败: {}", path, e)),
                }
            }
        }

        ConfigLoad {
            config: Self::default(),
            source: None,
            failures,
        }
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// 配置加载结果
#[derive(Debug)]
pub struct ConfigLoad {
    pub config: AppConfig,
    /// 生效的配置文件，`None` 表示使用默认值
    pub source: Option<String>,
    /// 存在但无法解析的配置文件
    pub failures: Vec<String>,
}

impl ConfigLoad {
    /// 输出加载过程，需在日志初始化之后调用
    pub fn log_summary(&self) {
        for failure in &self.failures {
            log::warn!("{}", failure);
        }
        match &self.source {
            Some(path) => log::info!("从 {} 加载配置成功", path),
            None => log::info!("使用默认配置"),
        }
    }
}
