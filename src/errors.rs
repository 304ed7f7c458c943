//! 错误类型
//!
//! 抓取、解析、绘图统一使用 `ScrapeError`。
//! "查无此代码" 这类可预期的缺失不是错误，由各抓取器以 `Ok(None)` 表示。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("上游请求失败: {0}")]
    Request(#[from] reqwest::Error),

    #[error("上游返回异常状态: {0}")]
    Status(reqwest::StatusCode),

    #[error("JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),

    /// 上游格式与预期不符（表格结构变化、行字段缺失等）
    #[error("数据格式异常: {0}")]
    Parse(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("绘图失败: {0}")]
    Render(String),

    #[error("数据序列为空，无法绘图")]
    EmptySeries,
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

impl ScrapeError {
    pub fn parse(msg: impl Into<String>) -> Self {
        ScrapeError::Parse(msg.into())
    }

    /// 是否为上游不可用（网络失败或非 2xx）
    pub fn is_upstream(&self) -> bool {
        matches!(self, ScrapeError::Request(_) | ScrapeError::Status(_))
    }
}

/// 将绘图库的错误统一转换为 `ScrapeError::Render`
pub fn render_err<E: std::fmt::Display>(e: E) -> ScrapeError {
    ScrapeError::Render(e.to_string())
}
