//! 产业分析 / 产业新闻文本
//!
//! 两份 JSON 文件，内容均为 `产业名称 -> 文本`，启动时载入一次

use crate::errors::Result;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct IndustryCatalog {
    analysis: HashMap<String, String>,
    news: HashMap<String, String>,
}

impl IndustryCatalog {
    pub fn new(analysis: HashMap<String, String>, news: HashMap<String, String>) -> Self {
        Self { analysis, news }
    }

    /// 载入两份文件；文件不存在时该部分为空
    pub fn load(analysis_path: impl AsRef<Path>, news_path: impl AsRef<Path>) -> Result<Self> {
        let analysis = load_entries(analysis_path.as_ref())?;
        let news = load_entries(news_path.as_ref())?;
        log::info!(
            "产业资料载入完成：分析 {} 项，新闻 {} 项",
            analysis.len(),
            news.len()
        );
        Ok(Self { analysis, news })
    }

    pub fn analysis(&self, industry: &str) -> Option<&str> {
        self.analysis.get(industry.trim()).map(String::as_str)
    }

    pub fn news(&self, industry: &str) -> Option<&str> {
        self.news.get(industry.trim()).map(String::as_str)
    }
}

fn load_entries(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        log::warn!("产业资料文件 {} 不存在，使用空表", path.display());
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
