//! 新闻数据模型

use serde::{Deserialize, Serialize};

/// 单则新闻标题与链接
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewsItem {
    pub title: String,
    /// 绝对地址
    pub url: String,
}
