//! 聊天机器人请求/回复模型
//!
//! 路由层把使用者讯息解析成 `BotRequest` 后再交给核心处理，
//! 核心返回有序的文字/图片讯息列表

use serde::{Deserialize, Serialize};

/// 已解析的查询请求，标识符已由路由层对照静态表转换完毕
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BotRequest {
    /// 原物料价格走势图 + 最新十笔表格
    SeriesChart { code: String },
    /// 原物料最新价格
    LatestQuote { name: String },
    /// 个股当日行情
    StockQuote { code: String },
    /// 公司新闻
    CompanyNews { stock_id: String },
    /// 产业分析
    IndustryAnalysis { industry: String },
    /// 产业新闻
    IndustryNews { industry: String },
}

/// 单则回复讯息
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplyMessage {
    Text { text: String },
    /// 图片需在清理时限内被取走
    Image { url: String },
}

/// 回复内容
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct BotReply {
    pub messages: Vec<ReplyMessage>,
}

impl BotReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            messages: vec![ReplyMessage::Text { text: text.into() }],
        }
    }

    pub fn images(urls: Vec<String>) -> Self {
        Self {
            messages: urls.into_iter().map(|url| ReplyMessage::Image { url }).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_request_tagged_json() {
        println!("\n========== 测试请求 JSON 格式 ==========");
        let req: BotRequest =
            serde_json::from_str(r#"{"kind": "series_chart", "code": "COMMGOLD"}"#).unwrap();
        assert_eq!(req, BotRequest::SeriesChart { code: "COMMGOLD".to_string() });

        let req: BotRequest =
            serde_json::from_str(r#"{"kind": "company_news", "stock_id": "2330"}"#).unwrap();
        assert_eq!(req, BotRequest::CompanyNews { stock_id: "2330".to_string() });

        assert!(serde_json::from_str::<BotRequest>(r#"{"kind": "weather"}"#).is_err());
        println!("✅ 请求 JSON 格式测试通过！");
    }

    #[test]
    fn test_reply_serialization() {
        let reply = BotReply::images(vec!["http://host/static/1/plot.jpg".to_string()]);
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["messages"][0]["type"], "image");
        assert_eq!(json["messages"][0]["url"], "http://host/static/1/plot.jpg");
    }
}
