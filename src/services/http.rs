//! 上游 HTTP 客户端
//!
//! 所有抓取器共用同一个 reqwest 客户端：统一超时、gzip 与浏览器 User-Agent

use crate::config::HttpConfig;
use crate::errors::{Result, ScrapeError};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.as_str())
            .gzip(true)
            .build()?;
        Ok(Self { client })
    }

    /// GET 文本内容，按 Content-Type 声明的字符集解码
    pub async fn get_text(&self, url: &str, headers: &[(&str, &str)]) -> Result<String> {
        log::debug!("📡 请求 URL: {}", url);

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            log::warn!("上游 {} 返回状态 {}", url, response.status());
            return Err(ScrapeError::Status(response.status()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        Ok(decode_body(&bytes, content_type.as_deref()))
    }
}

/// 依 Content-Type 中的 charset 解码，未声明或无法识别时按 UTF-8 处理
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_label)
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
        .unwrap_or(encoding_rs::UTF_8);

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        log::debug!("以 {} 解码时存在无效字节", encoding.name());
    }
    text.into_owned()
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
}
