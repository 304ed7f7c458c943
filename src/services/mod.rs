//! 业务逻辑服务模块
//!
//! 封装上游抓取、绘图、临时目录与机器人回复

pub mod artifact; // 临时图片目录
pub mod bot;      // 机器人回复分派
pub mod http;     // 上游 HTTP 客户端
pub mod industry; // 产业资料
pub mod market;   // 行情抓取
pub mod news;     // 公司新闻
pub mod render;   // 图表绘制
