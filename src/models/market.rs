//! 行情数据模型
//!
//! 定义原物料走势、原物料报价、个股日成交资料等数据结构

use serde::{Deserialize, Serialize};

/// 走势序列中的单个数据点
///
/// 价格与两条均线来自同一行，天然共享日期轴
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    /// 日期（保持上游原样）
    pub date: String,
    /// 价格
    pub price: f64,
    /// 20 期均线
    pub ma20: f64,
    /// 60 期均线
    pub ma60: f64,
}

/// 原物料走势序列
///
/// 点按上游顺序排列（旧 -> 新），表头行不计入 `points`
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CommoditySeries {
    /// 原物料代码（如 COMMGOLD）
    pub code: String,
    /// 表头行的栏位名称（如 Date, Price, MA20, MA60）
    pub header: Vec<String>,
    /// 数据点
    pub points: Vec<TimeSeriesPoint>,
}

impl CommoditySeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 数值栏位名称，表头缺失时使用默认名称
    pub fn value_labels(&self) -> [String; 3] {
        let fallback = ["Price", "MA20", "MA60"];
        std::array::from_fn(|i| {
            self.header
                .get(i + 1)
                .filter(|s| !s.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| fallback[i].to_string())
        })
    }
}

/// 原物料最新报价
///
/// 生命周期只在单次请求内，不做保存
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MarketQuote {
    /// 显示名称（如 黃金）
    pub symbol: String,
    /// 最新价格
    pub price: f64,
    /// 涨跌
    pub change: f64,
    /// 涨跌幅（百分比）
    pub change_percent: f64,
    /// 报价时间（保持上游原样）
    pub timestamp: String,
}

/// 个股当日成交资料
///
/// 数值栏位保留证交所原始格式（含千分位、正负号），直接用于回复文字
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StockDailyRecord {
    /// 证券代号
    pub code: String,
    /// 证券名称
    pub name: String,
    /// 成交股数
    pub volume: String,
    /// 成交金额
    pub amount: String,
    /// 开盘价
    pub open: String,
    /// 最高价
    pub high: String,
    /// 最低价
    pub low: String,
    /// 收盘价
    pub close: String,
    /// 涨跌价差
    pub price_change: String,
    /// 成交笔数
    pub transaction_count: String,
}

impl StockDailyRecord {
    /// 除代号外的 9 个栏位及其中文名称，顺序与证交所一致
    pub fn labelled_fields(&self) -> [(&'static str, &str); 9] {
        [
            ("證券名稱", &self.name),
            ("成交股數", &self.volume),
            ("成交金額", &self.amount),
            ("開盤價", &self.open),
            ("最高價", &self.high),
            ("最低價", &self.low),
            ("收盤價", &self.close),
            ("漲跌價差", &self.price_change),
            ("成交筆數", &self.transaction_count),
        ]
    }
}
