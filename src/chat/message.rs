//! 会话消息模型
//!
//! 消息日志的条目类型与固定文案（欢迎语、建议提问、错误兜底）。
//! 日志只增不改：任何一条消息一旦进入日志便不再被修改或删除。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gateway::api::{HistoryRecord, QueryAnswer, RecommendationItem, ResponsePayload};

/// 欢迎语正文
pub const WELCOME_TEXT: &str =
    "您好！我是AI股票分析助手。您可以询问我关于股票分析、投资建议、市场趋势等问题。";

/// 欢迎消息附带的建议提问（仅出现在欢迎消息上）
pub const WELCOME_SUGGESTIONS: [&str; 4] = [
    "分析苹果公司的股票",
    "推荐一些科技股",
    "当前市场趋势如何？",
    "什么是技术分析？",
];

/// 请求失败时的固定兜底回复
pub const APOLOGY_TEXT: &str = "抱歉，我暂时无法回答您的问题。请稍后再试。";

/// 历史记录缺少回答正文时的占位文案
pub const HISTORY_NO_ANSWER: &str = "无响应内容";

/// 消息方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// 用户输入
    User,
    /// AI 回复（含欢迎语与错误兜底）
    Ai,
}

/// 单条投资建议（渲染态，缺失字段已按原始客户端兜底）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub symbol: String,
    pub rationale: String,
    pub action: String,
}

impl From<&RecommendationItem> for Recommendation {
    fn from(item: &RecommendationItem) -> Self {
        Self {
            symbol: item.symbol.clone().unwrap_or_else(|| "推荐".to_string()),
            rationale: item.rationale.clone().unwrap_or_default(),
            action: item.action.clone().unwrap_or_else(|| "推荐买入".to_string()),
        }
    }
}

/// 会话日志条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// 消息 ID（历史消息为 `user_{记录id}` / `ai_{记录id}`）
    pub id: String,
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// 分析内容（不透明负载）
    #[serde(default)]
    pub analysis: Option<serde_json::Value>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    /// 图表数据引用（不透明负载，渲染端消费）
    #[serde(default)]
    pub chart: Option<serde_json::Value>,
    #[serde(default)]
    pub reference_urls: Vec<String>,
    #[serde(default)]
    pub context_symbols: Vec<String>,
    /// 建议提问（仅欢迎消息携带；点选只填充输入框，不自动发送）
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub is_error: bool,
    /// 来源持久化记录的 id（仅历史消息携带，用于去重）
    #[serde(default)]
    pub history_id: Option<i64>,
}

impl Message {
    fn blank(id: String, kind: MessageKind, content: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            kind,
            content,
            timestamp,
            analysis: None,
            recommendations: Vec::new(),
            chart: None,
            reference_urls: Vec::new(),
            context_symbols: Vec::new(),
            suggestions: Vec::new(),
            is_error: false,
            history_id: None,
        }
    }

    /// 系统生成的欢迎消息（带建议提问）
    pub fn welcome() -> Self {
        let mut msg = Self::blank(
            "welcome".to_string(),
            MessageKind::Ai,
            WELCOME_TEXT.to_string(),
            Utc::now(),
        );
        msg.suggestions = WELCOME_SUGGESTIONS.iter().map(|s| s.to_string()).collect();
        msg
    }

    /// 用户消息（乐观插入，phase 1）
    pub fn user(content: impl Into<String>) -> Self {
        Self::blank(
            uuid::Uuid::new_v4().to_string(),
            MessageKind::User,
            content.into(),
            Utc::now(),
        )
    }

    /// 由查询响应构建的 AI 消息（phase 2，成功分支）
    pub fn from_answer(answer: &QueryAnswer) -> Self {
        let mut msg = Self::blank(
            uuid::Uuid::new_v4().to_string(),
            MessageKind::Ai,
            answer.answer.clone(),
            Utc::now(),
        );
        if let Some(payload) = &answer.response {
            msg.apply_payload(payload);
        }
        if let Some(symbols) = &answer.context_symbols {
            msg.context_symbols = symbols.clone();
        }
        msg
    }

    /// 请求失败时的配对错误回复（phase 2，失败分支）
    pub fn error_reply() -> Self {
        let mut msg = Self::blank(
            uuid::Uuid::new_v4().to_string(),
            MessageKind::Ai,
            APOLOGY_TEXT.to_string(),
            Utc::now(),
        );
        msg.is_error = true;
        msg
    }

    /// 历史记录展开：用户侧
    pub fn history_user(record: &HistoryRecord) -> Self {
        let mut msg = Self::blank(
            format!("user_{}", record.id),
            MessageKind::User,
            record.message.clone(),
            record.created_at.and_utc(),
        );
        msg.history_id = Some(record.id);
        msg
    }

    /// 历史记录展开：AI 侧
    ///
    /// 服务端持久化的是响应负载而非回答正文，answer 缺失时用占位文案。
    pub fn history_ai(record: &HistoryRecord) -> Self {
        let content = record
            .response
            .as_ref()
            .and_then(|p| p.answer.clone())
            .unwrap_or_else(|| HISTORY_NO_ANSWER.to_string());

        let mut msg = Self::blank(
            format!("ai_{}", record.id),
            MessageKind::Ai,
            content,
            record.created_at.and_utc(),
        );
        if let Some(payload) = &record.response {
            msg.apply_payload(payload);
        }
        msg.history_id = Some(record.id);
        msg
    }

    fn apply_payload(&mut self, payload: &ResponsePayload) {
        self.analysis = payload.analysis.clone();
        self.chart = payload.chart_data.clone();
        if let Some(items) = &payload.recommendations {
            self.recommendations = items.iter().map(Recommendation::from).collect();
        }
        if let Some(urls) = &payload.reference_urls {
            self.reference_urls = urls.clone();
        }
    }

    /// 是否来自持久化历史
    pub fn is_history(&self) -> bool {
        self.history_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: i64) -> HistoryRecord {
        HistoryRecord {
            id,
            message: format!("问题 {}", id),
            response: None,
            created_at: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        }
    }

    #[test]
    fn welcome_carries_suggestions() {
        let msg = Message::welcome();
        assert_eq!(msg.kind, MessageKind::Ai);
        assert_eq!(msg.suggestions.len(), 4);
        assert!(!msg.is_error);
    }

    #[test]
    fn error_reply_is_fixed_apology() {
        let msg = Message::error_reply();
        assert!(msg.is_error);
        assert_eq!(msg.content, APOLOGY_TEXT);
    }

    #[test]
    fn history_pair_shares_record_id() {
        let rec = record(42);
        let user = Message::history_user(&rec);
        let ai = Message::history_ai(&rec);
        assert_eq!(user.id, "user_42");
        assert_eq!(ai.id, "ai_42");
        assert_eq!(user.history_id, Some(42));
        assert_eq!(ai.history_id, Some(42));
        assert_eq!(ai.content, HISTORY_NO_ANSWER);
    }

    #[test]
    fn from_answer_without_recommendations_is_not_error() {
        let answer = QueryAnswer {
            session_id: None,
            answer: "苹果公司基本面稳健".to_string(),
            response: Some(ResponsePayload::default()),
            context_symbols: Some(vec!["AAPL".to_string()]),
        };
        let msg = Message::from_answer(&answer);
        assert!(!msg.is_error);
        assert!(msg.recommendations.is_empty());
        assert_eq!(msg.context_symbols, vec!["AAPL".to_string()]);
    }

    #[test]
    fn recommendation_fallbacks_match_renderer() {
        let item = RecommendationItem {
            symbol: None,
            rationale: None,
            action: None,
        };
        let rec = Recommendation::from(&item);
        assert_eq!(rec.symbol, "推荐");
        assert_eq!(rec.action, "推荐买入");
        assert!(rec.rationale.is_empty());
    }
}
