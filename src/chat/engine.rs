//! 会话引擎：乐观追加与历史回放的编排
//!
//! submit 的两阶段约定：phase 1 同步追加用户消息（乐观插入），phase 2
//! 在响应到达后追加其配对的 AI 消息 —— 成功时由响应构建，失败时为固定
//! 兜底回复。两个阶段都只追加，从不回撤或修改 phase 1 的条目，因此无论
//! 成败，一次 submit 后日志恰好增长两条，顺序为 [用户, AI 或错误]。
//!
//! 注意：引擎本身不阻止背靠背的两次 submit；「请求未返回时禁用输入」
//! 是调用方的 UI 约定，不是这里强制的不变量。

use std::sync::Arc;

use crate::chat::message::Message;
use crate::chat::session::SessionStore;
use crate::config::ChatSection;
use crate::error::ClientError;
use crate::gateway::RemoteGateway;

/// 会话引擎：持有会话日志与网关句柄
pub struct ConversationEngine {
    gateway: Arc<dyn RemoteGateway>,
    store: SessionStore,
    history_limit: usize,
}

impl ConversationEngine {
    pub fn new(gateway: Arc<dyn RemoteGateway>, chat: &ChatSection) -> Self {
        Self {
            gateway,
            store: SessionStore::new(),
            history_limit: chat.history_limit,
        }
    }

    /// 当前会话 id
    pub fn session_id(&self) -> &str {
        &self.store.session().id
    }

    /// 只读日志视图（视觉顺序 = 日志顺序）
    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    /// 欢迎消息上的建议提问（点选只应填充输入框，由调用方处理）
    pub fn welcome_suggestions(&self) -> &[String] {
        self.store
            .messages()
            .iter()
            .find(|m| m.id == "welcome")
            .map(|m| m.suggestions.as_slice())
            .unwrap_or(&[])
    }

    /// 提交一次查询
    ///
    /// 空白输入返回 Validation，不发请求也不动日志。其余情况下日志
    /// 必定增长两条；Transport/Service 错误在追加兜底回复后仍返回给
    /// 调用方，用于一次性提示。
    pub async fn submit(&mut self, text: &str) -> Result<(), ClientError> {
        if text.trim().is_empty() {
            return Err(ClientError::Validation("query text is empty".to_string()));
        }

        // phase 1：乐观追加用户消息
        self.store.append(Message::user(text));

        let session_id = self.store.session().id.clone();
        match self.gateway.submit_query(text, &session_id).await {
            Ok(answer) => {
                tracing::info!(session = %session_id, "Query answered");
                self.store.append(Message::from_answer(&answer));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(session = %session_id, error = %e, "Query failed, appending fallback reply");
                self.store.append(Message::error_reply());
                Err(e)
            }
        }
    }

    /// 加载持久化历史并前插到当前日志
    ///
    /// 按记录 id 去重，重复加载同一批数据不会产生重复条目。
    /// 返回实际前插的消息条数。
    pub async fn load_history(&mut self) -> Result<usize, ClientError> {
        let ticket = self.store.begin_history_load();
        let session_id = self.store.session().id.clone();

        let records = self
            .gateway
            .fetch_history(&session_id, self.history_limit)
            .await?;

        let count = self.store.apply_history(ticket, &records);
        tracing::info!(session = %session_id, prepended = count, "History loaded");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::message::{MessageKind, APOLOGY_TEXT};
    use crate::gateway::api::QueryAnswer;
    use crate::gateway::MockGateway;

    fn engine_with(gateway: Arc<MockGateway>) -> ConversationEngine {
        ConversationEngine::new(gateway, &ChatSection::default())
    }

    #[tokio::test]
    async fn submit_success_appends_user_then_ai() {
        let gateway = Arc::new(MockGateway::new());
        let mut engine = engine_with(gateway.clone());
        let before = engine.messages().len();

        engine.submit("分析苹果公司的股票").await.unwrap();

        let log = engine.messages();
        assert_eq!(log.len(), before + 2);
        assert_eq!(log[before].kind, MessageKind::User);
        assert_eq!(log[before + 1].kind, MessageKind::Ai);
        assert!(!log[before + 1].is_error);
    }

    #[tokio::test]
    async fn submit_failure_still_pairs_with_error_reply() {
        let gateway = Arc::new(MockGateway::new());
        gateway.enqueue_query(Err(ClientError::Transport("connection refused".to_string())));
        let mut engine = engine_with(gateway.clone());
        let before = engine.messages().len();

        let err = engine.submit("推荐一些科技股").await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));

        let log = engine.messages();
        assert_eq!(log.len(), before + 2);
        assert_eq!(log[before].kind, MessageKind::User);
        assert!(log[before + 1].is_error);
        assert_eq!(log[before + 1].content, APOLOGY_TEXT);
    }

    #[tokio::test]
    async fn blank_submit_is_rejected_without_network_call() {
        let gateway = Arc::new(MockGateway::new());
        let mut engine = engine_with(gateway.clone());
        let before = engine.messages().len();

        let err = engine.submit("   ").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(engine.messages().len(), before);
        assert!(gateway.recorded_calls().is_empty());
    }

    #[tokio::test]
    async fn answer_without_recommendations_is_plain_reply() {
        let gateway = Arc::new(MockGateway::new());
        gateway.enqueue_query(Ok(QueryAnswer {
            session_id: None,
            answer: "苹果公司近期走势平稳".to_string(),
            response: Some(Default::default()),
            context_symbols: None,
        }));
        let mut engine = engine_with(gateway);

        engine.submit("分析苹果公司的股票").await.unwrap();

        let last = engine.messages().last().unwrap();
        assert!(!last.is_error);
        assert!(last.recommendations.is_empty());
    }
}
