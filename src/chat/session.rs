//! 会话身份与消息日志
//!
//! Session 随引擎创建一次，进程内不持久化。SessionStore 以归约器风格
//! 持有有序消息日志：只允许追加与前插，不允许原地修改或删除；
//! 历史加载走「领票 - 应用」两步，过期响应直接丢弃。

use chrono::{DateTime, Utc};

use crate::chat::history;
use crate::chat::message::Message;
use crate::gateway::api::HistoryRecord;

/// 会话身份（不透明 id，视图激活时生成一次）
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: format!("session_{}", uuid::Uuid::new_v4()),
            created_at: Utc::now(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// 会话状态容器：身份 + 有序消息日志
///
/// 日志初始含一条欢迎消息（携带建议提问）。
pub struct SessionStore {
    session: Session,
    log: Vec<Message>,
    /// 历史加载的单调票号：已发出 / 已应用
    issued_loads: u64,
    applied_load: u64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            session: Session::new(),
            log: vec![Message::welcome()],
            issued_loads: 0,
            applied_load: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn messages(&self) -> &[Message] {
        &self.log
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// 追加一条消息到日志末尾
    pub fn append(&mut self, message: Message) {
        self.log.push(message);
    }

    /// 发起一次历史加载，领取单调递增的票号
    pub fn begin_history_load(&mut self) -> u64 {
        self.issued_loads += 1;
        self.issued_loads
    }

    /// 应用历史加载结果：去重后的消息对整体前插到日志最前
    ///
    /// 票号不高于已应用票号的响应视为过期，丢弃并返回 0。
    /// 返回实际前插的消息条数。
    pub fn apply_history(&mut self, ticket: u64, records: &[HistoryRecord]) -> usize {
        if ticket <= self.applied_load {
            tracing::debug!(ticket, applied = self.applied_load, "Stale history response discarded");
            return 0;
        }
        self.applied_load = ticket;

        let block = history::prepend_block(&self.log, records);
        let count = block.len();
        if count > 0 {
            self.log.splice(0..0, block);
        }
        count
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
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
                .and_hms_opt(9, id as u32 % 60, 0)
                .unwrap(),
        }
    }

    #[test]
    fn new_store_starts_with_welcome_only() {
        let store = SessionStore::new();
        assert_eq!(store.len(), 1);
        assert_eq!(store.messages()[0].id, "welcome");
        assert!(store.session().id.starts_with("session_"));
    }

    #[test]
    fn apply_history_prepends_before_welcome() {
        let mut store = SessionStore::new();
        let ticket = store.begin_history_load();
        let count = store.apply_history(ticket, &[record(1)]);
        assert_eq!(count, 2);
        assert_eq!(store.messages()[0].id, "user_1");
        assert_eq!(store.messages()[2].id, "welcome");
    }

    #[test]
    fn stale_ticket_is_discarded() {
        let mut store = SessionStore::new();
        let old = store.begin_history_load();
        let new = store.begin_history_load();

        // 新票先到并应用
        assert_eq!(store.apply_history(new, &[record(1)]), 2);
        // 旧票后到，整体丢弃
        assert_eq!(store.apply_history(old, &[record(2)]), 0);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn repeated_apply_with_same_data_is_idempotent() {
        let mut store = SessionStore::new();
        let t1 = store.begin_history_load();
        store.apply_history(t1, &[record(1), record(2)]);
        let len = store.len();

        let t2 = store.begin_history_load();
        assert_eq!(store.apply_history(t2, &[record(1), record(2)]), 0);
        assert_eq!(store.len(), len);
    }
}
