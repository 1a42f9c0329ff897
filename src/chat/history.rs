//! 历史合并（纯函数）
//!
//! 把服务端持久化的历史记录展开为 [用户, AI] 消息对，按原始创建时间升序
//! 组成前插块，并按记录 id 去重：已出现在当前日志中的记录不会再次插入。
//! 因此对同一批数据重复合并是幂等的。

use std::collections::HashSet;

use crate::chat::message::Message;
use crate::gateway::api::HistoryRecord;

/// 当前日志中已有的历史记录 id 集合
pub fn known_history_ids(current: &[Message]) -> HashSet<i64> {
    current.iter().filter_map(|m| m.history_id).collect()
}

/// 构建去重后的前插块（每条记录两条消息，升序）
///
/// 服务端按创建时间倒序返回，这里先升序排序再展开，保证块内
/// 视觉顺序与原始发生顺序一致。时间相同时按记录 id 升序。
pub fn prepend_block(current: &[Message], records: &[HistoryRecord]) -> Vec<Message> {
    let known = known_history_ids(current);

    let mut ordered: Vec<&HistoryRecord> =
        records.iter().filter(|r| !known.contains(&r.id)).collect();
    ordered.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut block = Vec::with_capacity(ordered.len() * 2);
    let mut seen = HashSet::new();
    for record in ordered {
        // 服务端单次返回中的重复记录也只展开一次
        if !seen.insert(record.id) {
            continue;
        }
        block.push(Message::history_user(record));
        block.push(Message::history_ai(record));
    }
    block
}

/// 合并：`[去重后的前插块, 当前日志]`
pub fn merge(current: &[Message], records: &[HistoryRecord]) -> Vec<Message> {
    let mut merged = prepend_block(current, records);
    merged.extend_from_slice(current);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::api::HistoryRecord;
    use chrono::NaiveDate;

    fn record(id: i64, minute: u32) -> HistoryRecord {
        HistoryRecord {
            id,
            message: format!("问题 {}", id),
            response: None,
            created_at: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(9, minute, 0)
                .unwrap(),
        }
    }

    #[test]
    fn expands_two_messages_per_record_in_creation_order() {
        // 服务端倒序返回
        let records = vec![record(2, 10), record(1, 5)];
        let merged = merge(&[], &records);
        let ids: Vec<&str> = merged.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["user_1", "ai_1", "user_2", "ai_2"]);
    }

    #[test]
    fn merge_is_idempotent_by_history_id_set() {
        let records = vec![record(1, 5), record(2, 10)];
        let once = merge(&[Message::welcome()], &records);
        let twice = merge(&once, &records);
        assert_eq!(known_history_ids(&once), known_history_ids(&twice));
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn only_new_records_are_prepended() {
        let first = merge(&[], &[record(1, 5)]);
        let merged = merge(&first, &[record(1, 5), record(2, 10)]);
        assert_eq!(merged.len(), 4);
        // 新记录插在已有历史之前，旧日志整体不动
        assert_eq!(merged[0].id, "user_2");
        assert_eq!(merged[2].id, "user_1");
    }

    #[test]
    fn duplicate_ids_within_one_response_expand_once() {
        let merged = merge(&[], &[record(1, 5), record(1, 5)]);
        assert_eq!(merged.len(), 2);
    }
}
