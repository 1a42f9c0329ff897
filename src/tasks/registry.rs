//! 任务列表视图
//!
//! 客户端对服务端任务的只读投影：真实状态永远以服务端为准，本地从不
//! 乐观插入、从不自行迁移状态。刷新走「领票 - 应用」两步，过期的列表
//! 响应整体丢弃，避免后发先至覆盖新数据。

use crate::gateway::api::{TaskStatus, TaskSummary};

/// 已知任务的注册表（列表视图）
pub struct TaskRegistry {
    tasks: Vec<TaskSummary>,
    /// 刷新的单调票号：已发出 / 已应用
    issued_refreshes: u64,
    applied_refresh: u64,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            issued_refreshes: 0,
            applied_refresh: 0,
        }
    }

    /// 当前列表视图（服务端返回顺序）
    pub fn tasks(&self) -> &[TaskSummary] {
        &self.tasks
    }

    pub fn get(&self, task_id: &str) -> Option<&TaskSummary> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }

    /// 根据最近一次观察到的状态判断能否取消（Pending / Running）
    pub fn is_cancellable(&self, task_id: &str) -> bool {
        self.get(task_id)
            .map(|t| matches!(t.status, TaskStatus::Pending | TaskStatus::Running))
            .unwrap_or(false)
    }

    /// 发起一次刷新，领取单调递增的票号
    pub fn begin_refresh(&mut self) -> u64 {
        self.issued_refreshes += 1;
        self.issued_refreshes
    }

    /// 应用一次列表响应，整体替换视图
    ///
    /// 票号不高于已应用票号的响应视为过期，丢弃并返回 false。
    /// 已完成任务的进度归一为 100（不变量：Completed ⇒ progress = 100）。
    pub fn apply_list(&mut self, ticket: u64, mut tasks: Vec<TaskSummary>) -> bool {
        if ticket <= self.applied_refresh {
            tracing::debug!(ticket, applied = self.applied_refresh, "Stale task list discarded");
            return false;
        }
        self.applied_refresh = ticket;

        for task in &mut tasks {
            if task.status == TaskStatus::Completed {
                task.progress = 100;
            }
        }

        self.tasks = tasks;
        true
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::api::TaskKind;
    use chrono::NaiveDate;

    fn summary(id: &str, status: TaskStatus, progress: u8) -> TaskSummary {
        TaskSummary {
            task_id: id.to_string(),
            task_type: TaskKind::BatchStocks,
            status,
            symbols_count: Some(3),
            progress,
            created_at: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            completed_at: None,
        }
    }

    #[test]
    fn cancellable_only_for_pending_and_running() {
        let mut registry = TaskRegistry::new();
        let ticket = registry.begin_refresh();
        registry.apply_list(
            ticket,
            vec![
                summary("t1", TaskStatus::Pending, 0),
                summary("t2", TaskStatus::Running, 40),
                summary("t3", TaskStatus::Completed, 100),
                summary("t4", TaskStatus::Failed, 0),
                summary("t5", TaskStatus::Cancelled, 0),
            ],
        );

        assert!(registry.is_cancellable("t1"));
        assert!(registry.is_cancellable("t2"));
        assert!(!registry.is_cancellable("t3"));
        assert!(!registry.is_cancellable("t4"));
        assert!(!registry.is_cancellable("t5"));
        assert!(!registry.is_cancellable("unknown"));
    }

    #[test]
    fn completed_tasks_report_full_progress() {
        let mut registry = TaskRegistry::new();
        let ticket = registry.begin_refresh();
        registry.apply_list(ticket, vec![summary("t1", TaskStatus::Completed, 90)]);
        assert_eq!(registry.get("t1").unwrap().progress, 100);
    }

    #[test]
    fn stale_list_response_is_discarded() {
        let mut registry = TaskRegistry::new();
        let old = registry.begin_refresh();
        let new = registry.begin_refresh();

        assert!(registry.apply_list(new, vec![summary("t2", TaskStatus::Running, 50)]));
        assert!(!registry.apply_list(old, vec![summary("t1", TaskStatus::Pending, 0)]));

        assert_eq!(registry.tasks().len(), 1);
        assert_eq!(registry.tasks()[0].task_id, "t2");
    }
}
