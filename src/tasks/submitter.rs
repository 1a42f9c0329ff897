//! 任务提交与生命周期操作
//!
//! 创建 / 取消都遵循「服务端为唯一事实来源」：成功后触发整表刷新，
//! 从不依赖本地推断的状态变化。取消与任务完成赛跑时，最终以刷新
//! 拿到的服务端状态为准。

use std::sync::Arc;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::TasksSection;
use crate::error::ClientError;
use crate::gateway::api::{AnalysisKind, BatchAnalysisRequest, TaskDetail, TaskPriority};
use crate::gateway::RemoteGateway;
use crate::tasks::registry::TaskRegistry;

static SYMBOL_SPLIT_RE: OnceLock<Regex> = OnceLock::new();

/// 把自由文本切分为股票代码列表
///
/// 逗号 / 空白 / 换行的任意组合都是分隔符；空片段丢弃；
/// 重复代码原样保留（"AAPL AAPL" 得到两个条目）。
/// 切分结果为空时返回 Validation。
pub fn parse_symbols(raw: &str) -> Result<Vec<String>, ClientError> {
    let re = SYMBOL_SPLIT_RE.get_or_init(|| Regex::new(r"[,\s]+").unwrap());

    let symbols: Vec<String> = re
        .split(raw)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if symbols.is_empty() {
        return Err(ClientError::Validation(
            "no stock symbols provided".to_string(),
        ));
    }
    Ok(symbols)
}

/// 任务提交器：校验并组装创建请求，维护注册表视图
pub struct TaskSubmitter {
    gateway: Arc<dyn RemoteGateway>,
    registry: TaskRegistry,
    list_limit: usize,
    max_batch_symbols: usize,
}

impl TaskSubmitter {
    pub fn new(gateway: Arc<dyn RemoteGateway>, tasks: &TasksSection) -> Self {
        Self {
            gateway,
            registry: TaskRegistry::new(),
            list_limit: tasks.list_limit,
            max_batch_symbols: tasks.max_batch_symbols,
        }
    }

    /// 注册表只读视图
    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// 整表刷新，返回当前视图条数
    ///
    /// 失败时注册表保持原样。
    pub async fn refresh(&mut self) -> Result<usize, ClientError> {
        let ticket = self.registry.begin_refresh();
        let tasks = self.gateway.list_tasks(self.list_limit).await?;
        self.registry.apply_list(ticket, tasks);
        Ok(self.registry.tasks().len())
    }

    /// 创建批量分析任务，成功后整表刷新
    ///
    /// 校验失败（空代码列表、超过上限、未选分析类型）不发任何请求。
    /// 返回服务端分配的 task_id。
    pub async fn create_batch_analysis(
        &mut self,
        raw_symbols: &str,
        analysis_types: &[AnalysisKind],
        priority: TaskPriority,
    ) -> Result<String, ClientError> {
        let symbols = parse_symbols(raw_symbols)?;
        if symbols.len() > self.max_batch_symbols {
            return Err(ClientError::Validation(format!(
                "too many symbols: {} (max {})",
                symbols.len(),
                self.max_batch_symbols
            )));
        }
        if analysis_types.is_empty() {
            return Err(ClientError::Validation(
                "no analysis types selected".to_string(),
            ));
        }

        let request = BatchAnalysisRequest {
            symbols,
            analysis_types: analysis_types.to_vec(),
            priority,
        };
        let created = self.gateway.create_batch_analysis(&request).await?;
        tracing::info!(task_id = %created.task_id, "Batch analysis task created");

        self.refresh().await?;
        Ok(created.task_id)
    }

    /// 创建市场扫描任务（无参数），成功后整表刷新
    pub async fn create_market_scan(&mut self) -> Result<String, ClientError> {
        let created = self.gateway.create_market_scan().await?;
        tracing::info!(task_id = %created.task_id, "Market scan task created");

        self.refresh().await?;
        Ok(created.task_id)
    }

    /// 请求取消任务
    ///
    /// 仅当本地视图中状态为 Pending/Running 时才发出请求，否则是
    /// 客户端空操作（返回 Ok(false)）。成功发出后整表刷新而非本地
    /// 置为 Cancelled —— 取消可能与任务完成赛跑。
    pub async fn cancel(&mut self, task_id: &str) -> Result<bool, ClientError> {
        if !self.registry.is_cancellable(task_id) {
            tracing::debug!(task_id, "Cancel skipped: task not in a cancellable state");
            return Ok(false);
        }

        self.gateway.cancel_task(task_id).await?;
        tracing::info!(task_id, "Cancel requested");

        self.refresh().await?;
        Ok(true)
    }

    /// 拉取任务完整记录（点查，不改动注册表）
    pub async fn fetch_detail(&self, task_id: &str) -> Result<TaskDetail, ClientError> {
        self.gateway.fetch_task_detail(task_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_commas_whitespace_and_newlines() {
        let symbols = parse_symbols("AAPL, GOOGL\nMSFT").unwrap();
        assert_eq!(symbols, vec!["AAPL", "GOOGL", "MSFT"]);
    }

    #[test]
    fn mixed_separator_runs_collapse() {
        let symbols = parse_symbols("AAPL,,  GOOGL ,\n\nMSFT,").unwrap();
        assert_eq!(symbols, vec!["AAPL", "GOOGL", "MSFT"]);
    }

    #[test]
    fn duplicates_are_preserved_verbatim() {
        let symbols = parse_symbols("AAPL AAPL").unwrap();
        assert_eq!(symbols, vec!["AAPL", "AAPL"]);
    }

    #[test]
    fn blank_input_is_a_validation_error() {
        let err = parse_symbols("   ").unwrap_err();
        assert!(err.is_validation());
    }
}
