//! 远端网关抽象
//!
//! 所有实现（HTTP / Mock）实现 RemoteGateway：会话查询、历史加载、任务创建 / 取消 / 列表 / 详情。
//! 网关只负责传输与协议解析，不持有任何会话或任务状态。

pub mod api;
pub mod http;
pub mod mock;

use async_trait::async_trait;

use crate::error::ClientError;

pub use api::{
    AnalysisKind, ApiEnvelope, BatchAnalysisRequest, CreatedTask, HistoryRecord, QueryAnswer,
    RecommendationItem, ResponsePayload, TaskDetail, TaskKind, TaskPriority, TaskStatus,
    TaskSummary,
};
pub use http::HttpGateway;
pub use mock::MockGateway;

/// 远端网关 trait：对分析服务的七个逻辑调用
///
/// 调用均为异步非阻塞；已发出的请求无法中途取消。
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// 提交一次会话查询
    async fn submit_query(
        &self,
        text: &str,
        session_id: &str,
    ) -> Result<QueryAnswer, ClientError>;

    /// 拉取会话的持久化历史（服务端按创建时间倒序返回）
    async fn fetch_history(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryRecord>, ClientError>;

    /// 创建批量股票分析任务
    async fn create_batch_analysis(
        &self,
        request: &BatchAnalysisRequest,
    ) -> Result<CreatedTask, ClientError>;

    /// 创建市场扫描任务（无参数）
    async fn create_market_scan(&self) -> Result<CreatedTask, ClientError>;

    /// 请求取消任务
    async fn cancel_task(&self, task_id: &str) -> Result<(), ClientError>;

    /// 拉取任务列表
    async fn list_tasks(&self, limit: usize) -> Result<Vec<TaskSummary>, ClientError>;

    /// 拉取单个任务完整记录（点查，不影响列表视图）
    async fn fetch_task_detail(&self, task_id: &str) -> Result<TaskDetail, ClientError>;
}
