//! 服务端线上协议定义
//!
//! 与分析服务 REST API 对应的请求 / 响应类型。服务端统一返回
//! `{success, message, data}` 信封，失败时返回 FastAPI 风格的 `{detail}`。
//! 分析内容本身（analysis / chart_data / result）对客户端是不透明负载。

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 统一响应信封（服务端 BaseResponse）
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

fn default_success() -> bool {
    true
}

/// 服务端错误体（FastAPI HTTPException）
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub detail: Option<String>,
}

/// 查询响应（POST /analysis/query 的 data）
#[derive(Debug, Clone, Deserialize)]
pub struct QueryAnswer {
    #[serde(default)]
    pub session_id: Option<String>,
    /// 回答正文（必须存在）
    pub answer: String,
    #[serde(default)]
    pub response: Option<ResponsePayload>,
    #[serde(default)]
    pub context_symbols: Option<Vec<String>>,
}

/// 结构化响应负载（查询响应与历史记录共用）
///
/// 历史记录中服务端只保存了负载而未保存 answer 正文，因此 answer 可缺失。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsePayload {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub analysis: Option<serde_json::Value>,
    #[serde(default)]
    pub chart_data: Option<serde_json::Value>,
    #[serde(default)]
    pub recommendations: Option<Vec<RecommendationItem>>,
    #[serde(default)]
    pub reference_urls: Option<Vec<String>>,
}

/// 单条投资建议（字段均可缺失，渲染端自行兜底）
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecommendationItem {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

/// 持久化的历史问答记录（GET /analysis/history/{session_id} 的 data 元素）
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    /// 用户当时发送的问题
    pub message: String,
    #[serde(default)]
    pub response: Option<ResponsePayload>,
    pub created_at: NaiveDateTime,
}

/// 批量分析任务创建请求（POST /tasks/batch-analysis）
#[derive(Debug, Clone, Serialize)]
pub struct BatchAnalysisRequest {
    pub symbols: Vec<String>,
    pub analysis_types: Vec<AnalysisKind>,
    pub priority: TaskPriority,
}

/// 任务创建响应（data 中的 task_id）
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedTask {
    pub task_id: String,
}

/// 任务列表视图（GET /tasks/ 的 data 元素）
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSummary {
    pub task_id: String,
    pub task_type: TaskKind,
    pub status: TaskStatus,
    #[serde(default)]
    pub symbols_count: Option<u32>,
    #[serde(default)]
    pub progress: u8,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
}

/// 任务完整记录（GET /tasks/{task_id} 的 data）
#[derive(Debug, Clone, Deserialize)]
pub struct TaskDetail {
    pub task_id: String,
    pub task_type: TaskKind,
    pub status: TaskStatus,
    #[serde(default)]
    pub symbols: Vec<String>,
    #[serde(default)]
    pub progress: u8,
    /// 任务结果（不透明负载）
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub started_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
}

/// 任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// 批量股票分析
    BatchStocks,
    /// 市场扫描
    MarketScan,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::BatchStocks => write!(f, "batch_stocks"),
            TaskKind::MarketScan => write!(f, "market_scan"),
        }
    }
}

/// 任务状态（状态迁移由服务端裁决，客户端只渲染最近一次观察到的值）
///
/// Pending -> Running | Cancelled
/// Running -> Completed | Failed | Cancelled
/// Completed / Failed / Cancelled 为终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// 等待执行
    Pending,
    /// 正在执行
    Running,
    /// 已完成
    Completed,
    /// 执行失败
    Failed,
    /// 已取消
    Cancelled,
}

impl TaskStatus {
    /// 是否为终态（不再发生迁移）
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// 分析类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    /// 技术分析
    Technical,
    /// 基本面分析
    Fundamental,
    /// 情绪分析
    Sentiment,
    /// 投资建议
    Recommendation,
}

/// 任务优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Normal,
    High,
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Normal
    }
}
