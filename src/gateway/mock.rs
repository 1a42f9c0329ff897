//! Mock 网关（用于测试，无需服务端）
//!
//! 每类调用维护一个脚本队列：出队即消费；队列为空时回落到默认行为
//! （查询回显、列表 / 历史为空、创建返回新 task_id、取消成功）。
//! 所有调用都会被记录，供测试断言请求次数与参数。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ClientError;
use crate::gateway::api::{
    AnalysisKind, BatchAnalysisRequest, CreatedTask, HistoryRecord, QueryAnswer, TaskDetail,
    TaskPriority, TaskSummary,
};
use crate::gateway::RemoteGateway;

/// 记录的一次网关调用
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    SubmitQuery {
        text: String,
        session_id: String,
    },
    FetchHistory {
        session_id: String,
        limit: usize,
    },
    CreateBatchAnalysis {
        symbols: Vec<String>,
        analysis_types: Vec<AnalysisKind>,
        priority: TaskPriority,
    },
    CreateMarketScan,
    CancelTask {
        task_id: String,
    },
    ListTasks {
        limit: usize,
    },
    FetchTaskDetail {
        task_id: String,
    },
}

/// Mock 网关：脚本化响应 + 调用记录
#[derive(Default)]
pub struct MockGateway {
    query_script: Mutex<VecDeque<Result<QueryAnswer, ClientError>>>,
    history_script: Mutex<VecDeque<Result<Vec<HistoryRecord>, ClientError>>>,
    create_script: Mutex<VecDeque<Result<CreatedTask, ClientError>>>,
    cancel_script: Mutex<VecDeque<Result<(), ClientError>>>,
    list_script: Mutex<VecDeque<Result<Vec<TaskSummary>, ClientError>>>,
    detail_script: Mutex<VecDeque<Result<TaskDetail, ClientError>>>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue_query(&self, result: Result<QueryAnswer, ClientError>) {
        self.query_script.lock().unwrap().push_back(result);
    }

    pub fn enqueue_history(&self, result: Result<Vec<HistoryRecord>, ClientError>) {
        self.history_script.lock().unwrap().push_back(result);
    }

    pub fn enqueue_create(&self, result: Result<CreatedTask, ClientError>) {
        self.create_script.lock().unwrap().push_back(result);
    }

    pub fn enqueue_cancel(&self, result: Result<(), ClientError>) {
        self.cancel_script.lock().unwrap().push_back(result);
    }

    pub fn enqueue_list(&self, result: Result<Vec<TaskSummary>, ClientError>) {
        self.list_script.lock().unwrap().push_back(result);
    }

    pub fn enqueue_detail(&self, result: Result<TaskDetail, ClientError>) {
        self.detail_script.lock().unwrap().push_back(result);
    }

    /// 已记录的调用（按发出顺序）
    pub fn recorded_calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    /// 取消请求被实际发出的次数
    pub fn cancel_call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, GatewayCall::CancelTask { .. }))
            .count()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RemoteGateway for MockGateway {
    async fn submit_query(
        &self,
        text: &str,
        session_id: &str,
    ) -> Result<QueryAnswer, ClientError> {
        self.record(GatewayCall::SubmitQuery {
            text: text.to_string(),
            session_id: session_id.to_string(),
        });

        if let Some(result) = self.query_script.lock().unwrap().pop_front() {
            return result;
        }
        Ok(QueryAnswer {
            session_id: Some(session_id.to_string()),
            answer: format!("Echo from Mock: {}", text),
            response: None,
            context_symbols: None,
        })
    }

    async fn fetch_history(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryRecord>, ClientError> {
        self.record(GatewayCall::FetchHistory {
            session_id: session_id.to_string(),
            limit,
        });

        if let Some(result) = self.history_script.lock().unwrap().pop_front() {
            return result;
        }
        Ok(Vec::new())
    }

    async fn create_batch_analysis(
        &self,
        request: &BatchAnalysisRequest,
    ) -> Result<CreatedTask, ClientError> {
        self.record(GatewayCall::CreateBatchAnalysis {
            symbols: request.symbols.clone(),
            analysis_types: request.analysis_types.clone(),
            priority: request.priority,
        });

        if let Some(result) = self.create_script.lock().unwrap().pop_front() {
            return result;
        }
        Ok(CreatedTask {
            task_id: format!("task_{}", uuid::Uuid::new_v4()),
        })
    }

    async fn create_market_scan(&self) -> Result<CreatedTask, ClientError> {
        self.record(GatewayCall::CreateMarketScan);

        if let Some(result) = self.create_script.lock().unwrap().pop_front() {
            return result;
        }
        Ok(CreatedTask {
            task_id: format!("task_{}", uuid::Uuid::new_v4()),
        })
    }

    async fn cancel_task(&self, task_id: &str) -> Result<(), ClientError> {
        self.record(GatewayCall::CancelTask {
            task_id: task_id.to_string(),
        });

        if let Some(result) = self.cancel_script.lock().unwrap().pop_front() {
            return result;
        }
        Ok(())
    }

    async fn list_tasks(&self, limit: usize) -> Result<Vec<TaskSummary>, ClientError> {
        self.record(GatewayCall::ListTasks { limit });

        if let Some(result) = self.list_script.lock().unwrap().pop_front() {
            return result;
        }
        Ok(Vec::new())
    }

    async fn fetch_task_detail(&self, task_id: &str) -> Result<TaskDetail, ClientError> {
        self.record(GatewayCall::FetchTaskDetail {
            task_id: task_id.to_string(),
        });

        if let Some(result) = self.detail_script.lock().unwrap().pop_front() {
            return result;
        }
        Err(ClientError::Service {
            detail: "任务不存在".to_string(),
        })
    }
}
