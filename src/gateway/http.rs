//! HTTP 网关实现（reqwest）
//!
//! 对应分析服务的 REST 接口前缀 `/api/v1`：
//! - POST   /analysis/query
//! - GET    /analysis/history/{session_id}
//! - POST   /tasks/batch-analysis
//! - POST   /tasks/market-scan
//! - GET    /tasks/?limit=N
//! - GET    /tasks/{task_id}
//! - DELETE /tasks/{task_id}
//!
//! 连接失败 / 超时映射为 Transport；非 2xx 的 `{detail}` 错误体映射为 Service。

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ServiceSection;
use crate::error::ClientError;
use crate::gateway::api::{
    ApiEnvelope, ApiErrorBody, BatchAnalysisRequest, CreatedTask, HistoryRecord, QueryAnswer,
    TaskDetail, TaskSummary,
};
use crate::gateway::RemoteGateway;

/// 查询请求体
#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    message: &'a str,
    session_id: &'a str,
}

/// 基于 reqwest 的远端网关
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    /// 按 [service] 配置段构建
    pub fn new(service: &ServiceSection) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(service.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: service.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 解析统一信封：非 2xx 取 `{detail}`，2xx 取 `data`，缺失即服务端违约
    async fn unwrap_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if !status.is_success() {
            let detail = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(ClientError::Service { detail });
        }

        let envelope: ApiEnvelope<T> = response.json().await?;
        if !envelope.success {
            return Err(ClientError::Service {
                detail: envelope
                    .message
                    .unwrap_or_else(|| "request rejected".to_string()),
            });
        }

        envelope.data.ok_or_else(|| ClientError::Service {
            detail: "response missing data".to_string(),
        })
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn submit_query(
        &self,
        text: &str,
        session_id: &str,
    ) -> Result<QueryAnswer, ClientError> {
        let response = self
            .client
            .post(self.url("/analysis/query"))
            .json(&QueryRequest {
                message: text,
                session_id,
            })
            .send()
            .await?;

        Self::unwrap_envelope(response).await
    }

    async fn fetch_history(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryRecord>, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/analysis/history/{}", session_id)))
            .query(&[("limit", limit)])
            .send()
            .await?;

        Self::unwrap_envelope(response).await
    }

    async fn create_batch_analysis(
        &self,
        request: &BatchAnalysisRequest,
    ) -> Result<CreatedTask, ClientError> {
        let response = self
            .client
            .post(self.url("/tasks/batch-analysis"))
            .json(request)
            .send()
            .await?;

        Self::unwrap_envelope(response).await
    }

    async fn create_market_scan(&self) -> Result<CreatedTask, ClientError> {
        let response = self
            .client
            .post(self.url("/tasks/market-scan"))
            .send()
            .await?;

        Self::unwrap_envelope(response).await
    }

    async fn cancel_task(&self, task_id: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/tasks/{}", task_id)))
            .send()
            .await?;

        // data 只含回显的 task_id/status，无需保留
        Self::unwrap_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }

    async fn list_tasks(&self, limit: usize) -> Result<Vec<TaskSummary>, ClientError> {
        let response = self
            .client
            .get(self.url("/tasks/"))
            .query(&[("limit", limit)])
            .send()
            .await?;

        Self::unwrap_envelope(response).await
    }

    async fn fetch_task_detail(&self, task_id: &str) -> Result<TaskDetail, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/tasks/{}", task_id)))
            .send()
            .await?;

        Self::unwrap_envelope(response).await
    }
}
