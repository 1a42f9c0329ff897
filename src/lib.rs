//! Gushi - AI 股票分析客户端核心
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **error**: 客户端错误类型（校验 / 网络 / 服务端）
//! - **gateway**: 远端网关抽象与实现（HTTP / Mock）
//! - **chat**: 会话子系统（消息日志、历史合并、会话引擎）
//! - **tasks**: 批量任务子系统（注册表视图、任务提交）
//! - **observability**: tracing 初始化
//!
//! 核心问题是异步交互生命周期：本地乐观状态与异步到达的服务端权威
//! 状态的调和 —— 不丢条目、不重复条目、不暴露不一致的中间视图。

pub mod chat;
pub mod config;
pub mod error;
pub mod gateway;
pub mod observability;
pub mod tasks;

pub use chat::ConversationEngine;
pub use error::ClientError;
pub use tasks::TaskSubmitter;
