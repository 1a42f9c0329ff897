//! 批量任务子系统：注册表视图与任务提交

pub mod registry;
pub mod submitter;

pub use registry::TaskRegistry;
pub use submitter::{parse_symbols, TaskSubmitter};
