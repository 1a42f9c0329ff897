//! 会话子系统：消息日志、历史合并、会话引擎

pub mod engine;
pub mod history;
pub mod message;
pub mod session;

pub use engine::ConversationEngine;
pub use message::{Message, MessageKind, Recommendation};
pub use session::{Session, SessionStore};
