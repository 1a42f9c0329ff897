//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `GUSHI__*` 覆盖（双下划线表示嵌套，如 `GUSHI__SERVICE__BASE_URL=...`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceSection,
    #[serde(default)]
    pub chat: ChatSection,
    #[serde(default)]
    pub tasks: TasksSection,
}

/// [service] 段：分析服务地址与请求超时
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSection {
    /// 服务端 API 前缀（不含结尾斜杠）
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 单次请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// [chat] 段：会话相关
#[derive(Debug, Clone, Deserialize)]
pub struct ChatSection {
    /// 单次加载的历史记录条数上限
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_history_limit() -> usize {
    10
}

impl Default for ChatSection {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

/// [tasks] 段：任务列表与批量提交限制
#[derive(Debug, Clone, Deserialize)]
pub struct TasksSection {
    /// 任务列表刷新条数上限
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
    /// 单次批量分析最多股票数（与服务端限制一致）
    #[serde(default = "default_max_batch_symbols")]
    pub max_batch_symbols: usize,
}

fn default_list_limit() -> usize {
    50
}

fn default_max_batch_symbols() -> usize {
    50
}

impl Default for TasksSection {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
            max_batch_symbols: default_max_batch_symbols(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: ServiceSection::default(),
            chat: ChatSection::default(),
            tasks: TasksSection::default(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 GUSHI__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 GUSHI__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("GUSHI")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_no_file() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.service.base_url, "http://localhost:8000/api/v1");
        assert_eq!(cfg.service.request_timeout_secs, 30);
        assert_eq!(cfg.chat.history_limit, 10);
        assert_eq!(cfg.tasks.list_limit, 50);
        assert_eq!(cfg.tasks.max_batch_symbols, 50);
    }

    #[test]
    fn load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gushi.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "[service]\nbase_url = \"http://example.com/api/v1\"\n\n[tasks]\nlist_limit = 20"
        )
        .unwrap();

        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.service.base_url, "http://example.com/api/v1");
        assert_eq!(cfg.tasks.list_limit, 20);
        // 未覆盖的键保持默认
        assert_eq!(cfg.chat.history_limit, 10);
    }
}
