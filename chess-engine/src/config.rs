//! 引擎配置

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::{DEFAULT_COMMAND_BUFFER, DEFAULT_DEPTH, DEFAULT_READY_TIMEOUT_MS};
use crate::error::Result;

/// 引擎未就绪时收到分析请求的处理策略
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotReadyPolicy {
    /// 暂存请求，就绪后按调用顺序重放
    #[default]
    Queue,
    /// 丢弃请求并记录警告
    Drop,
}

/// 引擎配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 引擎可执行文件，默认 "stockfish"
    pub program: String,
    /// 启动参数
    pub args: Vec<String>,
    /// 默认搜索深度
    pub default_depth: u32,
    /// 未就绪策略
    pub not_ready_policy: NotReadyPolicy,
    /// 就绪超时（毫秒），0 表示一直等待
    pub ready_timeout_ms: u64,
    /// 宿主命令通道容量
    pub command_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "stockfish".to_string(),
            args: Vec::new(),
            default_depth: DEFAULT_DEPTH,
            not_ready_policy: NotReadyPolicy::Queue,
            ready_timeout_ms: DEFAULT_READY_TIMEOUT_MS,
            command_buffer: DEFAULT_COMMAND_BUFFER,
        }
    }
}

impl EngineConfig {
    /// 从 JSON 字符串解析，缺失字段使用默认值
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 从 JSON 文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&content)?;
        info!("Loaded engine config: {:?}", path.as_ref());
        Ok(config)
    }

    /// 从 JSON 文件加载，失败时使用默认配置
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("Engine config {:?} not found, using defaults", path);
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Engine config {:?} is invalid: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    /// 就绪超时
    pub fn ready_timeout(&self) -> Option<Duration> {
        (self.ready_timeout_ms > 0).then(|| Duration::from_millis(self.ready_timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.program, "stockfish");
        assert_eq!(config.default_depth, 15);
        assert_eq!(config.not_ready_policy, NotReadyPolicy::Queue);
        assert_eq!(config.ready_timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(
            r#"{ "program": "/usr/games/stockfish", "not_ready_policy": "drop", "ready_timeout_ms": 0 }"#,
        )
        .unwrap();

        assert_eq!(config.program, "/usr/games/stockfish");
        assert_eq!(config.not_ready_policy, NotReadyPolicy::Drop);
        assert_eq!(config.ready_timeout(), None);
        assert_eq!(config.default_depth, 15);
        assert!(config.args.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        assert!(EngineConfig::from_json("{ \"default_depth\": \"deep\" }").is_err());
        assert!(EngineConfig::from_json("{ \"not_ready_policy\": \"retry\" }").is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = EngineConfig::load_or_default("/nonexistent/chess-engine/config.json");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{ "args": ["--threads", "2"], "default_depth": 20 }"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.args, vec!["--threads", "2"]);
        assert_eq!(config.default_depth, 20);

        std::fs::write(&path, "not json").unwrap();
        assert_eq!(EngineConfig::load_or_default(&path), EngineConfig::default());
    }
}
