//! 错误类型定义

use thiserror::Error;

/// 引擎客户端错误
#[derive(Error, Debug)]
pub enum EngineError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 引擎进程启动失败
    #[error("Failed to spawn engine '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// 引擎进程缺少标准输入/输出管道
    #[error("Engine process has no {0} pipe")]
    MissingPipe(&'static str),

    /// 命令通道已关闭
    #[error("Engine channel closed")]
    ChannelClosed,

    /// 配置文件格式错误
    #[error("Invalid engine config: {0}")]
    Config(#[from] serde_json::Error),
}

/// 引擎操作结果类型
pub type Result<T> = std::result::Result<T, EngineError>;
