//! 引擎客户端常量

use std::time::Duration;

/// 默认搜索深度
pub const DEFAULT_DEPTH: u32 = 15;

/// 上报分析结果的最小深度，更浅的 info 行被忽略
pub const MIN_REPORT_DEPTH: u32 = 10;

/// 只有杀棋步数时使用的分值
pub const MATE_SCORE: i32 = 10_000;

/// 默认就绪超时（毫秒）
pub const DEFAULT_READY_TIMEOUT_MS: u64 = 10_000;

/// 默认宿主命令通道容量
pub const DEFAULT_COMMAND_BUFFER: usize = 32;

/// 发送 quit 后等待引擎自行退出的时间
pub const QUIT_GRACE_PERIOD: Duration = Duration::from_secs(2);
