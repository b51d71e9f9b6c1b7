//! 引擎会话状态

use std::fmt;

/// 会话状态
///
/// 握手阶段只能单向推进：`Uninitialized → AwaitingUciOk → AwaitingReadyOk → Ready`。
/// `Degraded` 与 `Closed` 是终态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// 尚未发送 `uci`
    Uninitialized,
    /// 已发送 `uci`，等待 `uciok`
    AwaitingUciOk,
    /// 已发送 `isready`，等待 `readyok`
    AwaitingReadyOk,
    /// 可以接受分析请求
    Ready,
    /// 引擎不可用（启动失败或就绪超时），永久不就绪
    Degraded { reason: String },
    /// 已调用 quit
    Closed,
}

impl SessionState {
    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready)
    }

    /// 握手中（尚未就绪，但仍可能就绪）
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            SessionState::Uninitialized | SessionState::AwaitingUciOk | SessionState::AwaitingReadyOk
        )
    }

    /// 终态：不再收发任何内容
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Degraded { .. } | SessionState::Closed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Uninitialized => write!(f, "uninitialized"),
            SessionState::AwaitingUciOk => write!(f, "awaiting uciok"),
            SessionState::AwaitingReadyOk => write!(f, "awaiting readyok"),
            SessionState::Ready => write!(f, "ready"),
            SessionState::Degraded { reason } => write!(f, "degraded ({})", reason),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}
