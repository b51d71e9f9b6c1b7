//! 引擎事件与订阅

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::trace;

/// 一次分析进度
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    /// 分值（厘兵），正数对白方有利；只有杀棋步数时为 ±MATE_SCORE
    pub score: i32,
    /// 杀棋步数，正数为白方杀棋
    pub mate: Option<i32>,
    /// 主变第一步（UCI 格式，如 "e2e4"）
    pub best_move: Option<String>,
    /// 搜索深度
    pub depth: u32,
    /// 主变
    pub pv: Vec<String>,
}

/// 引擎事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum EngineEvent {
    /// 握手完成（每个会话一次）
    Ready,
    /// 分析进度
    Analysis(AnalysisResult),
    /// 最终着法
    BestMove(String),
}

/// 事件分发
///
/// 每个订阅者一个无界通道；接收端关闭的订阅者在下次分发时移除。
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<UnboundedSender<EngineEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新增订阅者，只会收到之后分发的事件
    pub fn subscribe(&mut self) -> UnboundedReceiver<EngineEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// 分发事件
    pub fn emit(&mut self, event: EngineEvent) {
        trace!("Emitting {:?} to {} subscribers", event, self.subscribers.len());
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// 移除所有订阅者
    pub fn close(&mut self) {
        self.subscribers.clear();
    }

    /// 订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
