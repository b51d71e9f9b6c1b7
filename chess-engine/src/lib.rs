//! UCI 分析引擎客户端
//!
//! 包含:
//! - 握手状态机（uci / isready）
//! - 分析请求翻译（position fen / go depth）
//! - 引擎输出行解析与事件分发
//! - 传输抽象（子进程、进程内通道）
//! - 异步引擎句柄

mod adapter;
mod config;
mod constants;
mod error;
mod event;
mod handle;
mod parser;
mod session;
mod tokenizer;
mod transport;

pub use adapter::{AnalysisRequest, UciAdapter};
pub use config::{EngineConfig, NotReadyPolicy};
pub use constants::*;
pub use error::{EngineError, Result};
pub use event::{AnalysisResult, EngineEvent, EventBus};
pub use handle::{EngineCommand, EngineHandle};
pub use parser::{EngineLine, InfoLine};
pub use session::SessionState;
pub use tokenizer::TokenCursor;
pub use transport::{forward_lines, ChannelTransport, EngineLines, EngineTransport, ProcessTransport};
