//! UCI 协议适配器
//!
//! 管理握手状态机，把分析请求翻译为 UCI 命令，把引擎输出翻译为事件。
//! 所有公开操作都按 `SessionState` 分派，任何情况下都不会向调用方返回错误：
//! 失败通过日志报告。

use std::collections::VecDeque;

use chess_board::{Board, Fen};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, trace, warn};

use crate::config::{EngineConfig, NotReadyPolicy};
use crate::event::{EngineEvent, EventBus};
use crate::parser::EngineLine;
use crate::session::SessionState;
use crate::transport::{EngineLines, EngineTransport, ProcessTransport};

/// 分析请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub fen: String,
    pub depth: u32,
}

/// UCI 适配器
pub struct UciAdapter<T: EngineTransport> {
    transport: Option<T>,
    state: SessionState,
    policy: NotReadyPolicy,
    default_depth: u32,
    /// 就绪前暂存的请求（仅 Queue 策略）
    pending: VecDeque<AnalysisRequest>,
    current_position: Option<String>,
    events: EventBus,
}

impl<T: EngineTransport> UciAdapter<T> {
    /// 基于已建立的传输创建适配器
    pub fn new(transport: T, config: &EngineConfig) -> Self {
        Self {
            transport: Some(transport),
            state: SessionState::Uninitialized,
            policy: config.not_ready_policy,
            default_depth: config.default_depth,
            pending: VecDeque::new(),
            current_position: None,
            events: EventBus::new(),
        }
    }

    /// 创建不可用的适配器，所有操作都是空操作
    pub fn degraded(reason: impl Into<String>, config: &EngineConfig) -> Self {
        let reason = reason.into();
        error!("Engine unavailable: {}", reason);
        Self {
            transport: None,
            state: SessionState::Degraded { reason },
            policy: config.not_ready_policy,
            default_depth: config.default_depth,
            pending: VecDeque::new(),
            current_position: None,
            events: EventBus::new(),
        }
    }

    /// 当前会话状态
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// 最近一次提交给引擎的局面
    pub fn current_position(&self) -> Option<&str> {
        self.current_position.as_deref()
    }

    /// 等待就绪的请求数
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// 订阅事件
    ///
    /// 就绪前订阅的会收到一次 `Ready`，就绪后订阅的不会补发。
    pub fn subscribe(&mut self) -> UnboundedReceiver<EngineEvent> {
        self.events.subscribe()
    }

    /// 发送 `uci` 开始握手，不等待结果
    pub fn initialize(&mut self) {
        match self.state {
            SessionState::Uninitialized => {
                self.send("uci");
                self.state = SessionState::AwaitingUciOk;
                info!("UCI handshake started");
            }
            _ => debug!("initialize() ignored in state {}", self.state),
        }
    }

    /// 分析局面
    pub fn analyze_position(&mut self, fen: &str, depth: u32) {
        let request = AnalysisRequest {
            fen: fen.to_string(),
            depth,
        };

        match &self.state {
            SessionState::Ready => self.submit(request),
            SessionState::Uninitialized
            | SessionState::AwaitingUciOk
            | SessionState::AwaitingReadyOk => match self.policy {
                NotReadyPolicy::Queue => {
                    debug!("Engine not ready, queued analysis of {}", request.fen);
                    self.pending.push_back(request);
                }
                NotReadyPolicy::Drop => {
                    warn!("Engine not ready, dropped analysis of {}", request.fen);
                }
            },
            SessionState::Degraded { reason } => {
                warn!("Engine unavailable ({}), analysis ignored", reason);
            }
            SessionState::Closed => debug!("Engine closed, analysis ignored"),
        }
    }

    /// 以默认深度分析局面
    pub fn analyze_position_default(&mut self, fen: &str) {
        self.analyze_position(fen, self.default_depth);
    }

    /// 把棋盘快照转换为 FEN 后分析
    pub fn analyze_board(&mut self, board: &Board, side: &str, depth: u32) {
        let fen = Fen::to_fen(board, side);
        self.analyze_position(&fen, depth);
    }

    /// 停止当前分析，未就绪时为空操作
    pub fn stop_analysis(&mut self) {
        match self.state {
            SessionState::Ready => self.send("stop"),
            _ => debug!("stop_analysis() ignored in state {}", self.state),
        }
    }

    /// 结束会话，可重复调用
    ///
    /// 之后不会再分发任何事件。
    pub fn quit(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }

        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.send("quit") {
                warn!("Failed to send quit to engine: {}", e);
            }
            transport.terminate();
        }

        self.pending.clear();
        self.events.close();
        self.state = SessionState::Closed;
        info!("Engine session closed");
    }

    /// 进入不可用状态：释放传输，丢弃暂存请求
    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.state.is_terminal() {
            return;
        }

        let reason = reason.into();
        error!("Engine failed in state {}: {}", self.state, reason);

        if let Some(mut transport) = self.transport.take() {
            transport.terminate();
        }
        if !self.pending.is_empty() {
            warn!("Dropped {} queued analysis requests", self.pending.len());
            self.pending.clear();
        }
        self.state = SessionState::Degraded { reason };
    }

    /// 处理引擎输出的一行
    pub fn handle_line(&mut self, line: &str) {
        if self.state.is_terminal() {
            trace!("Ignoring engine line in state {}: {}", self.state, line);
            return;
        }

        trace!("Engine: {}", line);

        match EngineLine::parse(line) {
            EngineLine::UciOk => {
                self.send("isready");
                if self.state.is_pending() {
                    self.state = SessionState::AwaitingReadyOk;
                }
            }
            EngineLine::ReadyOk => self.on_ready(),
            EngineLine::Info(info) => {
                if let Some(result) = info.to_analysis() {
                    self.events.emit(EngineEvent::Analysis(result));
                }
            }
            EngineLine::BestMove { best, .. } => match best {
                Some(best) => self.events.emit(EngineEvent::BestMove(best)),
                None => debug!("Ignoring bestmove line without a move"),
            },
            EngineLine::Other => {}
        }
    }

    fn on_ready(&mut self) {
        if self.state.is_ready() {
            debug!("Duplicate readyok ignored");
            return;
        }

        self.state = SessionState::Ready;
        info!("Engine ready");
        self.events.emit(EngineEvent::Ready);

        while let Some(request) = self.pending.pop_front() {
            self.submit(request);
        }
    }

    fn submit(&mut self, request: AnalysisRequest) {
        self.send(&format!("position fen {}", request.fen));
        self.send(&format!("go depth {}", request.depth));
        self.current_position = Some(request.fen);
    }

    fn send(&mut self, command: &str) {
        let Some(transport) = self.transport.as_mut() else {
            debug!("No engine transport, '{}' not sent", command);
            return;
        };

        debug!("> {}", command);
        if let Err(e) = transport.send(command) {
            warn!("Failed to send '{}' to engine: {}", command, e);
        }
    }
}

impl UciAdapter<ProcessTransport> {
    /// 启动引擎进程
    ///
    /// 启动失败时不会 panic，而是返回不可用的适配器且没有输出流。
    pub fn spawn_process(config: &EngineConfig) -> (Self, Option<EngineLines>) {
        match ProcessTransport::spawn(config) {
            Ok((transport, lines)) => (Self::new(transport, config), Some(lines)),
            Err(e) => (Self::degraded(e.to_string(), config), None),
        }
    }
}

impl<T: EngineTransport> Drop for UciAdapter<T> {
    fn drop(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.terminate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::AnalysisResult;
    use crate::transport::ChannelTransport;
    use tokio::sync::mpsc::error::TryRecvError;

    type Commands = UnboundedReceiver<String>;

    fn adapter_with(policy: NotReadyPolicy) -> (UciAdapter<ChannelTransport>, Commands) {
        let (transport, commands) = ChannelTransport::channel();
        let config = EngineConfig {
            not_ready_policy: policy,
            ..Default::default()
        };
        (UciAdapter::new(transport, &config), commands)
    }

    fn drain(commands: &mut Commands) -> Vec<String> {
        let mut sent = Vec::new();
        while let Ok(command) = commands.try_recv() {
            sent.push(command);
        }
        sent
    }

    fn events(rx: &mut UnboundedReceiver<EngineEvent>) -> Vec<EngineEvent> {
        let mut received = Vec::new();
        while let Ok(event) = rx.try_recv() {
            received.push(event);
        }
        received
    }

    fn ready_adapter() -> (UciAdapter<ChannelTransport>, Commands) {
        let (mut adapter, mut commands) = adapter_with(NotReadyPolicy::Queue);
        adapter.initialize();
        adapter.handle_line("uciok");
        adapter.handle_line("readyok");
        drain(&mut commands);
        (adapter, commands)
    }

    #[test]
    fn test_handshake() {
        let (mut adapter, mut commands) = adapter_with(NotReadyPolicy::Queue);
        let mut rx = adapter.subscribe();
        assert_eq!(adapter.state(), &SessionState::Uninitialized);

        adapter.initialize();
        assert_eq!(drain(&mut commands), vec!["uci"]);
        assert_eq!(adapter.state(), &SessionState::AwaitingUciOk);

        adapter.handle_line("id name Stockfish 16");
        adapter.handle_line("option name Threads type spin default 1 min 1 max 1024");
        adapter.handle_line("uciok");
        assert_eq!(drain(&mut commands), vec!["isready"]);
        assert_eq!(adapter.state(), &SessionState::AwaitingReadyOk);

        adapter.handle_line("readyok");
        assert!(adapter.is_ready());
        assert_eq!(events(&mut rx), vec![EngineEvent::Ready]);
    }

    #[test]
    fn test_initialize_only_once() {
        let (mut adapter, mut commands) = adapter_with(NotReadyPolicy::Queue);
        adapter.initialize();
        adapter.initialize();
        assert_eq!(drain(&mut commands), vec!["uci"]);
    }

    #[test]
    fn test_ready_is_one_shot() {
        let (mut adapter, _commands) = adapter_with(NotReadyPolicy::Queue);
        let mut early_a = adapter.subscribe();
        let mut early_b = adapter.subscribe();

        adapter.initialize();
        adapter.handle_line("uciok");
        adapter.handle_line("readyok");
        let mut late = adapter.subscribe();
        adapter.handle_line("readyok");

        assert_eq!(events(&mut early_a), vec![EngineEvent::Ready]);
        assert_eq!(events(&mut early_b), vec![EngineEvent::Ready]);
        assert!(events(&mut late).is_empty());
    }

    #[test]
    fn test_analyze_when_ready() {
        let (mut adapter, mut commands) = ready_adapter();
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

        adapter.analyze_position(fen, 18);
        assert_eq!(
            drain(&mut commands),
            vec![format!("position fen {}", fen), "go depth 18".to_string()]
        );
        assert_eq!(adapter.current_position(), Some(fen));

        adapter.analyze_position_default("8/8/8/8/8/8/8/8 b - - 0 1");
        assert_eq!(
            drain(&mut commands),
            vec![
                "position fen 8/8/8/8/8/8/8/8 b - - 0 1".to_string(),
                "go depth 15".to_string()
            ]
        );
    }

    #[test]
    fn test_analyze_board() {
        let (mut adapter, mut commands) = ready_adapter();
        adapter.analyze_board(&Board::standard(), "black", 10);

        assert_eq!(
            drain(&mut commands),
            vec![
                "position fen rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1",
                "go depth 10"
            ]
        );
    }

    #[test]
    fn test_queue_policy_replays_after_ready() {
        let (mut adapter, mut commands) = adapter_with(NotReadyPolicy::Queue);
        adapter.initialize();
        adapter.analyze_position("fen-one", 12);
        adapter.analyze_position("fen-two", 20);
        assert_eq!(adapter.pending_requests(), 2);
        assert_eq!(adapter.current_position(), None);

        adapter.handle_line("uciok");
        assert_eq!(drain(&mut commands), vec!["uci", "isready"]);

        adapter.handle_line("readyok");
        assert_eq!(
            drain(&mut commands),
            vec![
                "position fen fen-one",
                "go depth 12",
                "position fen fen-two",
                "go depth 20"
            ]
        );
        assert_eq!(adapter.pending_requests(), 0);
        assert_eq!(adapter.current_position(), Some("fen-two"));
    }

    #[test]
    fn test_drop_policy_discards() {
        let (mut adapter, mut commands) = adapter_with(NotReadyPolicy::Drop);
        adapter.initialize();
        adapter.analyze_position("fen-one", 12);
        assert_eq!(adapter.pending_requests(), 0);

        adapter.handle_line("uciok");
        adapter.handle_line("readyok");
        assert_eq!(drain(&mut commands), vec!["uci", "isready"]);
        assert_eq!(adapter.current_position(), None);
    }

    #[test]
    fn test_stop_only_when_ready() {
        let (mut adapter, mut commands) = adapter_with(NotReadyPolicy::Queue);
        adapter.stop_analysis();
        adapter.initialize();
        adapter.stop_analysis();
        assert_eq!(drain(&mut commands), vec!["uci"]);

        let (mut adapter, mut commands) = ready_adapter();
        adapter.stop_analysis();
        assert_eq!(drain(&mut commands), vec!["stop"]);
    }

    #[test]
    fn test_analysis_events() {
        let (mut adapter, _commands) = ready_adapter();
        let mut rx = adapter.subscribe();

        adapter.handle_line("info depth 9 score cp 50");
        assert!(events(&mut rx).is_empty());

        adapter.handle_line("info depth 10 score cp 50");
        assert_eq!(
            events(&mut rx),
            vec![EngineEvent::Analysis(AnalysisResult {
                score: 50,
                mate: None,
                best_move: None,
                depth: 10,
                pv: Vec::new(),
            })]
        );

        adapter.handle_line("info depth 12 score mate 3 pv d8h4 g2g3");
        adapter.handle_line("info depth 12 score mate -2");
        let received = events(&mut rx);
        assert_eq!(received.len(), 2);
        match &received[0] {
            EngineEvent::Analysis(result) => {
                assert_eq!(result.mate, Some(3));
                assert_eq!(result.score, 10_000);
                assert_eq!(result.best_move.as_deref(), Some("d8h4"));
            }
            other => panic!("Unexpected event {:?}", other),
        }
        match &received[1] {
            EngineEvent::Analysis(result) => {
                assert_eq!(result.mate, Some(-2));
                assert_eq!(result.score, -10_000);
            }
            other => panic!("Unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_bestmove_event() {
        let (mut adapter, _commands) = ready_adapter();
        let mut rx = adapter.subscribe();

        adapter.handle_line("bestmove e2e4 ponder e7e5");
        adapter.handle_line("bestmove");
        assert_eq!(events(&mut rx), vec![EngineEvent::BestMove("e2e4".to_string())]);
    }

    #[test]
    fn test_events_keep_arrival_order() {
        let (mut adapter, _commands) = ready_adapter();
        let mut rx = adapter.subscribe();

        adapter.handle_line("info depth 10 score cp 1 pv a2a3");
        adapter.handle_line("info depth 11 score cp 2 pv b2b3");
        adapter.handle_line("bestmove b2b3");

        let depths: Vec<_> = events(&mut rx)
            .into_iter()
            .map(|e| match e {
                EngineEvent::Analysis(r) => r.depth.to_string(),
                EngineEvent::BestMove(m) => m,
                EngineEvent::Ready => "ready".to_string(),
            })
            .collect();
        assert_eq!(depths, vec!["10", "11", "b2b3"]);
    }

    #[test]
    fn test_quit_is_idempotent() {
        let (mut adapter, mut commands) = ready_adapter();
        let mut rx = adapter.subscribe();

        adapter.quit();
        adapter.quit();
        assert_eq!(drain(&mut commands), vec!["quit"]);
        assert_eq!(adapter.state(), &SessionState::Closed);

        // 之后的输出与调用都被忽略
        adapter.handle_line("bestmove e2e4");
        adapter.analyze_position("fen", 10);
        adapter.stop_analysis();
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Disconnected)));
        assert!(matches!(commands.try_recv(), Err(TryRecvError::Disconnected)));
    }

    #[test]
    fn test_quit_drops_queued_requests() {
        let (mut adapter, _commands) = adapter_with(NotReadyPolicy::Queue);
        adapter.initialize();
        adapter.analyze_position("fen", 10);
        adapter.quit();
        assert_eq!(adapter.pending_requests(), 0);

        adapter.handle_line("readyok");
        assert!(!adapter.is_ready());
    }

    #[test]
    fn test_degraded_adapter_is_inert() {
        let config = EngineConfig::default();
        let mut adapter = UciAdapter::<ChannelTransport>::degraded("engine not found", &config);
        let mut rx = adapter.subscribe();

        adapter.initialize();
        adapter.analyze_position("fen", 10);
        adapter.stop_analysis();
        adapter.handle_line("uciok");
        adapter.handle_line("readyok");
        adapter.handle_line("bestmove e2e4");

        assert!(!adapter.is_ready());
        assert_eq!(adapter.pending_requests(), 0);
        assert!(events(&mut rx).is_empty());
        assert!(matches!(adapter.state(), SessionState::Degraded { .. }));

        adapter.quit();
        adapter.quit();
        assert_eq!(adapter.state(), &SessionState::Closed);
    }

    #[test]
    fn test_fail_degrades_pending_session() {
        let (mut adapter, mut commands) = adapter_with(NotReadyPolicy::Queue);
        adapter.initialize();
        adapter.analyze_position("fen", 10);

        adapter.fail("ready timeout");
        assert_eq!(
            adapter.state(),
            &SessionState::Degraded {
                reason: "ready timeout".to_string()
            }
        );
        assert_eq!(adapter.pending_requests(), 0);

        adapter.handle_line("readyok");
        assert!(!adapter.is_ready());
        assert_eq!(drain(&mut commands), vec!["uci"]);
    }

    #[tokio::test]
    async fn test_spawn_process_failure_degrades() {
        let config = EngineConfig {
            program: "/nonexistent/uci-engine".to_string(),
            ..Default::default()
        };
        let (mut adapter, lines) = UciAdapter::spawn_process(&config);

        assert!(lines.is_none());
        assert!(matches!(adapter.state(), SessionState::Degraded { .. }));
        adapter.analyze_position("fen", 10);
        adapter.stop_analysis();
        adapter.quit();
    }
}
