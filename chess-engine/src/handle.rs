//! 引擎句柄
//!
//! 一个后台任务独占适配器，宿主命令和引擎输出在同一条时间线上处理，
//! 因此不需要锁。

use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::adapter::UciAdapter;
use crate::config::EngineConfig;
use crate::event::EngineEvent;
use crate::transport::{forward_lines, EngineTransport};

/// 宿主发给引擎任务的命令
#[derive(Debug)]
pub enum EngineCommand {
    Analyze { fen: String, depth: u32 },
    Stop,
    Subscribe(oneshot::Sender<UnboundedReceiver<EngineEvent>>),
    Quit,
}

/// 引擎句柄
pub struct EngineHandle {
    commands: mpsc::Sender<EngineCommand>,
    task: JoinHandle<()>,
    default_depth: u32,
}

impl EngineHandle {
    /// 启动引擎进程并开始握手
    ///
    /// 返回句柄和第一个订阅者，后者一定能收到 `Ready`。
    /// 启动失败时句柄仍然可用，但所有操作都是空操作，事件流立即结束。
    pub fn spawn(config: &EngineConfig) -> (Self, UnboundedReceiver<EngineEvent>) {
        let (mut adapter, lines) = UciAdapter::spawn_process(config);
        let (line_tx, line_rx) = mpsc::unbounded_channel();

        if let Some(lines) = lines {
            tokio::spawn(forward_lines(lines, line_tx));
            adapter.initialize();
        }

        Self::start(adapter, line_rx, config)
    }

    /// 用任意传输和输出行通道运行适配器
    ///
    /// 适配器的握手由调用方决定是否已开始。
    pub fn start<T>(
        mut adapter: UciAdapter<T>,
        lines: UnboundedReceiver<String>,
        config: &EngineConfig,
    ) -> (Self, UnboundedReceiver<EngineEvent>)
    where
        T: EngineTransport + 'static,
    {
        let events = adapter.subscribe();
        let (tx, rx) = mpsc::channel(config.command_buffer.max(1));
        let task = tokio::spawn(drive(adapter, rx, lines, config.ready_timeout()));

        (
            Self {
                commands: tx,
                task,
                default_depth: config.default_depth,
            },
            events,
        )
    }

    /// 分析局面
    pub async fn analyze(&self, fen: impl Into<String>, depth: u32) {
        self.send(EngineCommand::Analyze {
            fen: fen.into(),
            depth,
        })
        .await;
    }

    /// 以默认深度分析局面
    pub async fn analyze_default(&self, fen: impl Into<String>) {
        self.analyze(fen, self.default_depth).await;
    }

    /// 停止当前分析
    pub async fn stop(&self) {
        self.send(EngineCommand::Stop).await;
    }

    /// 新增订阅者；引擎任务已结束时返回 None
    pub async fn subscribe(&self) -> Option<UnboundedReceiver<EngineEvent>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(EngineCommand::Subscribe(reply_tx)).await;
        reply_rx.await.ok()
    }

    /// 结束会话，可重复调用
    pub async fn quit(&self) {
        self.send(EngineCommand::Quit).await;
    }

    /// 结束会话并等待引擎任务退出
    pub async fn shutdown(self) {
        self.quit().await;
        if let Err(e) = self.task.await {
            warn!("Engine task failed: {}", e);
        }
    }

    /// 引擎任务是否已退出
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    async fn send(&self, command: EngineCommand) {
        if self.commands.send(command).await.is_err() {
            debug!("Engine task stopped, command ignored");
        }
    }
}

/// 引擎任务主循环
async fn drive<T: EngineTransport>(
    mut adapter: UciAdapter<T>,
    mut commands: mpsc::Receiver<EngineCommand>,
    mut lines: UnboundedReceiver<String>,
    ready_timeout: Option<Duration>,
) {
    let deadline = ready_timeout.map(|t| Instant::now() + t);
    let mut watching_ready = deadline.is_some();
    let ready_timer = sleep_until(deadline.unwrap_or_else(Instant::now));
    tokio::pin!(ready_timer);

    loop {
        let awaiting_ready = watching_ready && adapter.state().is_pending();

        tokio::select! {
            command = commands.recv() => match command {
                Some(EngineCommand::Analyze { fen, depth }) => adapter.analyze_position(&fen, depth),
                Some(EngineCommand::Stop) => adapter.stop_analysis(),
                Some(EngineCommand::Subscribe(reply)) => {
                    let _ = reply.send(adapter.subscribe());
                }
                Some(EngineCommand::Quit) | None => {
                    adapter.quit();
                    break;
                }
            },
            line = lines.recv() => match line {
                Some(line) => adapter.handle_line(&line),
                None => {
                    adapter.fail("engine output closed");
                    break;
                }
            },
            () = &mut ready_timer, if awaiting_ready => {
                watching_ready = false;
                if let Some(timeout) = ready_timeout {
                    adapter.fail(format!("engine not ready after {:?}", timeout));
                }
            }
        }
    }

    info!("Engine task finished ({})", adapter.state());
}
