//! 引擎传输层抽象
//!
//! `EngineTransport` 只负责把命令送出去，不阻塞调用方。
//! 引擎输出由调用方按行读取后交给适配器。

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::constants::QUIT_GRACE_PERIOD;
use crate::error::{EngineError, Result};

/// 引擎输出行流
pub type EngineLines = Lines<BufReader<ChildStdout>>;

/// 传输抽象 trait
pub trait EngineTransport: Send {
    /// 发送一条命令（不含换行符）
    fn send(&mut self, command: &str) -> Result<()>;

    /// 释放底层资源，之后的 send 都会失败
    fn terminate(&mut self);
}

// ============================================================================
// 进程内通道实现
// ============================================================================

/// 基于通道的传输，用于进程内引擎或测试
pub struct ChannelTransport {
    commands: Option<UnboundedSender<String>>,
}

impl ChannelTransport {
    /// 创建传输及其命令接收端
    pub fn channel() -> (Self, UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { commands: Some(tx) }, rx)
    }
}

impl EngineTransport for ChannelTransport {
    fn send(&mut self, command: &str) -> Result<()> {
        let tx = self.commands.as_ref().ok_or(EngineError::ChannelClosed)?;
        tx.send(command.to_string())
            .map_err(|_| EngineError::ChannelClosed)
    }

    fn terminate(&mut self) {
        self.commands = None;
    }
}

// ============================================================================
// 子进程实现
// ============================================================================

/// 子进程传输
///
/// 命令经无界通道交给写任务，由写任务追加换行后写入子进程标准输入。
pub struct ProcessTransport {
    commands: Option<UnboundedSender<String>>,
    child: Option<Child>,
}

impl ProcessTransport {
    /// 启动引擎进程，返回传输和标准输出行流
    ///
    /// 必须在 tokio 运行时内调用。
    pub fn spawn(config: &EngineConfig) -> Result<(Self, EngineLines)> {
        let mut child = Command::new(&config.program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: config.program.clone(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(EngineError::MissingPipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(EngineError::MissingPipe("stdout"))?;

        info!("Engine process started: {} (pid {:?})", config.program, child.id());

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(write_commands(stdin, rx));

        Ok((
            Self {
                commands: Some(tx),
                child: Some(child),
            },
            BufReader::new(stdout).lines(),
        ))
    }
}

impl EngineTransport for ProcessTransport {
    fn send(&mut self, command: &str) -> Result<()> {
        let tx = self.commands.as_ref().ok_or(EngineError::ChannelClosed)?;
        tx.send(command.to_string())
            .map_err(|_| EngineError::ChannelClosed)
    }

    fn terminate(&mut self) {
        // 关闭命令通道，写任务写完已排队的命令后关闭标准输入
        self.commands = None;

        let Some(mut child) = self.child.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    match timeout(QUIT_GRACE_PERIOD, child.wait()).await {
                        Ok(Ok(status)) => debug!("Engine process exited: {}", status),
                        Ok(Err(e)) => warn!("Failed to wait for engine process: {}", e),
                        Err(_) => {
                            warn!("Engine process did not exit after quit, killing it");
                            if let Err(e) = child.kill().await {
                                warn!("Failed to kill engine process: {}", e);
                            }
                        }
                    }
                });
            }
            Err(_) => {
                if let Err(e) = child.start_kill() {
                    warn!("Failed to kill engine process: {}", e);
                }
            }
        }
    }
}

/// 写任务：逐条写入命令直到通道关闭
async fn write_commands(mut stdin: ChildStdin, mut commands: UnboundedReceiver<String>) {
    while let Some(command) = commands.recv().await {
        if let Err(e) = write_line(&mut stdin, &command).await {
            warn!("Failed to write '{}' to engine: {}", command, e);
            break;
        }
    }
    debug!("Engine command writer stopped");
}

async fn write_line(stdin: &mut ChildStdin, command: &str) -> std::io::Result<()> {
    stdin.write_all(command.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await
}

/// 把引擎输出行转发到通道，引擎输出结束时关闭通道
pub async fn forward_lines(mut lines: EngineLines, tx: UnboundedSender<String>) {
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Ok(None) => {
                debug!("Engine output closed");
                break;
            }
            Err(e) => {
                warn!("Failed to read engine output: {}", e);
                break;
            }
        }
    }
}
