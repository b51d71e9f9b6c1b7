//! 错误类型定义

use thiserror::Error;

/// 棋盘与 FEN 错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChessError {
    /// 无效的格子坐标
    #[error("Invalid square: {file}{rank}")]
    InvalidSquare { file: char, rank: u8 },

    /// 无效的 FEN 字符串
    #[error("Invalid FEN string: {reason}")]
    InvalidFen { reason: String },

    /// 无效的棋盘快照（JSON）
    #[error("Invalid board snapshot: {reason}")]
    InvalidBoard { reason: String },
}

/// 棋盘操作结果类型
pub type Result<T> = std::result::Result<T, ChessError>;
