//! 国际象棋棋盘与 FEN 库
//!
//! 包含:
//! - 棋子、格子、棋盘等核心数据结构
//! - 宿主棋盘快照（JSON）解析
//! - FEN 生成与棋盘部分解析

mod board;
mod constants;
mod error;
mod fen;
mod piece;

pub use board::{Board, Square};
pub use constants::*;
pub use error::{ChessError, Result};
pub use fen::{Fen, INITIAL_FEN};
pub use piece::{Piece, PieceKind, Side};
