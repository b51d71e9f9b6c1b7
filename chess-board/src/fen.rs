//! FEN 格式生成和解析
//!
//! 国际象棋 FEN 格式：
//! `<棋盘> <走子方> <易位权> <吃过路兵> <半回合计数> <回合数>`
//!
//! 示例：
//! `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1`
//!
//! 生成时后三个字段固定为 `- 0 1`，不根据对局历史推导。
//! 易位权按结构推断：王和车在初始格且步数为 0 即视为可易位，
//! 无法区分后来放置（或升变）且未移动的车与原始的车。

use crate::board::Board;
use crate::constants::{
    BOARD_SIZE, FEN_EN_PASSANT, FEN_FULLMOVE_NUMBER, FEN_HALFMOVE_CLOCK, FEN_NO_CASTLING, FILES,
};
use crate::error::ChessError;
use crate::piece::{Piece, PieceKind, Side};

/// 初始局面 FEN
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// 易位检查表：(记号, 阵营, 王的格子, 车的格子)
const CASTLING_CHECKS: [(char, Side, (char, u8), (char, u8)); 4] = [
    ('K', Side::White, ('e', 1), ('h', 1)),
    ('Q', Side::White, ('e', 1), ('a', 1)),
    ('k', Side::Black, ('e', 8), ('h', 8)),
    ('q', Side::Black, ('e', 8), ('a', 8)),
];

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 将棋盘转换为 FEN 字符串
    ///
    /// `current_side` 恰好为 `"white"` 时走子方为 `w`，其余任何输入都视为黑方。
    pub fn to_fen(board: &Board, current_side: &str) -> String {
        let active_color = if current_side == Side::White.name() {
            'w'
        } else {
            'b'
        };

        format!(
            "{} {} {} {} {} {}",
            Self::placement(board),
            active_color,
            Self::castling_rights(board),
            FEN_EN_PASSANT,
            FEN_HALFMOVE_CLOCK,
            FEN_FULLMOVE_NUMBER
        )
    }

    /// 将棋盘转换为 FEN 棋盘部分
    pub fn placement(board: &Board) -> String {
        let mut ranks = Vec::with_capacity(BOARD_SIZE);

        // 从第 8 行到第 1 行
        for rank in (1..=BOARD_SIZE as u8).rev() {
            let mut row = String::new();
            let mut empty_count = 0;

            for file in FILES {
                if let Some(piece) = board.piece_at(file, rank) {
                    if empty_count > 0 {
                        row.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    row.push_str(&piece.to_fen_notation());
                } else {
                    empty_count += 1;
                }
            }

            if empty_count > 0 {
                row.push_str(&empty_count.to_string());
            }

            ranks.push(row);
        }

        ranks.join("/")
    }

    /// 计算易位权字段，按 KQkq 顺序，无则为 `-`
    pub fn castling_rights(board: &Board) -> String {
        let rights: String = CASTLING_CHECKS
            .iter()
            .filter(|(_, side, king, rook)| {
                Self::is_unmoved(board, *king, PieceKind::King, *side)
                    && Self::is_unmoved(board, *rook, PieceKind::Rook, *side)
            })
            .map(|(symbol, ..)| *symbol)
            .collect();

        if rights.is_empty() {
            FEN_NO_CASTLING.to_string()
        } else {
            rights
        }
    }

    fn is_unmoved(board: &Board, (file, rank): (char, u8), kind: PieceKind, side: Side) -> bool {
        board
            .piece_at(file, rank)
            .is_some_and(|p| p.kind == kind && p.side == side && p.is_unmoved())
    }

    /// 解析 FEN 棋盘部分（也接受完整 FEN，只取第一个字段）
    ///
    /// 解析出的棋子步数均为 0。
    pub fn parse_board(fen: &str) -> Result<Board, ChessError> {
        let placement = fen.split_whitespace().next().ok_or_else(|| ChessError::InvalidFen {
            reason: "Empty FEN string".to_string(),
        })?;

        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != BOARD_SIZE {
            return Err(ChessError::InvalidFen {
                reason: format!("Expected {} rows, got {}", BOARD_SIZE, rows.len()),
            });
        }

        let mut board = Board::empty();

        // FEN 从上到下是第 8 行到第 1 行
        for (row_idx, row) in rows.iter().enumerate() {
            let rank = (BOARD_SIZE - row_idx) as u8;
            let mut column = 0usize;

            for c in row.chars() {
                if column >= BOARD_SIZE {
                    return Err(ChessError::InvalidFen {
                        reason: format!("Row {} has too many columns", row_idx),
                    });
                }

                if let Some(empty_count) = c.to_digit(10).filter(|n| (1..=8).contains(n)) {
                    column += empty_count as usize;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    board.place(FILES[column], rank, piece)?;
                    column += 1;
                } else {
                    return Err(ChessError::InvalidFen {
                        reason: format!("Invalid piece character: {}", c),
                    });
                }
            }

            if column != BOARD_SIZE {
                return Err(ChessError::InvalidFen {
                    reason: format!("Row {} has {} columns, expected {}", row_idx, column, BOARD_SIZE),
                });
            }
        }

        Ok(board)
    }
}
