//! 棋盘状态
//!
//! 棋盘是格子的无序集合。没有记录的坐标与记录了但没有棋子的格子等价，
//! 都视为空格。

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_SIZE, FILES};
use crate::error::{ChessError, Result};
use crate::piece::{Piece, PieceKind, Side};

/// 格子
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Square {
    /// 列 (a-h)
    pub file: char,
    /// 行 (1-8)
    pub rank: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece: Option<Piece>,
}

impl Square {
    /// 检查坐标是否在棋盘内
    pub fn is_valid_coordinate(file: char, rank: u8) -> bool {
        FILES.contains(&file) && (1..=BOARD_SIZE as u8).contains(&rank)
    }
}

/// 棋盘
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    squares: Vec<Square>,
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self::default()
    }

    /// 创建标准初始局面
    pub fn standard() -> Self {
        let mut board = Self::empty();
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        for (file, kind) in FILES.iter().zip(back_rank) {
            board.put(*file, 1, Piece::new(kind.clone(), Side::White));
            board.put(*file, 2, Piece::new(PieceKind::Pawn, Side::White));
            board.put(*file, 7, Piece::new(PieceKind::Pawn, Side::Black));
            board.put(*file, 8, Piece::new(kind, Side::Black));
        }

        board
    }

    /// 从宿主提供的 JSON 快照构造棋盘
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ChessError::InvalidBoard {
            reason: e.to_string(),
        })
    }

    /// 所有格子记录
    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    /// 查找格子记录
    pub fn square(&self, file: char, rank: u8) -> Option<&Square> {
        self.squares
            .iter()
            .find(|s| s.file == file && s.rank == rank)
    }

    /// 获取指定坐标的棋子
    pub fn piece_at(&self, file: char, rank: u8) -> Option<&Piece> {
        self.square(file, rank).and_then(|s| s.piece.as_ref())
    }

    /// 放置棋子，已有棋子会被替换
    pub fn place(&mut self, file: char, rank: u8, piece: Piece) -> Result<()> {
        if !Square::is_valid_coordinate(file, rank) {
            return Err(ChessError::InvalidSquare { file, rank });
        }
        self.put(file, rank, piece);
        Ok(())
    }

    /// 移除指定坐标的棋子，返回被移除的棋子
    pub fn remove(&mut self, file: char, rank: u8) -> Option<Piece> {
        self.squares
            .iter_mut()
            .find(|s| s.file == file && s.rank == rank)
            .and_then(|s| s.piece.take())
    }

    /// 棋子数量
    pub fn piece_count(&self) -> usize {
        self.squares.iter().filter(|s| s.piece.is_some()).count()
    }

    // 坐标已校验
    fn put(&mut self, file: char, rank: u8, piece: Piece) {
        match self
            .squares
            .iter_mut()
            .find(|s| s.file == file && s.rank == rank)
        {
            Some(square) => square.piece = Some(piece),
            None => self.squares.push(Square {
                file,
                rank,
                piece: Some(piece),
            }),
        }
    }
}
