//! 棋盘常量定义

/// 棋盘边长（行数与列数）
pub const BOARD_SIZE: usize = 8;

/// 列名，从 a 到 h
pub const FILES: [char; BOARD_SIZE] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];

/// 吃过路兵目标格（固定占位）
pub const FEN_EN_PASSANT: &str = "-";

/// 半回合计数（固定占位）
pub const FEN_HALFMOVE_CLOCK: &str = "0";

/// 回合数（固定占位）
pub const FEN_FULLMOVE_NUMBER: &str = "1";

/// 无易位权时的占位
pub const FEN_NO_CASTLING: &str = "-";
