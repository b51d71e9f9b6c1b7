//! 棋子定义

use serde::{Deserialize, Deserializer, Serialize};

/// 棋子类型
///
/// 六种标准棋子之外的变体棋子用 `Other` 携带其自身记号。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
    /// 变体棋子（如 "archbishop"）
    Other(String),
}

impl PieceKind {
    /// 标准棋子的 FEN 字母（大写），变体棋子返回 None
    pub fn standard_letter(&self) -> Option<char> {
        match self {
            PieceKind::Pawn => Some('P'),
            PieceKind::Knight => Some('N'),
            PieceKind::Bishop => Some('B'),
            PieceKind::Rook => Some('R'),
            PieceKind::Queen => Some('Q'),
            PieceKind::King => Some('K'),
            PieceKind::Other(_) => None,
        }
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<(PieceKind, Side)> {
        let side = if c.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };
        Some((kind, side))
    }

    /// 类型名称（与宿主快照中的 `type` 字段一致）
    pub fn name(&self) -> &str {
        match self {
            PieceKind::Pawn => "pawn",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Rook => "rook",
            PieceKind::Queen => "queen",
            PieceKind::King => "king",
            PieceKind::Other(name) => name,
        }
    }
}

impl From<String> for PieceKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "pawn" => PieceKind::Pawn,
            "knight" => PieceKind::Knight,
            "bishop" => PieceKind::Bishop,
            "rook" => PieceKind::Rook,
            "queen" => PieceKind::Queen,
            "king" => PieceKind::King,
            _ => PieceKind::Other(name),
        }
    }
}

impl From<PieceKind> for String {
    fn from(kind: PieceKind) -> Self {
        kind.name().to_string()
    }
}

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// 阵营名称，`"white"` 或 `"black"`
    pub fn name(&self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }
}

/// 宿主快照中的阵营：`"white"` 或 `{ "name": "white" }`
#[derive(Deserialize)]
#[serde(untagged)]
enum SideRepr {
    Plain(Side),
    Named { name: Side },
}

fn deserialize_side<'de, D>(deserializer: D) -> std::result::Result<Side, D::Error>
where
    D: Deserializer<'de>,
{
    match SideRepr::deserialize(deserializer)? {
        SideRepr::Plain(side) | SideRepr::Named { name: side } => Ok(side),
    }
}

/// 棋子
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    #[serde(rename = "type")]
    pub kind: PieceKind,
    #[serde(deserialize_with = "deserialize_side")]
    pub side: Side,
    /// 棋子自身记号，变体棋子的 FEN 字母由它决定
    #[serde(default)]
    pub notation: String,
    /// 该棋子已走的步数，0 表示从未移动
    #[serde(default)]
    pub move_count: u32,
}

impl Piece {
    /// 创建未移动过的棋子
    pub fn new(kind: PieceKind, side: Side) -> Self {
        let notation = kind
            .standard_letter()
            .map(|c| c.to_string())
            .unwrap_or_else(|| kind.name().to_string());
        Self {
            kind,
            side,
            notation,
            move_count: 0,
        }
    }

    /// 创建变体棋子
    pub fn variant(name: &str, notation: &str, side: Side) -> Self {
        Self {
            kind: PieceKind::Other(name.to_string()),
            side,
            notation: notation.to_string(),
            move_count: 0,
        }
    }

    /// 设置步数
    pub fn with_move_count(mut self, move_count: u32) -> Self {
        self.move_count = move_count;
        self
    }

    /// 是否从未移动
    pub fn is_unmoved(&self) -> bool {
        self.move_count == 0
    }

    /// 获取 FEN 记号（白方大写，黑方小写）
    pub fn to_fen_notation(&self) -> String {
        let letter = match self.kind.standard_letter() {
            Some(c) => c.to_string(),
            None => self.notation.to_uppercase(),
        };
        match self.side {
            Side::White => letter,
            Side::Black => letter.to_lowercase(),
        }
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<Piece> {
        PieceKind::from_fen_char(c).map(|(kind, side)| Piece::new(kind, side))
    }
}
