//! UCI 输出行解析
//!
//! 只识别四种行：`uciok`、`readyok`、以 `info depth` 开头的分析行
//! 和以 `bestmove` 开头的结果行，其余一律视为 `Other`。

use crate::constants::{MATE_SCORE, MIN_REPORT_DEPTH};
use crate::event::AnalysisResult;
use crate::tokenizer::TokenCursor;

/// 解析后的引擎输出行
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineLine {
    UciOk,
    ReadyOk,
    Info(InfoLine),
    BestMove {
        best: Option<String>,
        ponder: Option<String>,
    },
    Other,
}

impl EngineLine {
    /// 解析一行
    pub fn parse(line: &str) -> Self {
        if line == "uciok" {
            EngineLine::UciOk
        } else if line == "readyok" {
            EngineLine::ReadyOk
        } else if line.starts_with("info depth") {
            EngineLine::Info(InfoLine::parse(line))
        } else if line.starts_with("bestmove") {
            Self::parse_best_move(line)
        } else {
            EngineLine::Other
        }
    }

    // bestmove <move> [ponder <move>]
    fn parse_best_move(line: &str) -> Self {
        let mut cursor = TokenCursor::new(line);
        cursor.next();
        let best = cursor.next().map(str::to_string);
        let ponder = if cursor.eat("ponder") {
            cursor.next().map(str::to_string)
        } else {
            None
        };
        EngineLine::BestMove { best, ponder }
    }
}

/// `info` 行中关心的字段
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoLine {
    pub depth: Option<u32>,
    pub score: Option<i32>,
    pub mate: Option<i32>,
    pub pv: Vec<String>,
}

impl InfoLine {
    /// 从左到右扫描；`pv` 之后的所有词都属于主变
    pub fn parse(line: &str) -> Self {
        let mut info = InfoLine::default();
        let mut cursor = TokenCursor::new(line);

        while let Some(token) = cursor.next() {
            match token {
                "depth" => {
                    if let Some(depth) = cursor.next_parsed() {
                        info.depth = Some(depth);
                    }
                }
                "score" => {
                    if cursor.eat("cp") {
                        if let Some(score) = cursor.next_parsed() {
                            info.score = Some(score);
                        }
                    } else if cursor.eat("mate") {
                        if let Some(mate) = cursor.next_parsed() {
                            info.mate = Some(mate);
                        }
                    }
                }
                "pv" => {
                    info.pv = cursor.rest().into_iter().map(str::to_string).collect();
                    break;
                }
                _ => {}
            }
        }

        info
    }

    /// 转换为分析结果
    ///
    /// 深度不足 `MIN_REPORT_DEPTH` 或既无分值也无杀棋步数时返回 None。
    pub fn to_analysis(&self) -> Option<AnalysisResult> {
        let depth = self.depth.filter(|d| *d >= MIN_REPORT_DEPTH)?;
        if self.score.is_none() && self.mate.is_none() {
            return None;
        }

        let score = self.score.unwrap_or(match self.mate {
            Some(mate) if mate > 0 => MATE_SCORE,
            _ => -MATE_SCORE,
        });

        Some(AnalysisResult {
            score,
            mate: self.mate,
            best_move: self.pv.first().cloned(),
            depth,
            pv: self.pv.clone(),
        })
    }
}
