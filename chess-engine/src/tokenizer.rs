//! 引擎输出行的词法游标
//!
//! 按空白切分一行文本，只提供带边界检查的前进操作，
//! 关键字之后缺少的取值表现为 `None`，不会越界。

use std::str::FromStr;

/// 词法游标
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    /// 创建游标
    pub fn new(line: &'a str) -> Self {
        Self {
            tokens: line.split_whitespace().collect(),
            pos: 0,
        }
    }

    /// 查看下一个词但不前进
    pub fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    /// 下一个词能解析为 `T` 时消费它，否则保持位置不变
    pub fn next_parsed<T: FromStr>(&mut self) -> Option<T> {
        let value = self.peek()?.parse().ok()?;
        self.pos += 1;
        Some(value)
    }

    /// 下一个词等于 `expected` 时消费它
    pub fn eat(&mut self, expected: &str) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// 消费剩余所有词
    pub fn rest(&mut self) -> Vec<&'a str> {
        let rest = self.tokens[self.pos..].to_vec();
        self.pos = self.tokens.len();
        rest
    }

    /// 剩余词数
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.pos
    }
}

impl<'a> Iterator for TokenCursor<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }
}
