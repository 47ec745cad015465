//! 定界符：`\left( .. \right)` 与 `\big(` 一族

use log::trace;
use phf::phf_map;

use crate::ast::{BraceNode, BraceType, Node};
use crate::error::ParseError;

use super::super::lexer::Token;
use super::super::Parser;
use super::InstructionKind;

/// `\bigl` 放在左侧，`\bigr` 放在右侧，`\big`/`\bigm` 按括号的朝向决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BigSide {
    Open,
    Close,
    Auto,
}

/// 指令名 → (支撑高度 em, 位置)
static BIG: phf::Map<&'static str, (f32, BigSide)> = phf_map! {
    "big" => (0.85, BigSide::Auto),
    "bigm" => (0.85, BigSide::Auto),
    "bigl" => (0.85, BigSide::Open),
    "bigr" => (0.85, BigSide::Close),
    "Big" => (1.15, BigSide::Auto),
    "Bigm" => (1.15, BigSide::Auto),
    "Bigl" => (1.15, BigSide::Open),
    "Bigr" => (1.15, BigSide::Close),
    "bigg" => (1.45, BigSide::Auto),
    "biggm" => (1.45, BigSide::Auto),
    "biggl" => (1.45, BigSide::Open),
    "biggr" => (1.45, BigSide::Close),
    "Bigg" => (1.75, BigSide::Auto),
    "Biggm" => (1.75, BigSide::Auto),
    "Biggl" => (1.75, BigSide::Open),
    "Biggr" => (1.75, BigSide::Close),
};

/// 以指令形式书写的括号 → (类型, 是否为左括号)
static NAMED_BRACES: phf::Map<&'static str, (BraceType, bool)> = phf_map! {
    "{" => (BraceType::CurlyBracket, true),
    "}" => (BraceType::CurlyBracket, false),
    "lbrace" => (BraceType::CurlyBracket, true),
    "rbrace" => (BraceType::CurlyBracket, false),
    "|" => (BraceType::DoubleLine, true),
    "Vert" => (BraceType::DoubleLine, true),
    "lVert" => (BraceType::DoubleLine, true),
    "rVert" => (BraceType::DoubleLine, false),
    "vert" => (BraceType::SingleLine, true),
    "lvert" => (BraceType::SingleLine, true),
    "rvert" => (BraceType::SingleLine, false),
    "langle" => (BraceType::AngleBracket, true),
    "rangle" => (BraceType::AngleBracket, false),
    "lfloor" => (BraceType::FloorBracket, true),
    "rfloor" => (BraceType::FloorBracket, false),
    "lceil" => (BraceType::CeilBracket, true),
    "rceil" => (BraceType::CeilBracket, false),
    "lbrack" => (BraceType::SquareBracket, true),
    "rbrack" => (BraceType::SquareBracket, false),
};

pub fn lookup(name: &str) -> Option<InstructionKind> {
    if name == "left" {
        return Some(InstructionKind::Left);
    }
    BIG.get(name)
        .map(|&(factor, side)| InstructionKind::Big { factor, side })
}

fn char_brace(ch: char) -> Option<(BraceType, bool)> {
    Some(match ch {
        '(' => (BraceType::Parenthesis, true),
        ')' => (BraceType::Parenthesis, false),
        '[' => (BraceType::SquareBracket, true),
        ']' => (BraceType::SquareBracket, false),
        '|' => (BraceType::SingleLine, true),
        '<' => (BraceType::AngleBracket, true),
        '>' => (BraceType::AngleBracket, false),
        '.' => (BraceType::None, true),
        _ => return None,
    })
}

impl Parser {
    /// 读取 `\left`、`\right`、`\big` 之后的括号
    pub(crate) fn read_brace(&mut self, instruction: &str) -> Option<(BraceType, bool)> {
        let pos = self.position();
        match self.next_skip_whitespace() {
            Token::Text(text) => {
                let mut chars = text.chars();
                let first = chars.next()?;
                let rest: String = chars.collect();
                if !rest.is_empty() {
                    self.push_back(Token::Text(rest));
                }
                let brace = char_brace(first);
                if brace.is_none() {
                    self.error(ParseError::UnexpectedBraceToken {
                        pos,
                        instruction: instruction.to_string(),
                    });
                }
                brace
            }
            Token::OpenBracket => Some((BraceType::SquareBracket, true)),
            Token::CloseBracket => Some((BraceType::SquareBracket, false)),
            Token::Underscore => Some((BraceType::FloorBracket, true)),
            Token::Tilde => Some((BraceType::CeilBracket, true)),
            Token::Instruction(name) => match NAMED_BRACES.get(name.as_str()) {
                Some(&brace) => Some(brace),
                None => {
                    self.error(ParseError::UnknownInstruction { pos, name: name.clone() });
                    self.push_back(Token::Instruction(name));
                    None
                }
            },
            other => {
                self.error(ParseError::UnexpectedBraceToken {
                    pos,
                    instruction: instruction.to_string(),
                });
                self.push_back(other);
                None
            }
        }
    }

    /// `\right` 出现时由列表解析调用，结果暂存给外层的 `\left`
    pub(crate) fn read_right_brace(&mut self) {
        self.last_right_brace = self
            .read_brace("right")
            .map(|(brace, _)| brace)
            .unwrap_or(BraceType::None);
    }

    /// `\left` 已被读取
    pub(crate) fn parse_left(&mut self) -> Node {
        let start = self.position();
        let open = self
            .read_brace("left")
            .map(|(brace, _)| brace)
            .unwrap_or(BraceType::None);
        let mut content = Vec::new();
        let close = loop {
            let (items, end) = self.parse_list(false);
            content.extend(items);
            match end {
                Token::Instruction(name) if name == "right" => break self.last_right_brace,
                other => {
                    self.error(ParseError::UnmatchedLeft(start));
                    self.restore_terminator(other);
                    break BraceType::None;
                }
            }
        };
        trace!("\\left 配对完成: {:?} .. {:?}", open, close);
        Node::Brace(BraceNode {
            open,
            close,
            child: Box::new(Node::HorizontalList(content).simplify()),
        })
    }

    /// `\big(` 一族：括号包住一个不可见的支撑盒
    pub(crate) fn parse_big(&mut self, name: &str, factor: f32, side: BigSide) -> Node {
        let Some((brace, opening)) = self.read_brace(name) else {
            return Node::Strut(factor);
        };
        let as_open = match side {
            BigSide::Open => true,
            BigSide::Close => false,
            BigSide::Auto => opening,
        };
        let (open, close) = if as_open {
            (brace, BraceType::None)
        } else {
            (BraceType::None, brace)
        };
        Node::Brace(BraceNode {
            open,
            close,
            child: Box::new(Node::Strut(factor)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_family_heights_grow() {
        let heights: Vec<f32> = ["big", "Big", "bigg", "Bigg"]
            .iter()
            .filter_map(|name| BIG.get(*name).map(|(factor, _)| *factor))
            .collect();
        assert_eq!(heights, vec![0.85, 1.15, 1.45, 1.75]);
        assert_eq!(BIG.get("Biggr").map(|(_, side)| *side), Some(BigSide::Close));
    }

    #[test]
    fn named_braces_know_their_side() {
        assert_eq!(
            NAMED_BRACES.get("rangle").copied(),
            Some((BraceType::AngleBracket, false))
        );
        assert_eq!(char_brace('.'), Some((BraceType::None, true)));
        assert_eq!(char_brace('x'), None);
        assert_eq!(lookup("left"), Some(InstructionKind::Left));
        assert_eq!(lookup("right"), None);
    }
}
